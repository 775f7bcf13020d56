//! Weak navigation handle handed to views and components.

use std::rc::Weak;

use wasm_bindgen_futures::spawn_local;

use super::params::RouteParams;
use super::{Router, RouterInner};
use crate::dom;

/// Cloneable handle for triggering navigation without owning the router.
/// Holding only a weak reference keeps views from forming a cycle with the
/// router that owns them.
#[derive(Clone, Default)]
pub struct Navigator {
    inner: Weak<RouterInner>,
}

impl Navigator {
    pub(super) fn new(inner: Weak<RouterInner>) -> Self {
        Self { inner }
    }

    /// Fire-and-forget navigation that writes a history entry.
    pub fn go(&self, path: &str) {
        self.dispatch(path.to_owned(), None, true);
    }

    /// Replay the location after a browser back/forward, without pushing.
    pub fn pop_state(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let location = dom::window().location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_owned());
        let search = location.search().unwrap_or_default();
        let full = format!("{path}{search}");
        spawn_local(async move {
            Router::from_inner(inner).navigate(&full, None, false).await;
        });
    }

    fn dispatch(&self, path: String, params: Option<RouteParams>, push: bool) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        spawn_local(async move {
            Router::from_inner(inner).navigate(&path, params, push).await;
        });
    }
}
