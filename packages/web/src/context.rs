//! Per-view application context.
//!
//! Views receive everything they need (backend client, session store,
//! navigation handle) through their constructor instead of reaching
//! through globals.

use std::rc::Rc;

use crate::auth::SessionStore;
use crate::backend::Backend;
use crate::dom;
use crate::router::Navigator;

#[derive(Clone)]
pub struct AppContext {
    pub backend: Rc<Backend>,
    pub session: SessionStore,
    pub navigator: Navigator,
    /// Id of the element views render into.
    pub container_id: &'static str,
}

impl AppContext {
    pub fn container(&self) -> anyhow::Result<web_sys::Element> {
        dom::container(self.container_id)
    }
}
