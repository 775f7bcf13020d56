//! Client-side router.
//!
//! Maps URL paths to views, enforces per-route async guards, keeps browser
//! history in sync, and intercepts internal anchor clicks so navigation
//! never reloads the page.
//!
//! Overlapping navigations are arbitrated with a generation counter: every
//! `navigate` claims a new generation, and after each await point a stale
//! navigation abandons the DOM without touching it. The last call to
//! `navigate` wins regardless of how long its guard or view takes to
//! resolve.

mod link;
mod matcher;
mod navigator;
mod params;
mod view;

pub use link::{classify, LinkAction, LinkCandidate};
pub use matcher::{strip_query, Pattern};
pub use navigator::Navigator;
pub use params::RouteParams;
pub use view::{BoxedView, View};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsValue;

use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::routes::RouteTable;
use crate::templates;

pub struct Router {
    inner: Rc<RouterInner>,
}

pub(crate) struct RouterInner {
    table: RouteTable,
    container_id: &'static str,
    generation: Cell<u64>,
    current: RefCell<Option<BoxedView>>,
    ctx: RefCell<Option<AppContext>>,
    listeners: RefCell<Listeners>,
}

impl Router {
    pub fn new(table: RouteTable, container_id: &'static str) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                table,
                container_id,
                generation: Cell::new(0),
                current: RefCell::new(None),
                ctx: RefCell::new(None),
                listeners: RefCell::new(Listeners::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RouterInner>) -> Self {
        Self { inner }
    }

    /// Handle for views and components to trigger navigation.
    pub fn navigator(&self) -> Navigator {
        Navigator::new(Rc::downgrade(&self.inner))
    }

    /// Set the context views are constructed with. Must be called before the
    /// first navigation.
    pub fn set_context(&self, ctx: AppContext) {
        *self.inner.ctx.borrow_mut() = Some(ctx);
    }

    /// Wire up history and link interception.
    pub fn attach(&self) {
        let mut listeners = self.inner.listeners.borrow_mut();
        let nav = self.navigator();
        listeners.on(&dom::window(), "popstate", move |_event| {
            nav.pop_state();
        });
        let nav = self.navigator();
        listeners.on(&dom::document(), "click", move |event| {
            link::on_document_click(&nav, &event);
        });
    }

    /// Resolve a path against the route table.
    pub fn find_route(
        &self,
        path: &str,
    ) -> Option<(&crate::routes::RouteDef, RouteParams)> {
        self.inner.table.find(strip_query(path))
    }

    /// Navigate to a path. `params` overrides query-string parsing; `push`
    /// controls whether a history entry is written.
    pub async fn navigate(&self, path: &str, params: Option<RouteParams>, push: bool) {
        let generation = self.begin();
        let (bare, query_params) = RouteParams::split_path(path);
        let mut params = params.unwrap_or(query_params);

        let Some(ctx) = self.ctx() else {
            tracing::error!("router used before context was set");
            return;
        };

        let resolved = self.inner.table.find(bare);
        if let Some((_, captures)) = &resolved {
            params.extend(captures);
        }

        if let Some((route, _)) = &resolved {
            if let Some(guard) = route.guard {
                if !guard(ctx.clone()).await {
                    tracing::debug!(path, "navigation blocked by guard");
                    return;
                }
                if !self.is_current(generation) {
                    return;
                }
            }
        }

        if push {
            if let Ok(history) = dom::window().history() {
                if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
                    tracing::warn!(?err, path, "push_state failed");
                }
            }
        }

        self.load_route(bare, resolved, params, ctx, generation).await;
    }

    async fn load_route(
        &self,
        path: &str,
        resolved: Option<(&crate::routes::RouteDef, RouteParams)>,
        params: RouteParams,
        ctx: AppContext,
        generation: u64,
    ) {
        let Some(container) = dom::get(self.inner.container_id) else {
            tracing::error!(
                container = self.inner.container_id,
                "app container missing"
            );
            return;
        };

        let Some((route, _)) = resolved else {
            tracing::debug!(path, "no route matched");
            dom::set_html(&container, &templates::not_found());
            return;
        };

        dom::set_title(route.title);
        dom::set_html(&container, &templates::loading());

        let result: anyhow::Result<Option<BoxedView>> = async {
            let mut view = route.id.build(ctx, params).await;
            if !self.is_current(generation) {
                return Ok(None);
            }
            if let Some(mut old) = self.inner.current.borrow_mut().take() {
                old.destroy();
            }
            view.render().await?;
            Ok(Some(view))
        }
        .await;

        match result {
            Ok(Some(mut view)) => {
                if self.is_current(generation) {
                    *self.inner.current.borrow_mut() = Some(view);
                    dom::dispatch("route-change", path);
                } else {
                    // a newer navigation owns the container now
                    view.destroy();
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(%err, path, "route load failed");
                if self.is_current(generation) {
                    dom::set_html(&container, &templates::error_page(&format!("{err:#}")));
                }
            }
        }
    }

    fn ctx(&self) -> Option<AppContext> {
        self.inner.ctx.borrow().clone()
    }

    fn begin(&self) -> u64 {
        let next = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(next);
        next
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.get() == generation
    }
}
