//! Landing page: hero search, categories, freshest listings.

use futures_util::future::LocalBoxFuture;
use minijinja::context;

use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{Category, Listing};

pub struct HomePage {
    ctx: AppContext,
    listeners: Listeners,
}

impl HomePage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let nav = self.ctx.navigator.clone();
        self.listeners
            .on_id("home-search-form", "submit", move |event| {
                event.prevent_default();
                let q = dom::input_value("home-search");
                let q = q.trim().to_owned();
                if q.is_empty() {
                    nav.go("/listings");
                } else {
                    nav.go(&format!("/listings?q={}", urlencoding::encode(&q)));
                }
            });
    }
}

impl View for HomePage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let categories: Vec<Category> = self
                .ctx
                .backend
                .table("categories")
                .order("name", true)
                .fetch()
                .await?;
            let listings: Vec<Listing> = self
                .ctx
                .backend
                .table("listings")
                .eq("status", "active")
                .order("created_at", false)
                .limit(8)
                .fetch()
                .await?;
            let cards = cards::collect(&self.ctx, &listings).await?;

            let html = templates::render("home.html", context! { categories, cards })?;
            dom::set_html(&container, &html);
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}
