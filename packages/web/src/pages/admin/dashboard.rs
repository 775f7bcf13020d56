//! Admin dashboard: entity counts and shortcuts.

use futures_util::future::LocalBoxFuture;
use minijinja::context;

use crate::context::AppContext;
use crate::dom;
use crate::router::{RouteParams, View};
use crate::templates;

pub struct AdminDashboardPage {
    ctx: AppContext,
}

impl AdminDashboardPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self { ctx }
    }
}

impl View for AdminDashboardPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let backend = &self.ctx.backend;

            let listings = backend.table("listings").count().await?;
            let pending = backend
                .table("listings")
                .eq("status", "pending")
                .count()
                .await?;
            let members = backend.table("profiles").count().await?;
            let open_reports = backend
                .table("reports")
                .eq("status", "open")
                .count()
                .await?;
            let messages = backend.table("messages").count().await?;

            let html = templates::render(
                "admin_dashboard.html",
                context! {
                    listings,
                    pending,
                    members,
                    open_reports,
                    messages,
                },
            )?;
            dom::set_html(&container, &html);
            Ok(())
        })
    }
}
