//! Audit log, newest first.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use uuid::Uuid;

use crate::context::AppContext;
use crate::dom;
use crate::pages::lookup;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::AuditEntry;

const PAGE_SIZE: u32 = 100;

pub struct AdminAuditPage {
    ctx: AppContext,
}

impl AdminAuditPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self { ctx }
    }
}

impl View for AdminAuditPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let entries: Vec<AuditEntry> = self
                .ctx
                .backend
                .table("audit_log")
                .order("created_at", false)
                .limit(PAGE_SIZE)
                .fetch()
                .await?;
            let actor_ids: Vec<Uuid> = entries.iter().map(|entry| entry.actor_id).collect();
            let actors = lookup::profile_names(&self.ctx, &actor_ids).await?;

            let rows: Vec<minijinja::Value> = entries
                .iter()
                .map(|entry| {
                    context! {
                        actor => actors
                            .get(&entry.actor_id)
                            .cloned()
                            .unwrap_or_else(|| "Member".to_owned()),
                        action => entry.action.clone(),
                        target_id => entry.target_id.map(|id| id.to_string()),
                        detail => entry.detail.clone(),
                        created_at => entry.created_at.to_rfc3339(),
                    }
                })
                .collect();

            let html = templates::render("admin_audit.html", context! { rows })?;
            dom::set_html(&container, &html);
            Ok(())
        })
    }
}
