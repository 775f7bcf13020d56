//! Open reports against listings.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use serde_json::json;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::admin::record_audit;
use crate::pages::lookup;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::Report;

pub struct AdminReportsPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl AdminReportsPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners.on_id("reports-rows", "click", move |event| {
            if let Some(id) = dom::closest_attr(&event, "data-resolve") {
                event.prevent_default();
                close_report(ctx.clone(), id, "resolved");
            } else if let Some(id) = dom::closest_attr(&event, "data-dismiss") {
                event.prevent_default();
                close_report(ctx.clone(), id, "dismissed");
            }
        });
    }
}

impl View for AdminReportsPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("admin_reports.html", context! {})?;
            dom::set_html(&container, &html);
            reload_rows(&self.ctx).await?;
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

async fn reload_rows(ctx: &AppContext) -> anyhow::Result<()> {
    let reports: Vec<Report> = ctx
        .backend
        .table("reports")
        .eq("status", "open")
        .order("created_at", true)
        .fetch()
        .await?;
    let reporter_ids: Vec<Uuid> = reports.iter().map(|report| report.reporter_id).collect();
    let listing_ids: Vec<Uuid> = reports.iter().map(|report| report.listing_id).collect();
    let reporters = lookup::profile_names(ctx, &reporter_ids).await?;
    let listings = lookup::listing_titles(ctx, &listing_ids).await?;

    let rows: Vec<minijinja::Value> = reports
        .iter()
        .map(|report| {
            context! {
                id => report.id.to_string(),
                listing_id => report.listing_id.to_string(),
                listing => listings
                    .get(&report.listing_id)
                    .cloned()
                    .unwrap_or_else(|| "Listing".to_owned()),
                reporter => reporters
                    .get(&report.reporter_id)
                    .cloned()
                    .unwrap_or_else(|| "Member".to_owned()),
                reason => report.reason.clone(),
                details => report.details.clone(),
                created_at => report.created_at.to_rfc3339(),
            }
        })
        .collect();
    let html = templates::render("admin_reports_rows.html", context! { rows })?;
    dom::set_html_by_id("reports-rows", &html);
    Ok(())
}

fn close_report(ctx: AppContext, id: String, status: &'static str) {
    spawn_local(async move {
        let Ok(report_id) = Uuid::parse_str(&id) else {
            return;
        };
        let result = ctx
            .backend
            .table("reports")
            .eq("id", report_id)
            .update(&json!({ "status": status }))
            .await;
        match result {
            Ok(()) => {
                record_audit(
                    &ctx,
                    "report.close",
                    Some(report_id),
                    Some(status.to_owned()),
                )
                .await;
                toast::success("Report closed");
                if let Err(err) = reload_rows(&ctx).await {
                    tracing::warn!(%err, "failed to refresh reports");
                }
            }
            Err(err) => toast::error(&format!("Could not close report: {err}")),
        }
    });
}
