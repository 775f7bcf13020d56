//! Moderation queue: approve or reject pending listings.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::admin::record_audit;
use crate::pages::lookup;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{Listing, ListingPatch, ListingStatus};

pub struct AdminModerationPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl AdminModerationPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners
            .on_id("moderation-rows", "click", move |event| {
                if let Some(id) = dom::closest_attr(&event, "data-approve") {
                    event.prevent_default();
                    decide(ctx.clone(), id, ListingStatus::Active);
                } else if let Some(id) = dom::closest_attr(&event, "data-reject") {
                    event.prevent_default();
                    decide(ctx.clone(), id, ListingStatus::Rejected);
                }
            });
    }
}

impl View for AdminModerationPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("admin_moderation.html", context! {})?;
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
    let pending: Vec<Listing> = ctx
        .backend
        .table("listings")
        .eq("status", "pending")
        .order("created_at", true)
        .fetch()
        .await?;
    let owner_ids: Vec<Uuid> = pending.iter().map(|listing| listing.owner_id).collect();
    let owners = lookup::profile_names(ctx, &owner_ids).await?;

    let rows: Vec<minijinja::Value> = pending
        .iter()
        .map(|listing| {
            context! {
                id => listing.id.to_string(),
                title => listing.title.clone(),
                description => listing.description.clone(),
                price => listing.price,
                owner => owners
                    .get(&listing.owner_id)
                    .cloned()
                    .unwrap_or_else(|| "Member".to_owned()),
                created_at => listing.created_at.to_rfc3339(),
            }
        })
        .collect();
    let html = templates::render("admin_moderation_rows.html", context! { rows })?;
    dom::set_html_by_id("moderation-rows", &html);
    Ok(())
}

fn decide(ctx: AppContext, id: String, status: ListingStatus) {
    spawn_local(async move {
        let Ok(listing_id) = Uuid::parse_str(&id) else {
            return;
        };
        let patch = ListingPatch {
            status: Some(status),
            ..ListingPatch::default()
        };
        let result = ctx
            .backend
            .table("listings")
            .eq("id", listing_id)
            .update(&patch)
            .await;
        match result {
            Ok(()) => {
                let action = match status {
                    ListingStatus::Active => "listing.approve",
                    _ => "listing.reject",
                };
                record_audit(&ctx, action, Some(listing_id), None).await;
                toast::success(match status {
                    ListingStatus::Active => "Listing approved",
                    _ => "Listing rejected",
                });
                if let Err(err) = reload_rows(&ctx).await {
                    tracing::warn!(%err, "failed to refresh moderation queue");
                }
            }
            Err(err) => toast::error(&format!("Moderation action failed: {err}")),
        }
    });
}
