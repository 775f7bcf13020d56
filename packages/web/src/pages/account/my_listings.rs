//! The signed-in user's listings.

use anyhow::Context as _;
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{Listing, ListingPatch, ListingStatus};

pub struct MyListingsPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl MyListingsPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self, me: Uuid) {
        let ctx = self.ctx.clone();
        self.listeners
            .on_id("my-listings-rows", "click", move |event| {
                if let Some(id) = dom::closest_attr(&event, "data-sold") {
                    event.prevent_default();
                    mark_sold(ctx.clone(), me, id);
                } else if let Some(id) = dom::closest_attr(&event, "data-delete") {
                    event.prevent_default();
                    let confirmed = dom::window()
                        .confirm_with_message("Delete this listing? This cannot be undone.")
                        .unwrap_or(false);
                    if confirmed {
                        delete_listing(ctx.clone(), me, id);
                    }
                }
            });
    }
}

impl View for MyListingsPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let me = self
                .ctx
                .session
                .user()
                .context("my-listings page without a session")?
                .id;

            let html = templates::render("my_listings.html", context! {})?;
            dom::set_html(&container, &html);
            reload_rows(&self.ctx, me).await?;
            self.wire(me);
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

async fn reload_rows(ctx: &AppContext, me: Uuid) -> anyhow::Result<()> {
    let listings: Vec<Listing> = ctx
        .backend
        .table("listings")
        .eq("owner_id", me)
        .order("created_at", false)
        .fetch()
        .await?;
    let rows = cards::collect(ctx, &listings).await?;
    let html = templates::render("my_listings_rows.html", context! { rows })?;
    dom::set_html_by_id("my-listings-rows", &html);
    Ok(())
}

fn mark_sold(ctx: AppContext, me: Uuid, id: String) {
    spawn_local(async move {
        let patch = ListingPatch {
            status: Some(ListingStatus::Sold),
            ..ListingPatch::default()
        };
        let result = ctx
            .backend
            .table("listings")
            .eq("id", &id)
            .eq("owner_id", me)
            .update(&patch)
            .await;
        match result {
            Ok(()) => {
                toast::success("Marked as sold");
                if let Err(err) = reload_rows(&ctx, me).await {
                    tracing::warn!(%err, "failed to refresh listings");
                }
            }
            Err(err) => toast::error(&format!("Update failed: {err}")),
        }
    });
}

fn delete_listing(ctx: AppContext, me: Uuid, id: String) {
    spawn_local(async move {
        let result = ctx
            .backend
            .table("listings")
            .eq("id", &id)
            .eq("owner_id", me)
            .delete()
            .await;
        match result {
            Ok(()) => {
                toast::success("Listing deleted");
                if let Err(err) = reload_rows(&ctx, me).await {
                    tracing::warn!(%err, "failed to refresh listings");
                }
            }
            Err(err) => toast::error(&format!("Delete failed: {err}")),
        }
    });
}
