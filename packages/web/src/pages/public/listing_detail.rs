//! Listing detail: gallery, seller panel, message composer, report form.

use anyhow::Context as _;
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards::IMAGE_BUCKET;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{
    Category, Listing, ListingImage, ListingPatch, ListingStatus, NewMessage, NewReport, Profile,
};

pub struct ListingDetailPage {
    ctx: AppContext,
    params: RouteParams,
    listeners: Listeners,
}

impl ListingDetailPage {
    pub fn new(ctx: AppContext, params: RouteParams) -> Self {
        Self {
            ctx,
            params,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self, listing_id: Uuid, owner_id: Uuid) {
        let Ok(container) = self.ctx.container() else {
            return;
        };

        // gallery thumbnails swap the main image
        self.listeners.on(&container, "click", move |event| {
            if let Some(src) = dom::closest_attr(&event, "data-image-src") {
                event.prevent_default();
                if let Some(main) = dom::get("detail-main-image") {
                    let _ = main.set_attribute("src", &src);
                }
            }
        });

        // report form visibility toggle
        self.listeners.on_id("report-toggle", "click", move |event| {
            event.prevent_default();
            if let Some(form) = dom::get("report-form") {
                if form.has_attribute("hidden") {
                    let _ = form.remove_attribute("hidden");
                } else {
                    let _ = form.set_attribute("hidden", "");
                }
            }
        });

        let ctx = self.ctx.clone();
        self.listeners.on_id("message-form", "submit", move |event| {
            event.prevent_default();
            send_message(ctx.clone(), listing_id, owner_id);
        });

        let ctx = self.ctx.clone();
        self.listeners.on_id("report-form", "submit", move |event| {
            event.prevent_default();
            submit_report(ctx.clone(), listing_id);
        });

        let ctx = self.ctx.clone();
        self.listeners.on_id("mark-sold", "click", move |event| {
            event.prevent_default();
            mark_sold(ctx.clone(), listing_id);
        });
    }
}

impl View for ListingDetailPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let id = self.params.get("id").context("missing listing id")?;
            let id = Uuid::parse_str(id).context("invalid listing id")?;

            let listing: Option<Listing> = self
                .ctx
                .backend
                .table("listings")
                .eq("id", id)
                .fetch_optional()
                .await?;
            let Some(listing) = listing else {
                dom::set_html(&container, &templates::not_found());
                return Ok(());
            };

            let images: Vec<ListingImage> = self
                .ctx
                .backend
                .table("listing_images")
                .eq("listing_id", id)
                .order("position", true)
                .fetch()
                .await?;
            let seller: Option<Profile> = self
                .ctx
                .backend
                .table("profiles")
                .eq("id", listing.owner_id)
                .fetch_optional()
                .await?;
            let category: Option<Category> = match listing.category_id {
                Some(category_id) => {
                    self.ctx
                        .backend
                        .table("categories")
                        .eq("id", category_id)
                        .fetch_optional()
                        .await?
                }
                None => None,
            };

            let me = self.ctx.session.user();
            let is_owner = me
                .as_ref()
                .map(|user| user.id == listing.owner_id)
                .unwrap_or(false);
            let authenticated = me.is_some();

            let image_urls: Vec<minijinja::Value> = images
                .iter()
                .map(|image| {
                    context! {
                        url => self.ctx.backend.public_url(IMAGE_BUCKET, &image.path),
                        is_primary => image.is_primary,
                    }
                })
                .collect();
            let main_image_url = images
                .iter()
                .find(|image| image.is_primary)
                .or_else(|| images.first())
                .map(|image| self.ctx.backend.public_url(IMAGE_BUCKET, &image.path));

            let listing_id = listing.id;
            let owner_id = listing.owner_id;
            let status_label = listing.status.label();
            let is_active = listing.status == ListingStatus::Active;
            let html = templates::render(
                "listing_detail.html",
                context! {
                    listing,
                    status_label,
                    is_active,
                    images => image_urls,
                    main_image_url,
                    seller_name => seller.map(|p| p.display_name),
                    category => category.map(|c| c.name),
                    is_owner,
                    authenticated,
                },
            )?;
            dom::set_html(&container, &html);
            self.wire(listing_id, owner_id);
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn send_message(ctx: AppContext, listing_id: Uuid, owner_id: Uuid) {
    let Some(user) = ctx.session.user() else {
        toast::info("Please sign in to message the seller");
        ctx.navigator.go("/login");
        return;
    };
    let body = dom::textarea_value("message-body");
    let body = body.trim().to_owned();
    if body.is_empty() {
        return;
    }
    spawn_local(async move {
        let payload = NewMessage {
            listing_id,
            sender_id: user.id,
            recipient_id: owner_id,
            body,
        };
        match ctx
            .backend
            .table("messages")
            .insert::<_, serde_json::Value>(&payload)
            .await
        {
            Ok(_) => {
                toast::success("Message sent");
                dom::set_textarea_value("message-body", "");
            }
            Err(err) => toast::error(&format!("Could not send message: {err}")),
        }
    });
}

fn submit_report(ctx: AppContext, listing_id: Uuid) {
    let Some(user) = ctx.session.user() else {
        toast::info("Please sign in to report a listing");
        ctx.navigator.go("/login");
        return;
    };
    let reason = dom::select_value("report-reason");
    if reason.is_empty() {
        return;
    }
    let details = dom::textarea_value("report-details");
    let details = details.trim();
    let details = (!details.is_empty()).then(|| details.to_owned());
    spawn_local(async move {
        let payload = NewReport {
            listing_id,
            reporter_id: user.id,
            reason,
            details,
            status: "open".to_owned(),
        };
        match ctx
            .backend
            .table("reports")
            .insert::<_, serde_json::Value>(&payload)
            .await
        {
            Ok(_) => {
                toast::success("Report submitted, thank you");
                if let Some(form) = dom::get("report-form") {
                    let _ = form.set_attribute("hidden", "");
                }
            }
            Err(err) => toast::error(&format!("Could not submit report: {err}")),
        }
    });
}

fn mark_sold(ctx: AppContext, listing_id: Uuid) {
    spawn_local(async move {
        let patch = ListingPatch {
            status: Some(ListingStatus::Sold),
            ..ListingPatch::default()
        };
        match ctx
            .backend
            .table("listings")
            .eq("id", listing_id)
            .update(&patch)
            .await
        {
            Ok(()) => {
                toast::success("Listing marked as sold");
                ctx.navigator.go(&format!("/listings/{listing_id}"));
            }
            Err(err) => toast::error(&format!("Update failed: {err}")),
        }
    });
}
