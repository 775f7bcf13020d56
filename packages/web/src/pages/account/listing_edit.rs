//! Listing editor, used for both `/listings/new` and `/listings/:id/edit`.
//!
//! Photos are uploaded on save: chosen files are listed with a "primary"
//! radio, existing photos can be removed or promoted to primary in place.

use anyhow::Context as _;
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use serde_json::json;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards::IMAGE_BUCKET;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{
    Category, Listing, ListingImage, ListingPatch, ListingStatus, NewListing, NewListingImage,
};

pub struct ListingEditPage {
    ctx: AppContext,
    params: RouteParams,
    listeners: Listeners,
}

impl ListingEditPage {
    pub fn new(ctx: AppContext, params: RouteParams) -> Self {
        Self {
            ctx,
            params,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self, listing_id: Option<Uuid>) {
        // chosen files get listed with a primary-photo radio
        self.listeners
            .on_id("listing-images-input", "change", move |_event| {
                render_pending_list();
            });

        if let Some(id) = listing_id {
            let ctx = self.ctx.clone();
            self.listeners
                .on_id("existing-images", "click", move |event| {
                    if let Some(image_id) = dom::closest_attr(&event, "data-remove-image") {
                        event.prevent_default();
                        remove_image(ctx.clone(), id, image_id);
                    } else if let Some(image_id) =
                        dom::closest_attr(&event, "data-make-primary")
                    {
                        event.prevent_default();
                        make_primary(ctx.clone(), id, image_id);
                    }
                });
        }

        let ctx = self.ctx.clone();
        self.listeners.on_id("listing-form", "submit", move |event| {
            event.prevent_default();
            let ctx = ctx.clone();
            spawn_local(async move {
                if let Err(err) = save(&ctx, listing_id).await {
                    toast::error(&format!("Could not save listing: {err}"));
                }
            });
        });
    }
}

impl View for ListingEditPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let me = self
                .ctx
                .session
                .user()
                .context("listing editor without a session")?
                .id;

            let listing_id = match self.params.get("id") {
                Some(raw) => Some(Uuid::parse_str(raw).context("invalid listing id")?),
                None => None,
            };

            let categories: Vec<Category> = self
                .ctx
                .backend
                .table("categories")
                .order("name", true)
                .fetch()
                .await?;

            let (listing, images) = match listing_id {
                Some(id) => {
                    let listing: Listing = self
                        .ctx
                        .backend
                        .table("listings")
                        .eq("id", id)
                        .fetch_one()
                        .await?;
                    if listing.owner_id != me {
                        toast::error("You can only edit your own listings");
                        self.ctx.navigator.go("/my-listings");
                        return Ok(());
                    }
                    let images: Vec<ListingImage> = self
                        .ctx
                        .backend
                        .table("listing_images")
                        .eq("listing_id", id)
                        .order("position", true)
                        .fetch()
                        .await?;
                    (Some(listing), images)
                }
                None => (None, Vec::new()),
            };

            let image_rows = image_context(&self.ctx, &images);
            let html = templates::render(
                "listing_edit.html",
                context! {
                    editing => listing.is_some(),
                    listing,
                    categories,
                    images => image_rows,
                },
            )?;
            dom::set_html(&container, &html);
            self.wire(listing_id);
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn image_context(ctx: &AppContext, images: &[ListingImage]) -> Vec<minijinja::Value> {
    images
        .iter()
        .map(|image| {
            context! {
                id => image.id.to_string(),
                url => ctx.backend.public_url(IMAGE_BUCKET, &image.path),
                is_primary => image.is_primary,
            }
        })
        .collect()
}

fn render_pending_list() {
    let files = dom::input_files("listing-images-input");
    let rows: Vec<minijinja::Value> = files
        .iter()
        .enumerate()
        .map(|(index, file)| context! { index, name => file.name() })
        .collect();
    match templates::render("pending_images.html", context! { rows }) {
        Ok(html) => dom::set_html_by_id("pending-images", &html),
        Err(err) => tracing::error!(%err, "pending image list render failed"),
    }
}

fn remove_image(ctx: AppContext, listing_id: Uuid, image_id: String) {
    spawn_local(async move {
        let result = ctx
            .backend
            .table("listing_images")
            .eq("id", &image_id)
            .delete()
            .await;
        match result {
            Ok(()) => reload_existing(&ctx, listing_id).await,
            Err(err) => toast::error(&format!("Could not remove photo: {err}")),
        }
    });
}

fn make_primary(ctx: AppContext, listing_id: Uuid, image_id: String) {
    spawn_local(async move {
        let cleared = ctx
            .backend
            .table("listing_images")
            .eq("listing_id", listing_id)
            .update(&json!({ "is_primary": false }))
            .await;
        let set = match cleared {
            Ok(()) => {
                ctx.backend
                    .table("listing_images")
                    .eq("id", &image_id)
                    .update(&json!({ "is_primary": true }))
                    .await
            }
            Err(err) => Err(err),
        };
        match set {
            Ok(()) => reload_existing(&ctx, listing_id).await,
            Err(err) => toast::error(&format!("Could not update primary photo: {err}")),
        }
    });
}

async fn reload_existing(ctx: &AppContext, listing_id: Uuid) {
    let images: Result<Vec<ListingImage>, _> = ctx
        .backend
        .table("listing_images")
        .eq("listing_id", listing_id)
        .order("position", true)
        .fetch()
        .await;
    match images {
        Ok(images) => {
            let rows = image_context(ctx, &images);
            match templates::render("existing_images.html", context! { images => rows }) {
                Ok(html) => dom::set_html_by_id("existing-images", &html),
                Err(err) => tracing::error!(%err, "photo list render failed"),
            }
        }
        Err(err) => toast::error(&format!("Could not refresh photos: {err}")),
    }
}

/// Read the form, create or patch the listing, then upload new photos.
async fn save(ctx: &AppContext, listing_id: Option<Uuid>) -> anyhow::Result<()> {
    let me = ctx
        .session
        .user()
        .context("listing save without a session")?
        .id;

    let title = dom::input_value("listing-title");
    let title = title.trim().to_owned();
    let description = dom::textarea_value("listing-description");
    let description = description.trim().to_owned();
    if title.is_empty() || description.is_empty() {
        toast::error("Title and description are required");
        return Ok(());
    }
    let price: f64 = match dom::input_value("listing-price").trim().parse() {
        Ok(price) if price >= 0.0 => price,
        _ => {
            toast::error("Please enter a valid price");
            return Ok(());
        }
    };
    let category = dom::select_value("listing-category");
    let category_id = if category.is_empty() {
        None
    } else {
        Some(Uuid::parse_str(&category).context("invalid category")?)
    };
    let location = dom::input_value("listing-location");
    let location = location.trim();
    let location = (!location.is_empty()).then(|| location.to_owned());

    let (id, created) = match listing_id {
        Some(id) => {
            let patch = ListingPatch {
                title: Some(title),
                description: Some(description),
                price: Some(price),
                category_id,
                location,
                ..ListingPatch::default()
            };
            ctx.backend
                .table("listings")
                .eq("id", id)
                .eq("owner_id", me)
                .update(&patch)
                .await?;
            (id, false)
        }
        None => {
            let payload = NewListing {
                owner_id: me,
                title,
                description,
                price,
                category_id,
                status: ListingStatus::Pending,
                location,
            };
            let listing: Listing = ctx
                .backend
                .table("listings")
                .insert_one(&payload)
                .await?;
            (listing.id, true)
        }
    };

    upload_new_images(ctx, id).await?;

    if created {
        toast::success("Listing submitted for review");
        ctx.navigator.go("/my-listings");
    } else {
        toast::success("Listing updated");
        ctx.navigator.go(&format!("/listings/{id}"));
    }
    Ok(())
}

/// Upload the chosen files and insert their rows. The photo picked with the
/// primary radio (or the first upload when the listing has no primary yet)
/// becomes the primary image.
async fn upload_new_images(ctx: &AppContext, listing_id: Uuid) -> anyhow::Result<()> {
    let files = dom::input_files("listing-images-input");
    if files.is_empty() {
        return Ok(());
    }

    let existing: Vec<ListingImage> = ctx
        .backend
        .table("listing_images")
        .eq("listing_id", listing_id)
        .fetch()
        .await?;
    let has_primary = existing.iter().any(|image| image.is_primary);
    let next_position = existing.len() as i32;

    let chosen_primary: Option<usize> = dom::checked_radio_value("new-primary")
        .and_then(|value| value.parse().ok());
    let primary_index = match chosen_primary {
        Some(index) if index < files.len() => Some(index),
        Some(_) => None,
        None if !has_primary => Some(0),
        None => None,
    };

    if primary_index.is_some() && has_primary {
        ctx.backend
            .table("listing_images")
            .eq("listing_id", listing_id)
            .update(&json!({ "is_primary": false }))
            .await?;
    }

    let mut rows = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let bytes = dom::file_bytes(file).await?;
        let name = file.name();
        let ext = name.rsplit('.').next().unwrap_or("jpg").to_lowercase();
        let path = format!("{listing_id}/{}.{ext}", Uuid::new_v4());
        ctx.backend
            .upload(IMAGE_BUCKET, &path, bytes, &file.type_())
            .await?;
        rows.push(NewListingImage {
            listing_id,
            path,
            is_primary: primary_index == Some(index),
            position: next_position + index as i32,
        });
    }

    ctx.backend
        .table("listing_images")
        .insert::<_, serde_json::Value>(&rows)
        .await?;
    Ok(())
}
