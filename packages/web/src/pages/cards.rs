//! Listing card view-models shared by the browse pages.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::backend::BackendError;
use crate::context::AppContext;
use crate::types::{Category, Listing, ListingImage};

/// Bucket holding listing photos.
pub const IMAGE_BUCKET: &str = "listing-images";

/// Bucket holding profile avatars.
pub const AVATAR_BUCKET: &str = "avatars";

#[derive(Debug, Serialize)]
pub struct ListingCard {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub location: Option<String>,
    pub created_at: String,
    pub status: String,
    pub status_label: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

/// Build cards for a set of listings, resolving primary images and category
/// names in two batched queries.
pub async fn collect(
    ctx: &AppContext,
    listings: &[Listing],
) -> Result<Vec<ListingCard>, BackendError> {
    if listings.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = listings.iter().map(|l| l.id.to_string()).collect();
    let images: Vec<ListingImage> = ctx
        .backend
        .table("listing_images")
        .eq("is_primary", "true")
        .in_("listing_id", &ids)
        .fetch()
        .await?;
    let mut image_paths: HashMap<Uuid, String> = HashMap::new();
    for image in images {
        image_paths.entry(image.listing_id).or_insert(image.path);
    }

    let category_ids: Vec<String> = listings
        .iter()
        .filter_map(|l| l.category_id)
        .map(|id| id.to_string())
        .collect();
    let mut category_names: HashMap<Uuid, String> = HashMap::new();
    if !category_ids.is_empty() {
        let categories: Vec<Category> = ctx
            .backend
            .table("categories")
            .in_("id", &category_ids)
            .fetch()
            .await?;
        for category in categories {
            category_names.insert(category.id, category.name);
        }
    }

    Ok(listings
        .iter()
        .map(|listing| ListingCard {
            id: listing.id.to_string(),
            title: listing.title.clone(),
            price: listing.price,
            location: listing.location.clone(),
            created_at: listing.created_at.to_rfc3339(),
            status: listing.status.as_str().to_owned(),
            status_label: listing.status.label().to_owned(),
            image_url: image_paths
                .get(&listing.id)
                .map(|path| ctx.backend.public_url(IMAGE_BUCKET, path)),
            category: listing
                .category_id
                .and_then(|id| category_names.get(&id).cloned()),
        })
        .collect())
}
