//! Small batched lookups used by several pages.

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::BackendError;
use crate::context::AppContext;
use crate::types::{Listing, Profile};

/// Display names for a set of profile ids.
pub async fn profile_names(
    ctx: &AppContext,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    let profiles: Vec<Profile> = ctx.backend.table("profiles").in_("id", &ids).fetch().await?;
    Ok(profiles
        .into_iter()
        .map(|profile| (profile.id, profile.display_name))
        .collect())
}

/// Titles for a set of listing ids.
pub async fn listing_titles(
    ctx: &AppContext,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    let listings: Vec<Listing> = ctx.backend.table("listings").in_("id", &ids).fetch().await?;
    Ok(listings
        .into_iter()
        .map(|listing| (listing.id, listing.title))
        .collect())
}
