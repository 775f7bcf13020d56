//! Browse listings with category filter, text search, and sort order.
//!
//! Filter state lives in the URL; changing a control navigates to the
//! rebuilt query so results are linkable and back/forward work.

use futures_util::future::LocalBoxFuture;
use minijinja::context;

use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards;
use crate::router::{Navigator, RouteParams, View};
use crate::state::ListingSort;
use crate::templates;
use crate::types::{Category, Listing};

const PAGE_SIZE: u32 = 48;

pub struct ListingsPage {
    ctx: AppContext,
    params: RouteParams,
    listeners: Listeners,
}

impl ListingsPage {
    pub fn new(ctx: AppContext, params: RouteParams) -> Self {
        Self {
            ctx,
            params,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let nav = self.ctx.navigator.clone();
        self.listeners.on_id("browse-form", "submit", move |event| {
            event.prevent_default();
            navigate_from_controls(&nav);
        });
        let nav = self.ctx.navigator.clone();
        self.listeners
            .on_id("browse-category", "change", move |_event| {
                navigate_from_controls(&nav);
            });
        let nav = self.ctx.navigator.clone();
        self.listeners.on_id("browse-sort", "change", move |_event| {
            navigate_from_controls(&nav);
        });
    }
}

impl View for ListingsPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let q = self.params.get("q").unwrap_or("").to_owned();
            let category = self.params.get("category").unwrap_or("").to_owned();
            let sort = ListingSort::from_str(self.params.get("sort").unwrap_or(""));

            let categories: Vec<Category> = self
                .ctx
                .backend
                .table("categories")
                .order("name", true)
                .fetch()
                .await?;

            let mut query = self
                .ctx
                .backend
                .table("listings")
                .eq("status", "active")
                .limit(PAGE_SIZE);
            if !category.is_empty() {
                query = query.eq("category_id", &category);
            }
            if !q.trim().is_empty() {
                query = query.ilike("title", q.trim());
            }
            let (column, ascending) = sort.order_clause();
            let listings: Vec<Listing> = query.order(column, ascending).fetch().await?;
            let cards = cards::collect(&self.ctx, &listings).await?;

            let sorts: Vec<minijinja::Value> = ListingSort::variants()
                .iter()
                .map(|variant| {
                    context! {
                        value => variant.as_str(),
                        label => variant.label(),
                        selected => *variant == sort,
                    }
                })
                .collect();

            let count = cards.len();
            let html = templates::render(
                "listings.html",
                context! {
                    q,
                    selected_category => category,
                    categories,
                    sorts,
                    cards,
                    count,
                },
            )?;
            dom::set_html(&container, &html);
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn navigate_from_controls(nav: &Navigator) {
    let q = dom::input_value("browse-search");
    let category = dom::select_value("browse-category");
    let sort = ListingSort::from_str(&dom::select_value("browse-sort"));
    nav.go(&browse_query(&q, &category, sort));
}

/// Rebuild the browse path from filter state, omitting defaults.
fn browse_query(q: &str, category: &str, sort: ListingSort) -> String {
    let mut parts = Vec::new();
    if !q.trim().is_empty() {
        parts.push(format!("q={}", urlencoding::encode(q.trim())));
    }
    if !category.is_empty() {
        parts.push(format!("category={category}"));
    }
    if sort != ListingSort::Newest {
        parts.push(format!("sort={}", sort.as_str()));
    }
    if parts.is_empty() {
        "/listings".to_owned()
    } else {
        format!("/listings?{}", parts.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_collapse_to_the_bare_path() {
        assert_eq!(browse_query("", "", ListingSort::Newest), "/listings");
        assert_eq!(browse_query("  ", "", ListingSort::Newest), "/listings");
    }

    #[test]
    fn active_filters_round_trip_through_the_query() {
        assert_eq!(
            browse_query("city bike", "abc", ListingSort::PriceAsc),
            "/listings?q=city%20bike&category=abc&sort=price_asc"
        );
    }

    #[test]
    fn newest_sort_is_left_implicit() {
        assert_eq!(
            browse_query("bike", "", ListingSort::Newest),
            "/listings?q=bike"
        );
    }
}
