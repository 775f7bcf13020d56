//! Shared template environment.
//!
//! Every page renders HTML through a single minijinja [`Environment`] holding
//! templates embedded at compile time. Template names end in `.html` so the
//! environment's default auto-escaping applies to all interpolated user
//! content.

use std::sync::OnceLock;

use minijinja::{context, Environment};

/// Every embedded template, by name.
const TEMPLATES: &[(&str, &str)] = &[
    ("loading.html", include_str!("../templates/loading.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("navbar.html", include_str!("../templates/navbar.html")),
    ("footer.html", include_str!("../templates/footer.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("listings.html", include_str!("../templates/listings.html")),
    (
        "listings_grid.html",
        include_str!("../templates/listings_grid.html"),
    ),
    (
        "listing_detail.html",
        include_str!("../templates/listing_detail.html"),
    ),
    ("contact.html", include_str!("../templates/contact.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    (
        "my_listings.html",
        include_str!("../templates/my_listings.html"),
    ),
    (
        "my_listings_rows.html",
        include_str!("../templates/my_listings_rows.html"),
    ),
    (
        "listing_edit.html",
        include_str!("../templates/listing_edit.html"),
    ),
    (
        "existing_images.html",
        include_str!("../templates/existing_images.html"),
    ),
    (
        "pending_images.html",
        include_str!("../templates/pending_images.html"),
    ),
    ("messages.html", include_str!("../templates/messages.html")),
    (
        "conversations_list.html",
        include_str!("../templates/conversations_list.html"),
    ),
    (
        "message_thread.html",
        include_str!("../templates/message_thread.html"),
    ),
    (
        "admin_dashboard.html",
        include_str!("../templates/admin_dashboard.html"),
    ),
    (
        "admin_moderation.html",
        include_str!("../templates/admin_moderation.html"),
    ),
    (
        "admin_moderation_rows.html",
        include_str!("../templates/admin_moderation_rows.html"),
    ),
    (
        "admin_reports.html",
        include_str!("../templates/admin_reports.html"),
    ),
    (
        "admin_reports_rows.html",
        include_str!("../templates/admin_reports_rows.html"),
    ),
    ("admin_audit.html", include_str!("../templates/admin_audit.html")),
    ("admin_users.html", include_str!("../templates/admin_users.html")),
    (
        "admin_users_rows.html",
        include_str!("../templates/admin_users_rows.html"),
    ),
];

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn env() -> &'static Environment<'static> {
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES.iter().copied() {
            if let Err(err) = env.add_template(name, source) {
                tracing::error!(template = name, %err, "failed to register template");
            }
        }
        env.add_filter("price", price);
        env.add_filter("datefmt", datefmt);
        env.add_filter("datetimefmt", datetimefmt);
        env.add_filter("excerpt", excerpt);
        env
    })
}

/// Render a named template with the given context.
pub fn render(name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    env().get_template(name)?.render(ctx)
}

/// Markup for the in-flight navigation placeholder.
pub fn loading() -> String {
    render("loading.html", context! {})
        .unwrap_or_else(|_| r#"<p class="loading">Loading…</p>"#.to_owned())
}

/// Markup for unregistered paths.
pub fn not_found() -> String {
    render("not_found.html", context! {})
        .unwrap_or_else(|_| "<h1>Page not found</h1>".to_owned())
}

/// Markup for a failed navigation, carrying the error's message.
pub fn error_page(message: &str) -> String {
    render("error.html", context! { message })
        .unwrap_or_else(|_| "<h1>Something went wrong</h1>".to_owned())
}

fn price(value: f64) -> String {
    format!("${value:.2}")
}

/// `2024-05-01T12:30:00Z` → `2024-05-01`
fn datefmt(value: String) -> String {
    value.chars().take(10).collect()
}

/// `2024-05-01T12:30:00Z` → `2024-05-01 12:30`
fn datetimefmt(value: String) -> String {
    let prefix: String = value.chars().take(16).collect();
    prefix.replace('T', " ")
}

fn excerpt(value: String, max: usize) -> String {
    if value.chars().count() <= max {
        value
    } else {
        let mut cut: String = value.chars().take(max).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_template_renders() {
        let html = not_found();
        assert!(html.contains("Page not found"));
    }

    #[test]
    fn error_template_carries_message() {
        let html = error_page("boom");
        assert!(html.contains("boom"));
    }

    #[test]
    fn error_template_escapes_markup() {
        let html = error_page("<script>alert(1)</script>");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn price_filter_formats_two_decimals() {
        assert_eq!(price(12.5), "$12.50");
        assert_eq!(price(0.0), "$0.00");
    }

    #[test]
    fn datetime_filters_trim_rfc3339() {
        assert_eq!(datefmt("2024-05-01T12:30:00Z".into()), "2024-05-01");
        assert_eq!(datetimefmt("2024-05-01T12:30:00Z".into()), "2024-05-01 12:30");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("héllo wörld".into(), 5), "héllo…");
        assert_eq!(excerpt("short".into(), 10), "short");
    }
}
