//! Route table: every path the application serves.

use futures_util::future::LocalBoxFuture;

use crate::auth::{require_admin, require_auth};
use crate::context::AppContext;
use crate::pages::account::{ListingEditPage, MessagesPage, MyListingsPage, ProfilePage};
use crate::pages::admin::{
    AdminAuditPage, AdminDashboardPage, AdminModerationPage, AdminReportsPage, AdminUsersPage,
};
use crate::pages::public::{
    ContactPage, HomePage, ListingDetailPage, ListingsPage, LoginPage, RegisterPage,
};
use crate::router::{BoxedView, Pattern, RouteParams};

/// Guard predicate: false aborts the navigation.
pub type Guard = fn(AppContext) -> LocalBoxFuture<'static, bool>;

/// Every routable page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteId {
    Home,
    Listings,
    ListingNew,
    ListingDetail,
    ListingEdit,
    Contact,
    Login,
    Register,
    Profile,
    MyListings,
    Messages,
    AdminDashboard,
    AdminModeration,
    AdminReports,
    AdminAudit,
    AdminUsers,
}

impl RouteId {
    /// Async view factory. Construction stays lazy per navigation.
    pub fn build(self, ctx: AppContext, params: RouteParams) -> LocalBoxFuture<'static, BoxedView> {
        Box::pin(async move {
            match self {
                RouteId::Home => Box::new(HomePage::new(ctx, params)) as BoxedView,
                RouteId::Listings => Box::new(ListingsPage::new(ctx, params)) as BoxedView,
                RouteId::ListingNew | RouteId::ListingEdit => {
                    Box::new(ListingEditPage::new(ctx, params)) as BoxedView
                }
                RouteId::ListingDetail => {
                    Box::new(ListingDetailPage::new(ctx, params)) as BoxedView
                }
                RouteId::Contact => Box::new(ContactPage::new(ctx, params)) as BoxedView,
                RouteId::Login => Box::new(LoginPage::new(ctx, params)) as BoxedView,
                RouteId::Register => Box::new(RegisterPage::new(ctx, params)) as BoxedView,
                RouteId::Profile => Box::new(ProfilePage::new(ctx, params)) as BoxedView,
                RouteId::MyListings => Box::new(MyListingsPage::new(ctx, params)) as BoxedView,
                RouteId::Messages => Box::new(MessagesPage::new(ctx, params)) as BoxedView,
                RouteId::AdminDashboard => {
                    Box::new(AdminDashboardPage::new(ctx, params)) as BoxedView
                }
                RouteId::AdminModeration => {
                    Box::new(AdminModerationPage::new(ctx, params)) as BoxedView
                }
                RouteId::AdminReports => Box::new(AdminReportsPage::new(ctx, params)) as BoxedView,
                RouteId::AdminAudit => Box::new(AdminAuditPage::new(ctx, params)) as BoxedView,
                RouteId::AdminUsers => Box::new(AdminUsersPage::new(ctx, params)) as BoxedView,
            }
        })
    }
}

pub struct RouteDef {
    pub id: RouteId,
    pub pattern: Pattern,
    pub title: &'static str,
    pub guard: Option<Guard>,
}

pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Resolve an already query-stripped path: exact matches win, then
    /// patterns are tried in declaration order.
    pub fn find(&self, path: &str) -> Option<(&RouteDef, RouteParams)> {
        for route in self.routes.iter().filter(|r| r.pattern.is_static()) {
            if let Some(params) = route.pattern.matches(path) {
                return Some((route, params));
            }
        }
        for route in self.routes.iter().filter(|r| !r.pattern.is_static()) {
            if let Some(params) = route.pattern.matches(path) {
                return Some((route, params));
            }
        }
        None
    }
}

fn route(
    id: RouteId,
    pattern: &'static str,
    title: &'static str,
    guard: Option<Guard>,
) -> RouteDef {
    RouteDef {
        id,
        pattern: Pattern::compile(pattern),
        title,
        guard,
    }
}

/// The application's route table.
pub fn table() -> RouteTable {
    RouteTable::new(vec![
        route(RouteId::Home, "/", "Tradepost — Community Marketplace", None),
        route(RouteId::Listings, "/listings", "Browse listings — Tradepost", None),
        route(
            RouteId::ListingNew,
            "/listings/new",
            "New listing — Tradepost",
            Some(require_auth),
        ),
        route(
            RouteId::ListingDetail,
            "/listings/:id",
            "Listing — Tradepost",
            None,
        ),
        route(
            RouteId::ListingEdit,
            "/listings/:id/edit",
            "Edit listing — Tradepost",
            Some(require_auth),
        ),
        route(RouteId::Contact, "/contact", "Contact us — Tradepost", None),
        route(RouteId::Login, "/login", "Sign in — Tradepost", None),
        route(RouteId::Register, "/register", "Create account — Tradepost", None),
        route(
            RouteId::Profile,
            "/profile",
            "Your profile — Tradepost",
            Some(require_auth),
        ),
        route(
            RouteId::MyListings,
            "/my-listings",
            "Your listings — Tradepost",
            Some(require_auth),
        ),
        route(
            RouteId::Messages,
            "/messages",
            "Messages — Tradepost",
            Some(require_auth),
        ),
        route(
            RouteId::AdminDashboard,
            "/admin",
            "Admin — Tradepost",
            Some(require_admin),
        ),
        route(
            RouteId::AdminModeration,
            "/admin/moderation",
            "Moderation queue — Tradepost",
            Some(require_admin),
        ),
        route(
            RouteId::AdminReports,
            "/admin/reports",
            "Reports — Tradepost",
            Some(require_admin),
        ),
        route(
            RouteId::AdminAudit,
            "/admin/audit",
            "Audit log — Tradepost",
            Some(require_admin),
        ),
        route(
            RouteId::AdminUsers,
            "/admin/users",
            "Users — Tradepost",
            Some(require_admin),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_static_path_resolves_to_its_route() {
        let table = table();
        for def in table.routes().iter().filter(|r| r.pattern.is_static()) {
            let (found, params) = table.find(def.pattern.source()).unwrap();
            assert_eq!(found.id, def.id, "path {}", def.pattern.source());
            assert!(params.is_empty());
        }
    }

    #[test]
    fn listing_detail_binds_its_id() {
        let table = table();
        let (def, params) = table.find("/listings/42").unwrap();
        assert_eq!(def.id, RouteId::ListingDetail);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn static_listing_new_wins_over_the_id_pattern() {
        let table = table();
        let (def, params) = table.find("/listings/new").unwrap();
        assert_eq!(def.id, RouteId::ListingNew);
        assert!(params.is_empty());
    }

    #[test]
    fn edit_pattern_matches_with_trailing_segment() {
        let table = table();
        let (def, params) = table.find("/listings/42/edit").unwrap();
        assert_eq!(def.id, RouteId::ListingEdit);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn unknown_paths_resolve_to_nothing() {
        let table = table();
        assert!(table.find("/nope").is_none());
        assert!(table.find("/listings/42/gallery").is_none());
    }

    #[test]
    fn account_and_admin_routes_carry_guards() {
        let table = table();
        for path in ["/profile", "/my-listings", "/messages", "/listings/new"] {
            let (def, _) = table.find(path).unwrap();
            assert!(def.guard.is_some(), "path {path} must be guarded");
        }
        for path in [
            "/admin",
            "/admin/moderation",
            "/admin/reports",
            "/admin/audit",
            "/admin/users",
        ] {
            let (def, _) = table.find(path).unwrap();
            assert!(def.guard.is_some(), "path {path} must be guarded");
        }
        for path in ["/", "/listings", "/login", "/register", "/contact"] {
            let (def, _) = table.find(path).unwrap();
            assert!(def.guard.is_none(), "path {path} must be public");
        }
    }
}
