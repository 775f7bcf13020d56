//! Route resolution and guard behavior, exercised through the public API.

use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use web::auth::{require_auth, SessionStore};
use web::backend::{AuthUser, Backend, Session};
use web::context::AppContext;
use web::router::{
    classify, LinkAction, LinkCandidate, Navigator, Pattern, RouteParams, Router,
};
use web::routes::{self, RouteDef, RouteId, RouteTable};

fn test_context(session: Option<Session>) -> AppContext {
    AppContext {
        backend: Rc::new(Backend::with_endpoint("https://api.example", "anon")),
        session: SessionStore::new(session),
        navigator: Navigator::default(),
        container_id: "app",
    }
}

fn live_session() -> Session {
    Session {
        access_token: "token".into(),
        refresh_token: "refresh".into(),
        expires_at: i64::MAX,
        user: AuthUser {
            id: uuid::Uuid::from_u128(1),
            email: "me@example.com".into(),
        },
    }
}

#[test]
fn every_route_has_a_title_and_resolves() {
    let table = routes::table();
    for def in table.routes() {
        assert!(!def.title.is_empty());
    }
    assert_eq!(table.routes().len(), 16);
}

#[test]
fn navigation_pipeline_merges_query_and_path_params() {
    // the same split/find/extend sequence `navigate` runs
    let table = routes::table();
    let (path, mut params) = RouteParams::split_path("/listings/42?ref=home#top");
    let (def, captures) = table.find(path).unwrap();
    params.extend(&captures);

    assert_eq!(def.id, RouteId::ListingDetail);
    assert_eq!(params.get("id"), Some("42"));
    assert_eq!(params.get("ref"), Some("home"));
}

#[test]
fn path_captures_override_query_params_of_the_same_name() {
    let table = routes::table();
    let (path, mut params) = RouteParams::split_path("/listings/42?id=spoofed");
    let (_, captures) = table.find(path).unwrap();
    params.extend(&captures);
    assert_eq!(params.get("id"), Some("42"));
}

#[tokio::test]
async fn auth_guard_passes_a_live_session() {
    let ctx = test_context(Some(live_session()));
    assert!(require_auth(ctx).await);
}

fn deny_guard(_ctx: AppContext) -> LocalBoxFuture<'static, bool> {
    Box::pin(async { false })
}

// A failing guard must abort before the router touches the page: no history
// write, no title change, no view. Off-browser, any DOM call panics, so
// completing at all proves the navigation was dropped cleanly.
#[tokio::test]
async fn blocked_navigation_leaves_the_page_alone() {
    let table = RouteTable::new(vec![RouteDef {
        id: RouteId::Profile,
        pattern: Pattern::compile("/profile"),
        title: "Guarded",
        guard: Some(deny_guard),
    }]);
    let router = Router::new(table, "app");
    router.set_context(test_context(None));
    router.navigate("/profile?tab=bids", None, true).await;
}

#[test]
fn external_and_annotated_anchors_stay_with_the_browser() {
    let base = LinkCandidate {
        href: "/listings".into(),
        resolved: "https://tradepost.example/listings".into(),
        origin: "https://tradepost.example".into(),
        ..Default::default()
    };
    assert_eq!(
        classify(&base),
        LinkAction::Navigate("/listings".to_owned())
    );

    let blank = LinkCandidate {
        target: Some("_blank".into()),
        ..base.clone()
    };
    assert_eq!(classify(&blank), LinkAction::BrowserDefault);

    let download = LinkCandidate {
        download: true,
        ..base.clone()
    };
    assert_eq!(classify(&download), LinkAction::BrowserDefault);

    let external = LinkCandidate {
        href: "https://elsewhere.example/".into(),
        resolved: "https://elsewhere.example/".into(),
        ..base
    };
    assert_eq!(classify(&external), LinkAction::BrowserDefault);
}
