//! Application bootstrap.
//!
//! Builds the shared context (backend client, session store, router),
//! mounts the persistent chrome, and performs the initial navigation.

use std::rc::Rc;

use chrono::Utc;

use crate::auth::SessionStore;
use crate::backend::Backend;
use crate::components::footer::Footer;
use crate::components::navbar::Navbar;
use crate::config;
use crate::context::AppContext;
use crate::dom;
use crate::router::Router;
use crate::routes;
use crate::types::Profile;

/// Id of the element routed views render into.
const CONTAINER_ID: &str = "app";

/// Sessions this close to expiry are refreshed at boot.
const REFRESH_WINDOW_SECS: i64 = 3_600;

/// Owns everything that must live for the lifetime of the page.
pub struct App {
    _router: Router,
    _navbar: Navbar,
    _footer: Footer,
}

/// Boot the application and perform the initial navigation.
pub async fn start() -> anyhow::Result<App> {
    config::init_from_document();

    let backend = Rc::new(Backend::new());
    let session = SessionStore::restore();
    backend.set_token(session.session().map(|s| s.access_token));

    // keep a day-old tab signed in
    if let Some(current) = session.session() {
        if current.expires_at - Utc::now().timestamp() < REFRESH_WINDOW_SECS {
            match backend.refresh_session(&current.refresh_token).await {
                Ok(fresh) => session.set_session(Some(fresh)),
                Err(err) => tracing::warn!(%err, "session refresh failed"),
            }
        }
    }

    let router = Router::new(routes::table(), CONTAINER_ID);
    let ctx = AppContext {
        backend: backend.clone(),
        session: session.clone(),
        navigator: router.navigator(),
        container_id: CONTAINER_ID,
    };
    router.set_context(ctx.clone());

    // restore the profile for a persisted session before the first guard runs
    if let Some(user) = session.user() {
        let profile: Option<Profile> = backend
            .table("profiles")
            .eq("id", user.id)
            .fetch_optional()
            .await
            .unwrap_or_default();
        session.set_profile(profile);
    }

    let navbar = Navbar::mount(ctx.clone());
    let footer = Footer::mount(ctx.clone());
    router.attach();

    let location = dom::window().location();
    let path = location.pathname().unwrap_or_else(|_| "/".to_owned());
    let search = location.search().unwrap_or_default();
    router.navigate(&format!("{path}{search}"), None, false).await;

    Ok(App {
        _router: router,
        _navbar: navbar,
        _footer: footer,
    })
}
