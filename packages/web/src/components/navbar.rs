//! Site navigation bar.
//!
//! Mounted once into `#navbar` and re-rendered on `auth-change` and
//! `route-change`. Action buttons use delegated clicks on the root element
//! so re-rendering the inner markup never loses handlers.

use minijinja::context;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::templates;

pub struct Navbar {
    ctx: AppContext,
    listeners: Listeners,
}

impl Navbar {
    pub fn mount(ctx: AppContext) -> Self {
        let mut navbar = Self {
            ctx,
            listeners: Listeners::new(),
        };
        render_into(&navbar.ctx);
        navbar.wire();
        navbar
    }

    fn wire(&mut self) {
        if let Some(root) = dom::get("navbar") {
            let ctx = self.ctx.clone();
            self.listeners.on(&root, "click", move |event| {
                if dom::closest_attr(&event, "data-signout").is_some() {
                    event.prevent_default();
                    sign_out(ctx.clone());
                }
            });
        }

        let ctx = self.ctx.clone();
        self.listeners
            .on(&dom::document(), "auth-change", move |_event| {
                render_into(&ctx);
            });
        let ctx = self.ctx.clone();
        self.listeners
            .on(&dom::document(), "route-change", move |_event| {
                render_into(&ctx);
            });
    }
}

fn sign_out(ctx: AppContext) {
    spawn_local(async move {
        if let Err(err) = ctx.backend.sign_out().await {
            tracing::warn!(%err, "sign-out call failed");
        }
        ctx.session.set_session(None);
        toast::info("Signed out");
        ctx.navigator.go("/");
    });
}

fn render_into(ctx: &AppContext) {
    let Some(el) = dom::get("navbar") else {
        return;
    };
    let display_name = ctx
        .session
        .profile()
        .map(|profile| profile.display_name)
        .or_else(|| ctx.session.user().map(|user| user.email));
    let current = dom::window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_owned());
    match templates::render(
        "navbar.html",
        context! {
            authenticated => ctx.session.is_authenticated(),
            admin => ctx.session.is_admin(),
            display_name,
            current,
        },
    ) {
        Ok(html) => dom::set_html(&el, &html),
        Err(err) => tracing::error!(%err, "navbar render failed"),
    }
}
