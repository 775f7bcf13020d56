//! Sign-in page.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::Profile;

pub struct LoginPage {
    ctx: AppContext,
    params: RouteParams,
    listeners: Listeners,
}

impl LoginPage {
    pub fn new(ctx: AppContext, params: RouteParams) -> Self {
        Self {
            ctx,
            params,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        let next = self
            .params
            .get("next")
            .filter(|next| next.starts_with('/'))
            .unwrap_or("/")
            .to_owned();
        self.listeners.on_id("login-form", "submit", move |event| {
            event.prevent_default();
            let email = dom::input_value("login-email");
            let password = dom::input_value("login-password");
            if email.trim().is_empty() || password.is_empty() {
                toast::error("Email and password are required");
                return;
            }
            sign_in(ctx.clone(), email.trim().to_owned(), password, next.clone());
        });
    }
}

impl View for LoginPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("login.html", context! {})?;
            dom::set_html(&container, &html);
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn sign_in(ctx: AppContext, email: String, password: String, next: String) {
    spawn_local(async move {
        match ctx.backend.sign_in(&email, &password).await {
            Ok(session) => {
                let user_id = session.user.id;
                ctx.session.set_session(Some(session));
                let profile: Option<Profile> = ctx
                    .backend
                    .table("profiles")
                    .eq("id", user_id)
                    .fetch_optional()
                    .await
                    .unwrap_or_default();
                ctx.session.set_profile(profile);
                toast::success("Welcome back!");
                ctx.navigator.go(&next);
            }
            Err(err) => toast::error(&format!("Sign-in failed: {err}")),
        }
    });
}
