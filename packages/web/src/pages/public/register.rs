//! Account creation page.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{NewProfile, Profile};

pub struct RegisterPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl RegisterPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners
            .on_id("register-form", "submit", move |event| {
                event.prevent_default();
                let display_name = dom::input_value("register-name");
                let email = dom::input_value("register-email");
                let password = dom::input_value("register-password");
                let confirm = dom::input_value("register-confirm");
                if display_name.trim().is_empty() || email.trim().is_empty() {
                    toast::error("Display name and email are required");
                    return;
                }
                if password.len() < 8 {
                    toast::error("Password must be at least 8 characters");
                    return;
                }
                if password != confirm {
                    toast::error("Passwords do not match");
                    return;
                }
                register(
                    ctx.clone(),
                    display_name.trim().to_owned(),
                    email.trim().to_owned(),
                    password,
                );
            });
    }
}

impl View for RegisterPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("register.html", context! {})?;
            dom::set_html(&container, &html);
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn register(ctx: AppContext, display_name: String, email: String, password: String) {
    spawn_local(async move {
        let session = match ctx.backend.sign_up(&email, &password).await {
            Ok(session) => session,
            Err(err) => {
                toast::error(&format!("Registration failed: {err}"));
                return;
            }
        };
        let user_id = session.user.id;
        ctx.session.set_session(Some(session));

        // The profile row may already exist if the backend creates one on
        // signup; fall back to reading it.
        let payload = NewProfile {
            id: user_id,
            display_name,
            role: "member".to_owned(),
        };
        let profile = match ctx
            .backend
            .table("profiles")
            .insert_one::<_, Profile>(&payload)
            .await
        {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::debug!(%err, "profile insert failed, reading existing row");
                ctx.backend
                    .table("profiles")
                    .eq("id", user_id)
                    .fetch_optional()
                    .await
                    .unwrap_or_default()
            }
        };
        ctx.session.set_profile(profile);
        toast::success("Welcome to Tradepost!");
        ctx.navigator.go("/");
    });
}
