//! Profile editor: display name, bio, avatar.

use anyhow::Context as _;
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::cards::AVATAR_BUCKET;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{Profile, ProfilePatch};

pub struct ProfilePage {
    ctx: AppContext,
    listeners: Listeners,
}

impl ProfilePage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners.on_id("profile-form", "submit", move |event| {
            event.prevent_default();
            let display_name = dom::input_value("profile-name");
            if display_name.trim().is_empty() {
                toast::error("Display name is required");
                return;
            }
            let ctx = ctx.clone();
            spawn_local(async move {
                match save_profile(&ctx, display_name.trim().to_owned()).await {
                    Ok(()) => toast::success("Profile saved"),
                    Err(err) => toast::error(&format!("Could not save profile: {err}")),
                }
            });
        });
    }
}

impl View for ProfilePage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let user = self
                .ctx
                .session
                .user()
                .context("profile page without a session")?;
            let profile: Option<Profile> = self
                .ctx
                .backend
                .table("profiles")
                .eq("id", user.id)
                .fetch_optional()
                .await?;

            let avatar_url = profile
                .as_ref()
                .and_then(|p| p.avatar_path.as_ref())
                .map(|path| self.ctx.backend.public_url(AVATAR_BUCKET, path));

            let html = templates::render(
                "profile.html",
                context! {
                    email => user.email,
                    display_name => profile.as_ref().map(|p| p.display_name.clone()),
                    bio => profile.as_ref().and_then(|p| p.bio.clone()),
                    avatar_url,
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

async fn save_profile(ctx: &AppContext, display_name: String) -> anyhow::Result<()> {
    let user = ctx
        .session
        .user()
        .context("profile save without a session")?;

    let bio = dom::textarea_value("profile-bio");
    let bio = bio.trim();
    let mut patch = ProfilePatch {
        display_name: Some(display_name),
        bio: (!bio.is_empty()).then(|| bio.to_owned()),
        ..ProfilePatch::default()
    };

    if let Some(file) = dom::input_file("profile-avatar") {
        let bytes = dom::file_bytes(&file).await?;
        let name = file.name();
        let ext = name.rsplit('.').next().unwrap_or("jpg").to_lowercase();
        let path = format!("{}/avatar.{ext}", user.id);
        ctx.backend
            .upload(AVATAR_BUCKET, &path, bytes, &file.type_())
            .await?;
        patch.avatar_path = Some(path);
    }

    ctx.backend
        .table("profiles")
        .eq("id", user.id)
        .update(&patch)
        .await?;

    let refreshed: Option<Profile> = ctx
        .backend
        .table("profiles")
        .eq("id", user.id)
        .fetch_optional()
        .await?;
    ctx.session.set_profile(refreshed);
    Ok(())
}
