//! Member administration: listing, ban and unban.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::admin::record_audit;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::{Profile, ProfilePatch};

const PAGE_SIZE: u32 = 100;

pub struct AdminUsersPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl AdminUsersPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners.on_id("users-rows", "click", move |event| {
            if let Some(id) = dom::closest_attr(&event, "data-ban") {
                event.prevent_default();
                set_banned(ctx.clone(), id, true);
            } else if let Some(id) = dom::closest_attr(&event, "data-unban") {
                event.prevent_default();
                set_banned(ctx.clone(), id, false);
            }
        });
    }
}

impl View for AdminUsersPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("admin_users.html", context! {})?;
            dom::set_html(&container, &html);
            reload_rows(&self.ctx).await?;
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

async fn reload_rows(ctx: &AppContext) -> anyhow::Result<()> {
    let profiles: Vec<Profile> = ctx
        .backend
        .table("profiles")
        .order("created_at", false)
        .limit(PAGE_SIZE)
        .fetch()
        .await?;
    let me = ctx.session.user().map(|user| user.id);

    let rows: Vec<minijinja::Value> = profiles
        .iter()
        .map(|profile| {
            context! {
                id => profile.id.to_string(),
                display_name => profile.display_name.clone(),
                role => profile.role.clone(),
                banned => profile.banned,
                is_self => me == Some(profile.id),
                created_at => profile.created_at.to_rfc3339(),
            }
        })
        .collect();
    let html = templates::render("admin_users_rows.html", context! { rows })?;
    dom::set_html_by_id("users-rows", &html);
    Ok(())
}

fn set_banned(ctx: AppContext, id: String, banned: bool) {
    spawn_local(async move {
        let Ok(profile_id) = Uuid::parse_str(&id) else {
            return;
        };
        let patch = ProfilePatch {
            banned: Some(banned),
            ..ProfilePatch::default()
        };
        let result = ctx
            .backend
            .table("profiles")
            .eq("id", profile_id)
            .update(&patch)
            .await;
        match result {
            Ok(()) => {
                let action = if banned { "user.ban" } else { "user.unban" };
                record_audit(&ctx, action, Some(profile_id), None).await;
                toast::success(if banned { "Member banned" } else { "Member unbanned" });
                if let Err(err) = reload_rows(&ctx).await {
                    tracing::warn!(%err, "failed to refresh members");
                }
            }
            Err(err) => toast::error(&format!("Could not update member: {err}")),
        }
    });
}
