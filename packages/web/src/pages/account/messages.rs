//! Inbox: conversation list, thread pane, composer, live updates.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context as _;
use futures_util::future::LocalBoxFuture;
use minijinja::context;
use serde_json::json;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

use crate::backend::{ChangeKind, RealtimeHandle};
use crate::components::{loading, toast};
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::pages::account::conversations;
use crate::pages::lookup;
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::Message;

type ActiveConversation = Rc<RefCell<Option<(Uuid, Uuid)>>>;

pub struct MessagesPage {
    ctx: AppContext,
    listeners: Listeners,
    realtime: Option<RealtimeHandle>,
    active: ActiveConversation,
}

impl MessagesPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
            realtime: None,
            active: Rc::new(RefCell::new(None)),
        }
    }

    fn wire(&mut self, me: Uuid) {
        // conversation rows
        let ctx = self.ctx.clone();
        let active = self.active.clone();
        self.listeners
            .on_id("conversations-pane", "click", move |event| {
                let (Some(listing), Some(other)) = (
                    dom::closest_attr(&event, "data-listing"),
                    dom::closest_attr(&event, "data-other"),
                ) else {
                    return;
                };
                let (Ok(listing), Ok(other)) =
                    (Uuid::parse_str(&listing), Uuid::parse_str(&other))
                else {
                    return;
                };
                event.prevent_default();
                *active.borrow_mut() = Some((listing, other));
                let ctx = ctx.clone();
                spawn_local(async move {
                    if let Err(err) = open_thread(&ctx, me, listing, other).await {
                        toast::error(&format!("Could not load the conversation: {err}"));
                    }
                });
            });

        // composer lives inside the thread fragment; delegate from the pane
        let ctx = self.ctx.clone();
        let active = self.active.clone();
        self.listeners
            .on_id("message-thread", "submit", move |event| {
                event.prevent_default();
                let Some((listing, other)) = *active.borrow() else {
                    return;
                };
                let body = dom::textarea_value("thread-body");
                let body = body.trim().to_owned();
                if body.is_empty() {
                    return;
                }
                let ctx = ctx.clone();
                spawn_local(async move {
                    if let Err(err) = send_and_refresh(&ctx, me, listing, other, body).await {
                        toast::error(&format!("Could not send message: {err}"));
                    }
                });
            });
    }

    fn subscribe(&mut self, me: Uuid) {
        let ctx = self.ctx.clone();
        let active = self.active.clone();
        match self.ctx.backend.subscribe("messages", move |event| {
            if event.kind != ChangeKind::Insert {
                return;
            }
            let Ok(message) = serde_json::from_value::<Message>(event.record.clone()) else {
                return;
            };
            if message.recipient_id != me {
                return;
            }
            let is_open =
                *active.borrow() == Some((message.listing_id, message.sender_id));
            let ctx = ctx.clone();
            spawn_local(async move {
                if is_open {
                    let _ = open_thread(&ctx, me, message.listing_id, message.sender_id).await;
                } else {
                    toast::info("New message received");
                    let _ = load_conversations(&ctx, me).await;
                }
            });
        }) {
            Ok(handle) => self.realtime = Some(handle),
            Err(err) => tracing::warn!(%err, "live message updates unavailable"),
        }
    }
}

impl View for MessagesPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let me = self
                .ctx
                .session
                .user()
                .context("messages page without a session")?
                .id;

            let html = templates::render("messages.html", context! {})?;
            dom::set_html(&container, &html);
            load_conversations(&self.ctx, me).await?;

            self.wire(me);
            self.subscribe(me);
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
        self.realtime = None;
    }
}

/// Fetch, group, and render the conversation list.
async fn load_conversations(ctx: &AppContext, me: Uuid) -> anyhow::Result<()> {
    let messages: Vec<Message> = ctx
        .backend
        .table("messages")
        .either_eq("sender_id", "recipient_id", me)
        .order("created_at", true)
        .fetch()
        .await?;
    let conversations = conversations::group(&messages, me);

    let other_ids: Vec<Uuid> = conversations.iter().map(|c| c.other_user_id).collect();
    let listing_ids: Vec<Uuid> = conversations.iter().map(|c| c.listing_id).collect();
    let names = lookup::profile_names(ctx, &other_ids).await?;
    let titles = lookup::listing_titles(ctx, &listing_ids).await?;

    let rows: Vec<minijinja::Value> = conversations
        .iter()
        .map(|conversation| {
            context! {
                listing_id => conversation.listing_id.to_string(),
                other_id => conversation.other_user_id.to_string(),
                name => names
                    .get(&conversation.other_user_id)
                    .cloned()
                    .unwrap_or_else(|| "Member".to_owned()),
                listing => titles
                    .get(&conversation.listing_id)
                    .cloned()
                    .unwrap_or_else(|| "Listing".to_owned()),
                last_body => conversation.last.body.clone(),
                last_at => conversation.last.created_at.to_rfc3339(),
                unread => conversation.unread,
            }
        })
        .collect();

    let html = templates::render("conversations_list.html", context! { rows })?;
    dom::set_html_by_id("conversations-pane", &html);
    Ok(())
}

/// Fetch and render one conversation, marking its incoming messages read.
async fn open_thread(
    ctx: &AppContext,
    me: Uuid,
    listing_id: Uuid,
    other: Uuid,
) -> anyhow::Result<()> {
    dom::set_html_by_id("message-thread", &loading::panel("Loading conversation…"));
    let messages: Vec<Message> = ctx
        .backend
        .table("messages")
        .eq("listing_id", listing_id)
        .either_eq("sender_id", "recipient_id", me)
        .order("created_at", true)
        .fetch()
        .await?;
    let thread: Vec<&Message> = messages
        .iter()
        .filter(|m| m.sender_id == other || m.recipient_id == other)
        .collect();

    let names = lookup::profile_names(ctx, &[other]).await?;
    let titles = lookup::listing_titles(ctx, &[listing_id]).await?;

    let rows: Vec<minijinja::Value> = thread
        .iter()
        .map(|message| {
            context! {
                body => message.body.clone(),
                mine => message.sender_id == me,
                at => message.created_at.to_rfc3339(),
            }
        })
        .collect();
    let html = templates::render(
        "message_thread.html",
        context! {
            rows,
            other_name => names
                .get(&other)
                .cloned()
                .unwrap_or_else(|| "Member".to_owned()),
            listing_id => listing_id.to_string(),
            listing_title => titles
                .get(&listing_id)
                .cloned()
                .unwrap_or_else(|| "Listing".to_owned()),
        },
    )?;
    dom::set_html_by_id("message-thread", &html);

    // mark the other side's messages read, then refresh the unread badges
    ctx.backend
        .table("messages")
        .eq("listing_id", listing_id)
        .eq("sender_id", other)
        .eq("recipient_id", me)
        .eq("read", "false")
        .update(&json!({ "read": true }))
        .await?;
    load_conversations(ctx, me).await
}

async fn send_and_refresh(
    ctx: &AppContext,
    me: Uuid,
    listing_id: Uuid,
    other: Uuid,
    body: String,
) -> anyhow::Result<()> {
    let payload = crate::types::NewMessage {
        listing_id,
        sender_id: me,
        recipient_id: other,
        body,
    };
    ctx.backend
        .table("messages")
        .insert::<_, serde_json::Value>(&payload)
        .await?;
    open_thread(ctx, me, listing_id, other).await
}
