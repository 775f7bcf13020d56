//! Site footer with the newsletter signup form.

use minijinja::context;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::templates;
use crate::types::NewNewsletterSubscription;

pub struct Footer {
    ctx: AppContext,
    listeners: Listeners,
}

impl Footer {
    pub fn mount(ctx: AppContext) -> Self {
        let mut footer = Self {
            ctx,
            listeners: Listeners::new(),
        };
        if let Some(el) = dom::get("footer") {
            match templates::render("footer.html", context! {}) {
                Ok(html) => dom::set_html(&el, &html),
                Err(err) => tracing::error!(%err, "footer render failed"),
            }
        }
        footer.wire();
        footer
    }

    fn wire(&mut self) {
        let Some(root) = dom::get("footer") else {
            return;
        };
        let ctx = self.ctx.clone();
        self.listeners.on(&root, "submit", move |event| {
            event.prevent_default();
            let email = dom::input_value("newsletter-email");
            if email.trim().is_empty() {
                return;
            }
            subscribe(ctx.clone(), email.trim().to_owned());
        });
    }
}

fn subscribe(ctx: AppContext, email: String) {
    spawn_local(async move {
        let payload = NewNewsletterSubscription { email };
        match ctx
            .backend
            .table("newsletter_subscriptions")
            .insert::<_, serde_json::Value>(&payload)
            .await
        {
            Ok(_) => {
                toast::success("You're on the list!");
                dom::set_input_value("newsletter-email", "");
            }
            Err(err) => toast::error(&format!("Subscription failed: {err}")),
        }
    });
}
