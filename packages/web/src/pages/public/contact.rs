//! Contact form.

use futures_util::future::LocalBoxFuture;
use minijinja::context;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::components::toast;
use crate::context::AppContext;
use crate::dom::{self, Listeners};
use crate::router::{RouteParams, View};
use crate::templates;
use crate::types::NewContactSubmission;

pub struct ContactPage {
    ctx: AppContext,
    listeners: Listeners,
}

impl ContactPage {
    pub fn new(ctx: AppContext, _params: RouteParams) -> Self {
        Self {
            ctx,
            listeners: Listeners::new(),
        }
    }

    fn wire(&mut self) {
        let ctx = self.ctx.clone();
        self.listeners.on_id("contact-form", "submit", move |event| {
            event.prevent_default();
            let name = dom::input_value("contact-name");
            let email = dom::input_value("contact-email");
            let subject = dom::input_value("contact-subject");
            let body = dom::textarea_value("contact-body");
            if name.trim().is_empty() || email.trim().is_empty() || body.trim().is_empty() {
                toast::error("Please fill in your name, email and message");
                return;
            }
            submit(ctx.clone(), name, email, subject, body);
        });
    }
}

impl View for ContactPage {
    fn render(&mut self) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let container = self.ctx.container()?;
            let html = templates::render("contact.html", context! {})?;
            dom::set_html(&container, &html);
            self.wire();
            Ok(())
        })
    }

    fn destroy(&mut self) {
        self.listeners.clear();
    }
}

fn submit(ctx: AppContext, name: String, email: String, subject: String, body: String) {
    spawn_local(async move {
        let payload = NewContactSubmission {
            name: name.trim().to_owned(),
            email: email.trim().to_owned(),
            subject: subject.trim().to_owned(),
            body: body.trim().to_owned(),
        };
        match ctx
            .backend
            .table("contact_submissions")
            .insert::<_, serde_json::Value>(&payload)
            .await
        {
            Ok(_) => {
                toast::success("Thanks, we'll be in touch");
                if let Some(form) = dom::get("contact-form")
                    .and_then(|el| el.dyn_into::<web_sys::HtmlFormElement>().ok())
                {
                    form.reset();
                }
            }
            Err(err) => toast::error(&format!("Could not send your message: {err}")),
        }
    });
}
