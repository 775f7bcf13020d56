//! Transient toast notifications.

use gloo_timers::callback::Timeout;

use crate::dom;

const TOAST_MS: u32 = 4_000;

pub fn info(message: &str) {
    show(message, "toast toast-info");
}

pub fn success(message: &str) {
    show(message, "toast toast-success");
}

pub fn error(message: &str) {
    show(message, "toast toast-error");
}

fn show(message: &str, class: &str) {
    let document = dom::document();
    let Some(body) = document.body() else {
        return;
    };
    let Ok(el) = document.create_element("div") else {
        return;
    };
    let _ = el.set_attribute("class", class);
    el.set_text_content(Some(message));
    if body.append_child(&el).is_err() {
        return;
    }
    Timeout::new(TOAST_MS, move || {
        el.remove();
    })
    .forget();
}
