//! Thin DOM helpers shared by the router, components and pages.
//!
//! Everything here is a small veneer over `web-sys`. The one stateful piece
//! is [`Listeners`], which owns the JS closures behind attached event
//! handlers; dropping it detaches every listener it added, which is how view
//! `destroy` tears down its event wiring.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventTarget, Window,
};

pub fn window() -> Window {
    web_sys::window().expect("no global window")
}

pub fn document() -> Document {
    window().document().expect("no document on window")
}

/// Look up an element by id.
pub fn get(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

/// Look up an element by id, erroring if it is missing.
pub fn container(id: &str) -> anyhow::Result<Element> {
    get(id).ok_or_else(|| anyhow::anyhow!("missing container element #{id}"))
}

pub fn set_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

/// Replace the contents of the element with the given id, if it exists.
///
/// Pages use this for partial updates after an action; if the element is
/// gone the page has been navigated away from and the update is dropped.
pub fn set_html_by_id(id: &str, html: &str) {
    if let Some(el) = get(id) {
        el.set_inner_html(html);
    }
}

pub fn set_title(title: &str) {
    document().set_title(title);
}

/// Read the `content` attribute of a `<meta name="...">` tag.
pub fn meta_content(name: &str) -> Option<String> {
    document()
        .query_selector(&format!("meta[name=\"{name}\"]"))
        .ok()
        .flatten()
        .and_then(|el| el.get_attribute("content"))
}

/// Dispatch a named `CustomEvent` on the document with a string detail.
pub fn dispatch(name: &str, detail: &str) {
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(detail));
    if let Ok(event) = CustomEvent::new_with_event_init_dict(name, &init) {
        let _ = document().dispatch_event(&event);
    }
}

/// Current value of an `<input>` by id, empty string if absent.
pub fn input_value(id: &str) -> String {
    get(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default()
}

pub fn set_input_value(id: &str, value: &str) {
    if let Some(input) = get(id).and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok()) {
        input.set_value(value);
    }
}

pub fn set_textarea_value(id: &str, value: &str) {
    if let Some(area) = get(id).and_then(|el| el.dyn_into::<web_sys::HtmlTextAreaElement>().ok()) {
        area.set_value(value);
    }
}

pub fn textarea_value(id: &str) -> String {
    get(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        .map(|area| area.value())
        .unwrap_or_default()
}

pub fn select_value(id: &str) -> String {
    get(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlSelectElement>().ok())
        .map(|select| select.value())
        .unwrap_or_default()
}

/// First selected file of an `<input type="file">`, if any.
pub fn input_file(id: &str) -> Option<web_sys::File> {
    get(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .and_then(|input| input.files())
        .and_then(|files| files.get(0))
}

/// All selected files of an `<input type="file" multiple>`.
pub fn input_files(id: &str) -> Vec<web_sys::File> {
    let Some(files) = get(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .and_then(|input| input.files())
    else {
        return Vec::new();
    };
    (0..files.length()).filter_map(|i| files.get(i)).collect()
}

/// Value of the checked radio button in a named group, if any.
pub fn checked_radio_value(name: &str) -> Option<String> {
    document()
        .query_selector(&format!("input[name=\"{name}\"]:checked"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
}

/// Read a file's bytes through the browser's async buffer API.
pub async fn file_bytes(file: &web_sys::File) -> anyhow::Result<Vec<u8>> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| anyhow::anyhow!("failed to read file {}", file.name()))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Walk up from an event target to the nearest element carrying `attr`, and
/// return the attribute's value. Used for delegated row-action clicks.
pub fn closest_attr(event: &Event, attr: &str) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let el = target.closest(&format!("[{attr}]")).ok().flatten()?;
    el.get_attribute(attr)
}

/// Owns DOM event closures. Dropping detaches every listener it added.
#[derive(Default)]
pub struct Listeners {
    items: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` for `event` on `target`, keeping the closure alive
    /// until this collection is dropped or cleared.
    pub fn on<T, F>(&mut self, target: &T, event: &'static str, handler: F)
    where
        T: AsRef<EventTarget>,
        F: FnMut(Event) + 'static,
    {
        let target = target.as_ref().clone();
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        if target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .is_err()
        {
            tracing::warn!(event, "failed to attach listener");
        }
        self.items.push((target, event, closure));
    }

    /// Attach a handler to the element with the given id, if present.
    pub fn on_id<F>(&mut self, id: &str, event: &'static str, handler: F)
    where
        F: FnMut(Event) + 'static,
    {
        if let Some(el) = get(id) {
            self.on(&el, event, handler);
        }
    }

    /// Detach everything now instead of waiting for drop.
    pub fn clear(&mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        for (target, event, closure) in self.items.drain(..) {
            let _ = target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        self.detach();
    }
}
