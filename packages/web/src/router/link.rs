//! Anchor-click interception.
//!
//! The classification rules are pure so they can be tested off-browser; the
//! DOM half extracts a [`LinkCandidate`] from the click event and applies
//! the decision.

use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlAnchorElement, MouseEvent};

use super::navigator::Navigator;
use crate::dom;

/// What the click handler saw on an anchor.
#[derive(Debug, Clone, Default)]
pub struct LinkCandidate {
    /// Raw `href` attribute.
    pub href: String,
    /// Fully resolved URL (`HTMLAnchorElement.href`).
    pub resolved: String,
    pub target: Option<String>,
    pub download: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// `location.origin` of the page.
    pub origin: String,
}

/// Decision for a click on an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Let the browser handle it.
    BrowserDefault,
    /// Prevent default and navigate in-page to this path (query included).
    Navigate(String),
}

/// Decide whether a click should become an in-page navigation.
pub fn classify(candidate: &LinkCandidate) -> LinkAction {
    if candidate.href.is_empty() || candidate.href.starts_with('#') {
        return LinkAction::BrowserDefault;
    }
    if candidate.href.starts_with("javascript:") {
        return LinkAction::BrowserDefault;
    }
    if candidate.download {
        return LinkAction::BrowserDefault;
    }
    if let Some(target) = &candidate.target {
        if !target.is_empty() && target != "_self" {
            return LinkAction::BrowserDefault;
        }
    }
    if candidate.ctrl || candidate.meta || candidate.shift {
        return LinkAction::BrowserDefault;
    }
    let Some(rest) = candidate.resolved.strip_prefix(&candidate.origin) else {
        return LinkAction::BrowserDefault;
    };
    // the origin prefix must end exactly at the path boundary
    if !rest.is_empty() && !rest.starts_with('/') {
        return LinkAction::BrowserDefault;
    }
    let path = if rest.is_empty() { "/" } else { rest };
    let without_hash = path.split('#').next().unwrap_or(path);
    LinkAction::Navigate(without_hash.to_owned())
}

/// Document-level click handler wired up by `Router::attach`.
pub(super) fn on_document_click(nav: &Navigator, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };
    let Some(anchor) = target
        .closest("a")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok())
    else {
        return;
    };

    let candidate = LinkCandidate {
        href: anchor.get_attribute("href").unwrap_or_default(),
        resolved: anchor.href(),
        target: anchor.get_attribute("target"),
        download: anchor.get_attribute("download").is_some(),
        ctrl: mouse.ctrl_key(),
        meta: mouse.meta_key(),
        shift: mouse.shift_key(),
        origin: dom::window().location().origin().unwrap_or_default(),
    };

    match classify(&candidate) {
        LinkAction::Navigate(path) => {
            event.prevent_default();
            nav.go(&path);
        }
        LinkAction::BrowserDefault => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(href: &str) -> LinkCandidate {
        LinkCandidate {
            href: href.to_owned(),
            resolved: format!("https://tradepost.example{href}"),
            origin: "https://tradepost.example".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn internal_links_are_intercepted() {
        assert_eq!(
            classify(&internal("/listings/42")),
            LinkAction::Navigate("/listings/42".to_owned())
        );
    }

    #[test]
    fn query_strings_survive_interception() {
        assert_eq!(
            classify(&internal("/listings?q=bike")),
            LinkAction::Navigate("/listings?q=bike".to_owned())
        );
    }

    #[test]
    fn blank_target_uses_browser_default() {
        let candidate = LinkCandidate {
            target: Some("_blank".to_owned()),
            ..internal("/listings")
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn download_links_use_browser_default() {
        let candidate = LinkCandidate {
            download: true,
            ..internal("/files/report.pdf")
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn modified_clicks_use_browser_default() {
        for modifier in ["ctrl", "meta", "shift"] {
            let mut candidate = internal("/listings");
            match modifier {
                "ctrl" => candidate.ctrl = true,
                "meta" => candidate.meta = true,
                _ => candidate.shift = true,
            }
            assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
        }
    }

    #[test]
    fn external_origins_use_browser_default() {
        let candidate = LinkCandidate {
            href: "https://elsewhere.example/listings".to_owned(),
            resolved: "https://elsewhere.example/listings".to_owned(),
            origin: "https://tradepost.example".to_owned(),
            ..Default::default()
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn origin_prefix_must_end_at_path_boundary() {
        let candidate = LinkCandidate {
            href: "https://tradepost.example.evil.com/x".to_owned(),
            resolved: "https://tradepost.example.evil.com/x".to_owned(),
            origin: "https://tradepost.example".to_owned(),
            ..Default::default()
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn javascript_and_hash_links_use_browser_default() {
        let candidate = LinkCandidate {
            href: "javascript:void(0)".to_owned(),
            ..Default::default()
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
        let candidate = LinkCandidate {
            href: "#gallery".to_owned(),
            ..internal("/listings")
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn mailto_links_use_browser_default() {
        let candidate = LinkCandidate {
            href: "mailto:sales@tradepost.example".to_owned(),
            resolved: "mailto:sales@tradepost.example".to_owned(),
            origin: "https://tradepost.example".to_owned(),
            ..Default::default()
        };
        assert_eq!(classify(&candidate), LinkAction::BrowserDefault);
    }

    #[test]
    fn bare_origin_resolves_to_root() {
        let candidate = LinkCandidate {
            href: "https://tradepost.example".to_owned(),
            resolved: "https://tradepost.example".to_owned(),
            origin: "https://tradepost.example".to_owned(),
            ..Default::default()
        };
        assert_eq!(classify(&candidate), LinkAction::Navigate("/".to_owned()));
    }
}
