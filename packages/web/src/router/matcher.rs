//! Path pattern compilation and matching.

use regex::Regex;

use super::params::{decode_component, RouteParams};

/// A compiled route pattern. `:name` segments become capture groups; a
/// pattern without dynamic segments matches by string equality.
#[derive(Debug)]
pub struct Pattern {
    source: &'static str,
    regex: Option<Regex>,
    names: Vec<String>,
}

impl Pattern {
    pub fn compile(source: &'static str) -> Self {
        if !source.contains(':') {
            return Self {
                source,
                regex: None,
                names: Vec::new(),
            };
        }

        let mut names = Vec::new();
        let mut parts = Vec::new();
        for segment in source.split('/') {
            if let Some(name) = segment.strip_prefix(':') {
                names.push(name.to_owned());
                parts.push("([^/]+)".to_owned());
            } else {
                parts.push(regex::escape(segment));
            }
        }
        let rendered = format!("^{}$", parts.join("/"));
        let regex = match Regex::new(&rendered) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::error!(%err, source, "invalid route pattern");
                None
            }
        };
        Self {
            source,
            regex,
            names,
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// True when the pattern has no dynamic segments.
    pub fn is_static(&self) -> bool {
        self.names.is_empty()
    }

    /// Match an already query-stripped path. Captured values are inserted
    /// into the params in declaration order, percent-decoded.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        match &self.regex {
            None => (self.source == path).then(RouteParams::new),
            Some(regex) => {
                let captures = regex.captures(path)?;
                let mut params = RouteParams::new();
                for (index, name) in self.names.iter().enumerate() {
                    if let Some(capture) = captures.get(index + 1) {
                        params.insert(name.clone(), decode_component(capture.as_str()));
                    }
                }
                Some(params)
            }
        }
    }
}

/// Strip the query string and hash fragment from a path.
pub fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_patterns_match_exactly() {
        let pattern = Pattern::compile("/listings");
        assert!(pattern.is_static());
        assert!(pattern.matches("/listings").is_some());
        assert!(pattern.matches("/listings/").is_none());
        assert!(pattern.matches("/listing").is_none());
    }

    #[test]
    fn param_segments_capture_values() {
        let pattern = Pattern::compile("/listings/:id");
        let params = pattern.matches("/listings/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(pattern.matches("/listings").is_none());
        assert!(pattern.matches("/listings/42/edit").is_none());
    }

    #[test]
    fn multiple_params_capture_in_declaration_order() {
        let pattern = Pattern::compile("/listings/:id/images/:image");
        let params = pattern.matches("/listings/42/images/7").unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("id", "42"), ("image", "7")]);
    }

    #[test]
    fn trailing_static_segments_still_bind() {
        let pattern = Pattern::compile("/listings/:id/edit");
        let params = pattern.matches("/listings/abc/edit").unwrap();
        assert_eq!(params.get("id"), Some("abc"));
        assert!(pattern.matches("/listings/abc").is_none());
    }

    #[test]
    fn captured_values_are_percent_decoded() {
        let pattern = Pattern::compile("/listings/:id");
        let params = pattern.matches("/listings/a%20b").unwrap();
        assert_eq!(params.get("id"), Some("a b"));
    }

    #[test]
    fn strip_query_drops_query_and_hash() {
        assert_eq!(strip_query("/listings?q=1"), "/listings");
        assert_eq!(strip_query("/listings#top"), "/listings");
        assert_eq!(strip_query("/listings"), "/listings");
    }
}
