//! Route and query parameters.

/// Ordered key→value parameter map. Pattern captures are inserted in
/// declaration order; query parameters follow document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    items: Vec<(String, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Insert a parameter, replacing any existing value for the key.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.items.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.items.push((name, value));
        }
    }

    /// Merge another set in; its values win on key collisions.
    pub fn extend(&mut self, other: &RouteParams) {
        for (name, value) in &other.items {
            self.insert(name.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parse a percent-encoded query string (`a=1&b=two`).
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
        {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_component(name), decode_component(value));
        }
        params
    }

    /// Split a location path into its bare path and query-derived params.
    /// The hash fragment is discarded.
    pub fn split_path(raw: &str) -> (&str, RouteParams) {
        let no_hash = raw.split('#').next().unwrap_or(raw);
        match no_hash.split_once('?') {
            Some((path, query)) => (path, Self::from_query(query)),
            None => (no_hash, RouteParams::new()),
        }
    }
}

/// Percent-decode one query component; `+` means space.
pub(crate) fn decode_component(raw: &str) -> String {
    let plussed = raw.replace('+', " ");
    match urlencoding::decode(&plussed) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plussed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_parse_in_document_order() {
        let params = RouteParams::from_query("a=1&b=two&c");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("two"));
        assert_eq!(params.get("c"), Some(""));
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn query_components_are_percent_decoded() {
        let params = RouteParams::from_query("q=city+bike&tag=caf%C3%A9");
        assert_eq!(params.get("q"), Some("city bike"));
        assert_eq!(params.get("tag"), Some("café"));
    }

    #[test]
    fn split_path_separates_query_and_hash() {
        let (path, params) = RouteParams::split_path("/listings?q=bike#gallery");
        assert_eq!(path, "/listings");
        assert_eq!(params.get("q"), Some("bike"));

        let (path, params) = RouteParams::split_path("/listings");
        assert_eq!(path, "/listings");
        assert!(params.is_empty());
    }

    #[test]
    fn insert_replaces_existing_keys() {
        let mut params = RouteParams::new();
        params.insert("id", "1");
        params.insert("id", "2");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("2"));
    }

    #[test]
    fn extend_overrides_on_collision() {
        let mut base = RouteParams::from_query("id=query&q=bike");
        let mut captures = RouteParams::new();
        captures.insert("id", "42");
        base.extend(&captures);
        assert_eq!(base.get("id"), Some("42"));
        assert_eq!(base.get("q"), Some("bike"));
    }
}
