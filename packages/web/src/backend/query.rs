//! Table query builder for the REST surface.
//!
//! Filters use the PostgREST operator syntax (`column=eq.value`), rendered
//! into the query string in insertion order.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_json, ensure_ok, Backend, BackendError};

/// Builder for a single table request.
pub struct QueryBuilder<'a> {
    backend: &'a Backend,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u32>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(backend: &'a Backend, table: &str) -> Self {
        Self {
            backend,
            table: table.to_owned(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Columns to return; defaults to `*`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_owned());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_owned(), format!("eq.{}", value.to_string())));
        self
    }

    /// Case-insensitive substring match.
    pub fn ilike(mut self, column: &str, needle: &str) -> Self {
        self.filters
            .push((column.to_owned(), format!("ilike.*{needle}*")));
        self
    }

    pub fn in_(mut self, column: &str, values: &[String]) -> Self {
        self.filters
            .push((column.to_owned(), format!("in.({})", values.join(","))));
        self
    }

    /// Match rows where either of two columns equals the value.
    pub fn either_eq(mut self, first: &str, second: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        self.filters.push((
            "or".to_owned(),
            format!("({first}.eq.{value},{second}.eq.{value})"),
        ));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{column}.{direction}"));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Query-string rendering, separated out for tests.
    pub(crate) fn query_string(&self) -> String {
        let mut parts = vec![format!(
            "select={}",
            urlencoding::encode(self.select.as_deref().unwrap_or("*"))
        )];
        for (column, value) in &self.filters {
            parts.push(format!("{column}={}", urlencoding::encode(value)));
        }
        for order in &self.order {
            parts.push(format!("order={order}"));
        }
        if let Some(n) = self.limit {
            parts.push(format!("limit={n}"));
        }
        parts.join("&")
    }

    fn url(&self) -> String {
        format!(
            "{}/rest/v1/{}?{}",
            self.backend.api_url(),
            self.table,
            self.query_string()
        )
    }

    /// Run the query, decoding all rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        let req = self.backend.authed(self.backend.http().get(self.url()));
        decode_json(req.send().await?).await
    }

    /// Run the query, requiring at least one row.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T, BackendError> {
        let mut rows: Vec<T> = self.limit(1).fetch().await?;
        if rows.is_empty() {
            Err(BackendError::NoRows)
        } else {
            Ok(rows.remove(0))
        }
    }

    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, BackendError> {
        let mut rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Exact row count without fetching rows.
    pub async fn count(self) -> Result<u64, BackendError> {
        let req = self
            .backend
            .authed(self.backend.http().get(self.url()))
            .header("Prefer", "count=exact")
            .header("Range", "0-0");
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let total = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total);
        // 206 Partial Content is the normal shape for ranged count queries
        match total {
            Some(n) => Ok(n),
            None => Err(BackendError::Api {
                status,
                message: "missing content-range header".to_owned(),
            }),
        }
    }

    /// Insert rows, returning the created representation.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        self,
        rows: &B,
    ) -> Result<Vec<T>, BackendError> {
        let req = self
            .backend
            .authed(self.backend.http().post(self.url()))
            .header("Prefer", "return=representation")
            .json(rows);
        decode_json(req.send().await?).await
    }

    /// Insert a single row, returning it.
    pub async fn insert_one<B: Serialize, T: DeserializeOwned>(
        self,
        row: &B,
    ) -> Result<T, BackendError> {
        let mut created: Vec<T> = self.insert(row).await?;
        if created.is_empty() {
            Err(BackendError::NoRows)
        } else {
            Ok(created.remove(0))
        }
    }

    /// Patch rows matching the filters.
    pub async fn update<B: Serialize>(self, patch: &B) -> Result<(), BackendError> {
        let req = self
            .backend
            .authed(self.backend.http().patch(self.url()))
            .json(patch);
        ensure_ok(req.send().await?).await?;
        Ok(())
    }

    /// Delete rows matching the filters.
    pub async fn delete(self) -> Result<(), BackendError> {
        let req = self.backend.authed(self.backend.http().delete(self.url()));
        ensure_ok(req.send().await?).await?;
        Ok(())
    }
}

/// `0-0/42` → `42`
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Backend {
        Backend::with_endpoint("https://api.example", "anon")
    }

    #[test]
    fn default_query_selects_everything() {
        let backend = backend();
        let query = backend.table("listings");
        assert_eq!(query.query_string(), "select=%2A");
    }

    #[test]
    fn filters_render_in_insertion_order() {
        let backend = backend();
        let query = backend
            .table("listings")
            .select("id,title")
            .eq("status", "active")
            .ilike("title", "bike")
            .order("created_at", false)
            .limit(20);
        assert_eq!(
            query.query_string(),
            "select=id%2Ctitle&status=eq.active&title=ilike.%2Abike%2A&order=created_at.desc&limit=20"
        );
    }

    #[test]
    fn either_eq_renders_or_filter() {
        let backend = backend();
        let id = "7f8d";
        let query = backend
            .table("messages")
            .either_eq("sender_id", "recipient_id", id);
        assert_eq!(
            query.query_string(),
            format!(
                "select=%2A&or={}",
                urlencoding::encode("(sender_id.eq.7f8d,recipient_id.eq.7f8d)")
            )
        );
    }

    #[test]
    fn content_range_total_parses() {
        assert_eq!(parse_total("0-0/42"), Some(42));
        assert_eq!(parse_total("*/0"), Some(0));
        assert_eq!(parse_total("garbage"), None);
    }
}
