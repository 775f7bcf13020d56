//! Object storage upload and URL generation.

use super::{ensure_ok, Backend, BackendError};

impl Backend {
    /// Upload an object, overwriting any existing one at the same path.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.api_url());
        let req = self
            .authed(self.http().post(url))
            .header("Content-Type", content_type.to_owned())
            .header("x-upsert", "true")
            .body(bytes);
        ensure_ok(req.send().await?).await?;
        Ok(())
    }

    /// Public URL for an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_points_at_public_object_route() {
        let backend = Backend::with_endpoint("https://api.example", "anon");
        assert_eq!(
            backend.public_url("listing-images", "abc/1.jpg"),
            "https://api.example/storage/v1/object/public/listing-images/abc/1.jpg"
        );
    }
}
