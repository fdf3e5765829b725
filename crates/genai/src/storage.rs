//! Google Cloud Storage upload for provider-returned image bytes.

use crate::error::GenerationError;

const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";
const PUBLIC_BASE: &str = "https://storage.googleapis.com";

/// Uploads objects to one bucket via the JSON API media upload.
pub struct GcsStore {
    client: reqwest::Client,
    bucket: String,
    access_token: String,
}

impl GcsStore {
    pub fn new(client: reqwest::Client, bucket: String, access_token: String) -> Self {
        Self {
            client,
            bucket,
            access_token,
        }
    }

    /// Public URL of an object in this bucket.
    pub fn public_url(&self, object: &str) -> String {
        format!("{PUBLIC_BASE}/{}/{object}", self.bucket)
    }

    /// Upload a PNG under `prefix` with a random name and return its public URL.
    pub async fn upload_png(&self, bytes: Vec<u8>, prefix: &str) -> Result<String, GenerationError> {
        if bytes.is_empty() {
            return Err(GenerationError::Upload("refusing to upload an empty image".into()));
        }

        let object = format!("{prefix}{}.png", uuid::Uuid::new_v4());
        let url = format!("{UPLOAD_BASE}/b/{}/o", self.bucket);
        let size = bytes.len();

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object.as_str())])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(bytes)
            .send()
            .await
            .map_err(|e| GenerationError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upload(format!(
                "GCS returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(300).collect::<String>()
            )));
        }

        tracing::debug!(bucket = %self.bucket, object = %object, size, "Image uploaded");
        Ok(self.public_url(&object))
    }
}
