use reqwest::{Client, StatusCode};
use std::time;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Thin client for the hosted document database. The store owns all durable
/// content; this service only ever reads the role field of a user document.
pub struct DocumentStoreClient {
    http_client: Client,
    base_url: String,
}

#[derive(serde::Deserialize)]
struct UserDocument {
    role: Option<String>,
}

impl DocumentStoreClient {
    pub fn new(base_url: String, timeout: Option<time::Duration>) -> DocumentStoreClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        DocumentStoreClient {
            http_client,
            base_url,
        }
    }

    /// Returns the role stored on `users/{uid}`, or `None` when the document
    /// does not exist or carries no role field.
    #[tracing::instrument(name = "Looking up a user role", skip(self))]
    pub async fn fetch_user_role(&self, uid: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/users/{}", self.base_url, uid);

        let response = self.http_client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = response.error_for_status()?.json::<UserDocument>().await?;

        Ok(document.role)
    }
}
