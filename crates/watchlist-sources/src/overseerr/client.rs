use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use watchlist_models::MediaType;

use crate::error::SourceError;
use crate::traits::MediaRequester;

/// Body of `POST /api/v1/request`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub media_id: u64,
    pub media_type: MediaType,
    /// Series requests cover every season
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<&'static str>,
}

impl RequestPayload {
    pub fn new(media_id: u64, media_type: MediaType) -> Self {
        Self {
            media_id,
            media_type,
            seasons: (media_type == MediaType::Tv).then_some("all"),
        }
    }
}

#[derive(Clone)]
pub struct OverseerrClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OverseerrClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request_url(&self) -> String {
        format!("{}/api/v1/request", self.base_url)
    }
}

#[async_trait]
impl MediaRequester for OverseerrClient {
    fn service_name(&self) -> &str {
        "overseerr"
    }

    async fn request_media(&self, id: u64, media_type: MediaType) -> Result<(), SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::not_configured("Overseerr API key"));
        }

        let payload = RequestPayload::new(id, media_type);
        debug!(media_id = id, media_type = %media_type, "Sending Overseerr request");

        let response = self
            .client
            .post(self.request_url())
            .header("X-Api-Key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: "overseerr",
                status: status.as_u16(),
                body,
            });
        }

        info!(operation = "overseerr_request", media_id = id, media_type = %media_type, "Requested media");
        Ok(())
    }
}
