//! Bearer-authenticated requests to the resource server

use crate::errors::FlowError;
use http::header::ACCEPT;
use log::{debug, warn};
use reqwest::Client;

/// Performs GET requests with a caller-supplied bearer token
#[derive(Clone)]
pub struct ResourceClient {
    client: Client,
    media_type: String,
}

impl ResourceClient {
    /// `media_type` is sent as `Accept` on every request
    pub fn new(client: Client, media_type: impl Into<String>) -> Self {
        Self {
            client,
            media_type: media_type.into(),
        }
    }

    /// GET `url` with `Authorization: Bearer {token}` and return the raw body
    pub async fn authenticated_get(&self, token: &str, url: &str) -> Result<String, FlowError> {
        debug!("Calling resource server: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, self.media_type.as_str())
            .send()
            .await
            .map_err(|e| FlowError::ResourceFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Resource server returned {} for {}", status, url);
            return Err(FlowError::ResourceFetch(format!("HTTP {status} from {url}")));
        }

        response
            .text()
            .await
            .map_err(|e| FlowError::ResourceFetch(e.to_string()))
    }
}
