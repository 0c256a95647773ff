//! Discovery document lookups

use crate::errors::FlowError;
use http::header::ACCEPT;
use log::debug;
use reqwest::Client;
use serde_json::Value;

pub const AUTHORIZATION_ENDPOINT: &str = "authorization_endpoint";
pub const TOKEN_ENDPOINT: &str = "token_endpoint";

/// Resolves endpoint URLs from a provider's discovery document
#[derive(Clone)]
pub struct MetadataResolver {
    client: Client,
}

impl MetadataResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the discovery document and return the string value of `endpoint`
    pub async fn resolve_endpoint(
        &self,
        well_known_url: &str,
        endpoint: &str,
    ) -> Result<String, FlowError> {
        debug!("Fetching provider metadata from {}", well_known_url);

        let response = self
            .client
            .get(well_known_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FlowError::MetadataFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowError::MetadataFetch(format!(
                "HTTP {} from {}",
                response.status(),
                well_known_url
            )));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| FlowError::MetadataFetch(format!("invalid discovery document: {e}")))?;

        document
            .get(endpoint)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                FlowError::MetadataFetch(format!("discovery document has no `{endpoint}`"))
            })
    }
}
