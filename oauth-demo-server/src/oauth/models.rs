//! Session record and wire models of the authorization code flow

use crate::config::Settings;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a session in the authorization code flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Unauthenticated,
    AuthorizationRequested,
    AwaitingOrgLink,
    Authenticated,
}

impl FlowPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::AuthorizationRequested => "Authorization requested",
            Self::AwaitingOrgLink => "Awaiting organization connection",
            Self::Authenticated => "Authenticated",
        }
    }
}

/// Configuration and accumulated state of the flow for one browser session
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowSettings {
    pub client_id: String,
    pub client_secret: String,
    pub well_known_url: String,
    pub callback_url: String,
    /// Space-delimited, sent verbatim
    pub scopes: String,
    /// CSRF token, generated once per settings record
    pub state: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Decoded, unverified access token payload. Display only.
    pub access_token_claims: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub api_url: String,
    pub org_connection_completed_url: String,
    pub last_api_response: Option<String>,
    pub phase: FlowPhase,
}

impl FlowSettings {
    /// Canonical defaults for a fresh session, derived from the server configuration
    pub fn defaults(settings: &Settings) -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            well_known_url: settings.provider.well_known_url.clone(),
            callback_url: settings.callback_url(),
            scopes: settings.provider.scopes.clone(),
            state: generate_state(),
            access_token: None,
            refresh_token: None,
            access_token_claims: None,
            expires_at: None,
            api_url: settings.provider.api_url.clone(),
            org_connection_completed_url: settings.org_connection_completed_url(),
            last_api_response: None,
            phase: FlowPhase::Unauthenticated,
        }
    }
}

// Secrets and tokens stay out of logs
impl fmt::Debug for FlowSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowSettings")
            .field("client_id", &self.client_id)
            .field("well_known_url", &self.well_known_url)
            .field("callback_url", &self.callback_url)
            .field("scopes", &self.scopes)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("api_url", &self.api_url)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Generate a random opaque `state` value (128 bits, base64url)
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Grant presented to the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    AuthorizationCode { code: String },
    RefreshToken { refresh_token: String },
}

impl Grant {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form body sent to the token endpoint
    pub fn form_params<'a>(&'a self, settings: &'a FlowSettings) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("grant_type", self.grant_type()),
            ("redirect_uri", settings.callback_url.as_str()),
        ];
        match self {
            Self::AuthorizationCode { code } => params.push(("code", code.as_str())),
            Self::RefreshToken { refresh_token } => {
                params.push(("refresh_token", refresh_token.as_str()))
            }
        }
        params.push(("scope", settings.scopes.as_str()));
        params
    }
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// `GET {api_url}/organizations` response
#[derive(Debug, Deserialize, Default)]
pub struct OrganizationList {
    #[serde(default)]
    pub values: Vec<Organization>,
}

#[derive(Debug, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub uri: String,
}
