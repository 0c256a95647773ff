//! Identity provider and resource server configuration

use confique::Config;
use serde::Deserialize;

/// Unit of the `expires_in` field returned by the token endpoint
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpiresInUnit {
    /// RFC 6749 semantics
    #[default]
    Seconds,
    Milliseconds,
}

impl ExpiresInUnit {
    /// Converts a raw `expires_in` value into a duration
    pub fn to_duration(self, expires_in: u64) -> chrono::Duration {
        let value = i64::try_from(expires_in).unwrap_or(i64::MAX);
        match self {
            Self::Seconds => chrono::Duration::try_seconds(value),
            Self::Milliseconds => chrono::Duration::try_milliseconds(value),
        }
        .unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Configuration of the identity provider and resource server
#[derive(Debug, Config, Clone)]
pub struct ProviderConfig {
    /// Discovery document of the identity provider
    #[config(
        env = "OAUTH_DEMO_PROVIDER_WELL_KNOWN_URL",
        default = "https://signin.johndeere.com/oauth2/aus78tnlaysMraFhC1t7/.well-known/oauth-authorization-server"
    )]
    pub well_known_url: String,

    /// Resource server base URL (default: https://sandboxapi.deere.com/platform)
    #[config(
        env = "OAUTH_DEMO_PROVIDER_API_URL",
        default = "https://sandboxapi.deere.com/platform"
    )]
    pub api_url: String,

    /// Space-delimited scopes requested by default
    #[config(
        env = "OAUTH_DEMO_PROVIDER_SCOPES",
        default = "ag1 ag2 ag3 eq1 eq2 org1 org2 files offline_access"
    )]
    pub scopes: String,

    /// Media type sent in the `Accept` header of resource requests
    #[config(
        env = "OAUTH_DEMO_PROVIDER_API_MEDIA_TYPE",
        default = "application/vnd.deere.axiom.v3+json"
    )]
    pub api_media_type: String,

    /// Unit of `expires_in` in token responses: "seconds" or "milliseconds"
    /// (default: seconds)
    #[config(env = "OAUTH_DEMO_PROVIDER_EXPIRES_IN_UNIT", default = "seconds")]
    pub expires_in_unit: ExpiresInUnit,

    /// Reject callbacks whose `state` does not match the session (default: true)
    #[config(env = "OAUTH_DEMO_PROVIDER_ENFORCE_STATE", default = true)]
    pub enforce_state: bool,
}
