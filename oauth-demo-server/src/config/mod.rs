pub(crate) use crate::config::http::HttpConfig;
pub(crate) use crate::config::provider::{ExpiresInUnit, ProviderConfig};
pub(crate) use crate::config::session::SessionConfig;
use confique::Config;

pub mod http;
pub mod provider;
pub mod session;

/// Environment variable pointing to an optional TOML configuration file
pub const CONFIG_FILE_ENV: &str = "OAUTH_DEMO_CONFIG_FILE";

/// Main configuration structure for the demo server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 9090)
    #[config(env = "OAUTH_DEMO_PORT", default = 9090)]
    pub port: u16,

    /// Public base URL of this application, used to derive the callback URL
    /// and the organization connection return URL (default: http://localhost:9090)
    #[config(env = "OAUTH_DEMO_SERVER_URL", default = "http://localhost:9090")]
    pub server_url: String,

    /// Outbound HTTP client configuration
    #[config(nested)]
    pub http: HttpConfig,

    /// Identity provider and resource server configuration
    #[config(nested)]
    pub provider: ProviderConfig,

    /// Browser session configuration
    #[config(nested)]
    pub session: SessionConfig,
}

impl Settings {
    /// Loads the configuration from environment variables, layered over an
    /// optional TOML file named by `OAUTH_DEMO_CONFIG_FILE`
    pub fn new() -> Result<Self, confique::Error> {
        let mut builder = Settings::builder().env();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.file(path);
        }
        builder.load()
    }

    /// Redirect URI registered with the identity provider
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.server_url.trim_end_matches('/'))
    }

    /// Where the resource server sends the user after organization consent
    pub fn org_connection_completed_url(&self) -> String {
        self.server_url.clone()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        idp_mock: &wiremock::MockServer,
        api_mock: &wiremock::MockServer,
    ) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            server_url: "https://app".to_string(),
            http: HttpConfig {
                timeout: 5,
                connect_timeout: 2,
                accept_invalid_certs: false,
            },
            provider: ProviderConfig {
                well_known_url: format!(
                    "{}/.well-known/oauth-authorization-server",
                    idp_mock.uri()
                ),
                api_url: api_mock.uri(),
                scopes: "ag1 org1 offline_access".to_string(),
                api_media_type: "application/vnd.deere.axiom.v3+json".to_string(),
                expires_in_unit: ExpiresInUnit::Seconds,
                enforce_state: true,
            },
            session: SessionConfig {
                idle_ttl: 60,
                max_sessions: 100,
                cookie_name: "oauth_demo_session".to_string(),
            },
        }
    }
}
