use confique::Config;

/// Configuration for the outbound HTTP client used against the identity
/// provider and the resource server
#[derive(Debug, Config, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 10)
    #[config(env = "OAUTH_DEMO_HTTP_TIMEOUT", default = 10)]
    pub timeout: u64,

    /// Connect timeout in seconds (default: 2)
    #[config(env = "OAUTH_DEMO_HTTP_CONNECT_TIMEOUT", default = 2)]
    pub connect_timeout: u64,

    /// Skip TLS certificate validation. Only meant for sandbox deployments
    /// with self-signed certificates (default: false)
    #[config(env = "OAUTH_DEMO_HTTP_ACCEPT_INVALID_CERTS", default = false)]
    pub accept_invalid_certs: bool,
}
