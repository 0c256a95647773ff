use confique::Config;

/// Configuration for browser sessions
#[derive(Debug, Config, Clone)]
pub struct SessionConfig {
    /// Idle time in seconds after which a session is dropped (default: 3600)
    #[config(env = "OAUTH_DEMO_SESSION_IDLE_TTL", default = 3600)]
    pub idle_ttl: u64,

    /// Maximum number of sessions kept in memory (default: 10000)
    #[config(env = "OAUTH_DEMO_SESSION_MAX_SESSIONS", default = 10000)]
    pub max_sessions: u64,

    /// Name of the session cookie (default: oauth_demo_session)
    #[config(env = "OAUTH_DEMO_SESSION_COOKIE_NAME", default = "oauth_demo_session")]
    pub cookie_name: String,
}
