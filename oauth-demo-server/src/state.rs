use crate::config::{HttpConfig, Settings};
use crate::oauth::flow::FlowController;
use crate::session::{InMemorySessionStore, SessionStore};
use log::warn;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub flow: Arc<FlowController>,
}

impl AppState {
    fn create_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for outbound requests, use only against sandboxes");
        }

        Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
    }

    /// Application state backed by the in-memory session store
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let store = Arc::new(InMemorySessionStore::new(
            settings.session.idle_ttl,
            settings.session.max_sessions,
        ));
        Self::with_session_store(settings, store)
    }

    /// Application state with a caller-provided session store
    pub fn with_session_store(
        settings: Settings,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, reqwest::Error> {
        let client = Self::create_http_client(&settings.http)?;
        let settings = Arc::new(settings);
        Ok(Self {
            flow: Arc::new(FlowController::new(settings.clone(), client, store)),
            settings,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_testing(settings: &Settings) -> Self {
        Self::new(settings.clone()).expect("Failed to create test state")
    }
}
