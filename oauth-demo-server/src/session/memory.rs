use super::{SessionError, SessionStore};
use crate::oauth::models::FlowSettings;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::time::Duration;

/// Session store kept in process memory. Sessions end after `idle_ttl_secs`
/// without access.
#[derive(Clone)]
pub struct InMemorySessionStore {
    cache: MokaCache<String, String>,
}

impl InMemorySessionStore {
    /// Initialize a new in-memory session store
    pub fn new(idle_ttl_secs: u64, max_sessions: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .max_capacity(max_sessions)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<FlowSettings>, SessionError> {
        if let Some(value) = self.cache.get(session_id).await {
            serde_json::from_str(&value)
                .map_err(|e| SessionError::Deserialization(e.to_string()))
                .map(Some)
        } else {
            Ok(None)
        }
    }

    async fn put(&self, session_id: &str, settings: &FlowSettings) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(settings)?;
        self.cache.insert(session_id.to_string(), serialized).await;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        self.cache.remove(session_id).await;
        Ok(())
    }
}
