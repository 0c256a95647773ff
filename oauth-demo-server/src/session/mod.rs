//! Server-side session storage for flow settings.
//!
//! Each browser session owns exactly one [`FlowSettings`] record. Handlers
//! hold the session's lock from [`SessionLocks`] for the whole
//! read-modify-write so that concurrent requests of the same session are
//! applied one after another.

use crate::oauth::models::FlowSettings;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub mod cookie;
pub mod memory;

pub use memory::InMemorySessionStore;

/// Errors that can occur during session store operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse session: {0}")]
    Deserialization(String),
}

/// Storage of one settings record per session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Retrieve the settings of a session, if any
    async fn get(&self, session_id: &str) -> Result<Option<FlowSettings>, SessionError>;

    /// Store (or replace) the settings of a session
    async fn put(&self, session_id: &str, settings: &FlowSettings) -> Result<(), SessionError>;

    /// Forget a session
    async fn delete(&self, session_id: &str) -> Result<(), SessionError>;
}

/// Per-session mutexes, expiring together with idle sessions
#[derive(Clone)]
pub struct SessionLocks {
    locks: MokaCache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new(idle_ttl_secs: u64, max_sessions: u64) -> Self {
        let locks = MokaCache::builder()
            .time_to_idle(Duration::from_secs(idle_ttl_secs))
            .max_capacity(max_sessions)
            .build();
        Self { locks }
    }

    /// Wait for exclusive access to a session
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(session_id.to_string(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}
