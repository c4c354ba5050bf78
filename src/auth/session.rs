//! Session manager: token freshness and client handout
//!
//! The only component that reads or writes credential records. Callers get
//! back an authenticated `GlipClient` or `Unauthenticated`; they never see
//! tokens. Refreshes write through to the store before the client is
//! handed back, and refreshes for the same session serialize on a
//! per-session lock so concurrent requests cannot interleave writes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::oauth;
use super::tokens::TokenStore;
use crate::api::GlipClient;
use crate::config::Config;
use crate::error::EngineError;

pub struct SessionManager<S> {
    config: Config,
    store: Mutex<S>,
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: TokenStore> SessionManager<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self {
            config,
            store: Mutex::new(store),
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Direct store access for login completion, status, and logout.
    pub async fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Yield an authenticated client for the session, refreshing first when
    /// the stored token is expired or inside the safety margin.
    ///
    /// A store miss, a missing refresh token, and a failed refresh exchange
    /// all degrade to `Unauthenticated`: the session is simply not usable,
    /// and the caller resolves that by re-authenticating.
    pub async fn acquire(&self, session_id: &str) -> Result<GlipClient, EngineError> {
        let lock = self.session_lock(session_id);
        let _serialized = lock.lock().await;

        let record = { self.store.lock().await.get(session_id) };
        let Some(record) = record else {
            tracing::debug!("no credentials for session {}", session_id);
            return Err(EngineError::Unauthenticated);
        };

        let record = if record.needs_refresh() {
            let Some(refresh_token) = record.refresh_token.clone() else {
                tracing::warn!(
                    "session {} expired and has no refresh token",
                    session_id
                );
                return Err(EngineError::Unauthenticated);
            };
            match oauth::refresh_credentials(&self.config, &refresh_token).await {
                Ok(mut fresh) => {
                    // Keep the old refresh token if the provider did not
                    // rotate it.
                    if fresh.refresh_token.is_none() {
                        fresh.refresh_token = Some(refresh_token);
                    }
                    // Persist before handing out the client, so a crash
                    // after refresh never leaves a stale record behind.
                    self.store.lock().await.put(session_id, fresh.clone())?;
                    tracing::info!("refreshed token for session {}", session_id);
                    fresh
                }
                Err(e) => {
                    tracing::warn!(
                        "token refresh failed for session {}: {:#}",
                        session_id,
                        e
                    );
                    return Err(EngineError::Unauthenticated);
                }
            }
        } else {
            record
        };

        Ok(GlipClient::new(
            &self.config.server_url,
            &record.access_token,
        ))
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tokens::{CredentialRecord, MemoryTokenStore};

    fn test_config() -> Config {
        Config {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            server_url: "https://platform.example.com".into(),
            redirect_uri: "https://app.example.com/oauth/callback".into(),
            token_store_path: None,
            cache_ttl_secs: 300,
        }
    }

    #[tokio::test]
    async fn test_absent_session_is_unauthenticated() {
        let manager = SessionManager::new(test_config(), MemoryTokenStore::default());
        let err = manager.acquire("missing").await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_fresh_token_yields_client() {
        let mut store = MemoryTokenStore::default();
        store
            .put("s1", CredentialRecord::new("tok".into(), None, Some(3600)))
            .unwrap();
        let manager = SessionManager::new(test_config(), store);
        assert!(manager.acquire("s1").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_is_unauthenticated() {
        let mut store = MemoryTokenStore::default();
        // Already-expired token and nothing to refresh with.
        store
            .put("s1", CredentialRecord::new("tok".into(), None, Some(0)))
            .unwrap();
        let manager = SessionManager::new(test_config(), store);
        let err = manager.acquire("s1").await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_session_locks_are_per_session() {
        let manager = SessionManager::new(test_config(), MemoryTokenStore::default());
        let a = manager.session_lock("a");
        let b = manager.session_lock("b");
        let a_again = manager.session_lock("a");
        assert!(Arc::ptr_eq(&a, &a_again));
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
