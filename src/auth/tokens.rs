//! Credential records and token storage

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Proactive refresh margin: a token within this many seconds of expiry is
/// treated as already expired, so a request never starts with a token that
/// dies mid-pagination.
const REFRESH_MARGIN_SECS: u64 = 300;

/// One session's provider credentials.
///
/// Owned by the session manager; mutated only on login and refresh.
/// Provider-specific fields we do not interpret are carried opaquely so a
/// store written by another process revision round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry as unix seconds. `None` means the provider did not
    /// say, and the token is used until it is rejected.
    pub expires_at: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CredentialRecord {
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: Option<u64>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expires_in_secs.map(|secs| unix_now() + secs),
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the access token is expired or within the safety margin.
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(exp) => unix_now() + REFRESH_MARGIN_SECS >= exp,
            None => false,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Durable mapping from session ID to credentials.
///
/// `put` persists synchronously before returning, so a crash after a
/// refresh never leaves a stale record to be reused by a later process run.
pub trait TokenStore: Send {
    fn get(&self, session_id: &str) -> Option<CredentialRecord>;
    fn put(&mut self, session_id: &str, record: CredentialRecord) -> Result<()>;
    fn remove(&mut self, session_id: &str) -> Result<()>;
    fn sessions(&self) -> Vec<String>;
}

/// JSON-file-backed store: load-all-on-start, save-on-write.
pub struct FileTokenStore {
    path: PathBuf,
    records: HashMap<String, CredentialRecord>,
}

impl FileTokenStore {
    /// Load the store from disk. A missing or unreadable file starts empty
    /// rather than failing: sessions are recoverable by re-authentication.
    pub fn load(path: PathBuf) -> Self {
        let records = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CredentialRecord>>(
                &content,
            ) {
                Ok(records) => {
                    tracing::debug!("loaded {} sessions from {}", records.len(), path.display());
                    records
                }
                Err(e) => {
                    tracing::warn!("could not parse token store {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                tracing::debug!("no token store at {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self { path, records }
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create token store directory")?;
        }
        let content =
            serde_json::to_string_pretty(&self.records).context("Failed to serialize token store")?;
        fs::write(&self.path, content).context("Failed to write token store")?;

        // Restrictive permissions: the file holds live credentials.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .context("Failed to set token store permissions")?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, session_id: &str) -> Option<CredentialRecord> {
        self.records.get(session_id).cloned()
    }

    fn put(&mut self, session_id: &str, record: CredentialRecord) -> Result<()> {
        self.records.insert(session_id.to_string(), record);
        self.save()
    }

    fn remove(&mut self, session_id: &str) -> Result<()> {
        if self.records.remove(session_id).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemoryTokenStore {
    records: HashMap<String, CredentialRecord>,
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, session_id: &str) -> Option<CredentialRecord> {
        self.records.get(session_id).cloned()
    }

    fn put(&mut self, session_id: &str, record: CredentialRecord) -> Result<()> {
        self.records.insert(session_id.to_string(), record);
        Ok(())
    }

    fn remove(&mut self, session_id: &str) -> Result<()> {
        self.records.remove(session_id);
        Ok(())
    }

    fn sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }
}
