//! File-backed session token store.
//!
//! The token lives under the `auth_token` key of `session.json` in the
//! config directory. It is the only durable state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use barkeep_fetch::{CredentialError, TokenStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::persistence::{default_session_path, load_json_opt, remove_file, save_json};

/// On-disk shape of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Token store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default session path.
    pub fn default_location() -> Self {
        Self::new(default_session_path())
    }

    /// The session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::default_location()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<String>, CredentialError> {
        let session: Option<SessionFile> = load_json_opt(&self.path).await?;
        let token = session
            .and_then(|s| s.auth_token)
            .filter(|t| !t.trim().is_empty());
        debug!(present = token.is_some(), "Read session file");
        Ok(token)
    }

    #[instrument(skip(self, token), fields(path = %self.path.display()))]
    async fn save(&self, token: &str) -> Result<(), CredentialError> {
        let session = SessionFile {
            auth_token: Some(token.to_string()),
        };
        save_json(&self.path, &session).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self) -> Result<(), CredentialError> {
        remove_file(&self.path).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
