//! OAuth token persistence.
//!
//! The token blob lets subsequent process starts skip the interactive
//! grant. It is read once at boot and written once after a fresh grant;
//! nothing in this module refreshes an expired token.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// A persisted OAuth token set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token, when the grant produced one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token expires, when known.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenInfo {
    /// Creates a token set from token-endpoint response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let expires_at = expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs));

        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    /// Returns true if the access token is past its expiry instant.
    ///
    /// Tokens without a recorded expiry are treated as valid.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

/// File-backed token blob at a fixed path.
#[derive(Debug)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    /// Creates a token storage at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the persisted token, if one exists.
    ///
    /// A missing or unreadable file yields `Ok(None)` - that is the signal
    /// to fall back to the interactive grant. A readable file that fails
    /// to parse is an error: a corrupt blob should stop boot rather than
    /// silently trigger re-authorization.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = ?self.path, error = %e, "no readable token file");
                return Ok(None);
            }
        };

        let token: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {}", e))
        })?;

        Ok(Some(token))
    }

    /// Writes the token blob to disk.
    ///
    /// Writes to a temp file and renames it into place; on Unix the blob
    /// gets owner-only permissions.
    pub fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!(path = ?self.path, "saved token");
        Ok(())
    }

    /// Returns the token blob path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
