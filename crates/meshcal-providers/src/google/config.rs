//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// Fixed path of the client credentials blob.
pub const DEFAULT_CREDENTIALS_PATH: &str = "config/google-cloud-credentials.json";

/// Fixed path of the persisted token blob.
pub const DEFAULT_TOKEN_PATH: &str = "config/gcal-token.json";

/// OAuth 2.0 client credentials for Google API access.
///
/// Users must provide their own OAuth client, as Google requires
/// registered applications for API access.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// The registered redirect URIs; the grant flow uses the first one.
    pub redirect_uris: Vec<String>,
}

/// Structure of Google's OAuth credentials JSON file, which nests the
/// actual credentials under an "installed" (desktop) or "web" section.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<CredentialsSection>,
    web: Option<CredentialsSection>,
}

#[derive(Debug, Deserialize)]
struct CredentialsSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
    #[serde(default)]
    #[allow(dead_code)]
    project_id: Option<String>,
}

impl GoogleCredentials {
    /// Creates credentials from their parts.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uris: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uris,
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    ///
    /// An unreadable or unparsable file is a fatal configuration error:
    /// the plugin cannot boot without a client identity.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::configuration(format!("failed to read credentials file: {}", e))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from a Google credentials JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        let section = file.installed.or(file.web).ok_or_else(|| {
            ProviderError::configuration(
                "credentials file must contain an 'installed' or 'web' section",
            )
        })?;

        Ok(Self::new(
            section.client_id,
            section.client_secret,
            section.redirect_uris,
        ))
    }

    /// Returns the redirect URI the grant flow should use.
    pub fn first_redirect_uri(&self) -> ProviderResult<&str> {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                ProviderError::configuration("credentials file lists no redirect URIs")
            })
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if self.client_secret.is_empty() {
            return Err(ProviderError::configuration("client_secret is required"));
        }
        if self.redirect_uris.is_empty() {
            return Err(ProviderError::configuration(
                "at least one redirect URI is required",
            ));
        }
        Ok(())
    }
}

/// Configuration for the Google Calendar provider.
///
/// Paths default to the fixed locations the plugin reads; the builders
/// exist for tests and embedding hosts, not for flag plumbing.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path of the client credentials blob, read once at boot.
    pub credentials_path: PathBuf,

    /// Path of the token blob, read at boot and written after a fresh
    /// interactive grant.
    pub token_path: PathBuf,

    /// OAuth scopes requested during the grant flow.
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    /// The two scopes the plugin always requests.
    pub const SCOPES: [&'static str; 2] = [
        "https://www.googleapis.com/auth/calendar",
        "https://www.googleapis.com/auth/calendar.events",
    ];

    /// Creates a configuration with the fixed default paths and scopes.
    pub fn new() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            scopes: Self::SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the credentials file path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Sets the token file path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self::new()
    }
}
