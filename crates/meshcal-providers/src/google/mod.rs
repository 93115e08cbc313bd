//! Google Calendar provider implementation.
//!
//! This module provides a [`GoogleProvider`] that serves the plugin's
//! three event operations against the Google Calendar API v3.
//!
//! # Authorization Flow
//!
//! 1. Client credentials (id, secret, redirect URIs) are read once from a
//!    local JSON file
//! 2. A previously persisted token is loaded from disk if one exists, and
//!    authorization completes with no network round trip
//! 3. Otherwise the provider prints an authorization URL, blocks reading
//!    the one-time grant code from the operator, and exchanges it for a
//!    token at Google's token endpoint
//! 4. The fresh token is persisted so later process starts skip the
//!    interactive step
//!
//! There is no automatic token refresh: once the access token expires
//! mid-process, remote calls fail and surface as provider errors.
//!
//! # Example
//!
//! ```ignore
//! use meshcal_providers::google::{GoogleConfig, GoogleProvider, TerminalPrompt};
//!
//! let config = GoogleConfig::default();
//! let provider = GoogleProvider::connect(&config, &TerminalPrompt).await?;
//! let events = provider.list_events(Default::default()).await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::GoogleEventsClient;
pub use config::{GoogleConfig, GoogleCredentials};
pub use oauth::{GrantPrompt, OAuthFlow, TerminalPrompt};
pub use provider::GoogleProvider;
pub use tokens::{TokenInfo, TokenStorage};
