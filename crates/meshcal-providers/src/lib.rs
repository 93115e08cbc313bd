//! EventProvider trait and implementations.
//!
//! This crate provides the abstraction layer between the plugin's message
//! handlers and the remote calendar service:
//!
//! - [`EventProvider`] - The core trait the handlers call through
//! - [`google`] - The Google Calendar implementation (OAuth grant flow,
//!   token persistence, events API client)
//! - [`ProviderError`] - Error types for provider operations
//!
//! Event payloads are schema-less [`serde_json`] maps: the provider passes
//! them through verbatim and never interprets fields beyond `id`.
//!
//! # Example
//!
//! ```ignore
//! use meshcal_providers::{EventProvider, google::{GoogleConfig, GoogleProvider, TerminalPrompt}};
//!
//! let provider = GoogleProvider::connect(&GoogleConfig::default(), &TerminalPrompt).await?;
//! let events = provider.list_events(Default::default()).await?;
//! ```

pub mod error;
pub mod google;
pub mod provider;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{BoxFuture, EventData, EventProvider};
