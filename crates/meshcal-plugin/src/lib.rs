//! Google Calendar entity plugin.
//!
//! This crate is the pluggable unit a message-driven host embeds:
//!
//! - [`GcalPlugin`] - lifecycle (`uninitialized` -> `ready`), the boot
//!   hook, and message dispatch
//! - [`EventHandlers`] - the three operation handlers (list, load, save)
//!   sharing one read-only provider handle
//! - [`init_tracing`] - log/tracing setup for the embedding process
//!
//! # Lifecycle
//!
//! The host must invoke [`GcalPlugin::init`] before routing any entity
//! message to the plugin. `init` loads the client credentials, reuses a
//! persisted token or runs the one-time interactive grant, and installs
//! the handlers; it resolves once the plugin is `ready`. Messages that
//! arrive during initialization wait for it; messages dispatched to an
//! uninitialized plugin that never booted get a `not_ready` error.
//!
//! # Example
//!
//! ```ignore
//! use meshcal_plugin::GcalPlugin;
//! use meshcal_protocol::Request;
//! use meshcal_providers::google::GoogleConfig;
//!
//! let plugin = GcalPlugin::new(GoogleConfig::default());
//! plugin.init().await?;               // the host's boot hook
//! let response = plugin.handle(Request::list()).await;
//! ```

mod error;
mod handler;
mod plugin;
mod tracing;

pub use error::{PluginError, PluginResult};
pub use handler::EventHandlers;
pub use plugin::{BASE, GcalPlugin, NAME, ZONE, event_canon};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
