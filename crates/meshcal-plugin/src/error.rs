//! Plugin error types.

use thiserror::Error;

use meshcal_providers::ProviderError;

/// Result type for plugin lifecycle operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur in the plugin itself.
///
/// Per-operation remote failures are not represented here - they travel
/// back to the host as protocol error responses. This type only covers
/// the boot path, where a failure is fatal and the host never receives
/// its acknowledgment.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Boot failed: credentials unreadable, token blob corrupt, or the
    /// authorization flow itself failed.
    #[error("plugin boot failed: {0}")]
    Boot(#[from] ProviderError),
}
