//! Plugin lifecycle and message dispatch.
//!
//! The plugin has exactly two states. It starts `uninitialized`; the
//! host's boot hook drives [`GcalPlugin::init`], which authorizes against
//! the remote service and installs the handlers, transitioning to `ready`
//! exactly once. There is no transition back and no re-authorization
//! path: a token expiring mid-process surfaces as per-operation provider
//! errors, not as a lifecycle event.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use meshcal_protocol::{Cmd, EntityCanon, Envelope, ErrorCode, Pattern, Request, Response};
use meshcal_providers::google::{GoogleConfig, GoogleProvider, GrantPrompt, TerminalPrompt};

use crate::error::PluginResult;
use crate::handler::EventHandlers;

/// The fixed entity address this plugin serves.
pub const ZONE: &str = "provider";
pub const BASE: &str = "google-calendar";
pub const NAME: &str = "event";

/// The canon of every record this plugin produces.
pub fn event_canon() -> EntityCanon {
    EntityCanon::new(ZONE, BASE, NAME)
}

enum PluginState {
    Uninitialized,
    Ready(EventHandlers),
}

/// The Google Calendar entity plugin.
///
/// One instance per host process. Cheap to share behind an `Arc`; all
/// methods take `&self`.
pub struct GcalPlugin {
    config: GoogleConfig,
    state: RwLock<PluginState>,
}

impl GcalPlugin {
    /// Creates an uninitialized plugin.
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            state: RwLock::new(PluginState::Uninitialized),
        }
    }

    /// The router patterns the host should bind to [`GcalPlugin::handle`].
    pub fn patterns() -> Vec<Pattern> {
        [Cmd::List, Cmd::Load, Cmd::Save]
            .into_iter()
            .map(|cmd| Pattern::new(cmd, event_canon()))
            .collect()
    }

    /// The boot hook: authorizes and transitions to `ready`.
    ///
    /// Uses the terminal prompt when no persisted token exists, blocking
    /// on the operator's grant code. The write lock is held for the whole
    /// sequence, so messages dispatched meanwhile wait for boot to
    /// finish.
    ///
    /// # Errors
    ///
    /// Any failure (unreadable credentials, corrupt token blob, exchange
    /// failure) leaves the plugin `uninitialized`; the host should treat
    /// it as fatal.
    pub async fn init(&self) -> PluginResult<()> {
        self.init_with_prompt(&TerminalPrompt).await
    }

    /// Boot with a caller-supplied grant prompt.
    pub async fn init_with_prompt(&self, prompt: &dyn GrantPrompt) -> PluginResult<()> {
        let mut state = self.state.write().await;
        if matches!(&*state, PluginState::Ready(_)) {
            warn!("init called on an already-ready plugin");
            return Ok(());
        }

        let provider = GoogleProvider::connect(&self.config, prompt).await?;
        *state = PluginState::Ready(EventHandlers::new(Arc::new(provider)));
        info!("plugin ready");
        Ok(())
    }

    /// Returns true once the plugin has reached `ready`.
    pub async fn is_ready(&self) -> bool {
        matches!(&*self.state.read().await, PluginState::Ready(_))
    }

    /// Dispatches one entity message.
    ///
    /// Safe to call concurrently; before `ready` it answers with a
    /// `not_ready` error.
    pub async fn handle(&self, request: Request) -> Response {
        let state = self.state.read().await;
        match &*state {
            PluginState::Ready(handlers) => handlers.handle(request).await,
            PluginState::Uninitialized => Response::error(
                ErrorCode::NotReady,
                "plugin has not completed initialization",
            ),
        }
    }

    /// Dispatches an enveloped message, echoing its request id.
    pub async fn handle_envelope(&self, envelope: Envelope<Request>) -> Envelope<Response> {
        if !envelope.is_compatible() {
            return Envelope::response(
                envelope.request_id,
                Response::error(
                    ErrorCode::InvalidRequest,
                    format!(
                        "unsupported protocol version: {}",
                        envelope.protocol_version
                    ),
                ),
            );
        }

        let response = self.handle(envelope.payload).await;
        Envelope::response(envelope.request_id, response)
    }

    #[cfg(test)]
    async fn install(&self, api: Arc<dyn meshcal_providers::EventProvider>) {
        *self.state.write().await = PluginState::Ready(EventHandlers::new(api));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcal_providers::{BoxFuture, EventData, EventProvider, ProviderError, ProviderResult};
    use serde_json::json;
    use std::fs;

    struct OneEventProvider;

    impl EventProvider for OneEventProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn list_events(&self, _query: EventData) -> BoxFuture<'_, ProviderResult<Vec<EventData>>> {
            let mut event = EventData::new();
            event.insert("id".to_string(), json!("evt-1"));
            Box::pin(async move { Ok(vec![event]) })
        }

        fn get_event(&self, _event_id: String) -> BoxFuture<'_, ProviderResult<EventData>> {
            Box::pin(async { Err(ProviderError::server("not wired in this test")) })
        }

        fn patch_event(
            &self,
            _event_id: String,
            _changes: EventData,
        ) -> BoxFuture<'_, ProviderResult<EventData>> {
            Box::pin(async { Err(ProviderError::server("not wired in this test")) })
        }
    }

    struct NoPrompt;

    impl GrantPrompt for NoPrompt {
        fn obtain_code(&self, _auth_url: String) -> BoxFuture<'_, ProviderResult<String>> {
            Box::pin(async {
                Err(ProviderError::internal(
                    "interactive prompt reached in a test that forbids it",
                ))
            })
        }
    }

    const CREDENTIALS: &str = r#"{
        "installed": {
            "client_id": "test-client.apps.googleusercontent.com",
            "client_secret": "test-secret",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
        }
    }"#;

    const TOKEN: &str = r#"{
        "access_token": "ya29.test",
        "refresh_token": "1//refresh",
        "expires_at": "2099-01-01T00:00:00Z"
    }"#;

    fn fixture_plugin(dir: &std::path::Path) -> GcalPlugin {
        let config = GoogleConfig::new()
            .with_credentials_path(dir.join("credentials.json"))
            .with_token_path(dir.join("token.json"));
        fs::write(&config.credentials_path, CREDENTIALS).unwrap();
        fs::write(&config.token_path, TOKEN).unwrap();
        GcalPlugin::new(config)
    }

    #[test]
    fn patterns_cover_the_three_commands() {
        let rendered: Vec<String> = GcalPlugin::patterns()
            .iter()
            .map(Pattern::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "role:entity,cmd:list,zone:provider,base:google-calendar,name:event",
                "role:entity,cmd:load,zone:provider,base:google-calendar,name:event",
                "role:entity,cmd:save,zone:provider,base:google-calendar,name:event",
            ]
        );
    }

    #[tokio::test]
    async fn messages_before_init_get_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());
        assert!(!plugin.is_ready().await);

        let response = plugin.handle(Request::list()).await;
        let error = response.as_error().expect("expected error");
        assert_eq!(error.code, ErrorCode::NotReady);
    }

    #[tokio::test]
    async fn init_with_persisted_token_needs_no_operator() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());

        plugin.init_with_prompt(&NoPrompt).await.unwrap();
        assert!(plugin.is_ready().await);
    }

    #[tokio::test]
    async fn init_without_credentials_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new()
            .with_credentials_path(dir.path().join("missing.json"))
            .with_token_path(dir.path().join("token.json"));
        let plugin = GcalPlugin::new(config);

        assert!(plugin.init_with_prompt(&NoPrompt).await.is_err());
        assert!(!plugin.is_ready().await);
    }

    #[tokio::test]
    async fn second_init_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());

        plugin.init_with_prompt(&NoPrompt).await.unwrap();
        plugin.init_with_prompt(&NoPrompt).await.unwrap();
        assert!(plugin.is_ready().await);
    }

    #[tokio::test]
    async fn ready_plugin_dispatches_to_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());
        plugin.install(Arc::new(OneEventProvider)).await;

        let response = plugin.handle(Request::list()).await;
        let Response::EntityList { list } = response else {
            panic!("expected entity list");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id(), Some("evt-1"));
    }

    #[tokio::test]
    async fn envelope_round_trip_echoes_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());
        plugin.install(Arc::new(OneEventProvider)).await;

        let envelope = Envelope::request("req-42", Request::list());
        let response = plugin.handle_envelope(envelope).await;
        assert_eq!(response.request_id, "req-42");
        assert!(response.payload.is_success());
    }

    #[tokio::test]
    async fn envelope_with_wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = fixture_plugin(dir.path());

        let envelope = Envelope {
            protocol_version: "99".to_string(),
            request_id: "req-1".to_string(),
            payload: Request::list(),
        };
        let response = plugin.handle_envelope(envelope).await;
        let error = response.payload.as_error().expect("expected error");
        assert_eq!(error.code, ErrorCode::InvalidRequest);
    }
}
