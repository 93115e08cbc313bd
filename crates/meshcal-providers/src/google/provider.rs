//! Google Calendar provider.
//!
//! Ties the authorization flow and the events client together behind the
//! [`EventProvider`] trait.

use tracing::{debug, info, warn};

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, EventData, EventProvider};

use super::client::GoogleEventsClient;
use super::config::{GoogleConfig, GoogleCredentials};
use super::oauth::{GrantPrompt, OAuthFlow};
use super::tokens::TokenStorage;

/// Google Calendar provider, constructed once during plugin boot.
///
/// Construction performs the whole authorization sequence; afterwards the
/// provider is immutable and safe to share across concurrent handlers.
#[derive(Debug)]
pub struct GoogleProvider {
    client: GoogleEventsClient,
}

impl GoogleProvider {
    /// Authorizes against Google and returns a ready provider.
    ///
    /// The sequence is strictly sequential, attempted once:
    ///
    /// 1. Load the credentials file (unreadable/unparsable is fatal)
    /// 2. Load the persisted token; if a readable blob exists, done
    /// 3. Otherwise run the interactive grant through `prompt` and
    ///    exchange the code for a token
    /// 4. Persist the fresh token; a write failure is logged, not fatal
    ///
    /// There is no retry on exchange failure and no token refresh later;
    /// an already-expired stored token only produces a warning here.
    pub async fn connect(config: &GoogleConfig, prompt: &dyn GrantPrompt) -> ProviderResult<Self> {
        let credentials = GoogleCredentials::from_file(&config.credentials_path)?;
        credentials.validate()?;

        let storage = TokenStorage::new(&config.token_path);
        let flow = OAuthFlow::new(credentials);

        let token = match storage.load()? {
            Some(token) => {
                debug!(path = ?storage.path(), "using persisted token");
                token
            }
            None => {
                let auth_url = flow.authorization_url(&config.scopes)?;
                let code = prompt.obtain_code(auth_url).await?;
                let token = flow.exchange_code(&code).await?;

                match storage.save(&token) {
                    Ok(()) => info!(path = ?storage.path(), "token stored"),
                    Err(e) => warn!(
                        error = %e,
                        "failed to persist token; authorization will not survive a restart"
                    ),
                }

                token
            }
        };

        if token.is_expired() {
            warn!("stored access token is past its expiry; remote calls may be rejected");
        }

        Ok(Self {
            client: GoogleEventsClient::new(token.access_token),
        })
    }
}

impl EventProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google-calendar"
    }

    fn list_events(&self, query: EventData) -> BoxFuture<'_, ProviderResult<Vec<EventData>>> {
        Box::pin(async move { self.client.list_events(query).await })
    }

    fn get_event(&self, event_id: String) -> BoxFuture<'_, ProviderResult<EventData>> {
        Box::pin(async move { self.client.get_event(&event_id).await })
    }

    fn patch_event(
        &self,
        event_id: String,
        changes: EventData,
    ) -> BoxFuture<'_, ProviderResult<EventData>> {
        Box::pin(async move { self.client.patch_event(&event_id, &changes).await })
    }
}
