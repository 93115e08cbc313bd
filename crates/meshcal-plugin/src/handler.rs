//! Event operation handlers.
//!
//! One handler per routed command, all sharing a single read-only provider
//! handle. Handlers are stateless beyond that handle, so the host may
//! dispatch list/load/save messages concurrently without coordination.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use meshcal_protocol::{
    EntityCanon, EntityRecord, ErrorCode, QueryParams, Request, Response,
};
use meshcal_providers::{EventData, EventProvider, ProviderError};

use crate::plugin::event_canon;

/// The explicit per-plugin context the three handlers run against.
///
/// Constructed once when the plugin reaches `ready`; holds the provider
/// handle rather than capturing it as ambient state, so tests can run the
/// handlers against a substituted provider.
pub struct EventHandlers {
    api: Arc<dyn EventProvider>,
    canon: EntityCanon,
}

impl EventHandlers {
    /// Creates handlers around a ready provider.
    pub fn new(api: Arc<dyn EventProvider>) -> Self {
        Self {
            api,
            canon: event_canon(),
        }
    }

    /// Dispatches one request to the matching handler.
    #[tracing::instrument(skip(self, request), fields(cmd = %request.cmd()))]
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::List { q } => self.list(q).await,
            Request::Load { q } => self.load(q).await,
            Request::Save { ent } => self.save(ent).await,
        }
    }

    /// Lists events; the optional query map is forwarded verbatim.
    async fn list(&self, q: Option<QueryParams>) -> Response {
        let query = q.unwrap_or_default();
        debug!(params = query.len(), "handling list");

        match self.api.list_events(query).await {
            Ok(items) => {
                let list: Vec<EntityRecord> =
                    items.into_iter().map(|item| self.record(item)).collect();
                debug!(count = list.len(), "returning events");
                Response::entity_list(list)
            }
            Err(e) => provider_failure(e),
        }
    }

    /// Loads one event; `q` must carry a string `id`.
    async fn load(&self, q: QueryParams) -> Response {
        let Some(id) = q.get("id").and_then(Value::as_str) else {
            return Response::error(ErrorCode::InvalidRequest, "load requires a string id in q");
        };
        debug!(id, "handling load");

        match self.api.get_event(id.to_string()).await {
            Ok(event) => Response::entity(self.record(event)),
            Err(e) => provider_failure(e),
        }
    }

    /// Saves one event: the whole `ent` payload, id included, is sent as
    /// the patch body.
    async fn save(&self, ent: EventData) -> Response {
        let Some(id) = ent.get("id").and_then(Value::as_str).map(str::to_string) else {
            return Response::error(
                ErrorCode::InvalidRequest,
                "save requires a string id in ent",
            );
        };
        debug!(id = %id, fields = ent.len(), "handling save");

        match self.api.patch_event(id, ent).await {
            Ok(event) => Response::entity(self.record(event)),
            Err(e) => provider_failure(e),
        }
    }

    fn record(&self, data: EventData) -> EntityRecord {
        EntityRecord::new(self.canon.clone()).with_data(data)
    }
}

/// Wraps any remote failure into the single generic error the host sees.
///
/// The original failure text rides in the message; callers get no finer
/// taxonomy (not-found is indistinguishable from a network error).
fn provider_failure(e: ProviderError) -> Response {
    warn!(error = %e, "remote call failed");
    Response::error(ErrorCode::ProviderError, e.to_string())
}
