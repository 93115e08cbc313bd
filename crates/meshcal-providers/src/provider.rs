//! EventProvider trait definition.
//!
//! This module defines the [`EventProvider`] trait, the seam between the
//! plugin's message handlers and the remote calendar backend. The handlers
//! hold one shared provider handle and call through it; tests substitute a
//! stub implementation.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::error::ProviderResult;

/// A schema-less event payload, exactly as the remote API sends or
/// receives it. Only the `id` field is ever interpreted by this system.
pub type EventData = Map<String, Value>;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe, so handlers can hold an
/// `Arc<dyn EventProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote-call capabilities the event handlers proxy to.
///
/// All three operations target the backend's single default calendar.
/// Implementations do not retry, back off, or time out on their own;
/// failures propagate directly to the caller.
pub trait EventProvider: Send + Sync {
    /// Returns the name of this provider (e.g., "google-calendar").
    fn name(&self) -> &str;

    /// Lists events, forwarding the opaque query map to the remote API.
    ///
    /// Returns the response items in the order the remote API produced
    /// them; an empty vector when the response has no items.
    fn list_events(&self, query: EventData) -> BoxFuture<'_, ProviderResult<Vec<EventData>>>;

    /// Fetches one event by identifier.
    fn get_event(&self, event_id: String) -> BoxFuture<'_, ProviderResult<EventData>>;

    /// Patches one event, sending `changes` verbatim as the patch body.
    fn patch_event(
        &self,
        event_id: String,
        changes: EventData,
    ) -> BoxFuture<'_, ProviderResult<EventData>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use serde_json::json;

    /// Minimal in-memory implementation proving the trait is object-safe.
    struct FixedProvider {
        event: EventData,
    }

    impl EventProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn list_events(&self, _query: EventData) -> BoxFuture<'_, ProviderResult<Vec<EventData>>> {
            let event = self.event.clone();
            Box::pin(async move { Ok(vec![event]) })
        }

        fn get_event(&self, event_id: String) -> BoxFuture<'_, ProviderResult<EventData>> {
            let event = self.event.clone();
            Box::pin(async move {
                if event.get("id").and_then(Value::as_str) == Some(event_id.as_str()) {
                    Ok(event)
                } else {
                    Err(ProviderError::server(format!("no such event: {event_id}")))
                }
            })
        }

        fn patch_event(
            &self,
            _event_id: String,
            changes: EventData,
        ) -> BoxFuture<'_, ProviderResult<EventData>> {
            let mut event = self.event.clone();
            event.extend(changes);
            Box::pin(async move { Ok(event) })
        }
    }

    fn fixed() -> Box<dyn EventProvider> {
        let mut event = EventData::new();
        event.insert("id".to_string(), json!("evt-1"));
        event.insert("summary".to_string(), json!("Standup"));
        Box::new(FixedProvider { event })
    }

    #[tokio::test]
    async fn object_safe_dispatch() {
        let provider = fixed();
        assert_eq!(provider.name(), "fixed");

        let events = provider.list_events(EventData::new()).await.unwrap();
        assert_eq!(events.len(), 1);

        let event = provider.get_event("evt-1".to_string()).await.unwrap();
        assert_eq!(event.get("summary"), Some(&json!("Standup")));

        let missing = provider.get_event("nope".to_string()).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn patch_merges_changes() {
        let provider = fixed();
        let mut changes = EventData::new();
        changes.insert("summary".to_string(), json!("Standup!"));

        let patched = provider
            .patch_event("evt-1".to_string(), changes)
            .await
            .unwrap();
        assert_eq!(patched.get("summary"), Some(&json!("Standup!")));
        assert_eq!(patched.get("id"), Some(&json!("evt-1")));
    }
}
