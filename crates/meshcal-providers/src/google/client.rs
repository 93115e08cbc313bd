//! Google Calendar events API client.
//!
//! A thin typed handle over the three REST calls the plugin proxies. All
//! calls target the account's primary calendar; other calendars are not
//! addressable through this client.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::EventData;

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The only calendar this client addresses.
const PRIMARY_CALENDAR: &str = "primary";

/// List-call defaults: expand recurring events into single occurrences and
/// order results by start time. Caller-supplied query parameters are
/// applied after these, so they win on key collision.
const LIST_DEFAULTS: [(&str, &str); 2] = [("singleEvents", "true"), ("orderBy", "startTime")];

/// Google Calendar events client for the primary calendar.
#[derive(Debug)]
pub struct GoogleEventsClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl GoogleEventsClient {
    /// Creates a client with the given access token.
    ///
    /// No explicit request timeout is configured; the transport default
    /// applies.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            access_token: access_token.into(),
        }
    }

    /// Lists events, merging the fixed defaults with the caller's query.
    ///
    /// Returns the response items in the order the API produced them; an
    /// absent or empty `items` array yields an empty vector.
    pub async fn list_events(&self, query: EventData) -> ProviderResult<Vec<EventData>> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE, PRIMARY_CALENDAR
        );
        let pairs = merge_list_query(&query);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&pairs)
            .send()
            .await
            .map_err(request_error)?;

        let body = read_success_body(response).await?;
        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse list response: {}", e))
        })?;

        debug!(count = list.items.len(), "listed events");
        Ok(list.items)
    }

    /// Fetches one event by identifier.
    pub async fn get_event(&self, event_id: &str) -> ProviderResult<EventData> {
        let response = self
            .http_client
            .get(self.event_url(event_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(request_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse event response: {}", e))
        })
    }

    /// Patches one event, sending the caller's payload verbatim as the
    /// request body (no field-level diffing).
    pub async fn patch_event(
        &self,
        event_id: &str,
        changes: &EventData,
    ) -> ProviderResult<EventData> {
        let response = self
            .http_client
            .patch(self.event_url(event_id))
            .bearer_auth(&self.access_token)
            .json(changes)
            .send()
            .await
            .map_err(request_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse event response: {}", e))
        })
    }

    fn event_url(&self, event_id: &str) -> String {
        format!(
            "{}/calendars/{}/events/{}",
            CALENDAR_API_BASE,
            PRIMARY_CALENDAR,
            urlencoding::encode(event_id)
        )
    }
}

/// Merges the fixed list defaults with caller-supplied query parameters.
///
/// The caller's pairs are inserted after the defaults, so a caller value
/// replaces a default of the same name (e.g. `orderBy`).
fn merge_list_query(query: &EventData) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, String> = LIST_DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (key, value) in query {
        merged.insert(key.clone(), query_value(value));
    }

    merged.into_iter().collect()
}

/// Renders one query value as the string the API expects.
fn query_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Maps a transport-level failure to a provider error.
fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Checks the response status and reads the body of a successful call.
async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProviderError::authentication(
            "access token expired or invalid",
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::server(format!(
            "API error ({}): {}",
            status, body
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<EventData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn merge_applies_defaults() {
        let pairs = merge_list_query(&EventData::new());
        assert_eq!(pair(&pairs, "singleEvents"), Some("true"));
        assert_eq!(pair(&pairs, "orderBy"), Some("startTime"));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn merge_caller_overrides_default() {
        let mut query = EventData::new();
        query.insert("orderBy".to_string(), json!("updated"));

        let pairs = merge_list_query(&query);
        assert_eq!(pair(&pairs, "orderBy"), Some("updated"));
        assert_eq!(pair(&pairs, "singleEvents"), Some("true"));
    }

    #[test]
    fn merge_passes_extra_parameters_through() {
        let mut query = EventData::new();
        query.insert("timeMin".to_string(), json!("2024-03-15T00:00:00Z"));
        query.insert("maxResults".to_string(), json!(250));
        query.insert("showDeleted".to_string(), json!(true));

        let pairs = merge_list_query(&query);
        assert_eq!(pair(&pairs, "timeMin"), Some("2024-03-15T00:00:00Z"));
        assert_eq!(pair(&pairs, "maxResults"), Some("250"));
        assert_eq!(pair(&pairs, "showDeleted"), Some("true"));
    }

    #[test]
    fn parse_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {"id": "first", "summary": "Standup"},
                {"id": "second", "summary": "Review"}
            ]
        }"#;

        let parsed: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 2);
        // Remote order is preserved
        assert_eq!(parsed.items[0].get("id"), Some(&json!("first")));
        assert_eq!(parsed.items[1].get("id"), Some(&json!("second")));
    }

    #[test]
    fn parse_list_response_without_items() {
        let parsed: EventListResponse =
            serde_json::from_str(r#"{"kind": "calendar#events"}"#).unwrap();
        assert!(parsed.items.is_empty());

        let parsed: EventListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn event_url_escapes_identifier() {
        let client = GoogleEventsClient::new("token");
        let url = client.event_url("abc 123/def");
        assert!(url.ends_with("/calendars/primary/events/abc%20123%2Fdef"));
    }
}
