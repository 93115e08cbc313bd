//! Request and response types for the entity message contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PROTOCOL_VERSION;
use crate::entity::{EntityCanon, EntityRecord, QueryParams};

/// The role segment all entity messages are addressed under.
pub const ENTITY_ROLE: &str = "entity";

/// Message envelope wrapping all protocol messages.
///
/// Every message exchanged with the host router is wrapped in this envelope
/// which provides versioning and request correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Unique request ID for correlation.
    pub request_id: String,
    /// The actual payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    /// Creates a request envelope.
    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    /// Creates a response envelope.
    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

/// The operation verb of an entity message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmd {
    /// List events matching a query.
    List,
    /// Load one event by identifier.
    Load,
    /// Save (patch) one event.
    Save,
}

impl Cmd {
    /// The wire name of this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Load => "load",
            Self::Save => "save",
        }
    }
}

impl std::fmt::Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A router address for one entity operation.
///
/// Rendered in the `key:value` pair form the host router matches on, e.g.
/// `role:entity,cmd:list,zone:provider,base:google-calendar,name:event`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    cmd: Cmd,
    canon: EntityCanon,
}

impl Pattern {
    /// Creates the pattern for one command on one entity kind.
    pub fn new(cmd: Cmd, canon: EntityCanon) -> Self {
        Self { cmd, canon }
    }

    /// The command this pattern routes.
    pub fn cmd(&self) -> Cmd {
        self.cmd
    }

    /// The entity kind this pattern routes.
    pub fn canon(&self) -> &EntityCanon {
        &self.canon
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "role:{},cmd:{},zone:{},base:{},name:{}",
            ENTITY_ROLE,
            self.cmd,
            self.canon.zone(),
            self.canon.base(),
            self.canon.name(),
        )
    }
}

/// Requests the host router can dispatch to the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// List events, optionally filtered by an opaque query map.
    List {
        /// Filter parameters forwarded to the remote API unmodified.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        q: Option<QueryParams>,
    },

    /// Load one event; `q` must carry a string `id`.
    Load {
        /// Query map; only `id` is interpreted.
        q: QueryParams,
    },

    /// Save (patch) one event; `ent` must carry a string `id` and is sent
    /// to the remote API as the whole patch body.
    Save {
        /// The record data to persist.
        ent: Map<String, Value>,
    },
}

impl Request {
    /// Creates a List request with no query.
    pub fn list() -> Self {
        Self::List { q: None }
    }

    /// Creates a List request with a query map.
    pub fn list_with(q: QueryParams) -> Self {
        Self::List { q: Some(q) }
    }

    /// Creates a Load request for one event id.
    pub fn load_by_id(id: impl Into<String>) -> Self {
        let mut q = QueryParams::new();
        q.insert("id".to_string(), Value::String(id.into()));
        Self::Load { q }
    }

    /// Creates a Save request from record data.
    pub fn save(ent: Map<String, Value>) -> Self {
        Self::Save { ent }
    }

    /// The command verb of this request.
    pub fn cmd(&self) -> Cmd {
        match self {
            Self::List { .. } => Cmd::List,
            Self::Load { .. } => Cmd::Load,
            Self::Save { .. } => Cmd::Save,
        }
    }
}

/// Responses the plugin returns to the host router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A single entity record.
    Entity {
        /// The record.
        ent: EntityRecord,
    },

    /// An ordered sequence of entity records.
    EntityList {
        /// The records, in remote API order.
        list: Vec<EntityRecord>,
    },

    /// Generic success response (boot acknowledgment).
    Ok,

    /// Error response.
    Error {
        /// Error details.
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    /// Creates an Entity response.
    pub fn entity(ent: EntityRecord) -> Self {
        Self::Entity { ent }
    }

    /// Creates an EntityList response.
    pub fn entity_list(list: Vec<EntityRecord>) -> Self {
        Self::EntityList { list }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    /// Returns true if this is a success response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Error codes for protocol errors.
///
/// Remote failures of any kind surface as [`ErrorCode::ProviderError`];
/// callers are not given a finer taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown or internal error.
    InternalError,

    /// The request was missing a required field.
    InvalidRequest,

    /// A message arrived before the plugin finished initializing.
    NotReady,

    /// The remote calendar API call failed.
    ProviderError,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "An internal error occurred",
            Self::InvalidRequest => "The request was invalid",
            Self::NotReady => "The plugin is not initialized",
            Self::ProviderError => "The calendar provider returned an error",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Creates a provider error carrying the original failure text.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
