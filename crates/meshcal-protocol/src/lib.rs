//! Message contract between the meshcal plugin and its host router.
//!
//! The host addresses the plugin with entity-style messages: every message
//! carries a `cmd` (`list`, `load` or `save`) plus the operation payload
//! (`q` for queries, `ent` for a record to persist). Responses carry either
//! entity records or a single coded error.
//!
//! # Envelope Structure
//!
//! Messages exchanged with the router are wrapped in an [`Envelope`]
//! providing versioning and request correlation:
//! - `protocol_version`: always "1" for this version
//! - `request_id`: opaque id for request/response correlation
//! - `payload`: the actual request or response
//!
//! # Example
//!
//! ```rust
//! use meshcal_protocol::{Envelope, Request};
//!
//! let request = Envelope::request("req-123", Request::list());
//! let json = serde_json::to_string(&request).unwrap();
//! let decoded: Envelope<Request> = serde_json::from_str(&json).unwrap();
//! assert_eq!(decoded.request_id, "req-123");
//! ```

mod entity;
mod error;
mod types;

pub use entity::{EntityCanon, EntityRecord, QueryParams};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{Cmd, Envelope, ErrorCode, ErrorResponse, Pattern, Request, Response};

/// Protocol version constant.
pub const PROTOCOL_VERSION: &str = "1";
