//! Generic entity records.
//!
//! The host framework addresses data as entities identified by a
//! zone/base/name canon. This plugin never interprets event payloads
//! beyond the `id` field, so a record is the canon plus a schema-less
//! key/value map that is passed through verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, de};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// An opaque key/value filter map, forwarded to the remote API unmodified.
pub type QueryParams = Map<String, Value>;

/// The zone/base/name triple identifying an entity kind.
///
/// Serialized as a single `zone/base/name` string, which is how the canon
/// travels on the wire inside a record's `entity$` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityCanon {
    zone: String,
    base: String,
    name: String,
}

impl EntityCanon {
    /// Creates a canon from its three segments.
    pub fn new(
        zone: impl Into<String>,
        base: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            base: base.into(),
            name: name.into(),
        }
    }

    /// The zone segment (e.g. "provider").
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// The base segment (e.g. "google-calendar").
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The name segment (e.g. "event").
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityCanon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zone, self.base, self.name)
    }
}

impl FromStr for EntityCanon {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(zone), Some(base), Some(name), None)
                if !zone.is_empty() && !base.is_empty() && !name.is_empty() =>
            {
                Ok(Self::new(zone, base, name))
            }
            _ => Err(ProtocolError::MalformedCanon(s.to_string())),
        }
    }
}

impl Serialize for EntityCanon {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityCanon {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One addressable data record, as understood by the host framework.
///
/// The canon rides in the `entity$` field; everything else is the record's
/// data, flattened at the top level exactly as the remote API produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "entity$")]
    canon: EntityCanon,
    #[serde(flatten)]
    data: Map<String, Value>,
}

impl EntityRecord {
    /// Creates an empty record of the given kind.
    pub fn new(canon: EntityCanon) -> Self {
        Self {
            canon,
            data: Map::new(),
        }
    }

    /// Builder: replaces the record data with the given map.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// The entity kind of this record.
    pub fn canon(&self) -> &EntityCanon {
        &self.canon
    }

    /// The record data, verbatim from (or for) the remote API.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consumes the record, returning its data map.
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// The record identifier, when present as a string field.
    pub fn id(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }

    /// Looks up a single data field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}
