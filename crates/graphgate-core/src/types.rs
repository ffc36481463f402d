//! Core domain types for the graphgate gateway.
//!
//! These types describe what flows between the HTTP layer and the graph
//! layer: node identities, label sets, property maps, and the projected
//! values that end up in response bodies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphgateError;

// ── Identity ──────────────────────────────────────────────────────

/// Store-assigned numeric identity of a node. Never changes once assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId(pub i64);

impl FromStr for NodeId {
    type Err = GraphgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(NodeId)
            .map_err(|_| GraphgateError::InvalidNodeId(s.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Access Mode ───────────────────────────────────────────────────

/// Which store role services a session's statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("READ"),
            Self::Write => f.write_str("WRITE"),
        }
    }
}

// ── Labels ────────────────────────────────────────────────────────

/// An ordered, de-duplicated set of client-supplied label names.
///
/// Every label has passed [`is_allowed_label`], so rendering it into query
/// text cannot break out of the identifier position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    /// Parse a comma-separated label list such as `"Person, Employee"`.
    pub fn parse(raw: &str) -> Result<Self, GraphgateError> {
        let mut labels: Vec<String> = Vec::new();
        for segment in raw.split(',') {
            let label = segment.trim();
            if label.is_empty() {
                return Err(GraphgateError::EmptyLabel(raw.to_string()));
            }
            if !is_allowed_label(label) {
                return Err(GraphgateError::InvalidLabel(label.to_string()));
            }
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        Ok(Self(labels))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Render as Cypher multi-label syntax without the leading colon:
    /// `` `A`:`B` ``.
    pub fn to_cypher(&self) -> String {
        labels_to_cypher(&self.0)
    }
}

/// Allow-list for label names composed into query text.
pub fn is_allowed_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Quote a label as a Cypher identifier, doubling any embedded backtick.
pub fn quote_label(label: &str) -> String {
    format!("`{}`", label.replace('`', "``"))
}

/// Join labels with Cypher's multi-label separator.
pub fn labels_to_cypher<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|l| quote_label(l.as_ref()))
        .collect::<Vec<_>>()
        .join(":")
}

// ── Properties ────────────────────────────────────────────────────

/// A scalar property value accepted from a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    /// Convert a JSON value, rejecting arrays and objects.
    pub fn from_json(key: &str, value: &serde_json::Value) -> Result<Self, GraphgateError> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Null => Ok(Self::Null),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(GraphgateError::UnsupportedValue {
                        key: key.to_string(),
                    })
                }
            }
            Value::Array(_) | Value::Object(_) => Err(GraphgateError::UnsupportedValue {
                key: key.to_string(),
            }),
        }
    }
}

/// Property map supplied by a client, ordered by key.
pub type Properties = BTreeMap<String, PropertyValue>;

/// The body of a create or update request: labels plus properties.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub labels: LabelSet,
    pub properties: Properties,
}

impl NodeDraft {
    /// Field of the body that carries the comma-separated label list.
    pub const LABELS_FIELD: &'static str = "labels";

    /// Split a JSON object body into labels and the remaining properties.
    pub fn from_body(
        body: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, GraphgateError> {
        let labels = match body.get(Self::LABELS_FIELD) {
            Some(serde_json::Value::String(raw)) => LabelSet::parse(raw)?,
            Some(_) | None => return Err(GraphgateError::MissingLabels),
        };

        let mut properties = Properties::new();
        for (key, value) in body {
            if key == Self::LABELS_FIELD {
                continue;
            }
            properties.insert(key.clone(), PropertyValue::from_json(key, value)?);
        }

        Ok(Self { labels, properties })
    }
}

// ── Query Results ─────────────────────────────────────────────────

/// A node as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub identity: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// One column value of a result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Node(NodeRecord),
    List(Vec<String>),
    Text(String),
}

impl Field {
    pub fn as_node(&self) -> Option<&NodeRecord> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

/// A result row: named fields in the order the query declared them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, field: Field) -> Self {
        self.push(name, field);
        self
    }

    pub fn push(&mut self, name: &str, field: Field) {
        self.fields.push((name.to_string(), field));
    }

    pub fn into_fields(self) -> impl Iterator<Item = Field> {
        self.fields.into_iter().map(|(_, f)| f)
    }
}

/// A node, the type of one of its incoming relationships, and the neighbor
/// at the other end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triple {
    pub origin: Field,
    #[serde(rename = "relationShip")]
    pub relationship: Field,
    pub join: Field,
}
