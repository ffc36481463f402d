//! Per-request graph sessions.
//!
//! A session is opened for exactly one request, tagged with the access mode
//! derived from the request, and released exactly once. [`scoped`] is the
//! only way the HTTP layer acquires one, so release happens on every exit
//! path of the work it runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use neo4rs::{BoltMap, BoltNull, BoltString, BoltType};
use uuid::Uuid;

use graphgate_core::{AccessMode, Field, NodeRecord, Properties, PropertyValue, Record};

use crate::client::GraphError;
use crate::queries::{Column, ColumnKind, Param, Statement};

/// A scoped handle for issuing statements, bound to one access mode.
#[async_trait]
pub trait GraphSession: Send {
    fn access_mode(&self) -> AccessMode;

    /// Execute a statement and decode its rows. Callers go through [`run`](Self::run).
    async fn execute(&mut self, statement: &Statement) -> Result<Vec<Record>, GraphError>;

    /// Finish the session. `success` tells whether the work it carried succeeded.
    async fn release(self, success: bool) -> Result<(), GraphError>
    where
        Self: Sized;

    /// Issue a statement, refusing writes on a read session.
    async fn run(&mut self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        if statement.writes() && self.access_mode().is_read() {
            return Err(GraphError::ReadOnly(statement.text().to_string()));
        }
        self.execute(statement).await
    }
}

/// Hands out sessions against the shared connection handle.
#[async_trait]
pub trait SessionProvider: Clone + Send + Sync + 'static {
    type Session: GraphSession;

    async fn open(&self, mode: AccessMode) -> Result<Self::Session, GraphError>;
}

/// Open a session, run `work` on it, and release it.
///
/// The work outcome wins over a release failure; a release failure after
/// successful work is returned as the error.
pub async fn scoped<P, T, F>(provider: &P, mode: AccessMode, work: F) -> Result<T, GraphError>
where
    P: SessionProvider,
    T: Send,
    F: for<'s> FnOnce(&'s mut P::Session) -> BoxFuture<'s, Result<T, GraphError>> + Send,
{
    let mut session = provider.open(mode).await?;
    let outcome = work(&mut session).await;
    let released = session.release(outcome.is_ok()).await;

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_err)) => {
            tracing::warn!(error = %release_err, "Session release failed after work failure");
            Err(e)
        }
    }
}

// ── Neo4j ────────────────────────────────────────────────────────

/// A session backed by one explicit Neo4j transaction.
///
/// Write sessions commit on successful release and roll back otherwise.
/// Read sessions always roll back.
pub struct Neo4jSession {
    id: Uuid,
    mode: AccessMode,
    txn: neo4rs::Txn,
}

impl Neo4jSession {
    pub(crate) fn new(mode: AccessMode, txn: neo4rs::Txn) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, mode = %mode, "Session opened");
        Self { id, mode, txn }
    }
}

#[async_trait]
impl GraphSession for Neo4jSession {
    fn access_mode(&self) -> AccessMode {
        self.mode
    }

    async fn execute(&mut self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        tracing::debug!(session = %self.id, cypher = statement.text(), "Executing statement");

        let mut stream = self.txn.execute(to_query(statement)).await?;
        let mut records = Vec::new();
        while let Some(row) = stream.next(self.txn.handle()).await? {
            records.push(decode_row(&row, statement.columns())?);
        }
        Ok(records)
    }

    async fn release(self, success: bool) -> Result<(), GraphError> {
        let commit = success && self.mode == AccessMode::Write;
        if commit {
            self.txn.commit().await?;
        } else {
            self.txn.rollback().await?;
        }
        tracing::debug!(session = %self.id, mode = %self.mode, commit, "Session released");
        Ok(())
    }
}

/// Build a neo4rs query from a statement, binding every parameter.
fn to_query(statement: &Statement) -> neo4rs::Query {
    let mut q = neo4rs::query(statement.text());
    for (name, param) in statement.params() {
        q = match param {
            Param::Integer(i) => q.param(name, *i),
            Param::Map(props) => q.param(name, properties_to_bolt(props)),
        };
    }
    q
}

fn properties_to_bolt(props: &Properties) -> BoltType {
    let mut map = BoltMap::with_capacity(props.len());
    for (key, value) in props {
        map.put(BoltString::from(key.as_str()), property_to_bolt(value));
    }
    BoltType::Map(map)
}

fn property_to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::String(s) => BoltType::from(s.clone()),
        PropertyValue::Integer(i) => BoltType::from(*i),
        PropertyValue::Float(f) => BoltType::from(*f),
        PropertyValue::Boolean(b) => BoltType::from(*b),
        PropertyValue::Null => BoltType::Null(BoltNull),
    }
}

/// Decode a row column by column, in the order the statement declared them.
fn decode_row(row: &neo4rs::Row, columns: &[Column]) -> Result<Record, GraphError> {
    let mut record = Record::new();
    for column in columns {
        let field = match column.kind {
            ColumnKind::Node => {
                let node: neo4rs::Node = row.get(column.name).map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Field::Node(neo4j_node_to_record(&node))
            }
            ColumnKind::Labels => {
                let labels: Vec<String> = row.get(column.name).map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize labels: {e}"))
                })?;
                Field::List(labels)
            }
            ColumnKind::Text => {
                let text: String = row.get(column.name).map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize string: {e}"))
                })?;
                Field::Text(text)
            }
        };
        record.push(column.name, field);
    }
    Ok(record)
}

/// Convert a neo4rs::Node to a NodeRecord, keeping every property.
fn neo4j_node_to_record(node: &neo4rs::Node) -> NodeRecord {
    let mut properties = BTreeMap::new();
    for key in node.keys() {
        match node.get::<serde_json::Value>(key) {
            Ok(value) => {
                properties.insert(key.to_string(), value);
            }
            Err(e) => tracing::warn!(property = key, error = %e, "Skipping undecodable property"),
        }
    }

    NodeRecord {
        identity: node.id(),
        labels: node.labels().into_iter().map(str::to_string).collect(),
        properties,
    }
}
