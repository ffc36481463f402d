//! Neo4j connection management and the shared graph client.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph};

use graphgate_core::config::Neo4jSettings;
use graphgate_core::AccessMode;

use crate::session::{Neo4jSession, SessionProvider};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Node not found: id {id}")]
    NotFound { id: i64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Write statement issued on a read session: {0}")]
    ReadOnly(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Update failed at step '{step}': {source}")]
    Update {
        step: UpdateStep,
        #[source]
        source: Box<GraphError>,
    },
}

/// The steps of a node update, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    ReadNode,
    RemoveLabels,
    ClearProperties,
    ApplyLabels,
    MergeProperties,
}

impl std::fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReadNode => "read node",
            Self::RemoveLabels => "remove labels",
            Self::ClearProperties => "clear properties",
            Self::ApplyLabels => "apply labels",
            Self::MergeProperties => "merge properties",
        };
        f.write_str(name)
    }
}

impl GraphError {
    /// Attach the failing update step to an error.
    pub fn at(self, step: UpdateStep) -> Self {
        Self::Update {
            step,
            source: Box::new(self),
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// One client is shared by every request; each request draws its own
/// session from it. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}

#[async_trait]
impl SessionProvider for GraphClient {
    type Session = Neo4jSession;

    async fn open(&self, mode: AccessMode) -> Result<Neo4jSession, GraphError> {
        let txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        Ok(Neo4jSession::new(mode, txn))
    }
}
