//! Configuration management for the gateway.
//!
//! Configuration is loaded once at startup from (in priority order):
//! 1. Environment variables (`GRAPHGATE__` prefix, `__` separator)
//! 2. Config file (`graphgate.toml`, optional)
//! 3. Defaults

use serde::Deserialize;

use crate::error::GraphgateError;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Where and how to reach the graph store.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_neo4j_host")]
    pub host: String,

    #[serde(default = "default_neo4j_port")]
    pub port: u16,

    #[serde(default = "default_neo4j_user")]
    pub user: String,

    #[serde(default = "default_neo4j_password")]
    pub password: String,

    /// Logical database every session is opened against.
    #[serde(default = "default_neo4j_database")]
    pub database: String,

    /// Upper bound of the shared connection pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Neo4jSettings {
    /// Bolt URI built from host and port.
    pub fn uri(&self) -> String {
        format!("bolt://{}:{}", self.host, self.port)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_neo4j_host() -> String {
    "localhost".to_string()
}

fn default_neo4j_port() -> u16 {
    7687
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "neo4j".to_string()
}

fn default_neo4j_database() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> usize {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            host: default_neo4j_host(),
            port: default_neo4j_port(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            database: default_neo4j_database(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl GatewayConfig {
    /// Load from `<file_prefix>.toml` (if present) and `GRAPHGATE__*` variables.
    pub fn load(file_prefix: &str) -> Result<Self, GraphgateError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("GRAPHGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: GatewayConfig = cfg.try_deserialize()?;
        tracing::debug!(
            neo4j = %loaded.neo4j.uri(),
            database = %loaded.neo4j.database,
            listen = %loaded.server.bind_addr(),
            "Configuration loaded"
        );
        Ok(loaded)
    }
}
