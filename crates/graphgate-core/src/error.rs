use thiserror::Error;

/// Top-level error type for request input and configuration.
#[derive(Error, Debug)]
pub enum GraphgateError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid node id: {0:?}")]
    InvalidNodeId(String),

    #[error("Request body must carry a string `labels` field")]
    MissingLabels,

    #[error("Empty label in {0:?}")]
    EmptyLabel(String),

    #[error("Label not allowed: {0:?}")]
    InvalidLabel(String),

    #[error("Unsupported value for property {key:?}: only scalars are accepted")]
    UnsupportedValue { key: String },
}
