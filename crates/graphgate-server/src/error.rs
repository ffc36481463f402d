use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use graphgate_core::GraphgateError;
use graphgate_graph::{GraphError, UpdateStep};

/// Failure of a request, by kind.
///
/// Every kind answers `400 {}`; the detail only reaches the server log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No graph session available: {0}")]
    SessionUnavailable(#[source] GraphError),

    #[error("Graph query failed: {0}")]
    Query(#[source] GraphError),

    #[error("Update failed at step '{step}': {source}")]
    Update {
        step: UpdateStep,
        #[source]
        source: GraphError,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session task aborted: {0}")]
    Aborted(#[source] tokio::task::JoinError),
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Connection(_) => ApiError::SessionUnavailable(err),
            GraphError::Update { step, source } => ApiError::Update {
                step,
                source: *source,
            },
            other => ApiError::Query(other),
        }
    }
}

impl From<GraphgateError> for ApiError {
    fn from(err: GraphgateError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidRequest(_) => tracing::warn!(error = %self, "Rejected request"),
            _ => tracing::error!(error = %self, "Graph request failed"),
        }

        (StatusCode::BAD_REQUEST, Json(json!({}))).into_response()
    }
}
