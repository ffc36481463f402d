//! HTTP endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use graphgate_core::{Field, NodeDraft, NodeId, NodeRecord, Triple};
use graphgate_graph::{mutations, queries, SessionProvider};

use crate::error::ApiError;
use crate::state::SessionScope;

/// Successful payload wrapper: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub code: u16,
    pub msg: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateParams {
    pub init: Option<String>,
}

impl UpdateParams {
    /// Only the literal `"true"` resets properties.
    pub fn reset_properties(&self) -> bool {
        self.init.as_deref() == Some("true")
    }
}

type Reply<T> = Result<(StatusCode, Json<Data<T>>), ApiError>;

fn reply<T>(status: StatusCode, data: T) -> Reply<T> {
    Ok((status, Json(Data { data })))
}

fn parse_id(raw: &str) -> Result<NodeId, ApiError> {
    Ok(raw.parse::<NodeId>()?)
}

fn parse_draft(body: Result<Json<serde_json::Value>, JsonRejection>) -> Result<NodeDraft, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let object = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidRequest("body must be a JSON object".to_string()))?;
    Ok(NodeDraft::from_body(object)?)
}

/// `GET /welcome`
pub async fn welcome() -> Json<Welcome> {
    Json(Welcome {
        code: 200,
        msg: "good",
    })
}

/// `GET /graph/labels`
pub async fn list_labels<P: SessionProvider>(scope: SessionScope<P>) -> Reply<Vec<Field>> {
    let labels = scope
        .run(|session| Box::pin(queries::list_labels(session)))
        .await?;
    reply(StatusCode::OK, labels)
}

/// `GET /graph/all`
pub async fn full_graph<P: SessionProvider>(scope: SessionScope<P>) -> Reply<Vec<Triple>> {
    let triples = scope
        .run(|session| Box::pin(queries::full_graph(session)))
        .await?;
    reply(StatusCode::OK, triples)
}

/// `GET /graph/{id}`
///
/// Answers 201 on success, matching the status clients of this API expect.
pub async fn node_by_id<P: SessionProvider>(
    scope: SessionScope<P>,
    Path(raw_id): Path<String>,
) -> Reply<Vec<Field>> {
    let id = parse_id(&raw_id)?;
    let nodes = scope
        .run(move |session| Box::pin(queries::node_by_id(session, id)))
        .await?;
    reply(StatusCode::CREATED, nodes)
}

/// `POST /graph`
pub async fn create_node<P: SessionProvider>(
    scope: SessionScope<P>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Reply<Vec<Field>> {
    let draft = parse_draft(body)?;
    let created = scope
        .run(move |session| Box::pin(mutations::create_node(session, draft)))
        .await?;
    reply(StatusCode::CREATED, created)
}

/// `PUT /graph/{id}?init=true`
pub async fn update_node<P: SessionProvider>(
    scope: SessionScope<P>,
    Path(raw_id): Path<String>,
    params: Result<Query<UpdateParams>, QueryRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Reply<NodeRecord> {
    let id = parse_id(&raw_id)?;
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let draft = parse_draft(body)?;
    let reset = params.reset_properties();
    let node = scope
        .run(move |session| Box::pin(mutations::replace_node(session, id, draft, reset)))
        .await?;
    reply(StatusCode::OK, node)
}

/// `DELETE /graph/all`
pub async fn delete_all<P: SessionProvider>(scope: SessionScope<P>) -> Result<StatusCode, ApiError> {
    scope
        .run(|session| Box::pin(mutations::delete_all(session)))
        .await?;
    Ok(StatusCode::OK)
}

/// `DELETE /graph/{id}`
pub async fn delete_node<P: SessionProvider>(
    scope: SessionScope<P>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    scope
        .run(move |session| Box::pin(mutations::delete_node(session, id)))
        .await?;
    Ok(StatusCode::OK)
}
