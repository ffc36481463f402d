//! Write operations for the graph.
//!
//! Every operation here runs on a caller-provided session, so a sequence of
//! statements shares that session's transaction.

use graphgate_core::{Field, NodeDraft, NodeId, NodeRecord};

use crate::client::{GraphError, UpdateStep};
use crate::projection::flat;
use crate::queries::{
    clear_properties_statement, create_node_statement, delete_all_statement,
    delete_node_statement, merge_properties_statement, node_by_id_statement,
    remove_labels_statement, set_labels_statement,
};
use crate::session::GraphSession;

/// Create a node carrying all labels and properties of the draft.
pub async fn create_node<S: GraphSession>(
    session: &mut S,
    draft: NodeDraft,
) -> Result<Vec<Field>, GraphError> {
    let records = session.run(&create_node_statement(&draft)).await?;
    Ok(flat(records))
}

/// Replace a node's labels and merge properties into it.
///
/// Steps run strictly in order on one session:
/// 1. read the node and its current labels,
/// 2. remove every current label,
/// 3. clear all properties when `reset_properties` is set,
/// 4. apply the draft's labels,
/// 5. merge the draft's properties and read the node back.
///
/// The first failing step stops the sequence and is named in the error.
pub async fn replace_node<S: GraphSession>(
    session: &mut S,
    id: NodeId,
    draft: NodeDraft,
    reset_properties: bool,
) -> Result<NodeRecord, GraphError> {
    let current = session
        .run(&node_by_id_statement(id))
        .await
        .map(flat)
        .and_then(|fields| first_node(fields, id))
        .map_err(|e| e.at(UpdateStep::ReadNode))?;

    if !current.labels.is_empty() {
        session
            .run(&remove_labels_statement(id, &current.labels))
            .await
            .map_err(|e| e.at(UpdateStep::RemoveLabels))?;
    }

    if reset_properties {
        session
            .run(&clear_properties_statement(id))
            .await
            .map_err(|e| e.at(UpdateStep::ClearProperties))?;
    }

    session
        .run(&set_labels_statement(id, &draft.labels))
        .await
        .map_err(|e| e.at(UpdateStep::ApplyLabels))?;

    let updated = session
        .run(&merge_properties_statement(id, &draft.properties))
        .await
        .map(flat)
        .and_then(|fields| first_node(fields, id))
        .map_err(|e| e.at(UpdateStep::MergeProperties))?;

    tracing::debug!(
        id = id.0,
        labels = ?updated.labels,
        reset_properties,
        "Node replaced"
    );
    Ok(updated)
}

/// Remove every node and relationship.
pub async fn delete_all<S: GraphSession>(session: &mut S) -> Result<(), GraphError> {
    session.run(&delete_all_statement()).await?;
    Ok(())
}

/// Remove a node and any relationship touching it. Unknown ids are a no-op.
pub async fn delete_node<S: GraphSession>(session: &mut S, id: NodeId) -> Result<(), GraphError> {
    session.run(&delete_node_statement(id)).await?;
    Ok(())
}

fn first_node(fields: Vec<Field>, id: NodeId) -> Result<NodeRecord, GraphError> {
    match fields.into_iter().next() {
        Some(Field::Node(node)) => Ok(node),
        Some(_) => Err(GraphError::Projection(
            "expected a node in the first field".to_string(),
        )),
        None => Err(GraphError::NotFound { id: id.0 }),
    }
}
