//! Cypher statement builder and read operations.
//!
//! Client values never enter query text: ids and property maps are bound as
//! parameters, and labels are either allow-listed ([`LabelSet`]) or quoted.

use graphgate_core::types::labels_to_cypher;
use graphgate_core::{Field, LabelSet, NodeDraft, NodeId, Properties, Triple};

use crate::client::GraphError;
use crate::projection::{flat, triples};
use crate::session::GraphSession;

/// What a result column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Node,
    Labels,
    Text,
}

/// A declared result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Integer(i64),
    Map(Properties),
}

/// A parameterized Cypher statement together with the columns it returns.
///
/// How the records are projected is decided by the operation that issues it.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    params: Vec<(String, Param)>,
    columns: Vec<Column>,
    writes: bool,
}

impl Statement {
    fn read(text: impl Into<String>, columns: &[Column]) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            columns: columns.to_vec(),
            writes: false,
        }
    }

    fn write(text: impl Into<String>, columns: &[Column]) -> Self {
        Self {
            writes: true,
            ..Self::read(text, columns)
        }
    }

    fn param(mut self, name: &str, value: Param) -> Self {
        self.params.push((name.to_string(), value));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[(String, Param)] {
        &self.params
    }

    pub fn param_value(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn writes(&self) -> bool {
        self.writes
    }
}

const NODE: Column = Column::new("n", ColumnKind::Node);
const LABEL: Column = Column::new("Label", ColumnKind::Labels);
const RELATIONSHIP: Column = Column::new("relationship", ColumnKind::Text);
const NEIGHBOR: Column = Column::new("m", ColumnKind::Node);

// ── Reads ────────────────────────────────────────────────────────

/// Every distinct label combination present in the graph.
pub fn list_labels_statement() -> Statement {
    Statement::read("MATCH (n) RETURN DISTINCT labels(n) AS Label", &[LABEL])
}

/// Every node that has an incoming relationship, with the relationship type
/// and the node at its tail.
pub fn full_graph_statement() -> Statement {
    Statement::read(
        "MATCH (n)<-[r]-(m) RETURN n, type(r) AS relationship, m",
        &[NODE, RELATIONSHIP, NEIGHBOR],
    )
}

pub fn node_by_id_statement(id: NodeId) -> Statement {
    Statement::read("MATCH (n) WHERE id(n) = $id RETURN n", &[NODE])
        .param("id", Param::Integer(id.0))
}

// ── Writes ───────────────────────────────────────────────────────

pub fn create_node_statement(draft: &NodeDraft) -> Statement {
    Statement::write(
        format!(
            "CREATE (n:{}) SET n = $props RETURN n",
            draft.labels.to_cypher()
        ),
        &[NODE],
    )
    .param("props", Param::Map(draft.properties.clone()))
}

/// Remove labels currently held by a node. The labels come from the store,
/// so they are quoted rather than allow-listed.
pub fn remove_labels_statement(id: NodeId, labels: &[String]) -> Statement {
    Statement::write(
        format!(
            "MATCH (n) WHERE id(n) = $id REMOVE n:{}",
            labels_to_cypher(labels)
        ),
        &[],
    )
    .param("id", Param::Integer(id.0))
}

pub fn clear_properties_statement(id: NodeId) -> Statement {
    Statement::write("MATCH (n) WHERE id(n) = $id SET n = {}", &[])
        .param("id", Param::Integer(id.0))
}

pub fn set_labels_statement(id: NodeId, labels: &LabelSet) -> Statement {
    Statement::write(
        format!("MATCH (n) WHERE id(n) = $id SET n:{}", labels.to_cypher()),
        &[],
    )
    .param("id", Param::Integer(id.0))
}

/// Additive upsert: listed properties are overwritten, others kept.
pub fn merge_properties_statement(id: NodeId, properties: &Properties) -> Statement {
    Statement::write(
        "MATCH (n) WHERE id(n) = $id SET n += $props RETURN n",
        &[NODE],
    )
    .param("id", Param::Integer(id.0))
    .param("props", Param::Map(properties.clone()))
}

pub fn delete_all_statement() -> Statement {
    Statement::write("MATCH (n) DETACH DELETE n", &[])
}

/// Delete a node together with every relationship touching it.
pub fn delete_node_statement(id: NodeId) -> Statement {
    Statement::write("MATCH (n) WHERE id(n) = $id DETACH DELETE n", &[])
        .param("id", Param::Integer(id.0))
}

// ── Read Operations ──────────────────────────────────────────────

pub async fn list_labels<S: GraphSession>(session: &mut S) -> Result<Vec<Field>, GraphError> {
    let records = session.run(&list_labels_statement()).await?;
    Ok(flat(records))
}

pub async fn full_graph<S: GraphSession>(session: &mut S) -> Result<Vec<Triple>, GraphError> {
    let records = session.run(&full_graph_statement()).await?;
    triples(records)
}

/// Fetch one node. An unknown id yields an empty list, not an error.
pub async fn node_by_id<S: GraphSession>(
    session: &mut S,
    id: NodeId,
) -> Result<Vec<Field>, GraphError> {
    let records = session.run(&node_by_id_statement(id)).await?;
    Ok(flat(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgate_core::PropertyValue;

    #[test]
    fn test_read_statements_do_not_write() {
        assert!(!list_labels_statement().writes());
        assert!(!full_graph_statement().writes());
        assert!(!node_by_id_statement(NodeId(1)).writes());
        assert!(delete_all_statement().writes());
        assert!(delete_node_statement(NodeId(1)).writes());
    }

    #[test]
    fn test_node_by_id_binds_id() {
        let st = node_by_id_statement(NodeId(42));
        assert_eq!(st.text(), "MATCH (n) WHERE id(n) = $id RETURN n");
        assert_eq!(st.param_value("id"), Some(&Param::Integer(42)));
    }

    #[test]
    fn test_full_graph_declares_three_columns() {
        let st = full_graph_statement();
        let names: Vec<_> = st.columns().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["n", "relationship", "m"]);
    }

    #[test]
    fn test_create_keeps_values_out_of_text() {
        let body = serde_json::json!({
            "labels": "A, B",
            "name": "x\"}) DETACH DELETE (m",
            "age": 3
        });
        let draft = NodeDraft::from_body(body.as_object().unwrap()).unwrap();
        let st = create_node_statement(&draft);

        assert_eq!(st.text(), "CREATE (n:`A`:`B`) SET n = $props RETURN n");
        match st.param_value("props") {
            Some(Param::Map(props)) => {
                assert_eq!(props["age"], PropertyValue::Integer(3));
                assert_eq!(
                    props["name"],
                    PropertyValue::String("x\"}) DETACH DELETE (m".into())
                );
            }
            other => panic!("expected props map, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_labels_quotes_store_labels() {
        let st = remove_labels_statement(NodeId(5), &["Old".to_string(), "we`ird".to_string()]);
        assert_eq!(
            st.text(),
            "MATCH (n) WHERE id(n) = $id REMOVE n:`Old`:`we``ird`"
        );
    }

    #[test]
    fn test_merge_is_additive() {
        let st = merge_properties_statement(NodeId(5), &Properties::new());
        assert!(st.text().contains("SET n += $props"));
        assert_eq!(st.columns(), &[NODE]);
    }
}
