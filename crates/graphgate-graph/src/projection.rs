//! Projection of result records into response shapes.

use graphgate_core::{Field, Record, Triple};

use crate::client::GraphError;

/// Every field of every record, in declared order, as one sequence.
pub fn flat(records: Vec<Record>) -> Vec<Field> {
    records.into_iter().flat_map(Record::into_fields).collect()
}

/// One triple per record; each record must hold exactly three fields.
pub fn triples(records: Vec<Record>) -> Result<Vec<Triple>, GraphError> {
    records
        .into_iter()
        .map(|record| {
            let fields: Vec<Field> = record.into_fields().collect();
            let width = fields.len();
            match <[Field; 3]>::try_from(fields) {
                Ok([origin, relationship, join]) => Ok(Triple {
                    origin,
                    relationship,
                    join,
                }),
                Err(_) => Err(GraphError::Projection(format!(
                    "expected 3 fields per record, got {width}"
                ))),
            }
        })
        .collect()
}
