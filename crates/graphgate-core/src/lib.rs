//! graphgate-core: Shared types, configuration, and error handling for the gateway.
//!
//! This crate provides the foundational types used by the graph and HTTP layers:
//! - Node identities, label sets, and property maps parsed from requests
//! - Projected result values (records, fields, triples)
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::GatewayConfig;
pub use error::GraphgateError;
pub use types::{
    AccessMode, Field, LabelSet, NodeDraft, NodeId, NodeRecord, Properties, PropertyValue, Record,
    Triple,
};
