//! graphgate-graph: Neo4j sessions and Cypher translation for the gateway.
//!
//! Requests reach the store only through a [`GraphSession`] opened by a
//! [`SessionProvider`] and scoped with [`scoped`]. Statements are built in
//! [`queries`], write sequences live in [`mutations`], and results are
//! shaped for clients by [`projection`].

pub mod client;
pub mod mutations;
pub mod projection;
pub mod queries;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{GraphClient, GraphConfig, GraphError, UpdateStep};
pub use session::{scoped, GraphSession, Neo4jSession, SessionProvider};
