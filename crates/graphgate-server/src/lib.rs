//! graphgate-server: HTTP CRUD endpoints over the graph.
//!
//! Each request that touches the graph gets a [`SessionScope`] carrying the
//! access mode derived from its verb; handlers run their graph work inside
//! that scope and map failures through [`ApiError`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::{access_mode_for, AppState, SessionScope};
