use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use graphgate_graph::SessionProvider;

use crate::handlers;
use crate::state::AppState;

pub fn create_router<P: SessionProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route("/welcome", get(handlers::welcome))
        .route("/graph", post(handlers::create_node::<P>))
        .route("/graph/labels", get(handlers::list_labels::<P>))
        .route(
            "/graph/all",
            get(handlers::full_graph::<P>).delete(handlers::delete_all::<P>),
        )
        .route(
            "/graph/{id}",
            get(handlers::node_by_id::<P>)
                .put(handlers::update_node::<P>)
                .delete(handlers::delete_node::<P>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
