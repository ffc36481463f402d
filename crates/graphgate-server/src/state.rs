use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use futures::future::BoxFuture;

use graphgate_core::AccessMode;
use graphgate_graph::{scoped, GraphError, SessionProvider};

use crate::error::ApiError;

/// Shared application state: the session provider over the pooled connection.
#[derive(Clone)]
pub struct AppState<P: SessionProvider> {
    pub provider: P,
}

impl<P: SessionProvider> AppState<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Fetch-type verbs read; every other verb writes.
pub fn access_mode_for(method: &Method) -> AccessMode {
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        AccessMode::Read
    } else {
        AccessMode::Write
    }
}

/// Per-request right to one graph session, in the mode the verb calls for.
///
/// Extracting the scope does not touch the store; the session is opened by
/// [`SessionScope::run`] and released before it returns.
pub struct SessionScope<P: SessionProvider> {
    provider: P,
    mode: AccessMode,
}

impl<P: SessionProvider> SessionScope<P> {
    /// Run `work` on a fresh session in its own task.
    ///
    /// The task outlives the request future, so a client that disconnects
    /// mid-statement still gets its session released exactly once.
    pub async fn run<T, F>(self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'s> FnOnce(&'s mut P::Session) -> BoxFuture<'s, Result<T, GraphError>>
            + Send
            + 'static,
    {
        let Self { provider, mode } = self;
        let task = tokio::spawn(async move { scoped(&provider, mode, work).await });

        match task.await {
            Ok(outcome) => outcome.map_err(ApiError::from),
            Err(e) => Err(ApiError::Aborted(e)),
        }
    }
}

impl<P: SessionProvider> FromRequestParts<AppState<P>> for SessionScope<P> {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<P>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            provider: state.provider.clone(),
            mode: access_mode_for(&parts.method),
        })
    }
}
