//! HTTP surface - axum routers and handlers, one module per resource.
//!
//! Authentication is an external collaborator: an upstream gateway
//! authenticates the caller and injects `x-user-id`. The [`CurrentUser`]
//! extractor trusts that header and rejects requests without it. Handlers
//! stay thin — they parse, call `core`, and serialize; every error path goes
//! through the crate [`Error`](crate::errors::Error) and its JSON mapping.

/// Cart and checkout endpoints
pub mod cart;
/// Category tree endpoints
pub mod categories;
/// Customer profile endpoints
pub mod customers;
/// Order endpoints
pub mod orders;
/// Product catalog endpoints
pub mod products;

use crate::{errors::Error, notify::Notifier};
use axum::{Router, extract::FromRequestParts, http::request::Parts};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: DatabaseConnection,
    /// Injected notification client, owned by the process entry point
    pub notifier: Arc<dyn Notifier>,
}

/// The authenticated caller, resolved from the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or(Error::Unauthorized)
    }
}

/// Assembles the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(categories::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(customers::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
