//! Order endpoints, all scoped to the requesting user.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{
    api::{AppState, CurrentUser},
    core::order::{self, OrderChanges},
    entities::{OrderItemModel, OrderModel},
    errors::{Error, Result},
};

/// Mounts this resource under its `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(detail).patch(update))
}

/// Order with its immutable lines.
#[derive(Debug, Serialize)]
struct OrderDetail {
    #[serde(flatten)]
    order: OrderModel,
    items: Vec<OrderItemModel>,
}

/// GET /api/orders
async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<OrderModel>>> {
    Ok(Json(order::orders_for_user(&state.db, user_id).await?))
}

/// GET /api/orders/{id} — a miss and someone else's order are both 404.
async fn detail(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>> {
    let found = order::get_order_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Order {id} not found")))?;
    let items = order::order_items(&state.db, found.id).await?;
    Ok(Json(OrderDetail {
        order: found,
        items,
    }))
}

/// PATCH /api/orders/{id} — status, shipping address, and phone only.
async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(changes): Json<OrderChanges>,
) -> Result<Json<OrderModel>> {
    Ok(Json(
        order::update_order(&state.db, user_id, id, changes).await?,
    ))
}
