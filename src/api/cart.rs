//! Cart and checkout endpoints.
//!
//! All routes act on the requesting user's own cart, created on first touch.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppState, CurrentUser},
    core::{cart, checkout, product},
    entities::{CartItemModel, OrderItemModel, OrderModel},
    errors::{Error, Result},
};

/// Mounts this resource under its `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_item).put(update_item))
        .route("/items/{product_id}", delete(remove_item))
        .route("/clear", post(clear))
        .route("/checkout", post(do_checkout))
}

/// POST body for adding a product.
#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: i64,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

/// PUT body for replacing a line's quantity.
#[derive(Debug, Deserialize)]
struct UpdateItemRequest {
    product_id: i64,
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// One rendered cart line.
#[derive(Debug, Serialize)]
struct CartLine {
    product_id: i64,
    name: String,
    price: Decimal,
    quantity: i32,
    subtotal: Decimal,
}

/// The whole cart with derived totals.
#[derive(Debug, Serialize)]
struct CartView {
    id: i64,
    items: Vec<CartLine>,
    total_items: i64,
    total_price: Decimal,
}

/// A placed order with its lines.
#[derive(Debug, Serialize)]
struct CheckoutResponse {
    #[serde(flatten)]
    order: OrderModel,
    items: Vec<OrderItemModel>,
}

/// GET /api/cart
async fn view_cart(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CartView>> {
    let user_cart = cart::get_or_create_cart(&state.db, user_id).await?;
    let lines = cart::items_with_products(&state.db, user_cart.id).await?;

    let items: Vec<CartLine> = lines
        .iter()
        .map(|(line, prod)| CartLine {
            product_id: prod.id,
            name: prod.name.clone(),
            price: prod.price,
            quantity: line.quantity,
            subtotal: prod.price * Decimal::from(line.quantity),
        })
        .collect();
    let total_items = items.iter().map(|l| i64::from(l.quantity)).sum();
    let total_price = items.iter().map(|l| l.subtotal).sum();

    Ok(Json(CartView {
        id: user_cart.id,
        items,
        total_items,
        total_price,
    }))
}

/// POST /api/cart/items
async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartItemModel>> {
    let user_cart = cart::get_or_create_cart(&state.db, user_id).await?;
    let line = cart::add_item(&state.db, user_cart.id, payload.product_id, payload.quantity).await?;
    Ok(Json(line))
}

/// PUT /api/cart/items — a non-positive quantity removes the line instead,
/// mirroring the classic "set to zero to delete" update endpoint.
async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<axum::response::Response> {
    use axum::response::IntoResponse;

    let user_cart = cart::get_or_create_cart(&state.db, user_id).await?;
    if payload.quantity <= 0 {
        cart::remove_item(&state.db, user_cart.id, payload.product_id).await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let line =
        cart::set_item_quantity(&state.db, user_cart.id, payload.product_id, payload.quantity)
            .await?;
    Ok(Json(line).into_response())
}

/// DELETE /api/cart/items/{product_id}
async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<StatusCode> {
    // An unknown product is a 404; removing a product that simply isn't in
    // the cart succeeds quietly.
    product::get_product_by_id(&state.db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product not found"))?;

    let user_cart = cart::get_or_create_cart(&state.db, user_id).await?;
    cart::remove_item(&state.db, user_cart.id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cart/clear
async fn clear(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode> {
    let user_cart = cart::get_or_create_cart(&state.db, user_id).await?;
    cart::clear(&state.db, user_cart.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cart/checkout
async fn do_checkout(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let (order, items) = checkout::place_order(&state.db, state.notifier.as_ref(), user_id).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order, items })))
}
