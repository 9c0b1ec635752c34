//! Order queries and post-checkout updates.
//!
//! Orders are created only by `core::checkout`. Reads are always scoped to
//! the requesting user, and a miss — including someone else's order — is a
//! plain not-found so the API never leaks which order numbers exist. Only
//! status, shipping address, and phone number may change after creation;
//! the line items and total are an immutable snapshot.

use crate::{
    entities::{Order, OrderItem, OrderStatus, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// PATCH payload for an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderChanges {
    /// New fulfillment status
    pub status: Option<OrderStatus>,
    /// New delivery address
    pub shipping_address: Option<String>,
    /// New contact phone
    pub phone_number: Option<String>,
}

/// Retrieves the user's orders, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn orders_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one order, scoped to the user; `None` for a miss or an order
/// owned by someone else.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_order_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the line items of an order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn order_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies PATCH semantics to the order's mutable fields.
///
/// # Errors
/// Returns a not-found error when the order does not exist for this user.
pub async fn update_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
    changes: OrderChanges,
) -> Result<order::Model> {
    let existing = get_order_for_user(db, user_id, order_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Order {order_id} not found")))?;

    let mut model: order::ActiveModel = existing.into();
    if let Some(status) = changes.status {
        model.status = Set(status);
    }
    if let Some(address) = changes.shipping_address {
        model.shipping_address = Set(address);
    }
    if let Some(phone) = changes.phone_number {
        model.phone_number = Set(phone);
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}
