//! Checkout: the atomic cart → order conversion.
//!
//! The whole conversion — reading the cart, writing the order and its lines,
//! clearing the cart — runs inside one database transaction. Either the
//! order exists and the cart is empty, or nothing happened. Notifications go
//! out only after the commit and can never unwind it.

use crate::{
    core::cart,
    entities::{OrderStatus, customer, order, order_item},
    errors::{Error, Result},
    notify::Notifier,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{error, info};

/// Builds an order reference from the creation timestamp plus a random
/// 4-digit suffix. The suffix (backed by the unique index on the column)
/// keeps two orders placed in the same second from colliding.
fn generate_order_number(created_at: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!("ORD-{}-{suffix:04}", created_at.format("%Y%m%d%H%M%S"))
}

/// Converts the user's cart into an order, atomically.
///
/// The cart must hold at least one item. Each order line copies the
/// product's price as of this moment; later catalog edits never touch the
/// snapshot. The cart is cleared inside the same transaction. After the
/// commit the injected notifier is invoked once; its failures are logged and
/// swallowed.
///
/// # Errors
/// Returns [`Error::EmptyCart`] for a cart with no items, or a database
/// error if any write fails (in which case nothing is persisted).
pub async fn place_order(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    user_id: i64,
) -> Result<(order::Model, Vec<order_item::Model>)> {
    let user_cart = cart::get_or_create_cart(db, user_id).await?;

    let txn = db.begin().await?;

    // Re-read inside the transaction: a concurrent checkout that already
    // converted this cart leaves us an empty read and a clean failure.
    let lines = cart::items_with_products(&txn, user_cart.id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    let total_price: Decimal = lines
        .iter()
        .map(|(line, prod)| prod.price * Decimal::from(line.quantity))
        .sum();

    let phone_number = customer_phone(&txn, user_id).await?;

    let now = Utc::now();
    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        order_number: Set(generate_order_number(now)),
        status: Set(OrderStatus::Pending),
        total_price: Set(total_price),
        shipping_address: Set(String::new()),
        phone_number: Set(phone_number),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let placed = new_order.insert(&txn).await?;

    let mut items = Vec::with_capacity(lines.len());
    for (line, prod) in &lines {
        let item = order_item::ActiveModel {
            order_id: Set(placed.id),
            product_id: Set(prod.id),
            quantity: Set(line.quantity),
            price: Set(prod.price),
            subtotal: Set(prod.price * Decimal::from(line.quantity)),
            ..Default::default()
        };
        items.push(item.insert(&txn).await?);
    }

    cart::clear(&txn, user_cart.id).await?;

    txn.commit().await?;

    // Best effort from here on: the order is placed whether or not anyone
    // hears about it.
    match notifier.order_placed(&placed, &items).await {
        Ok(()) => info!(order_number = %placed.order_number, "sent order notifications"),
        Err(e) => error!(
            order_number = %placed.order_number,
            error = %e,
            "failed to send order notifications"
        ),
    }

    Ok((placed, items))
}

/// The customer's phone number when a profile exists and has one, else "".
async fn customer_phone<C>(conn: &C, user_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let profile = customer::Entity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(profile
        .and_then(|c| c.phone)
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_default())
}
