//! Cart business logic.
//!
//! One mutable cart per user. Line items are unique per (cart, product);
//! adding an existing product increments its quantity instead of inserting a
//! second row. Totals are recomputed from the line items on every read —
//! there are no cached counters to go stale.

use crate::{
    entities::{CartItem, cart, cart_item, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Returns the user's cart, creating it on first use.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_or_create_cart(db: &DatabaseConnection, user_id: i64) -> Result<cart::Model> {
    if let Some(existing) = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = chrono::Utc::now();
    let model = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Loads the cart's line items joined with their products, oldest line first.
///
/// Generic over the connection so checkout can call it inside its
/// transaction.
///
/// # Errors
/// Returns an error if the database query fails or a line references a
/// product that no longer exists.
pub async fn items_with_products<C>(
    conn: &C,
    cart_id: i64,
) -> Result<Vec<(cart_item::Model, product::Model)>>
where
    C: ConnectionTrait,
{
    let rows = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(product::Entity)
        .order_by_asc(cart_item::Column::Id)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(item, prod)| {
            let product_id = item.product_id;
            prod.map(|p| (item, p)).ok_or_else(|| {
                Error::validation(format!("Product {product_id} no longer exists"))
            })
        })
        .collect()
}

/// Adds a product to the cart, or bumps the quantity of its existing line.
///
/// Adding quantity 2 and then 1 leaves the same line as adding 3 once.
///
/// # Errors
/// Returns a validation error for a non-positive quantity and a not-found
/// error for a missing product.
pub async fn add_item(
    db: &DatabaseConnection,
    cart_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity <= 0 {
        return Err(Error::validation("Quantity must be greater than 0"));
    }
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product not found"))?;

    let existing = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    let now = chrono::Utc::now();
    match existing {
        Some(line) => {
            let new_quantity = line.quantity + quantity;
            let mut model: cart_item::ActiveModel = line.into();
            model.quantity = Set(new_quantity);
            model.updated_at = Set(now);
            model.update(db).await.map_err(Into::into)
        }
        None => {
            let model = cart_item::ActiveModel {
                cart_id: Set(cart_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            model.insert(db).await.map_err(Into::into)
        }
    }
}

/// Replaces the quantity of an existing line.
///
/// Non-positive quantities are rejected here; callers that treat zero as
/// "remove the line" (the HTTP update endpoint does) call [`remove_item`]
/// themselves.
///
/// # Errors
/// Returns a validation error for a non-positive quantity and a not-found
/// error when the product has no line in this cart.
pub async fn set_item_quantity(
    db: &DatabaseConnection,
    cart_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity <= 0 {
        return Err(Error::validation("Quantity must be greater than 0"));
    }

    let line = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Item not found in cart"))?;

    let mut model: cart_item::ActiveModel = line.into();
    model.quantity = Set(quantity);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Removes the product's line from the cart; a no-op when absent.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn remove_item(db: &DatabaseConnection, cart_id: i64, product_id: i64) -> Result<()> {
    CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes every line in the cart.
///
/// Generic over the connection so checkout can clear the cart inside its
/// transaction.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn clear<C>(conn: &C, cart_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Total number of units across all lines, recomputed from current rows.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn total_items(db: &DatabaseConnection, cart_id: i64) -> Result<i64> {
    let items = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(db)
        .await?;
    Ok(items.iter().map(|i| i64::from(i.quantity)).sum())
}

/// Sum of `product.price × quantity` over all lines, recomputed from current
/// rows and current prices.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn total_price(db: &DatabaseConnection, cart_id: i64) -> Result<Decimal> {
    let items = items_with_products(db, cart_id).await?;
    Ok(items
        .iter()
        .map(|(line, prod)| prod.price * Decimal::from(line.quantity))
        .sum())
}
