//! Database connection and schema bootstrap.
//!
//! Tables are generated from the entity definitions with SeaORM's
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. The same bootstrap serves process startup and the in-memory
//! databases used by tests. Statements are idempotent (`IF NOT EXISTS`), so
//! restarting against an existing file is safe.

use crate::entities::{
    Cart, CartItem, CartItemColumn, Category, Customer, Order, OrderItem, Product,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    Database::connect(url).await.map_err(Into::into)
}

/// Creates all tables and indexes from the entity definitions.
///
/// Creation order respects foreign keys: categories before products, carts
/// and products before cart items, orders before order items.
///
/// # Errors
/// Returns an error if any DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut product_table = schema.create_table_from_entity(Product);
    let mut cart_table = schema.create_table_from_entity(Cart);
    let mut cart_item_table = schema.create_table_from_entity(CartItem);
    let mut customer_table = schema.create_table_from_entity(Customer);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut order_item_table = schema.create_table_from_entity(OrderItem);

    for table in [
        &mut category_table,
        &mut product_table,
        &mut cart_table,
        &mut cart_item_table,
        &mut customer_table,
        &mut order_table,
        &mut order_item_table,
    ] {
        table.if_not_exists();
    }

    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&cart_table)).await?;
    db.execute(builder.build(&cart_item_table)).await?;
    db.execute(builder.build(&customer_table)).await?;
    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&order_item_table)).await?;

    // At most one line per (cart, product); add_item updates in place instead
    // of inserting a second row.
    let cart_line_unique = Index::create()
        .name("ux_cart_items_cart_product")
        .table(CartItem)
        .col(CartItemColumn::CartId)
        .col(CartItemColumn::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&cart_line_unique)).await?;

    Ok(())
}
