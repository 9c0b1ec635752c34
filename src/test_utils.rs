//! Shared test utilities for CartWheel.
//!
//! Helpers for setting up in-memory test databases and creating test
//! entities with sensible defaults.

use crate::{
    core::{cart, category, customer, product},
    entities,
    errors::Result,
    notify::Notifier,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a decimal literal, panicking on bad test input.
pub fn dec(value: &str) -> Decimal {
    value.parse().expect("invalid decimal literal in test")
}

/// Creates a root test category with an auto-derived slug.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), None, None, String::new()).await
}

/// Creates a test category under the given parent.
pub async fn create_child_category(
    db: &DatabaseConnection,
    name: &str,
    parent_id: i64,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), None, Some(parent_id), String::new()).await
}

/// Creates a test product with the given price in the given category.
///
/// # Defaults
/// * `description`: empty
/// * `stock`: 10
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: &str,
    category_id: i64,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        product::NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: dec(price),
            stock: 10,
            category_id,
        },
    )
    .await
}

/// Creates a test customer profile for the given user.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    user_id: i64,
    phone: Option<&str>,
) -> Result<entities::customer::Model> {
    customer::create_customer(
        db,
        user_id,
        "Test Customer".to_string(),
        format!("user{user_id}@example.com"),
        phone.map(str::to_string),
    )
    .await
}

/// Sets up a database with one category and a cart for user 1.
/// Returns (db, category, cart) for cart-related tests.
pub async fn setup_with_cart() -> Result<(
    DatabaseConnection,
    entities::category::Model,
    entities::cart::Model,
)> {
    let db = setup_test_db().await?;
    let cat = create_test_category(&db, "Electronics").await?;
    let cart = cart::get_or_create_cart(&db, 1).await?;
    Ok((db, cat, cart))
}

/// Test notifier that records calls and optionally fails every one of them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    /// Order numbers seen by `order_placed`
    pub seen: Mutex<Vec<String>>,
    /// When true, every call returns an error
    pub fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose every call fails, for log-and-swallow tests.
    pub fn failing() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Number of notifications received so far.
    pub fn call_count(&self) -> usize {
        self.seen.lock().expect("notifier mutex poisoned").len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn order_placed(
        &self,
        order: &entities::order::Model,
        _items: &[entities::order_item::Model],
    ) -> Result<()> {
        self.seen
            .lock()
            .expect("notifier mutex poisoned")
            .push(order.order_number.clone());
        if self.fail {
            return Err(crate::errors::Error::Notification {
                message: "simulated delivery failure".to_string(),
            });
        }
        Ok(())
    }
}
