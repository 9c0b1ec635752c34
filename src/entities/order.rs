//! Order entity - An immutable snapshot of a cart at purchase time.
//!
//! Orders are created exclusively by `core::checkout`; after creation only
//! `status`, `shipping_address`, and `phone_number` may change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who placed the order
    pub user_id: i64,
    /// Human-facing order reference, e.g. "ORD-20250614120000-0042"
    #[sea_orm(unique)]
    pub order_number: String,
    /// Fulfillment status
    pub status: OrderStatus,
    /// Snapshot of the cart total at checkout
    pub total_price: Decimal,
    /// Delivery address, filled in after checkout
    pub shipping_address: String,
    /// Contact phone, defaulted from the customer profile
    pub phone_number: String,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Fulfillment lifecycle of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting processing
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being prepared
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Handed to the carrier
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Received by the customer
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Cancelled before delivery
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
