//! Product entity - A purchasable item in the catalog.
//!
//! Every product belongs to exactly one category. Prices are decimals, never
//! floats; cart and order math reuses them verbatim.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Laptop")
    pub name: String,
    /// Full product description
    pub description: String,
    /// Unit price
    pub price: Decimal,
    /// Units currently in stock (informational; checkout does not reserve)
    pub stock: i32,
    /// Owning category
    pub category_id: i64,
    /// Detail-page view counter
    pub views: i32,
    /// Average review rating
    pub rating: Decimal,
    /// Number of reviews behind the rating
    pub review_count: i32,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product may sit in many carts
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
