//! Category entity - A node in the product classification tree.
//!
//! Categories form a self-referencing hierarchy through `parent_id`. The tree
//! is kept cycle-free at mutation time by `core::category`; nothing here
//! enforces it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Electronics")
    pub name: String,
    /// URL-safe identifier, derived from the name once at creation
    #[sea_orm(unique)]
    pub slug: String,
    /// Parent category, None for roots
    pub parent_id: Option<i64>,
    /// Free-form description
    pub description: String,
    /// When the category was created
    pub created_at: DateTimeUtc,
    /// When the category was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category optionally belongs to a parent category
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    /// One category has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
