//! Customer entity - Profile data supplementing an external user account.
//!
//! Optional 1:1 extension of a user: display name, contact email, and phone.
//! Auto-provisioned from social-login profile data by `core::customer` when
//! missing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User this profile extends (external identity, one profile each)
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Contact email
    #[sea_orm(unique)]
    pub email: String,
    /// Contact phone, used as the checkout default
    pub phone: Option<String>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
