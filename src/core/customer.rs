//! Customer profile business logic.
//!
//! Profiles are an optional 1:1 extension of an external user account. The
//! social-login pipeline calls [`ensure_customer_profile`] on every sign-in;
//! it creates a profile from the provider's data exactly once and never
//! overwrites an existing one.

use crate::{
    entities::{Customer, customer},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;

/// Profile fields handed over by the social-login provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialProfile {
    /// Provider's given name, may be blank
    #[serde(default)]
    pub given_name: String,
    /// Provider's family name, may be blank
    #[serde(default)]
    pub family_name: String,
    /// Verified email address
    pub email: String,
    /// Phone number when the provider shares one
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// PATCH payload for a customer profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerChanges {
    /// New display name
    pub name: Option<String>,
    /// New contact email
    pub email: Option<String>,
    /// New contact phone
    pub phone: Option<String>,
}

/// Retrieves the customer profile linked to a user, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn customer_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Idempotent provisioning hook for the social-login pipeline.
///
/// Creates a profile from the provider data when the user has none; an
/// existing profile is returned untouched, whatever the new data says. The
/// display name is "given family" trimmed, falling back to the email when
/// both are blank (there is no user table to borrow a username from).
///
/// # Errors
/// Returns a validation error for a blank email.
pub async fn ensure_customer_profile(
    db: &DatabaseConnection,
    user_id: i64,
    profile: &SocialProfile,
) -> Result<customer::Model> {
    if let Some(existing) = customer_for_user(db, user_id).await? {
        return Ok(existing);
    }

    let email = profile.email.trim().to_string();
    if email.is_empty() {
        return Err(Error::validation("Profile email cannot be empty"));
    }

    let name = format!("{} {}", profile.given_name.trim(), profile.family_name.trim())
        .trim()
        .to_string();
    let name = if name.is_empty() { email.clone() } else { name };

    let phone = profile
        .phone_number
        .clone()
        .filter(|p| !p.trim().is_empty());

    insert_customer(db, user_id, name, email, phone).await
}

/// Explicitly creates a customer profile for a user.
///
/// # Errors
/// Returns a conflict error when the user already has a profile or the
/// email is taken, and a validation error for blank fields.
pub async fn create_customer(
    db: &DatabaseConnection,
    user_id: i64,
    name: String,
    email: String,
    phone: Option<String>,
) -> Result<customer::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Customer name cannot be empty"));
    }
    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(Error::validation("Customer email cannot be empty"));
    }

    if customer_for_user(db, user_id).await?.is_some() {
        return Err(Error::conflict(
            "A customer profile already exists for this user.",
        ));
    }
    let email_taken = Customer::find()
        .filter(customer::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some();
    if email_taken {
        return Err(Error::conflict(format!(
            "A customer with email {email} already exists"
        )));
    }

    insert_customer(db, user_id, name, email, phone).await
}

async fn insert_customer(
    db: &DatabaseConnection,
    user_id: i64,
    name: String,
    email: String,
    phone: Option<String>,
) -> Result<customer::Model> {
    let now = chrono::Utc::now();
    let model = customer::ActiveModel {
        user_id: Set(user_id),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Applies PATCH semantics to the user's own profile.
///
/// # Errors
/// Returns a not-found error when the user has no profile, or a validation
/// error for blank replacement values.
pub async fn update_customer(
    db: &DatabaseConnection,
    user_id: i64,
    changes: CustomerChanges,
) -> Result<customer::Model> {
    let existing = customer_for_user(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("Customer profile not found"))?;

    let mut model: customer::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Customer name cannot be empty"));
        }
        model.name = Set(name);
    }
    if let Some(email) = changes.email {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(Error::validation("Customer email cannot be empty"));
        }
        model.email = Set(email);
    }
    if let Some(phone) = changes.phone {
        model.phone = Set(Some(phone).filter(|p| !p.trim().is_empty()));
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn profile(given: &str, family: &str, email: &str, phone: Option<&str>) -> SocialProfile {
        SocialProfile {
            given_name: given.to_string(),
            family_name: family.to_string(),
            email: email.to_string(),
            phone_number: phone.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_ensure_profile_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        let created = ensure_customer_profile(
            &db,
            1,
            &profile("Ada", "Lovelace", "ada@example.com", Some("0700000001")),
        )
        .await?;
        assert_eq!(created.name, "Ada Lovelace");
        assert_eq!(created.email, "ada@example.com");
        assert_eq!(created.phone.as_deref(), Some("0700000001"));

        // A second sign-in with different provider data changes nothing
        let again = ensure_customer_profile(
            &db,
            1,
            &profile("Someone", "Else", "other@example.com", None),
        )
        .await?;
        assert_eq!(again.id, created.id);
        assert_eq!(again.name, "Ada Lovelace");
        assert_eq!(again.email, "ada@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_profile_name_fallback() -> Result<()> {
        let db = setup_test_db().await?;

        // Blank names fall back to the email
        let created =
            ensure_customer_profile(&db, 1, &profile("", "", "grace@example.com", None)).await?;
        assert_eq!(created.name, "grace@example.com");
        assert_eq!(created.phone, None);

        // A single name component is used as-is
        let created =
            ensure_customer_profile(&db, 2, &profile("Grace", "", "g2@example.com", None)).await?;
        assert_eq!(created.name, "Grace");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, 1, None).await?;

        let result = create_customer(
            &db,
            1,
            "Second Profile".to_string(),
            "second@example.com".to_string(),
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        // Same email for a different user is also a conflict
        let result = create_customer(
            &db,
            2,
            "Other".to_string(),
            "user1@example.com".to_string(),
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_customer_patch() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, 1, Some("0700000001")).await?;

        let updated = update_customer(
            &db,
            1,
            CustomerChanges {
                name: Some("Renamed".to_string()),
                email: None,
                phone: Some(String::new()),
            },
        )
        .await?;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "user1@example.com");
        // Blanking the phone clears it
        assert_eq!(updated.phone, None);

        let result = update_customer(&db, 9, CustomerChanges::default()).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }
}
