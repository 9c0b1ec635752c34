//! Category tree business logic.
//!
//! Categories form a self-referencing hierarchy. This module owns slug
//! derivation, the mutation-time cycle check, ancestor-path rendering, and
//! the recursive subtree aggregates (product set, average price).

use crate::{
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashSet;

/// Derives a URL-safe slug from a name: lowercase, ASCII alphanumerics and
/// underscores kept, runs of whitespace and hyphens collapsed to a single
/// hyphen, everything else dropped.
///
/// "Books & Movies" becomes "books-movies".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }
    slug
}

/// Creates a category, deriving the slug from the name when none is given.
///
/// The slug is set exactly once here; renames never regenerate it.
///
/// # Errors
/// Returns a validation error if the name is empty, the slug cannot be
/// derived, or the referenced parent does not exist.
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
    slug: Option<String>,
    parent_id: Option<i64>,
    description: String,
) -> Result<category::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }

    if let Some(pid) = parent_id {
        get_category_by_id(db, pid)
            .await?
            .ok_or_else(|| Error::validation(format!("Parent category {pid} does not exist")))?;
    }

    let slug = match slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(explicit) => explicit,
        None => slugify(&name),
    };
    if slug.is_empty() {
        return Err(Error::validation(format!(
            "Cannot derive a slug from category name {name:?}"
        )));
    }

    let now = chrono::Utc::now();
    let model = category::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        parent_id: Set(parent_id),
        description: Set(description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Retrieves a category by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all categories ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Renames a category and/or replaces its description.
///
/// The slug is deliberately left untouched: it is derived once at creation
/// and stays stable across renames.
///
/// # Errors
/// Returns a not-found error if the category does not exist, or a validation
/// error for an empty name.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<category::Model> {
    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {category_id} not found")))?;

    let mut model: category::ActiveModel = existing.into();
    if let Some(name) = name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Category name cannot be empty"));
        }
        model.name = Set(name);
    }
    if let Some(description) = description {
        model.description = Set(description);
    }
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Moves a category under a new parent (or to the root with `None`).
///
/// Rejects any parent that is the category itself or one of its descendants;
/// the tree is left unchanged on rejection. The check runs here, at mutation
/// time, so reads can assume a cycle-free tree.
///
/// # Errors
/// Returns a not-found error for a missing category and a validation error
/// for a missing or cycle-forming parent.
pub async fn set_parent(
    db: &DatabaseConnection,
    category_id: i64,
    new_parent_id: Option<i64>,
) -> Result<category::Model> {
    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {category_id} not found")))?;

    if let Some(pid) = new_parent_id {
        let parent = get_category_by_id(db, pid)
            .await?
            .ok_or_else(|| Error::validation(format!("Parent category {pid} does not exist")))?;

        if pid == category_id || is_descendant_of(db, &parent, category_id).await? {
            return Err(Error::validation(
                "A category cannot be a parent of its own ancestor.",
            ));
        }
    }

    let mut model: category::ActiveModel = existing.into();
    model.parent_id = Set(new_parent_id);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Whether `candidate` sits somewhere below the category with `ancestor_id`.
async fn is_descendant_of(
    db: &DatabaseConnection,
    candidate: &category::Model,
    ancestor_id: i64,
) -> Result<bool> {
    let mut visited = HashSet::from([candidate.id]);
    let mut current = candidate.parent_id;
    while let Some(id) = current {
        if id == ancestor_id {
            return Ok(true);
        }
        if !visited.insert(id) {
            // Invariant violated upstream; stop rather than spin.
            return Err(Error::validation("Category hierarchy contains a cycle"));
        }
        current = get_category_by_id(db, id)
            .await?
            .ok_or_else(|| Error::validation(format!("Category {id} does not exist")))?
            .parent_id;
    }
    Ok(false)
}

/// Renders the names from the root down to this category, joined by " > ".
///
/// # Errors
/// Returns an error if the database query fails or the stored hierarchy
/// turns out to be cyclic.
pub async fn ancestors_path(db: &DatabaseConnection, category: &category::Model) -> Result<String> {
    let mut names = vec![category.name.clone()];
    let mut visited = HashSet::from([category.id]);
    let mut current = category.parent_id;
    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(Error::validation("Category hierarchy contains a cycle"));
        }
        let ancestor = get_category_by_id(db, id)
            .await?
            .ok_or_else(|| Error::validation(format!("Category {id} does not exist")))?;
        names.push(ancestor.name);
        current = ancestor.parent_id;
    }
    names.reverse();
    Ok(names.join(" > "))
}

/// Collects the IDs of the category and every descendant, breadth-first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn descendant_ids(db: &DatabaseConnection, category_id: i64) -> Result<Vec<i64>> {
    let mut ids = vec![category_id];
    let mut frontier = vec![category_id];
    while !frontier.is_empty() {
        let children: Vec<i64> = Category::find()
            .filter(category::Column::ParentId.is_in(frontier))
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.extend(&children);
        frontier = children;
    }
    Ok(ids)
}

/// Retrieves every product whose category is this node or any descendant.
///
/// Each product belongs to exactly one category, so the result is
/// duplicate-free by construction.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn all_products(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<product::Model>> {
    let ids = descendant_ids(db, category_id).await?;
    Product::find()
        .filter(product::Column::CategoryId.is_in(ids))
        .order_by_desc(product::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Arithmetic mean of `price` over the subtree's products.
///
/// An empty subtree yields exactly zero; it is not an error.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn average_price(db: &DatabaseConnection, category_id: i64) -> Result<Decimal> {
    let products = all_products(db, category_id).await?;
    if products.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let total: Decimal = products.iter().map(|p| p.price).sum();
    Ok(total / Decimal::from(products.len() as i64))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Books & Movies"), "books-movies");
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("  Home   Audio  "), "home-audio");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
        assert_eq!(slugify("snake_case ok"), "snake_case-ok");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn test_create_category_derives_slug_once() -> Result<()> {
        let db = setup_test_db().await?;

        let cat = create_test_category(&db, "Books & Movies").await?;
        assert_eq!(cat.slug, "books-movies");

        // Renaming must not regenerate the slug
        let renamed = update_category(&db, cat.id, Some("Media".to_string()), None).await?;
        assert_eq!(renamed.name, "Media");
        assert_eq!(renamed.slug, "books-movies");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_explicit_slug_wins() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_category(
            &db,
            "Books & Movies".to_string(),
            Some("media".to_string()),
            None,
            String::new(),
        )
        .await?;
        assert_eq!(cat.slug, "media");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_category(&db, "  ".to_string(), None, None, String::new()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_category(&db, "Orphan".to_string(), None, Some(999), String::new()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_ancestors_path() -> Result<()> {
        let db = setup_test_db().await?;

        let root = create_test_category(&db, "Electronics").await?;
        let mid = create_child_category(&db, "Computers", root.id).await?;
        let leaf = create_child_category(&db, "Laptops", mid.id).await?;

        assert_eq!(ancestors_path(&db, &root).await?, "Electronics");
        assert_eq!(
            ancestors_path(&db, &leaf).await?,
            "Electronics > Computers > Laptops"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_all_products_covers_subtree_without_duplicates() -> Result<()> {
        let db = setup_test_db().await?;

        let root = create_test_category(&db, "Electronics").await?;
        let computers = create_child_category(&db, "Computers", root.id).await?;
        let laptops = create_child_category(&db, "Laptops", computers.id).await?;
        let audio = create_child_category(&db, "Audio", root.id).await?;
        let other_root = create_test_category(&db, "Groceries").await?;

        create_test_product(&db, "Desktop", "800.00", computers.id).await?;
        create_test_product(&db, "Ultrabook", "1200.00", laptops.id).await?;
        create_test_product(&db, "Speaker", "99.00", audio.id).await?;
        create_test_product(&db, "Coffee", "9.50", other_root.id).await?;

        let products = all_products(&db, root.id).await?;
        let mut names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Desktop", "Speaker", "Ultrabook"]);

        // IDs are unique, so no product was counted twice
        let ids: std::collections::HashSet<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());

        // Subtree query from the middle of the tree
        let computer_products = all_products(&db, computers.id).await?;
        assert_eq!(computer_products.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_average_price() -> Result<()> {
        let db = setup_test_db().await?;

        let root = create_test_category(&db, "Electronics").await?;
        let laptops = create_child_category(&db, "Laptops", root.id).await?;

        // Empty subtree averages to exactly zero
        assert_eq!(average_price(&db, root.id).await?, Decimal::ZERO);

        create_test_product(&db, "Ultrabook", "1200.00", laptops.id).await?;
        create_test_product(&db, "Speaker", "100.00", root.id).await?;

        assert_eq!(average_price(&db, root.id).await?, dec("650.00"));
        assert_eq!(average_price(&db, laptops.id).await?, dec("1200.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_parent_rejects_cycles() -> Result<()> {
        let db = setup_test_db().await?;

        let root = create_test_category(&db, "Electronics").await?;
        let mid = create_child_category(&db, "Computers", root.id).await?;
        let leaf = create_child_category(&db, "Laptops", mid.id).await?;

        // Direct self-parenting
        let result = set_parent(&db, root.id, Some(root.id)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Parenting under a descendant
        let result = set_parent(&db, root.id, Some(leaf.id)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // The tree is unchanged after the rejections
        let root = get_category_by_id(&db, root.id).await?.unwrap();
        assert_eq!(root.parent_id, None);
        let leaf = get_category_by_id(&db, leaf.id).await?.unwrap();
        assert_eq!(leaf.parent_id, Some(mid.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_parent_reparents() -> Result<()> {
        let db = setup_test_db().await?;

        let root = create_test_category(&db, "Electronics").await?;
        let audio = create_child_category(&db, "Audio", root.id).await?;
        let speakers = create_child_category(&db, "Speakers", audio.id).await?;

        // Lift speakers directly under the root
        let moved = set_parent(&db, speakers.id, Some(root.id)).await?;
        assert_eq!(moved.parent_id, Some(root.id));
        assert_eq!(
            ancestors_path(&db, &moved).await?,
            "Electronics > Speakers"
        );

        // And detach it entirely
        let detached = set_parent(&db, speakers.id, None).await?;
        assert_eq!(detached.parent_id, None);

        Ok(())
    }
}
