//! Product catalog business logic.
//!
//! Creation, lookups, and the filtered/sorted listing behind the catalog
//! endpoint. View counts are bumped with an atomic column update so
//! concurrent detail-page hits never lose increments.

use crate::{
    entities::{Product, category, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields required to create a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Unit price, must be non-negative
    pub price: Decimal,
    /// Initial stock level
    #[serde(default)]
    pub stock: i32,
    /// Owning category
    pub category_id: i64,
}

/// Query parameters accepted by the product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Substring match against name or description
    pub search: Option<String>,
    /// Category slug filter (direct category, not the subtree)
    pub category: Option<String>,
    /// Lower price bound, inclusive
    pub min_price: Option<Decimal>,
    /// Upper price bound, inclusive
    pub max_price: Option<Decimal>,
    /// Result ordering, newest first when absent
    pub sort: Option<ProductSort>,
}

/// Supported orderings for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Most recently created first
    Newest,
    /// Most viewed first
    Popular,
}

/// Creates a product, validating the name, price, stock, and category.
///
/// # Errors
/// Returns a validation error if the name is empty, the price or stock is
/// negative, or the category does not exist.
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    let name = new.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }
    if new.price < Decimal::ZERO {
        return Err(Error::validation("Product price cannot be negative"));
    }
    if new.stock < 0 {
        return Err(Error::validation("Product stock cannot be negative"));
    }
    category::Entity::find_by_id(new.category_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            Error::validation(format!("Category {} does not exist", new.category_id))
        })?;

    let now = chrono::Utc::now();
    let model = product::ActiveModel {
        name: Set(name),
        description: Set(new.description),
        price: Set(new.price),
        stock: Set(new.stock),
        category_id: Set(new.category_id),
        views: Set(0),
        rating: Set(Decimal::ZERO),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Retrieves a product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists products matching the query filters, in the requested order.
///
/// An unknown category slug matches nothing rather than erroring, mirroring
/// a filter that simply excludes everything.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(
    db: &DatabaseConnection,
    query: &ProductQuery,
) -> Result<Vec<product::Model>> {
    let mut select = Product::find();

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let needle = search.trim();
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(needle))
                .add(product::Column::Description.contains(needle)),
        );
    }

    if let Some(slug) = query.category.as_deref() {
        match super::category::get_category_by_slug(db, slug).await? {
            Some(cat) => select = select.filter(product::Column::CategoryId.eq(cat.id)),
            None => return Ok(Vec::new()),
        }
    }

    if let Some(min) = query.min_price {
        select = select.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        select = select.filter(product::Column::Price.lte(max));
    }

    select = match query.sort.unwrap_or(ProductSort::Newest) {
        ProductSort::PriceAsc => select.order_by_asc(product::Column::Price),
        ProductSort::PriceDesc => select.order_by_desc(product::Column::Price),
        ProductSort::Newest => select.order_by_desc(product::Column::CreatedAt),
        ProductSort::Popular => select.order_by_desc(product::Column::Views),
    };

    select.all(db).await.map_err(Into::into)
}

/// Atomically increments the product's view counter and returns the updated
/// row.
///
/// A single `UPDATE products SET views = views + 1` statement, so concurrent
/// detail-page hits cannot lose counts to read-modify-write races.
///
/// # Errors
/// Returns a not-found error if the product does not exist.
pub async fn record_view(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let updated = Product::update_many()
        .col_expr(
            product::Column::Views,
            Expr::col(product::Column::Views).add(1),
        )
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        return Err(Error::not_found(format!("Product {product_id} not found")));
    }

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(format!("Product {product_id} not found")))
}

/// Renders the full category path for a product, root-first.
///
/// # Errors
/// Returns an error if the owning category is missing or the query fails.
pub async fn category_path(db: &DatabaseConnection, prod: &product::Model) -> Result<String> {
    let cat = super::category::get_category_by_id(db, prod.category_id)
        .await?
        .ok_or_else(|| {
            Error::validation(format!("Category {} does not exist", prod.category_id))
        })?;
    super::category::ancestors_path(db, &cat).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "Electronics").await?;

        let result = create_product(
            &db,
            NewProduct {
                name: "  ".to_string(),
                description: String::new(),
                price: dec("1.00"),
                stock: 0,
                category_id: cat.id,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_product(
            &db,
            NewProduct {
                name: "Laptop".to_string(),
                description: String::new(),
                price: dec("-1.00"),
                stock: 0,
                category_id: cat.id,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_product(
            &db,
            NewProduct {
                name: "Laptop".to_string(),
                description: String::new(),
                price: dec("1.00"),
                stock: 0,
                category_id: 999,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let electronics = create_test_category(&db, "Electronics").await?;
        let groceries = create_test_category(&db, "Groceries").await?;

        create_test_product(&db, "Gaming Laptop", "1500.00", electronics.id).await?;
        create_test_product(&db, "Mouse", "25.00", electronics.id).await?;
        create_test_product(&db, "Coffee Beans", "18.00", groceries.id).await?;

        // Substring search over name
        let hits = list_products(
            &db,
            &ProductQuery {
                search: Some("laptop".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Gaming Laptop");

        // Category slug filter
        let hits = list_products(
            &db,
            &ProductQuery {
                category: Some("electronics".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(hits.len(), 2);

        // Unknown slug matches nothing
        let hits = list_products(
            &db,
            &ProductQuery {
                category: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert!(hits.is_empty());

        // Price band
        let hits = list_products(
            &db,
            &ProductQuery {
                min_price: Some(dec("20.00")),
                max_price: Some(dec("100.00")),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mouse");

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_sorting() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "Electronics").await?;

        create_test_product(&db, "Mid", "50.00", cat.id).await?;
        create_test_product(&db, "Cheap", "10.00", cat.id).await?;
        let popular = create_test_product(&db, "Pricey", "90.00", cat.id).await?;
        record_view(&db, popular.id).await?;

        let by_price: Vec<String> = list_products(
            &db,
            &ProductQuery {
                sort: Some(ProductSort::PriceAsc),
                ..Default::default()
            },
        )
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
        assert_eq!(by_price, vec!["Cheap", "Mid", "Pricey"]);

        let by_views = list_products(
            &db,
            &ProductQuery {
                sort: Some(ProductSort::Popular),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_views[0].name, "Pricey");

        Ok(())
    }

    #[tokio::test]
    async fn test_record_view_increments_atomically() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "Electronics").await?;
        let prod = create_test_product(&db, "Mouse", "25.00", cat.id).await?;
        assert_eq!(prod.views, 0);

        record_view(&db, prod.id).await?;
        let after = record_view(&db, prod.id).await?;
        assert_eq!(after.views, 2);

        let missing = record_view(&db, 999).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_category_path_for_product() -> Result<()> {
        let db = setup_test_db().await?;
        let root = create_test_category(&db, "Electronics").await?;
        let laptops = create_child_category(&db, "Laptops", root.id).await?;
        let prod = create_test_product(&db, "Ultrabook", "1200.00", laptops.id).await?;

        assert_eq!(category_path(&db, &prod).await?, "Electronics > Laptops");
        Ok(())
    }
}
