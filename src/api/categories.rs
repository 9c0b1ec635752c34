//! Category tree endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    api::AppState,
    core::category,
    entities::{CategoryModel, ProductModel},
    errors::{Error, Result},
};

/// Mounts this resource under its `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{slug}", get(get_by_slug).patch(update))
        .route("/{slug}/products", get(subtree_products))
        .route("/{slug}/average-price", get(subtree_average_price))
}

/// POST body for category creation.
#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
    /// Explicit slug; derived from the name when absent
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    parent_id: Option<i64>,
    #[serde(default)]
    description: String,
}

/// PATCH body. `parent_id` distinguishes "absent" (leave alone) from
/// `null` (detach to root) via the nested Option.
#[derive(Debug, Deserialize)]
struct UpdateCategoryRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    parent_id: Option<Option<i64>>,
}

/// Plain `Option<Option<T>>` folds JSON `null` into "absent"; this keeps
/// `null` as an explicit `Some(None)` so PATCH can detach a parent.
fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Category plus its rendered ancestor path.
#[derive(Debug, Serialize)]
struct CategoryDetail {
    #[serde(flatten)]
    category: CategoryModel,
    path: String,
}

#[derive(Debug, Serialize)]
struct AveragePriceResponse {
    average_price: Decimal,
}

/// GET /api/categories
async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryModel>>> {
    Ok(Json(category::list_categories(&state.db).await?))
}

/// POST /api/categories
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryModel>)> {
    let created = category::create_category(
        &state.db,
        payload.name,
        payload.slug,
        payload.parent_id,
        payload.description,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/categories/{slug}
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>> {
    let found = require_category(&state, &slug).await?;
    let path = category::ancestors_path(&state.db, &found).await?;
    Ok(Json(CategoryDetail {
        category: found,
        path,
    }))
}

/// PATCH /api/categories/{slug}
async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryModel>> {
    let existing = require_category(&state, &slug).await?;

    let mut current = existing;
    if payload.name.is_some() || payload.description.is_some() {
        current =
            category::update_category(&state.db, current.id, payload.name, payload.description)
                .await?;
    }
    if let Some(new_parent) = payload.parent_id {
        current = category::set_parent(&state.db, current.id, new_parent).await?;
    }
    Ok(Json(current))
}

/// GET /api/categories/{slug}/products — the subtree's products, descendants
/// included.
async fn subtree_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductModel>>> {
    let found = require_category(&state, &slug).await?;
    Ok(Json(category::all_products(&state.db, found.id).await?))
}

/// GET /api/categories/{slug}/average-price
async fn subtree_average_price(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<AveragePriceResponse>> {
    let found = require_category(&state, &slug).await?;
    let average_price = category::average_price(&state.db, found.id).await?;
    Ok(Json(AveragePriceResponse { average_price }))
}

async fn require_category(state: &AppState, slug: &str) -> Result<CategoryModel> {
    category::get_category_by_slug(&state.db, slug)
        .await?
        .ok_or_else(|| Error::not_found(format!("Category {slug} not found")))
}
