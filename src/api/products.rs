//! Product catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use crate::{
    api::AppState,
    core::product::{self, NewProduct, ProductQuery},
    entities::ProductModel,
    errors::Result,
};

/// Mounts this resource under its `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(detail))
}

/// Product plus its rendered category path.
#[derive(Debug, Serialize)]
struct ProductDetail {
    #[serde(flatten)]
    product: ProductModel,
    category_path: String,
}

/// GET /api/products — supports `search`, `category`, `min_price`,
/// `max_price`, and `sort` query parameters.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductModel>>> {
    Ok(Json(product::list_products(&state.db, &query).await?))
}

/// POST /api/products
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductModel>)> {
    let created = product::create_product(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/products/{id} — a detail view counts as a view.
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetail>> {
    let viewed = product::record_view(&state.db, id).await?;
    let category_path = product::category_path(&state.db, &viewed).await?;
    Ok(Json(ProductDetail {
        product: viewed,
        category_path,
    }))
}
