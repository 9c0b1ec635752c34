//! Customer profile endpoints.
//!
//! Reads and writes are scoped to the requesting user; there is no DELETE.
//! The provision route is the idempotent hook the social-login pipeline
//! calls after authenticating a user.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    api::{AppState, CurrentUser},
    core::customer::{self, CustomerChanges, SocialProfile},
    entities::CustomerModel,
    errors::{Error, Result},
};

/// Mounts this resource under its `/api` prefix.
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(detail).patch(update))
        .route("/provision", post(provision))
}

/// POST body for explicit profile creation.
#[derive(Debug, Deserialize)]
struct CreateCustomerRequest {
    name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
}

/// GET /api/customers — the caller's own profile, as a (0- or 1-element)
/// list.
async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<CustomerModel>>> {
    let profile = customer::customer_for_user(&state.db, user_id).await?;
    Ok(Json(profile.into_iter().collect()))
}

/// POST /api/customers
async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerModel>)> {
    let created = customer::create_customer(
        &state.db,
        user_id,
        payload.name,
        payload.email,
        payload.phone,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/customers/{id} — only the caller's own profile resolves.
async fn detail(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<CustomerModel>> {
    let found = require_own_profile(&state, user_id, id).await?;
    Ok(Json(found))
}

/// PATCH /api/customers/{id}
async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(changes): Json<CustomerChanges>,
) -> Result<Json<CustomerModel>> {
    require_own_profile(&state, user_id, id).await?;
    Ok(Json(
        customer::update_customer(&state.db, user_id, changes).await?,
    ))
}

/// POST /api/customers/provision — idempotent social-login hook.
async fn provision(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(profile): Json<SocialProfile>,
) -> Result<Json<CustomerModel>> {
    Ok(Json(
        customer::ensure_customer_profile(&state.db, user_id, &profile).await?,
    ))
}

/// The caller's profile, and only if `id` names it; anything else is 404.
async fn require_own_profile(
    state: &AppState,
    user_id: i64,
    id: i64,
) -> Result<CustomerModel> {
    customer::customer_for_user(&state.db, user_id)
        .await?
        .filter(|profile| profile.id == id)
        .ok_or_else(|| Error::not_found(format!("Customer {id} not found")))
}
