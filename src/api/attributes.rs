//! Tag and ingredient endpoints. Both collections behave identically, so the
//! handlers are written once and bound to a kind in the router.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::types::{AttributeListQuery, MessageDto, NamePayload};
use super::validation::{json_body, parse_flag};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::AttributeKind;
use crate::models::account::Account;
use crate::models::attribute::Attribute;
use crate::services::AttributeError;

impl From<AttributeError> for ApiError {
    fn from(err: AttributeError) -> Self {
        match err {
            AttributeError::Validation(msg) => Self::validation(format!("name: {msg}")),
            AttributeError::Database(msg) => Self::DatabaseError(msg),
            AttributeError::Internal(msg) => Self::internal(msg),
        }
    }
}

async fn list(
    state: &AppState,
    kind: AttributeKind,
    account: &Account,
    query: &AttributeListQuery,
) -> Result<Json<ApiResponse<Vec<Attribute>>>, ApiError> {
    let assigned_only = parse_flag(query.assigned_only.as_deref())?;
    let items = state
        .shared
        .attributes(kind)
        .list(account.id, assigned_only)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn create(
    state: &AppState,
    kind: AttributeKind,
    account: &Account,
    payload: NamePayload,
) -> Result<Attribute, ApiError> {
    let name = payload.name.unwrap_or_default();
    Ok(state
        .shared
        .attributes(kind)
        .create(account.id, &name)
        .await?)
}

/// GET /api/recipe/tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    Query(query): Query<AttributeListQuery>,
) -> Result<Json<ApiResponse<Vec<Attribute>>>, ApiError> {
    list(&state, AttributeKind::Tag, &account, &query).await
}

/// POST /api/recipe/tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = create(&state, AttributeKind::Tag, &account, json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tag))))
}

/// GET /api/recipe/ingredients
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    Query(query): Query<AttributeListQuery>,
) -> Result<Json<ApiResponse<Vec<Attribute>>>, ApiError> {
    list(&state, AttributeKind::Ingredient, &account, &query).await
}

/// POST /api/recipe/ingredients
pub async fn create_ingredient(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient =
        create(&state, AttributeKind::Ingredient, &account, json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(ingredient))))
}

/// POST /api/recipe/ingredient-create
/// Same as creating through the collection, answering with a message only.
pub async fn ingredient_create_message(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload)?;
    if payload.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("Invalid name for ingredient"));
    }

    create(&state, AttributeKind::Ingredient, &account, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageDto {
            message: "Ingredient created".to_string(),
        })),
    ))
}
