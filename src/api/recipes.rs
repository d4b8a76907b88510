use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::types::{RecipeListQuery, RecipePayload};
use super::validation::{json_body, parse_id_list, recipe_fields, recipe_patch, recipe_path_id};
use super::{ApiError, ApiResponse, AppState};
use crate::models::account::Account;
use crate::models::recipe::{RecipeDetail, RecipeFilter, RecipeImage, RecipeSummary};
use crate::services::RecipeError;

/// Multipart field carrying the upload.
const IMAGE_FIELD: &str = "image";

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Validation(msg) => Self::validation(msg),
            RecipeError::InvalidImage(msg) => Self::validation(format!("{IMAGE_FIELD}: {msg}")),
            RecipeError::NotFound => Self::not_found("Recipe"),
            RecipeError::Database(msg) => Self::DatabaseError(msg),
            RecipeError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /api/recipe/recipes
/// Summary form, newest first. `?tags=1,2&ingredients=3` narrows the list.
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<ApiResponse<Vec<RecipeSummary>>>, ApiError> {
    let filter = RecipeFilter {
        tags: parse_id_list(query.tags.as_deref())?,
        ingredients: parse_id_list(query.ingredients.as_deref())?,
    };

    let recipes = state
        .shared
        .recipe_service
        .list(account.id, &filter)
        .await?;

    Ok(Json(ApiResponse::success(
        recipes.iter().map(|r| r.summary()).collect(),
    )))
}

/// POST /api/recipe/recipes
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = recipe_fields(json_body(payload)?)?;

    let recipe = state
        .shared
        .recipe_service
        .create(account.id, fields)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(recipe.summary())),
    ))
}

/// GET /api/recipe/recipes/{id}
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ApiError> {
    let id = recipe_path_id(id)?;
    let recipe = state.shared.recipe_service.get(account.id, id).await?;
    Ok(Json(ApiResponse::success(recipe.detail())))
}

/// PATCH /api/recipe/recipes/{id}
pub async fn patch_recipe(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ApiError> {
    let id = recipe_path_id(id)?;
    let patch = recipe_patch(json_body(payload)?);

    let recipe = state
        .shared
        .recipe_service
        .partial_update(account.id, id, patch)
        .await?;

    Ok(Json(ApiResponse::success(recipe.detail())))
}

/// PUT /api/recipe/recipes/{id}
pub async fn put_recipe(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> Result<Json<ApiResponse<RecipeDetail>>, ApiError> {
    let id = recipe_path_id(id)?;
    let fields = recipe_fields(json_body(payload)?)?;

    let recipe = state
        .shared
        .recipe_service
        .full_update(account.id, id, fields)
        .await?;

    Ok(Json(ApiResponse::success(recipe.detail())))
}

/// DELETE /api/recipe/recipes/{id}
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = recipe_path_id(id)?;
    state.shared.recipe_service.delete(account.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipe/recipes/{id}/upload-image
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    id: Result<Path<i32>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<RecipeImage>>, ApiError> {
    let id = recipe_path_id(id)?;
    let mut multipart =
        multipart.map_err(|e| ApiError::validation(format!("{IMAGE_FIELD}: {}", e.body_text())))?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("{IMAGE_FIELD}: {}", e.body_text())))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("{IMAGE_FIELD}: {}", e.body_text())))?;
            image = Some(bytes);
            break;
        }
    }

    // A missing field is rejected by the image store, after the ownership check.
    let bytes = image.unwrap_or_default();

    let recipe = state
        .shared
        .recipe_service
        .attach_image(account.id, id, &bytes)
        .await?;

    Ok(Json(ApiResponse::success(recipe.image_ref())))
}
