use axum::{
    Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::ApiError;
use super::types::RecipePayload;
use crate::domain::RecipeId;
use crate::models::recipe::{RecipeFields, RecipePatch};

/// Unwraps a JSON body, reporting malformed input as a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

pub fn validate_recipe_id(id: i32) -> Result<RecipeId, ApiError> {
    if id <= 0 {
        return Err(ApiError::recipe_not_found(id));
    }
    Ok(RecipeId::new(id))
}

/// Resolves the `{id}` segment. Anything that is not a positive `i32` cannot
/// name a recipe and answers 404.
pub fn recipe_path_id(path: Result<Path<i32>, PathRejection>) -> Result<RecipeId, ApiError> {
    match path {
        Ok(Path(id)) => validate_recipe_id(id),
        Err(rejection) => Err(ApiError::recipe_not_found(rejection.body_text())),
    }
}

/// Parses `1,2,3` into ids. Blank input means no filter.
pub fn parse_id_list(raw: Option<&str>) -> Result<Vec<i32>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| ApiError::validation(format!("Invalid id list: {raw}")))
        })
        .collect()
}

/// Query flags follow the `?flag=1` convention; `0`, `false` or absent mean off.
pub fn parse_flag(raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(str::trim) {
        None | Some("" | "0" | "false") => Ok(false),
        Some("1" | "true") => Ok(true),
        Some(other) => Err(ApiError::validation(format!(
            "Invalid boolean flag: {other}"
        ))),
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field}: This field is required.")))
}

/// Create and PUT need every scalar field; associations default to empty.
pub fn recipe_fields(payload: RecipePayload) -> Result<RecipeFields, ApiError> {
    Ok(RecipeFields {
        title: required(payload.title, "title")?,
        time_minutes: required(payload.time_minutes, "time_minutes")?,
        price: required(payload.price, "price")?,
        link: payload.link,
        tags: payload.tags.unwrap_or_default(),
        ingredients: payload.ingredients.unwrap_or_default(),
    })
}

#[must_use]
pub fn recipe_patch(payload: RecipePayload) -> RecipePatch {
    RecipePatch {
        title: payload.title,
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link,
        tags: payload.tags,
        ingredients: payload.ingredients,
    }
}
