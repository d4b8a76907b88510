//! Domain service for owner-scoped recipe management.

use thiserror::Error;

use crate::domain::{RecipeId, UserId};
use crate::models::recipe::{Recipe, RecipeFields, RecipeFilter, RecipePatch};
use crate::services::image::ImageError;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Recipe not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ImageError> for RecipeError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Io(e) => Self::Internal(e.to_string()),
            other => Self::InvalidImage(other.to_string()),
        }
    }
}

/// Every operation only ever sees recipes owned by `owner`; another
/// account's recipe is indistinguishable from a missing one.
#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    async fn list(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, RecipeError>;

    async fn get(&self, owner: UserId, id: RecipeId) -> Result<Recipe, RecipeError>;

    /// # Errors
    ///
    /// Returns [`RecipeError::Validation`] for bad scalar fields or a tag or
    /// ingredient id that is not one of the owner's records.
    async fn create(&self, owner: UserId, fields: RecipeFields) -> Result<Recipe, RecipeError>;

    /// Changes only what the patch supplies; omitted associations are kept.
    async fn partial_update(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeError>;

    /// Replaces every writable field; omitted link and associations are cleared.
    async fn full_update(
        &self,
        owner: UserId,
        id: RecipeId,
        fields: RecipeFields,
    ) -> Result<Recipe, RecipeError>;

    async fn delete(&self, owner: UserId, id: RecipeId) -> Result<(), RecipeError>;

    /// Validates and stores an image, then points the recipe at it. On a
    /// rejected payload the previous image is left in place.
    async fn attach_image(
        &self,
        owner: UserId,
        id: RecipeId,
        bytes: &[u8],
    ) -> Result<Recipe, RecipeError>;
}
