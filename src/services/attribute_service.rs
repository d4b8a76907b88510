//! Domain service for the per-user tag and ingredient collections.

use thiserror::Error;

use crate::domain::UserId;
use crate::models::attribute::Attribute;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AttributeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AttributeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Trims a submitted name and checks it is usable.
pub fn validate_name(name: &str) -> Result<String, AttributeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AttributeError::Validation(
            "This field may not be blank.".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AttributeError::Validation(format!(
            "Ensure this field has no more than {MAX_NAME_LEN} characters."
        )));
    }
    Ok(name.to_string())
}

/// One instance per [`AttributeKind`](crate::domain::AttributeKind); every
/// operation is scoped to `owner`.
#[async_trait::async_trait]
pub trait AttributeService: Send + Sync {
    /// Owner's records in reverse name order.
    async fn list(&self, owner: UserId, assigned_only: bool)
    -> Result<Vec<Attribute>, AttributeError>;

    /// Creates a record owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Validation`] when the name is blank or too long.
    async fn create(&self, owner: UserId, name: &str) -> Result<Attribute, AttributeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Vegan ").unwrap(), "Vegan");
    }

    #[test]
    fn test_validate_name_rejects_blank_and_long() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
        assert!(validate_name(&"x".repeat(255)).is_ok());
    }
}
