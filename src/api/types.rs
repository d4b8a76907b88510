use serde::{Deserialize, Serialize};

use crate::domain::Price;
use crate::models::account::Account;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public view of an account. The password never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub email: String,
    pub name: String,
}

impl From<Account> for UserDto {
    fn from(account: Account) -> Self {
        Self {
            email: account.email,
            name: account.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenDto {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

/// Body for signup and profile updates. Every field is optional at the wire
/// level; handlers decide which ones are required.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NamePayload {
    pub name: Option<String>,
}

/// Body for recipe create, PATCH and PUT.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributeListQuery {
    pub assigned_only: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub ready: bool,
    pub database: bool,
    pub uptime_seconds: u64,
}
