use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::observability::RequestSpan;
use super::types::{CredentialsPayload, TokenDto, UserDto, UserPayload};
use super::validation::json_body;
use super::{ApiError, ApiResponse, AppState};
use crate::models::account::{Account, AccountPatch};
use crate::services::{AccountError, AuthError};

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => Self::validation(msg),
            AccountError::NotFound => Self::not_found("User"),
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::validation(err.to_string()),
            AuthError::Unauthorized => Self::Unauthorized(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the request's token to an [`Account`] and stores it as a request
/// extension. Requests without a valid token stop here with a 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(&headers) else {
        return Err(ApiError::unauthorized());
    };

    let account = state.shared.auth_service.resolve_token(&token).await?;

    if let Some(RequestSpan(span)) = request.extensions().get::<RequestSpan>() {
        span.record("user_id", account.id.value());
    }
    request.extensions_mut().insert(account);

    Ok(next.run(request).await)
}

/// Reads `Authorization: Token <key>` or `Authorization: Bearer <key>`.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/user/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload)?;

    let account = state
        .shared
        .account_service
        .create_user(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
            payload.name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(account))),
    ))
}

/// POST /api/user/token
/// Exchanges email and password for the account's token.
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<TokenDto>>, ApiError> {
    let payload = json_body(payload)?;

    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AuthError::InvalidCredentials.into());
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials.into());
    }

    let auth = &state.shared.auth_service;
    let account = auth.authenticate(&email, &password).await?;
    let token = auth.issue_token(&account).await?;

    Ok(Json(ApiResponse::success(TokenDto { token })))
}

/// GET /api/user/me
pub async fn get_me(Extension(account): Extension<Account>) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(account)))
}

/// PATCH /api/user/me
pub async fn patch_me(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let payload = json_body(payload)?;

    let patch = AccountPatch {
        email: payload.email,
        password: payload.password,
        name: payload.name,
    };
    if patch.is_empty() {
        return Ok(Json(ApiResponse::success(UserDto::from(account))));
    }

    let updated = state
        .shared
        .account_service
        .update_user(account.id, patch)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// PUT /api/user/me
/// Full replacement: email and password are required, an absent name is cleared.
pub async fn put_me(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let payload = json_body(payload)?;

    let email = payload
        .email
        .ok_or_else(|| ApiError::validation("email: This field is required."))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::validation("password: This field is required."))?;

    let updated = state
        .shared
        .account_service
        .update_user(
            account.id,
            AccountPatch {
                email: Some(email),
                password: Some(password),
                name: Some(payload.name.unwrap_or_default()),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(extract_token(&headers("Token abc")).as_deref(), Some("abc"));
        assert_eq!(extract_token(&headers("Bearer abc")).as_deref(), Some("abc"));
        assert_eq!(extract_token(&headers("token  abc ")).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_rejects_other_forms() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        assert_eq!(extract_token(&headers("Basic abc")), None);
        assert_eq!(extract_token(&headers("Token")), None);
        assert_eq!(extract_token(&headers("abc")), None);
    }
}
