//! Login, logout, and session inspection handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::auth::{AuthError, MaybeUser, Role};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub email: String,
    pub id: i64,
}

/// Logout acknowledgement.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Current session report.
#[derive(Debug, Serialize)]
pub struct CurrentSessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Login endpoint.
///
/// An unknown username and a wrong password produce the same 401 so
/// callers cannot enumerate accounts.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let account = state
        .accounts
        .verify_credentials(&request.username, &request.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let role = account.role();
    let token = state.auth.issue_token(&account.username, role)?;

    info!(account_id = account.id, "Account logged in");

    Ok(Json(LoginResponse {
        token,
        role,
        email: account.email,
        id: account.id,
    }))
}

/// Logout endpoint.
///
/// Unconditionally idempotent: a missing or malformed Authorization
/// header means there is no session to end, which is still a success.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    let header_value = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    if state.auth.revoke_from_header(header_value) {
        info!("Session token revoked");
    }

    Json(LogoutResponse {
        message: "The account has been disconnected and the token is no more valid".to_string(),
    })
}

/// Report the current session's principal, if any.
pub async fn current_session(MaybeUser(user): MaybeUser) -> Json<CurrentSessionResponse> {
    match user {
        Some(user) => Json(CurrentSessionResponse {
            authenticated: true,
            username: Some(user.username().to_string()),
            role: Some(user.role()),
        }),
        None => Json(CurrentSessionResponse {
            authenticated: false,
            username: None,
            role: None,
        }),
    }
}
