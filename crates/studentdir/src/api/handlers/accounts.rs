//! Account management handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::account::{AccountInfo, CreateAccountRequest, UpdateAccountRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{CurrentUser, RequireAdmin, Role};

/// Query parameter carrying an entity id.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

/// Request body for the role lookup.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub username: String,
}

/// Role lookup response.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// List all accounts. Admin only.
#[instrument(skip(state, _admin))]
pub async fn list_accounts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AccountInfo>>> {
    let accounts = state.accounts.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountInfo::from).collect()))
}

/// Look up an account's role by username.
#[instrument(skip(state, _user, request))]
pub async fn account_role(
    _user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let account = state
        .accounts
        .get_account_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {}", request.username)))?;

    Ok(Json(RoleResponse {
        role: account.role(),
    }))
}

/// Register a new account. Open to everyone.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn save_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountInfo>)> {
    let account = state.accounts.save_account(request).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Edit an existing account.
#[instrument(skip(state, _user, request), fields(account_id = request.id))]
pub async fn edit_account(
    _user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountInfo>> {
    let id = request.id;
    let account = state
        .accounts
        .edit_account(request)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account not found: {}", id)))?;

    Ok(Json(account.into()))
}

/// Delete an account by id. Admin only.
#[instrument(skip(state, _admin))]
pub async fn delete_account(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    state.accounts.delete_account(query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every account and recreate the bootstrap administrator.
/// Admin only. The caller's own session is revoked first since its
/// account is about to disappear.
#[instrument(skip(state, _admin, headers))]
pub async fn clear_accounts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AccountInfo>> {
    let header_value = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    state.auth.revoke_from_header(header_value);

    let generic = state.accounts.clear_accounts().await?;
    info!("All accounts deleted, bootstrap admin recreated");

    Ok(Json(generic.into()))
}
