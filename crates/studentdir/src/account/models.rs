//! Account entity and request/response types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Role;

/// Account database row.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl Account {
    /// Parsed role; unknown values fall back to the regular-user role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Request body for editing an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub id: i64,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Account as exposed over the API (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        let role = account.role();
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            role,
        }
    }
}
