//! Account repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::Account;
use crate::auth::Role;

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. The password must already be hashed.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role: Role,
    ) -> Result<Account> {
        debug!("creating account: {}", username);

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (username, password_hash, email, role)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to insert account")?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found after creation"))
    }

    /// Get an account by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, email, role, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        Ok(account)
    }

    /// Get an account by username.
    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, email, role, created_at
            FROM accounts
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by username")?;

        Ok(account)
    }

    /// List all accounts.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, password_hash, email, role, created_at
            FROM accounts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        Ok(accounts)
    }

    /// Overwrite an account's mutable fields.
    #[instrument(skip(self, password_hash))]
    pub async fn update(
        &self,
        id: i64,
        username: &str,
        password_hash: &str,
        email: &str,
        role: Role,
    ) -> Result<Account> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = ?, password_hash = ?, email = ?, role = ?
            WHERE id = ?
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update account")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Account not found: {}", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found after update"))
    }

    /// Delete an account.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete account")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Account not found: {}", id));
        }

        Ok(())
    }

    /// Delete all accounts.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM accounts")
            .execute(&self.pool)
            .await
            .context("Failed to delete accounts")?;

        Ok(())
    }

    /// Check if a username is available.
    #[instrument(skip(self))]
    pub async fn is_username_available(&self, username: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check username availability")?;

        Ok(count.0 == 0)
    }

    /// Count total accounts.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?;

        Ok(count.0)
    }
}
