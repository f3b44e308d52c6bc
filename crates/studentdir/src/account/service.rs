//! Account service for business logic.

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use super::models::{Account, CreateAccountRequest, UpdateAccountRequest};
use super::repository::AccountRepository;
use crate::auth::Role;

/// Username of the bootstrap administrator account.
const BOOTSTRAP_USERNAME: &str = "admin";
const BOOTSTRAP_PASSWORD: &str = "admin";
const BOOTSTRAP_EMAIL: &str = "admin@email.com";

/// Service for account management operations.
#[derive(Debug, Clone)]
pub struct AccountService {
    repo: AccountRepository,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(repo: AccountRepository) -> Self {
        Self { repo }
    }

    /// Create a new account with a hashed password.
    ///
    /// The role is derived from the username: names containing `admin`
    /// or `administrator` become administrators, everyone else is a
    /// regular user.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn save_account(&self, request: CreateAccountRequest) -> Result<Account> {
        if !is_valid_username(&request.username) {
            bail!("Invalid username format. Must be 3-50 alphanumeric characters, underscores, or hyphens.");
        }

        if request.password.is_empty() {
            bail!("Password cannot be empty.");
        }

        if !self.repo.is_username_available(&request.username).await? {
            bail!("Username '{}' is already taken.", request.username);
        }

        let role = role_for_username(&request.username);
        let password_hash = hash_password(&request.password)?;

        let account = self
            .repo
            .create(&request.username, &password_hash, &request.email, role)
            .await?;
        info!(account_id = account.id, username = %account.username, role = %role, "Created account");

        Ok(account)
    }

    /// Get an account by ID.
    #[instrument(skip(self))]
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.repo.get(id).await
    }

    /// Get an account by username.
    #[instrument(skip(self))]
    pub async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.repo.get_by_username(username).await
    }

    /// List all accounts.
    #[instrument(skip(self))]
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repo.list().await
    }

    /// Edit an existing account.
    ///
    /// The supplied password is re-hashed and the role re-derived from
    /// the (possibly new) username. Returns `None` when the account does
    /// not exist.
    #[instrument(skip(self, request), fields(account_id = request.id))]
    pub async fn edit_account(&self, request: UpdateAccountRequest) -> Result<Option<Account>> {
        let Some(existing) = self.repo.get(request.id).await? else {
            return Ok(None);
        };

        if !is_valid_username(&request.username) {
            bail!("Invalid username format.");
        }

        if request.password.is_empty() {
            bail!("Password cannot be empty.");
        }

        // The new username must not collide with another account.
        if request.username != existing.username {
            if let Some(other) = self.repo.get_by_username(&request.username).await? {
                if other.id != request.id {
                    bail!("Username '{}' is already taken.", request.username);
                }
            }
        }

        let role = role_for_username(&request.username);
        let password_hash = hash_password(&request.password)?;

        let account = self
            .repo
            .update(
                request.id,
                &request.username,
                &password_hash,
                &request.email,
                role,
            )
            .await?;
        info!(account_id = account.id, "Updated account");

        Ok(Some(account))
    }

    /// Delete an account.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        info!(account_id = id, "Deleted account");
        Ok(())
    }

    /// Delete all accounts and recreate the bootstrap administrator.
    #[instrument(skip(self))]
    pub async fn clear_accounts(&self) -> Result<Account> {
        self.repo.delete_all().await?;
        warn!("Deleted all accounts");

        self.save_account(CreateAccountRequest {
            username: BOOTSTRAP_USERNAME.to_string(),
            password: BOOTSTRAP_PASSWORD.to_string(),
            email: BOOTSTRAP_EMAIL.to_string(),
        })
        .await
    }

    /// Seed the bootstrap administrator when the table is empty.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<()> {
        if self.repo.count().await? == 0 {
            let account = self
                .save_account(CreateAccountRequest {
                    username: BOOTSTRAP_USERNAME.to_string(),
                    password: BOOTSTRAP_PASSWORD.to_string(),
                    email: BOOTSTRAP_EMAIL.to_string(),
                })
                .await?;
            info!(account_id = account.id, "Seeded bootstrap admin account");
        }
        Ok(())
    }

    /// Verify login credentials.
    ///
    /// Returns the account when the username exists and the password
    /// matches its hash. An unknown username and a wrong password are
    /// indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let account = self.repo.get_by_username(username).await?;

        match account {
            Some(account) if verify_password(password, &account.password_hash) => {
                Ok(Some(account))
            }
            _ => Ok(None),
        }
    }
}

/// Derive an account role from its username.
fn role_for_username(username: &str) -> Role {
    let lower = username.to_lowercase();
    if lower.contains("admin") || lower.contains("administrator") {
        Role::Admin
    } else {
        Role::User
    }
}

/// Validate username format.
fn is_valid_username(username: &str) -> bool {
    let len = username.len();
    if !(3..=50).contains(&len) {
        return false;
    }

    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Hash a password using bcrypt.
fn hash_password(password: &str) -> Result<String> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash.
///
/// A malformed hash fails closed: the answer is "no match", never an
/// error the caller could mistake for success.
fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_service() -> AccountService {
        let db = Database::in_memory().await.unwrap();
        AccountService::new(AccountRepository::new(db.pool().clone()))
    }

    fn create_request(username: &str, password: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: format!("{}@example.com", username),
        }
    }

    #[test]
    fn test_role_for_username() {
        assert_eq!(role_for_username("admin"), Role::Admin);
        assert_eq!(role_for_username("site-administrator"), Role::Admin);
        assert_eq!(role_for_username("ADMIN42"), Role::Admin);
        assert_eq!(role_for_username("alice"), Role::User);
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("user_name-1"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("has@symbol"));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_fails_closed_on_malformed_hash() {
        assert!(!verify_password("secret", "not-a-bcrypt-hash"));
        assert!(!verify_password("secret", ""));
    }

    #[tokio::test]
    async fn test_save_account_assigns_roles() {
        let service = setup_service().await;

        let admin = service
            .save_account(create_request("admin", "admin"))
            .await
            .unwrap();
        assert_eq!(admin.role(), Role::Admin);

        let user = service
            .save_account(create_request("alice", "pw"))
            .await
            .unwrap();
        assert_eq!(user.role(), Role::User);
    }

    #[tokio::test]
    async fn test_save_account_rejects_duplicate_username() {
        let service = setup_service().await;
        service
            .save_account(create_request("alice", "pw"))
            .await
            .unwrap();

        let err = service
            .save_account(create_request("alice", "pw2"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let service = setup_service().await;
        service
            .save_account(create_request("alice", "correct-horse"))
            .await
            .unwrap();

        let ok = service
            .verify_credentials("alice", "correct-horse")
            .await
            .unwrap();
        assert!(ok.is_some());

        let wrong = service
            .verify_credentials("alice", "battery-staple")
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = service
            .verify_credentials("nobody", "correct-horse")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_edit_account_rehashes_and_rederives_role() {
        let service = setup_service().await;
        let account = service
            .save_account(create_request("alice", "pw"))
            .await
            .unwrap();

        let edited = service
            .edit_account(UpdateAccountRequest {
                id: account.id,
                username: "alice-admin".to_string(),
                password: "newpw".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(edited.role(), Role::Admin);
        assert!(
            service
                .verify_credentials("alice-admin", "newpw")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_edit_missing_account_is_none() {
        let service = setup_service().await;
        let result = service
            .edit_account(UpdateAccountRequest {
                id: 999,
                username: "ghost".to_string(),
                password: "pw".to_string(),
                email: String::new(),
            })
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_clear_recreates_bootstrap_admin() {
        let service = setup_service().await;
        service
            .save_account(create_request("alice", "pw"))
            .await
            .unwrap();
        service
            .save_account(create_request("bob", "pw"))
            .await
            .unwrap();

        let generic = service.clear_accounts().await.unwrap();
        assert_eq!(generic.username, "admin");
        assert_eq!(generic.role(), Role::Admin);

        let all = service.list_accounts().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_once() {
        let service = setup_service().await;
        service.bootstrap().await.unwrap();
        service.bootstrap().await.unwrap();

        let all = service.list_accounts().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(
            service
                .verify_credentials("admin", "admin")
                .await
                .unwrap()
                .is_some()
        );
    }
}
