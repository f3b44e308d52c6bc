//! Application state shared across handlers.

use std::sync::Arc;

use crate::account::AccountService;
use crate::auth::AuthState;
use crate::student::StudentService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account service for credential and account management.
    pub accounts: Arc<AccountService>,
    /// Student service for directory entries.
    pub students: Arc<StudentService>,
    /// Authentication state.
    pub auth: AuthState,
}

impl AppState {
    /// Create new application state.
    pub fn new(accounts: AccountService, students: StudentService, auth: AuthState) -> Self {
        Self {
            accounts: Arc::new(accounts),
            students: Arc::new(students),
            auth,
        }
    }
}
