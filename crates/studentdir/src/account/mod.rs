//! Account management module.
//!
//! Provides account CRUD, credential verification, and the bootstrap
//! administrator seed.

mod models;
mod repository;
mod service;

pub use models::{Account, AccountInfo, CreateAccountRequest, UpdateAccountRequest};
pub use repository::AccountRepository;
pub use service::AccountService;
