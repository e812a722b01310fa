//! Core workflow logic for the account/product directory.
//! This crate is the single source of truth for directory invariants:
//! unique emails, profile lifecycle, and child-before-parent deletion.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, Profile};
pub use model::product::{Product, ProductId};
pub use model::ValidationError;
pub use service::directory_service::{DirectoryService, DirectorySnapshot};
pub use store::directory_store::{
    AccountListQuery, AccountRecord, DirectoryStore, SqliteDirectoryStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
