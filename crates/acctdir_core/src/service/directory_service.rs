//! Directory manager workflow.
//!
//! # Responsibility
//! - Provide the account/product CRUD workflow over any `DirectoryStore`.
//! - Enforce the deletion order that keeps referential integrity intact:
//!   products, then profile, then account.
//!
//! # Invariants
//! - No operation lets a failure escape its own boundary: every store error
//!   is reported through the log facade and converted to a benign return
//!   (`None` / `false`). Callers learn the outcome only from the value.
//! - Create is duplicate-tolerant by email: an existing account is returned
//!   unchanged instead of raising.
//! - All operations are safe to invoke twice in a row.

use crate::model::account::AccountId;
use crate::model::product::{Product, ProductId};
use crate::store::directory_store::{AccountListQuery, AccountRecord, DirectoryStore};
use log::{error, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of the two-query full read: accounts with their owned rows, plus
/// the flat product listing. The queries run back to back without a shared
/// snapshot, so the product list may reflect a slightly later state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySnapshot {
    pub accounts: Vec<AccountRecord>,
    pub products: Vec<Product>,
}

/// Account/product directory manager over a substitutable store.
///
/// The store handle is passed in explicitly so the workflow carries no
/// hidden global state and tests can supply any implementation.
pub struct DirectoryService<S: DirectoryStore> {
    store: S,
}

impl<S: DirectoryStore> DirectoryService<S> {
    /// Creates a manager using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an account with its profile, deduplicating by email.
    ///
    /// An account already registered under `email` is returned unchanged
    /// (without loading its profile, matching the bare lookup used for the
    /// existence check). Store failures are reported and yield `None`.
    pub fn create_account(&mut self, email: &str, name: &str) -> Option<AccountRecord> {
        let existing = match self.store.find_account_by_email(email) {
            Ok(existing) => existing,
            Err(err) => {
                error!("event=account_create module=directory status=error stage=lookup error={err}");
                return None;
            }
        };

        if let Some(account) = existing {
            warn!(
                "event=account_create module=directory status=skip reason=email_registered account_id={}",
                account.id
            );
            return Some(AccountRecord {
                account,
                profile: None,
                products: Vec::new(),
            });
        }

        match self.store.create_account_with_profile(email, name) {
            Ok(record) => {
                info!(
                    "event=account_create module=directory status=ok account_id={}",
                    record.account.id
                );
                Some(record)
            }
            Err(err) => {
                error!("event=account_create module=directory status=error error={err}");
                None
            }
        }
    }

    /// Adds a product owned by `account_id`.
    ///
    /// The owner is not pre-checked; a missing account surfaces as the
    /// store's foreign-key rejection, which is reported here.
    pub fn add_product(
        &mut self,
        account_id: AccountId,
        name: &str,
        price: Decimal,
    ) -> Option<Product> {
        match self.store.create_product(account_id, name, price) {
            Ok(product) => {
                info!(
                    "event=product_add module=directory status=ok product_id={} account_id={account_id}",
                    product.id
                );
                Some(product)
            }
            Err(err) => {
                error!(
                    "event=product_add module=directory status=error account_id={account_id} error={err}"
                );
                None
            }
        }
    }

    /// Reads every account (with profile and products) and the flat product
    /// list in two independent queries.
    pub fn get_all_data(&mut self) -> Option<DirectorySnapshot> {
        let query = AccountListQuery {
            include_profile: true,
            include_products: true,
        };
        let accounts = match self.store.list_accounts(&query) {
            Ok(accounts) => accounts,
            Err(err) => {
                error!("event=directory_read module=directory status=error stage=accounts error={err}");
                return None;
            }
        };
        let products = match self.store.list_products() {
            Ok(products) => products,
            Err(err) => {
                error!("event=directory_read module=directory status=error stage=products error={err}");
                return None;
            }
        };

        info!(
            "event=directory_read module=directory status=ok accounts={} products={}",
            accounts.len(),
            products.len()
        );
        Some(DirectorySnapshot { accounts, products })
    }

    /// Updates account email and profile name together.
    ///
    /// Aborts with a warning when `new_email` already belongs to a
    /// different account; changing an account to its own current email is
    /// permitted.
    pub fn update_account(
        &mut self,
        account_id: AccountId,
        new_email: &str,
        new_name: &str,
    ) -> Option<AccountRecord> {
        match self.store.find_account_by_email(new_email) {
            Ok(Some(owner)) if owner.id != account_id => {
                warn!(
                    "event=account_update module=directory status=skip reason=email_taken account_id={account_id} owner_id={}",
                    owner.id
                );
                return None;
            }
            Ok(_) => {}
            Err(err) => {
                error!("event=account_update module=directory status=error stage=lookup account_id={account_id} error={err}");
                return None;
            }
        }

        match self
            .store
            .update_account_and_profile(account_id, new_email, new_name)
        {
            Ok(record) => {
                info!("event=account_update module=directory status=ok account_id={account_id}");
                Some(record)
            }
            Err(err) => {
                error!(
                    "event=account_update module=directory status=error account_id={account_id} error={err}"
                );
                None
            }
        }
    }

    /// Overwrites product name and price.
    ///
    /// A missing product is reported as a warning and the call no-ops.
    pub fn update_product(
        &mut self,
        product_id: ProductId,
        new_name: &str,
        new_price: Decimal,
    ) -> Option<Product> {
        match self.store.find_product_by_id(product_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(
                    "event=product_update module=directory status=skip reason=not_found product_id={product_id}"
                );
                return None;
            }
            Err(err) => {
                error!("event=product_update module=directory status=error stage=lookup product_id={product_id} error={err}");
                return None;
            }
        }

        match self.store.update_product(product_id, new_name, new_price) {
            Ok(product) => {
                info!("event=product_update module=directory status=ok product_id={product_id}");
                Some(product)
            }
            Err(err) => {
                error!(
                    "event=product_update module=directory status=error product_id={product_id} error={err}"
                );
                None
            }
        }
    }

    /// Deletes one product after an existence pre-check.
    ///
    /// Returns `true` only when a row was actually removed.
    pub fn delete_product(&mut self, product_id: ProductId) -> bool {
        match self.store.find_product_by_id(product_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(
                    "event=product_delete module=directory status=skip reason=not_found product_id={product_id}"
                );
                return false;
            }
            Err(err) => {
                error!("event=product_delete module=directory status=error stage=lookup product_id={product_id} error={err}");
                return false;
            }
        }

        match self.store.delete_product(product_id) {
            Ok(()) => {
                info!("event=product_delete module=directory status=ok product_id={product_id}");
                true
            }
            Err(err) => {
                error!(
                    "event=product_delete module=directory status=error product_id={product_id} error={err}"
                );
                false
            }
        }
    }

    /// Deletes an account and everything it owns, in the only order the
    /// store's foreign keys accept: products, then profile, then account.
    ///
    /// There is no compensating transaction; a failure after the first step
    /// leaves the earlier deletions in place and returns `false`.
    pub fn delete_account(&mut self, account_id: AccountId) -> bool {
        let deleted_products = match self.store.delete_products_by_account(account_id) {
            Ok(count) => count,
            Err(err) => {
                error!("event=account_delete module=directory status=error stage=products account_id={account_id} error={err}");
                return false;
            }
        };

        if let Err(err) = self.store.delete_profile_by_account(account_id) {
            error!(
                "event=account_delete module=directory status=error stage=profile account_id={account_id} deleted_products={deleted_products} error={err}"
            );
            return false;
        }

        if let Err(err) = self.store.delete_account(account_id) {
            error!(
                "event=account_delete module=directory status=error stage=account account_id={account_id} error={err}"
            );
            return false;
        }

        info!(
            "event=account_delete module=directory status=ok account_id={account_id} deleted_products={deleted_products}"
        );
        true
    }

    /// Hands the store back, releasing the manager.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Shared access to the underlying store, mainly for read-backs.
    pub fn store(&self) -> &S {
        &self.store
    }
}
