//! Directory store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed record operations over accounts, profiles and products.
//! - Keep multi-row writes (account+profile create/update) atomic.
//!
//! # Invariants
//! - Account+Profile creation and update each run in one transaction.
//! - Unique-email and foreign-key rejections surface as semantic errors,
//!   never as raw SQLite codes.
//! - Deleting an account with live profile/product rows is rejected by the
//!   schema's foreign keys; callers must delete children first.

use crate::db::DbError;
use crate::model::account::{
    validate_display_name, validate_email, Account, AccountId, Profile,
};
use crate::model::product::{validate_price, validate_product_name, Product, ProductId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PRODUCT_SELECT_SQL: &str = "SELECT id, account_id, name, price FROM products";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by directory store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected before any SQL ran.
    Validation(ValidationError),
    /// Transport or bootstrap failure; the store is unavailable.
    Db(DbError),
    /// Unique-email constraint rejected a write.
    DuplicateEmail(String),
    /// A write referenced an account the store does not hold.
    ForeignKeyViolation(AccountId),
    /// Target account does not exist.
    AccountNotFound(AccountId),
    /// No profile row exists for the given account.
    ProfileNotFound(AccountId),
    /// Target product does not exist.
    ProductNotFound(ProductId),
    /// Required table is missing from the connection's schema.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => {
                write!(f, "email is already registered: `{email}`")
            }
            Self::ForeignKeyViolation(account_id) => {
                write!(f, "foreign key rejected write touching account {account_id}")
            }
            Self::AccountNotFound(id) => write!(f, "account not found: {id}"),
            Self::ProfileNotFound(account_id) => {
                write!(f, "no profile for account: {account_id}")
            }
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "directory store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "directory store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Composite read model: an account with its owned rows, populated according
/// to the query flags or the create/update path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    pub account: Account,
    /// `None` when the profile was not requested or not loaded.
    pub profile: Option<Profile>,
    /// Empty when products were not requested.
    pub products: Vec<Product>,
}

/// Query options for account listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountListQuery {
    pub include_profile: bool,
    pub include_products: bool,
}

/// Record-operation contract for the directory store.
///
/// Multi-row writes take `&mut self` because they need a transaction; plain
/// reads and single-statement writes borrow shared.
pub trait DirectoryStore {
    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;
    /// Inserts an account and its profile in one transaction.
    fn create_account_with_profile(&mut self, email: &str, name: &str)
        -> StoreResult<AccountRecord>;
    /// Updates account email and profile name in one transaction.
    fn update_account_and_profile(
        &mut self,
        id: AccountId,
        email: &str,
        name: &str,
    ) -> StoreResult<AccountRecord>;
    fn list_accounts(&self, query: &AccountListQuery) -> StoreResult<Vec<AccountRecord>>;
    /// Inserts a product for `account_id`; a missing owner surfaces as the
    /// store's foreign-key rejection, not a pre-check.
    fn create_product(
        &self,
        account_id: AccountId,
        name: &str,
        price: Decimal,
    ) -> StoreResult<Product>;
    fn find_product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;
    fn list_products(&self) -> StoreResult<Vec<Product>>;
    fn update_product(&self, id: ProductId, name: &str, price: Decimal) -> StoreResult<Product>;
    fn delete_product(&self, id: ProductId) -> StoreResult<()>;
    fn delete_products_by_account(&self, account_id: AccountId) -> StoreResult<usize>;
    fn delete_profile_by_account(&self, account_id: AccountId) -> StoreResult<()>;
    fn delete_account(&self, id: AccountId) -> StoreResult<()>;
}

/// SQLite-backed directory store.
pub struct SqliteDirectoryStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDirectoryStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_directory_schema(conn)?;
        Ok(Self { conn })
    }
}

impl DirectoryStore for SqliteDirectoryStore<'_> {
    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                "SELECT id, email FROM accounts WHERE email = ?1;",
                [email],
                read_account_row,
            )
            .optional()?;
        Ok(account)
    }

    fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                "SELECT id, email FROM accounts WHERE id = ?1;",
                [id],
                read_account_row,
            )
            .optional()?;
        Ok(account)
    }

    fn create_account_with_profile(
        &mut self,
        email: &str,
        name: &str,
    ) -> StoreResult<AccountRecord> {
        validate_email(email)?;
        validate_display_name(name)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Err(err) = tx.execute("INSERT INTO accounts (email) VALUES (?1);", [email]) {
            return Err(map_unique_email(err, email));
        }
        let account_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO profiles (account_id, name) VALUES (?1, ?2);",
            params![account_id, name],
        )?;
        let profile_id = tx.last_insert_rowid();

        tx.commit()?;

        Ok(AccountRecord {
            account: Account {
                id: account_id,
                email: email.to_string(),
            },
            profile: Some(Profile {
                id: profile_id,
                account_id,
                name: name.to_string(),
            }),
            products: Vec::new(),
        })
    }

    fn update_account_and_profile(
        &mut self,
        id: AccountId,
        email: &str,
        name: &str,
    ) -> StoreResult<AccountRecord> {
        validate_email(email)?;
        validate_display_name(name)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = match tx.execute(
            "UPDATE accounts
             SET email = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![email, id],
        ) {
            Ok(changed) => changed,
            Err(err) => return Err(map_unique_email(err, email)),
        };
        if changed == 0 {
            return Err(StoreError::AccountNotFound(id));
        }

        let changed = tx.execute(
            "UPDATE profiles
             SET name = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE account_id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(StoreError::ProfileNotFound(id));
        }

        let profile = tx.query_row(
            "SELECT id, account_id, name FROM profiles WHERE account_id = ?1;",
            [id],
            read_profile_row,
        )?;

        tx.commit()?;

        Ok(AccountRecord {
            account: Account {
                id,
                email: email.to_string(),
            },
            profile: Some(profile),
            products: Vec::new(),
        })
    }

    fn list_accounts(&self, query: &AccountListQuery) -> StoreResult<Vec<AccountRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email FROM accounts ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let account = read_account_row(row)?;
            let profile = if query.include_profile {
                load_profile(self.conn, account.id)?
            } else {
                None
            };
            let products = if query.include_products {
                load_products_for_account(self.conn, account.id)?
            } else {
                Vec::new()
            };
            records.push(AccountRecord {
                account,
                profile,
                products,
            });
        }

        Ok(records)
    }

    fn create_product(
        &self,
        account_id: AccountId,
        name: &str,
        price: Decimal,
    ) -> StoreResult<Product> {
        validate_product_name(name)?;
        validate_price(price)?;

        if let Err(err) = self.conn.execute(
            "INSERT INTO products (account_id, name, price) VALUES (?1, ?2, ?3);",
            params![account_id, name, price.to_string()],
        ) {
            if is_foreign_key_violation(&err) {
                return Err(StoreError::ForeignKeyViolation(account_id));
            }
            return Err(err.into());
        }

        Ok(Product {
            id: self.conn.last_insert_rowid(),
            account_id,
            name: name.to_string(),
            price,
        })
    }

    fn find_product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = self
            .conn
            .query_row(
                &format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_product_columns,
            )
            .optional()?;

        match row {
            Some(columns) => Ok(Some(product_from_columns(columns)?)),
            None => Ok(None),
        }
    }

    fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(product_from_columns(read_product_columns(row)?)?);
        }

        Ok(products)
    }

    fn update_product(&self, id: ProductId, name: &str, price: Decimal) -> StoreResult<Product> {
        validate_product_name(name)?;
        validate_price(price)?;

        let changed = self.conn.execute(
            "UPDATE products
             SET name = ?1, price = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![name, price.to_string(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::ProductNotFound(id));
        }

        self.find_product_by_id(id)?
            .ok_or(StoreError::ProductNotFound(id))
    }

    fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::ProductNotFound(id));
        }
        Ok(())
    }

    fn delete_products_by_account(&self, account_id: AccountId) -> StoreResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE account_id = ?1;", [account_id])?;
        Ok(deleted)
    }

    fn delete_profile_by_account(&self, account_id: AccountId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM profiles WHERE account_id = ?1;", [account_id])?;
        if changed == 0 {
            return Err(StoreError::ProfileNotFound(account_id));
        }
        Ok(())
    }

    fn delete_account(&self, id: AccountId) -> StoreResult<()> {
        let changed = match self.conn.execute("DELETE FROM accounts WHERE id = ?1;", [id]) {
            Ok(changed) => changed,
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(StoreError::ForeignKeyViolation(id));
            }
            Err(err) => return Err(err.into()),
        };
        if changed == 0 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }
}

fn read_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        email: row.get("email")?,
    })
}

fn read_profile_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get("id")?,
        account_id: row.get("account_id")?,
        name: row.get("name")?,
    })
}

/// Raw product columns before price parsing; price stays text here because
/// row-mapping closures can only fail with `rusqlite::Error`.
type ProductColumns = (ProductId, AccountId, String, String);

fn read_product_columns(row: &Row<'_>) -> rusqlite::Result<ProductColumns> {
    Ok((
        row.get("id")?,
        row.get("account_id")?,
        row.get("name")?,
        row.get("price")?,
    ))
}

fn product_from_columns(columns: ProductColumns) -> StoreResult<Product> {
    let (id, account_id, name, price_text) = columns;
    let price = price_text.parse::<Decimal>().map_err(|_| {
        StoreError::InvalidData(format!(
            "unparseable price `{price_text}` in products.price for product {id}"
        ))
    })?;
    Ok(Product {
        id,
        account_id,
        name,
        price,
    })
}

fn load_profile(conn: &Connection, account_id: AccountId) -> StoreResult<Option<Profile>> {
    let profile = conn
        .query_row(
            "SELECT id, account_id, name FROM profiles WHERE account_id = ?1;",
            [account_id],
            read_profile_row,
        )
        .optional()?;
    Ok(profile)
}

fn load_products_for_account(
    conn: &Connection,
    account_id: AccountId,
) -> StoreResult<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "{PRODUCT_SELECT_SQL} WHERE account_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([account_id])?;
    let mut products = Vec::new();
    while let Some(row) = rows.next()? {
        products.push(product_from_columns(read_product_columns(row)?)?);
    }
    Ok(products)
}

fn map_unique_email(err: rusqlite::Error, email: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicateEmail(email.to_string())
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn ensure_directory_schema(conn: &Connection) -> StoreResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        ("accounts", &["id", "email"]),
        ("profiles", &["id", "account_id", "name"]),
        ("products", &["id", "account_id", "name", "price"]),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
