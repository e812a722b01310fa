use acctdir_core::db::open_db_in_memory;
use acctdir_core::{AccountListQuery, DirectoryStore, SqliteDirectoryStore, StoreError};
use rusqlite::Connection;
use rust_decimal_macros::dec;

#[test]
fn create_account_with_profile_writes_both_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let record = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();

    assert_eq!(record.account.id, 1);
    assert_eq!(record.account.email, "mara@example.com");
    let profile = record.profile.expect("create returns the profile");
    assert_eq!(profile.account_id, record.account.id);
    assert_eq!(profile.name, "Mara Quinn");
    assert!(record.products.is_empty());

    let found = store
        .find_account_by_email("mara@example.com")
        .unwrap()
        .expect("account is findable by email");
    assert_eq!(found.id, record.account.id);
    assert_eq!(
        store.find_account_by_id(record.account.id).unwrap(),
        Some(found)
    );
}

#[test]
fn duplicate_email_is_rejected_and_leaves_no_partial_rows() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();
        store
            .create_account_with_profile("mara@example.com", "Mara Quinn")
            .unwrap();

        let err = store
            .create_account_with_profile("mara@example.com", "Impostor")
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(email) if email == "mara@example.com"));
    }

    assert_eq!(count_rows(&conn, "accounts"), 1);
    assert_eq!(count_rows(&conn, "profiles"), 1);
}

#[test]
fn email_uniqueness_is_case_sensitive() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();
    let upper = store
        .create_account_with_profile("MARA@example.com", "Other Mara")
        .unwrap();

    assert_eq!(upper.account.id, 2);
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

        let err = store.create_account_with_profile("not-an-email", "Mara").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = store
            .create_account_with_profile("mara@example.com", "   ")
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    assert_eq!(count_rows(&conn, "accounts"), 0);
    assert_eq!(count_rows(&conn, "profiles"), 0);
}

#[test]
fn update_account_and_profile_updates_both_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let created = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();

    let updated = store
        .update_account_and_profile(created.account.id, "mara.quinn@example.com", "Mara T. Quinn")
        .unwrap();

    assert_eq!(updated.account.email, "mara.quinn@example.com");
    assert_eq!(updated.profile.as_ref().unwrap().name, "Mara T. Quinn");

    let reread = store
        .find_account_by_email("mara.quinn@example.com")
        .unwrap();
    assert!(reread.is_some());
    assert!(store.find_account_by_email("mara@example.com").unwrap().is_none());
}

#[test]
fn update_missing_account_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let err = store
        .update_account_and_profile(42, "ghost@example.com", "Ghost")
        .unwrap_err();
    assert!(matches!(err, StoreError::AccountNotFound(42)));
}

#[test]
fn update_with_missing_profile_rolls_back_the_email_change() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();
        let created = store
            .create_account_with_profile("mara@example.com", "Mara Quinn")
            .unwrap();
        store.delete_profile_by_account(created.account.id).unwrap();

        let err = store
            .update_account_and_profile(created.account.id, "new@example.com", "New Name")
            .unwrap_err();
        assert!(matches!(err, StoreError::ProfileNotFound(id) if id == created.account.id));
    }

    // Both statements ran in one transaction, so the email update is gone too.
    let email: String = conn
        .query_row("SELECT email FROM accounts WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(email, "mara@example.com");
}

#[test]
fn update_to_email_of_other_account_is_rejected_by_unique_index() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    store
        .create_account_with_profile("first@example.com", "First")
        .unwrap();
    let second = store
        .create_account_with_profile("second@example.com", "Second")
        .unwrap();

    let err = store
        .update_account_and_profile(second.account.id, "first@example.com", "Second")
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(email) if email == "first@example.com"));
}

#[test]
fn list_accounts_populates_owned_rows_per_query_flags() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let first = store
        .create_account_with_profile("first@example.com", "First")
        .unwrap();
    store
        .create_account_with_profile("second@example.com", "Second")
        .unwrap();
    store
        .create_product(first.account.id, "Arabica Beans", dec!(12.50))
        .unwrap();

    let bare = store.list_accounts(&AccountListQuery::default()).unwrap();
    assert_eq!(bare.len(), 2);
    assert!(bare.iter().all(|record| record.profile.is_none()));
    assert!(bare.iter().all(|record| record.products.is_empty()));

    let full = store
        .list_accounts(&AccountListQuery {
            include_profile: true,
            include_products: true,
        })
        .unwrap();
    assert_eq!(full[0].account.id, first.account.id);
    assert_eq!(full[0].profile.as_ref().unwrap().name, "First");
    assert_eq!(full[0].products.len(), 1);
    assert_eq!(full[1].profile.as_ref().unwrap().name, "Second");
    assert!(full[1].products.is_empty());
}

#[test]
fn delete_account_with_live_children_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let created = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();
    let account_id = created.account.id;
    store
        .create_product(account_id, "Arabica Beans", dec!(12.50))
        .unwrap();

    let err = store.delete_account(account_id).unwrap_err();
    assert!(matches!(err, StoreError::ForeignKeyViolation(id) if id == account_id));

    // Children first, then the account goes through.
    assert_eq!(store.delete_products_by_account(account_id).unwrap(), 1);
    store.delete_profile_by_account(account_id).unwrap();
    store.delete_account(account_id).unwrap();
    assert!(store.find_account_by_id(account_id).unwrap().is_none());
}

#[test]
fn delete_missing_rows_report_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    assert!(matches!(
        store.delete_profile_by_account(7).unwrap_err(),
        StoreError::ProfileNotFound(7)
    ));
    assert!(matches!(
        store.delete_account(7).unwrap_err(),
        StoreError::AccountNotFound(7)
    ));
    assert_eq!(store.delete_products_by_account(7).unwrap(), 0);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
