use acctdir_core::db::open_db_in_memory;
use acctdir_core::{DirectoryStore, SqliteDirectoryStore, StoreError};
use rusqlite::Connection;
use rust_decimal_macros::dec;

#[test]
fn create_product_for_missing_account_fails_and_stores_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

        let err = store
            .create_product(42, "Orphan Widget", dec!(10))
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(42)));
        assert!(store.list_products().unwrap().is_empty());
    }

    assert_eq!(count_rows(&conn, "products"), 0);
}

#[test]
fn product_roundtrip_preserves_exact_decimal_price() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let account = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();

    let created = store
        .create_product(account.account.id, "Arabica Beans", dec!(9.99))
        .unwrap();
    assert_eq!(created.id, 1);

    let loaded = store
        .find_product_by_id(created.id)
        .unwrap()
        .expect("product is findable by id");
    assert_eq!(loaded, created);
    assert_eq!(loaded.price, dec!(9.99));

    // Prices that float arithmetic would mangle survive the text roundtrip.
    let precise = store
        .create_product(account.account.id, "Sample Grinder", dec!(123.456789))
        .unwrap();
    let loaded = store.find_product_by_id(precise.id).unwrap().unwrap();
    assert_eq!(loaded.price, dec!(123.456789));
}

#[test]
fn list_products_returns_all_rows_in_id_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let account = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();
    store
        .create_product(account.account.id, "Arabica Beans", dec!(12.50))
        .unwrap();
    store
        .create_product(account.account.id, "Ceramic Mug", dec!(9.99))
        .unwrap();

    let products = store.list_products().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Arabica Beans");
    assert_eq!(products[1].name, "Ceramic Mug");
    assert!(products[0].id < products[1].id);
}

#[test]
fn update_product_overwrites_name_and_price() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let account = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();
    let product = store
        .create_product(account.account.id, "Arabica Beans", dec!(12.50))
        .unwrap();

    let updated = store
        .update_product(product.id, "Roasted Arabica", dec!(14.99))
        .unwrap();
    assert_eq!(updated.id, product.id);
    assert_eq!(updated.account_id, account.account.id);
    assert_eq!(updated.name, "Roasted Arabica");
    assert_eq!(updated.price, dec!(14.99));
}

#[test]
fn update_and_delete_on_missing_product_return_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    assert!(matches!(
        store.update_product(77, "Ghost", dec!(1)).unwrap_err(),
        StoreError::ProductNotFound(77)
    ));
    assert!(matches!(
        store.delete_product(77).unwrap_err(),
        StoreError::ProductNotFound(77)
    ));
}

#[test]
fn delete_product_removes_exactly_one_row() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let account = store
        .create_account_with_profile("mara@example.com", "Mara Quinn")
        .unwrap();
    let keep = store
        .create_product(account.account.id, "Arabica Beans", dec!(12.50))
        .unwrap();
    let gone = store
        .create_product(account.account.id, "Ceramic Mug", dec!(9.99))
        .unwrap();

    store.delete_product(gone.id).unwrap();

    assert!(store.find_product_by_id(gone.id).unwrap().is_none());
    assert!(store.find_product_by_id(keep.id).unwrap().is_some());
    assert!(matches!(
        store.delete_product(gone.id).unwrap_err(),
        StoreError::ProductNotFound(_)
    ));
}

#[test]
fn delete_products_by_account_only_touches_that_account() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();

    let first = store
        .create_account_with_profile("first@example.com", "First")
        .unwrap();
    let second = store
        .create_account_with_profile("second@example.com", "Second")
        .unwrap();
    store
        .create_product(first.account.id, "Arabica Beans", dec!(12.50))
        .unwrap();
    store
        .create_product(first.account.id, "Ceramic Mug", dec!(9.99))
        .unwrap();
    let kept = store
        .create_product(second.account.id, "Pour-over Kit", dec!(24.00))
        .unwrap();

    assert_eq!(store.delete_products_by_account(first.account.id).unwrap(), 2);

    let remaining = store.list_products().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
}

#[test]
fn invalid_product_input_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteDirectoryStore::try_new(&mut conn).unwrap();
        let account = store
            .create_account_with_profile("mara@example.com", "Mara Quinn")
            .unwrap();

        assert!(matches!(
            store.create_product(account.account.id, "  ", dec!(1)).unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(matches!(
            store
                .create_product(account.account.id, "Arabica Beans", dec!(-0.01))
                .unwrap_err(),
            StoreError::Validation(_)
        ));
    }

    assert_eq!(count_rows(&conn, "products"), 0);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
