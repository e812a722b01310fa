//! Demonstration driver for the account/product directory.
//!
//! # Responsibility
//! - Issue one fixed sequence of directory operations with sample data.
//! - Print operation results and the full snapshot to stdout.
//!
//! Failures inside operations never abort the sequence; the manager
//! reports them and the driver only sees the benign return values.

use acctdir_core::db::{open_db, open_db_in_memory};
use acctdir_core::{default_log_level, init_logging, DirectoryService, SqliteDirectoryStore};
use rust_decimal::Decimal;
use std::error::Error;

fn main() {
    if let Err(err) = run() {
        eprintln!("acctdir demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::temp_dir().join("acctdir-logs");
    if let Some(log_dir) = log_dir.to_str() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    // The connection lives for this scope and is released on drop, whether
    // or not any operation inside reported a failure.
    let mut conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let store = SqliteDirectoryStore::try_new(&mut conn)?;
    let mut directory = DirectoryService::new(store);

    let account = directory.create_account("mara@example.com", "Mara Quinn");
    println!("created account: {}", to_json(&account)?);

    let Some(account) = account else {
        return Ok(());
    };
    let account_id = account.account.id;

    // Same email again: the manager hands back the existing account.
    let duplicate = directory.create_account("mara@example.com", "Mara Quinn");
    println!("duplicate create: {}", to_json(&duplicate)?);

    let beans = directory.add_product(account_id, "Arabica Beans", Decimal::new(1250, 2));
    println!("added product: {}", to_json(&beans)?);

    let mug = directory.add_product(account_id, "Ceramic Mug", Decimal::new(999, 2));
    println!("added product: {}", to_json(&mug)?);

    let updated = directory.update_account(account_id, "mara.quinn@example.com", "Mara T. Quinn");
    println!("updated account: {}", to_json(&updated)?);

    if let Some(beans) = &beans {
        let renamed = directory.update_product(beans.id, "Roasted Arabica", Decimal::new(1499, 2));
        println!("updated product: {}", to_json(&renamed)?);
    }

    if let Some(snapshot) = directory.get_all_data() {
        println!("directory snapshot:\n{}", serde_json::to_string_pretty(&snapshot)?);
    }

    if let Some(mug) = &mug {
        println!("deleted product {}: {}", mug.id, directory.delete_product(mug.id));
    }

    println!(
        "deleted account {account_id}: {}",
        directory.delete_account(account_id)
    );

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, Box<dyn Error>> {
    Ok(serde_json::to_string(value)?)
}
