//! Store layer: record-operation contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the uniform record-operation contract the workflow layer
//!   composes against.
//! - Isolate SQLite query details from workflow orchestration.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation runs.
//! - Store APIs return semantic errors (`AccountNotFound`, `DuplicateEmail`,
//!   `ForeignKeyViolation`) in addition to DB transport errors.

pub mod directory_store;
