//! Domain model for the account directory.
//!
//! # Responsibility
//! - Define the canonical Account/Profile/Product records.
//! - Validate caller input before it reaches persistence.
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - A Profile or Product never exists without an owning Account.

use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account;
pub mod product;

/// Input validation failure, raised by store write paths before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email is empty or whitespace-only.
    EmailEmpty,
    /// Email does not match the minimal `local@domain.tld` shape.
    EmailMalformed(String),
    /// Profile display name is empty after trimming.
    DisplayNameEmpty,
    /// Product name is empty after trimming.
    ProductNameEmpty,
    /// Product price is negative.
    PriceNegative(Decimal),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "email must not be empty"),
            Self::EmailMalformed(email) => write!(f, "malformed email: `{email}`"),
            Self::DisplayNameEmpty => write!(f, "display name must not be empty"),
            Self::ProductNameEmpty => write!(f, "product name must not be empty"),
            Self::PriceNegative(price) => write!(f, "price must not be negative, got {price}"),
        }
    }
}

impl Error for ValidationError {}
