//! Account and Profile records.
//!
//! # Responsibility
//! - Define the top-level directory entity and its one-to-one profile.
//! - Provide email/name validation shared by all account write paths.
//!
//! # Invariants
//! - `email` is unique across accounts (case-sensitive, enforced by the
//!   store's unique index).
//! - Exactly one Profile row exists per Account while the Account lives.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Store-assigned account identifier.
pub type AccountId = i64;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Top-level directory entity, identified by unique email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable id assigned by the store on insert.
    pub id: AccountId,
    /// Unique address; uniqueness is case-sensitive.
    pub email: String,
}

/// One-to-one descriptive record owned by an Account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    /// Owning account; the store enforces the reference.
    pub account_id: AccountId,
    /// Display name shown for the account.
    pub name: String,
}

/// Checks the minimal shape of an email address.
///
/// This is a plausibility gate, not RFC validation: non-empty local part,
/// one `@`, dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailMalformed(email.to_string()));
    }
    Ok(())
}

/// Checks that a profile display name carries visible content.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::DisplayNameEmpty);
    }
    Ok(())
}
