//! Product record.
//!
//! # Responsibility
//! - Define the many-to-one catalog item owned by an Account.
//! - Validate product input before persistence.

use crate::model::account::AccountId;
use crate::model::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned product identifier.
pub type ProductId = i64;

/// Catalog item owned by one Account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Owning account; the store enforces the reference.
    pub account_id: AccountId,
    pub name: String,
    /// Exact decimal price. Persisted as text to avoid float drift.
    pub price: Decimal,
}

/// Checks that a product name carries visible content.
pub fn validate_product_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::ProductNameEmpty);
    }
    Ok(())
}

/// Rejects negative prices. Zero is allowed (free items exist).
pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::PriceNegative(price));
    }
    Ok(())
}
