//! # Validation Module
//!
//! Input validation utilities used at the store and sync boundaries.
//!
//! Validation here is for ADMIN inputs (catalog edits, settings, search
//! queries). Cart-level rejections are deliberately not validation errors:
//! the cart treats them as silent no-ops (see [`crate::cart`]).

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a local search query.
///
/// Empty queries are allowed (they list everything). Returns the trimmed
/// query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value for admin stock adjustments.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
