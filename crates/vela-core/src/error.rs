//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                           │
//! │  ├── CoreError        - General domain errors                           │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  vela-store errors (separate crate)                                     │
//! │  └── StoreError       - Local durable store failures                    │
//! │                                                                         │
//! │  vela-sync errors (separate crate)                                      │
//! │  └── SyncError        - Gateway and reconciliation failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError/SyncError → caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Note that most cart-level rejections (quantity to zero, sale past the
/// stock snapshot) are deliberately NOT errors: they are silent no-ops,
/// because they are expected, frequent conditions in a scan-and-add
/// workflow. Only conditions that must stop a checkout surface here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted on a cart with no line items.
    #[error("Cannot build an order from an empty cart")]
    EmptyCart,

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Cannot build an order from an empty cart"
        );

        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
