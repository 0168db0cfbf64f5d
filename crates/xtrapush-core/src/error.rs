//! # Error Types
//!
//! Domain-specific error types for xtrapush-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  xtrapush-core errors (this file)                                      │
//! │  ├── CoreError        - Stock, pricing and precondition failures       │
//! │  └── ValidationError  - User-correctable input problems                │
//! │                                                                         │
//! │  xtrapush-checkout errors (separate crate)                             │
//! │  └── CheckoutError    - Adds transient fetch / in-flight / submission  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → CheckoutFailure   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The live stock figure for the selection is zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Proceed ──► live re-fetch ──► matched variant stock = 0
    ///      │
    ///      ▼
    /// OutOfStock { item_name: "iPhone 14", variant_id: Some("v-2") }
    ///      │
    ///      ▼
    /// UI asks the customer to pick another color/storage/condition
    /// ```
    #[error("{item_name} is out of stock for the selected options")]
    OutOfStock {
        item_name: String,
        variant_id: Option<String>,
    },

    /// A catalog entry has neither a Kwacha nor a Pound price.
    ///
    /// Treated as a data-quality error instead of pricing the item at zero.
    #[error("No price is set for {item_id} (variant {variant_id:?})")]
    MissingVariantPrice {
        item_id: String,
        variant_id: Option<String>,
    },

    /// The plan type exists but is not offered yet.
    #[error("{plan} is not available")]
    PlanUnavailable { plan: String },

    /// Plan math was asked to run on a non-positive base price.
    #[error("Cannot calculate a plan for base price {base_price}")]
    InvalidCalculation { base_price: f64 },

    /// A caller invoked an operation without meeting its precondition.
    ///
    /// ## When This Occurs
    /// - Capturing without accepting the policy
    /// - Capturing with a stock clearance for a different selection
    /// - Capturing with an invalid breakdown
    ///
    /// Never expected through normal UI interaction.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Surfaced inline next to the offending field; they never block other
/// parts of the checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The financing policy has not been accepted.
    #[error("The financing policy must be accepted before continuing")]
    PolicyNotAccepted,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
