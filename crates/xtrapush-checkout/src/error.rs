//! # Checkout Error Types
//!
//! Error types for the async checkout layer, and the serializable form the
//! UI host receives.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ User-fixable    │  │   Transport     │  │   Programmer            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  TransientFetch │  │  PreconditionViolation  │ │
//! │  │  Stock          │  │  Submission     │  │  Config                 │ │
//! │  │  PlanUnavailable│  │                 │  │                         │ │
//! │  │  InFlight       │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  CheckoutError ──► CheckoutFailure { code, message } ──► UI host       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transport detail never reaches the UI: it is logged and replaced by a
//! generic retry message.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use xtrapush_core::{CoreError, ValidationError};

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Every way a checkout operation can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    // =========================================================================
    // User-correctable
    // =========================================================================
    /// Form input the customer can fix.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The selection has no live stock.
    #[error("{item_name} is out of stock for the selected options")]
    Stock {
        item_name: String,
        variant_id: Option<String>,
    },

    /// The chosen plan is not offered.
    #[error("{plan} is not available")]
    PlanUnavailable { plan: String },

    /// A proceed or submit is already running.
    #[error("A checkout request is already in progress")]
    InFlight,

    // =========================================================================
    // Transport
    // =========================================================================
    /// Network or parse failure while fetching catalog data.
    #[error("Catalog fetch failed: {0}")]
    TransientFetch(String),

    /// The submission sink failed or rejected the application.
    #[error("Submission failed: {0}")]
    Submission(String),

    // =========================================================================
    // Data quality
    // =========================================================================
    /// Catalog data cannot be priced.
    #[error("Pricing error: {0}")]
    Pricing(String),

    // =========================================================================
    // Programmer / setup
    // =========================================================================
    /// An operation ran without its precondition.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Configuration could not be loaded, saved or validated.
    #[error("Invalid checkout configuration: {0}")]
    Config(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OutOfStock {
                item_name,
                variant_id,
            } => CheckoutError::Stock {
                item_name,
                variant_id,
            },
            CoreError::PlanUnavailable { plan } => CheckoutError::PlanUnavailable { plan },
            CoreError::Validation(e) => CheckoutError::Validation(e),
            CoreError::PreconditionViolation(msg) => CheckoutError::PreconditionViolation(msg),
            err @ (CoreError::MissingVariantPrice { .. } | CoreError::InvalidCalculation { .. }) => {
                CheckoutError::Pricing(err.to_string())
            }
        }
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CheckoutError {
    fn from(err: toml::ser::Error) -> Self {
        CheckoutError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::TransientFetch(format!("malformed catalog payload: {}", err))
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CheckoutError {
    /// Whether the customer may simply try again.
    ///
    /// Nothing retries automatically; this only picks the UI wording.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::TransientFetch(_) | CheckoutError::Submission(_) | CheckoutError::InFlight
        )
    }

    /// Whether the customer should change their selection.
    pub fn requires_new_selection(&self) -> bool {
        matches!(self, CheckoutError::Stock { .. })
    }
}

// =============================================================================
// UI-facing Failure
// =============================================================================

/// What the UI host receives when an operation fails.
///
/// ```json
/// {
///   "code": "OUT_OF_STOCK",
///   "message": "iPhone 14 is out of stock for the selected options"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFailure {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error codes for the UI host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Inline form error
    ValidationError,

    /// Selection unavailable; pick another
    OutOfStock,

    /// Plan not offered
    PlanUnavailable,

    /// A request is already running
    RequestInFlight,

    /// Network trouble; try again
    NetworkError,

    /// Submission failed
    SubmissionFailed,

    /// Catalog data cannot be priced
    PricingError,

    /// Internal error
    Internal,
}

impl CheckoutFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CheckoutFailure {
            code,
            message: message.into(),
        }
    }
}

impl From<&CheckoutError> for CheckoutFailure {
    fn from(err: &CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => CheckoutFailure::new(ErrorCode::ValidationError, e.to_string()),
            CheckoutError::Stock { .. } => CheckoutFailure::new(ErrorCode::OutOfStock, err.to_string()),
            CheckoutError::PlanUnavailable { .. } => {
                CheckoutFailure::new(ErrorCode::PlanUnavailable, err.to_string())
            }
            CheckoutError::InFlight => CheckoutFailure::new(ErrorCode::RequestInFlight, err.to_string()),
            CheckoutError::TransientFetch(detail) => {
                tracing::error!(%detail, "Catalog fetch failed");
                CheckoutFailure::new(
                    ErrorCode::NetworkError,
                    "Unable to validate stock right now. Please try again.",
                )
            }
            CheckoutError::Submission(detail) => {
                tracing::error!(%detail, "Application submission failed");
                CheckoutFailure::new(
                    ErrorCode::SubmissionFailed,
                    "Your application could not be submitted. Please try again.",
                )
            }
            CheckoutError::Pricing(detail) => {
                tracing::error!(%detail, "Catalog pricing data is incomplete");
                CheckoutFailure::new(
                    ErrorCode::PricingError,
                    "This item cannot be priced right now. Please contact support.",
                )
            }
            CheckoutError::PreconditionViolation(detail) => {
                tracing::error!(%detail, "Checkout precondition violated");
                CheckoutFailure::new(ErrorCode::Internal, "Something went wrong. Please start again.")
            }
            CheckoutError::Config(detail) => {
                tracing::error!(%detail, "Checkout configuration error");
                CheckoutFailure::new(ErrorCode::Internal, "Something went wrong. Please start again.")
            }
        }
    }
}

impl From<CheckoutError> for CheckoutFailure {
    fn from(err: CheckoutError) -> Self {
        CheckoutFailure::from(&err)
    }
}

impl std::fmt::Display for CheckoutFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CheckoutFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_taxonomy() {
        let stock: CheckoutError = CoreError::OutOfStock {
            item_name: "Pixel 8".into(),
            variant_id: None,
        }
        .into();
        assert!(stock.requires_new_selection());

        let pricing: CheckoutError = CoreError::MissingVariantPrice {
            item_id: "g-1".into(),
            variant_id: Some("v-1".into()),
        }
        .into();
        assert!(matches!(pricing, CheckoutError::Pricing(_)));

        let validation: CheckoutError = CoreError::Validation(ValidationError::PolicyNotAccepted).into();
        assert_eq!(validation, CheckoutError::Validation(ValidationError::PolicyNotAccepted));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::TransientFetch("timeout".into()).is_retryable());
        assert!(CheckoutError::Submission("503".into()).is_retryable());
        assert!(!CheckoutError::Validation(ValidationError::PolicyNotAccepted).is_retryable());
        assert!(!CheckoutError::Stock {
            item_name: "x".into(),
            variant_id: None
        }
        .is_retryable());
    }

    #[test]
    fn test_transport_detail_is_hidden() {
        let failure = CheckoutFailure::from(CheckoutError::TransientFetch(
            "connection reset by peer at 10.0.0.4".into(),
        ));
        assert_eq!(failure.code, ErrorCode::NetworkError);
        assert!(failure.message.starts_with("Unable to validate stock"));
        assert!(!failure.message.contains("10.0.0.4"));
    }

    #[test]
    fn test_failure_serialization() {
        let failure = CheckoutFailure::from(CheckoutError::Stock {
            item_name: "iPhone 14".into(),
            variant_id: Some("v-2".into()),
        });
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["code"], "OUT_OF_STOCK");
        assert_eq!(
            json["message"],
            "iPhone 14 is out of stock for the selected options"
        );
    }
}
