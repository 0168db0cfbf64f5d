//! # Validation Module
//!
//! Checks on the application form, run before an application is captured.
//!
//! ## What Gets Checked
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Application Form                                     │
//! │                                                                         │
//! │  Profile ──────────► full name, email, phone, address required          │
//! │                      email must look like an address                    │
//! │                      phone must be 7-15 digits (optional leading +)     │
//! │                                                                         │
//! │  Lease only ───────► use case, 10-500 characters                        │
//! │                      duration positive / date range ordered             │
//! │                                                                         │
//! │  Every plan ───────► policy accepted                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each failure is a [`ValidationError`] the form shows inline.
//!
//! ## Usage
//! ```rust
//! use xtrapush_core::validation::{validate_email, validate_phone};
//!
//! assert!(validate_email("chikondi@example.mw").is_ok());
//! assert!(validate_phone("+265 991 234 567").is_ok());
//! assert!(validate_phone("call me").is_err());
//! ```

use crate::error::ValidationError;
use crate::plan::PlanParameters;
use crate::types::UserProfile;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum length of a lease use-case description.
pub const MIN_USE_CASE_LEN: usize = 10;

/// Maximum length of a lease use-case description.
pub const MAX_USE_CASE_LEN: usize = 500;

// =============================================================================
// Field Validators
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with text on both sides
/// - Domain contains a dot that is neither first nor last
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    required("email", email)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }

    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Optional leading `+`, then digits; spaces and hyphens are ignored
/// - 7 to 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    required("phone", phone)?;

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let digits: String = body.chars().filter(|c| !matches!(c, ' ' | '-')).collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) || !(7..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain 7 to 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates the identity and contact fields an application needs.
pub fn validate_profile(profile: &UserProfile) -> ValidationResult<()> {
    required("user id", &profile.user_id)?;
    required("full name", &profile.full_name)?;
    validate_email(&profile.email)?;
    validate_phone(&profile.phone)?;
    required("address", &profile.address)?;
    Ok(())
}

/// Validates the lease use-case description.
pub fn validate_use_case(use_case: Option<&str>) -> ValidationResult<()> {
    let use_case = use_case.map(str::trim).unwrap_or_default();
    required("use case", use_case)?;

    let len = use_case.chars().count();
    if len < MIN_USE_CASE_LEN {
        return Err(ValidationError::TooShort {
            field: "use case".to_string(),
            min: MIN_USE_CASE_LEN,
        });
    }
    if len > MAX_USE_CASE_LEN {
        return Err(ValidationError::TooLong {
            field: "use case".to_string(),
            max: MAX_USE_CASE_LEN,
        });
    }

    Ok(())
}

/// Validates everything the application form collects.
///
/// ## Order
/// Profile first, then lease details, then the policy checkbox, so the
/// first error shown is the one highest on the form.
pub fn validate_application(
    profile: &UserProfile,
    plan: &PlanParameters,
    use_case: Option<&str>,
) -> ValidationResult<()> {
    validate_profile(profile)?;

    if plan.plan_type.is_lease() {
        plan.lease.validate()?;
        validate_use_case(use_case)?;
    }

    if !plan.policy_accepted {
        return Err(ValidationError::PolicyNotAccepted);
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
