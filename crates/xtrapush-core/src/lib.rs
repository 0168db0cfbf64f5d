//! # xtrapush-core: Pure Financing Logic for Xtrapush Checkout
//!
//! This crate holds the business rules behind installment and lease
//! checkout: which variant the customer picked, what it costs, whether it
//! is in stock, and what goes into an application.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Xtrapush Checkout Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Storefront UI (host)                          │   │
//! │  │    Pickers ──► Plan tabs ──► Application form ──► Proceed       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ actions / events                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                xtrapush-checkout (async)                        │   │
//! │  │    CheckoutSession, StockValidator, CatalogSource, Sink         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ xtrapush-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  variant  │  │   plan    │  │   stock   │  │  capture  │  │   │
//! │  │   │ resolver  │  │calculator │  │ clearance │  │ snapshot  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                  checkout (reducer) ties them together          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog items, variants, selections, user profile
//! - [`money`] - Currencies, locale price routing, whole-unit `Money`
//! - [`variant`] - Variant resolution, option lists, initial selection
//! - [`plan`] - Pay-to-own and pay-to-lease math
//! - [`stock`] - Stock evaluation over freshly fetched data
//! - [`capture`] - Application snapshot assembly
//! - [`checkout`] - The checkout reducer
//! - [`validation`] - Application form rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use xtrapush_core::money::Currency;
//! use xtrapush_core::plan::{compute_breakdown, InstallmentWeeks, PlanTerms};
//!
//! let breakdown = compute_breakdown(100_000.0, &PlanTerms::PayToOwn { weeks: InstallmentWeeks::Two });
//! let shown = breakdown.to_money(Currency::Mwk);
//!
//! assert_eq!(shown.deposit_amount.to_string(), "MK 35,000");
//! assert_eq!(shown.weekly_amount.units(), 32_500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capture;
pub mod checkout;
pub mod error;
pub mod money;
pub mod plan;
pub mod stock;
pub mod types;
pub mod validation;
pub mod variant;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use capture::{capture_application_data, ApplicationDraft, ApplicationSnapshot};
pub use checkout::{reduce, CheckoutAction, CheckoutState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Locale, Money, ResolvedPrice};
pub use plan::{compute_breakdown, InstallmentWeeks, LeaseDuration, PlanBreakdown, PlanParameters, PlanTerms, PlanType};
pub use stock::{evaluate_stock, StockClearance};
pub use types::*;
