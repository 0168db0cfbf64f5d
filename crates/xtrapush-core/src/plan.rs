//! # Plan Calculator
//!
//! Deposit, balance and periodic-payment math for financed checkout.
//!
//! ## Pay-to-Own Policy (also used to price Pay-as-you-go)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  weeks │ deposit │ markup │ 100,000 base ──► adjusted / deposit / weekly│
//! │  ──────┼─────────┼────────┼──────────────────────────────────────────── │
//! │    2   │   35%   │   +0%  │ 100,000 / 35,000 / 32,500                   │
//! │    4   │   50%   │   +5%  │ 105,000 / 52,500 / 13,125                   │
//! │    6   │   65%   │  +10%  │ 110,000 / 71,500 / 6,416.67                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pay-to-Lease Policy
//! ```text
//! months        = days / 30.44 | weeks / 4.35 | months | ceil(range days) / 30.44
//! interest rate = (months / 48) × 15%          ← linear, shorter = cheaper
//! monthly rate  = base × 2.2%
//! total cost    = monthly rate × months × (1 + interest rate)
//! ```
//!
//! The constants below are business-policy literals.
//!
//! Everything here is unrounded `f64`; see [`crate::money`] for where
//! rounding happens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Currency, Money};
use crate::validation::ValidationResult;

/// Lease monthly rate as a fraction of the base price.
pub const LEASE_MONTHLY_RATE: f64 = 0.022;

/// Lease length the baseline interest applies to.
pub const LEASE_BASELINE_MONTHS: f64 = 48.0;

/// Interest charged on a lease of [`LEASE_BASELINE_MONTHS`].
pub const LEASE_BASELINE_INTEREST: f64 = 0.15;

/// Average days per month.
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Average weeks per month.
pub const WEEKS_PER_MONTH: f64 = 4.35;

// =============================================================================
// Plan Type
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PlanType {
    /// Deposit up front, weekly installments, ownership at the end.
    PayToOwn,
    /// Monthly lease with duration-scaled interest.
    PayToLease,
    /// Shown in the plan picker but not offered yet.
    PayAsYouGo,
}

impl PlanType {
    /// Whether customers can currently choose this plan.
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, PlanType::PayAsYouGo)
    }

    pub const fn is_lease(&self) -> bool {
        matches!(self, PlanType::PayToLease)
    }
}

impl Default for PlanType {
    fn default() -> Self {
        PlanType::PayToOwn
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::PayToOwn => write!(f, "pay-to-own"),
            PlanType::PayToLease => write!(f, "pay-to-lease"),
            PlanType::PayAsYouGo => write!(f, "pay-as-you-go"),
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pay-to-own" | "own" => Ok(PlanType::PayToOwn),
            "pay-to-lease" | "lease" => Ok(PlanType::PayToLease),
            "pay-as-you-go" | "payg" => Ok(PlanType::PayAsYouGo),
            _ => Err(ValidationError::NotAllowed {
                field: "plan type".to_string(),
                allowed: vec![
                    "pay-to-own".to_string(),
                    "pay-to-lease".to_string(),
                    "pay-as-you-go".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Installment Weeks
// =============================================================================

/// Installment lengths offered for pay-to-own.
///
/// Serialized as the bare week count (`4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum InstallmentWeeks {
    Two,
    Four,
    Six,
}

impl InstallmentWeeks {
    pub const fn weeks(&self) -> u32 {
        match self {
            InstallmentWeeks::Two => 2,
            InstallmentWeeks::Four => 4,
            InstallmentWeeks::Six => 6,
        }
    }

    /// Deposit as a fraction of the adjusted total.
    pub const fn deposit_rate(&self) -> f64 {
        match self {
            InstallmentWeeks::Two => 0.35,
            InstallmentWeeks::Four => 0.50,
            InstallmentWeeks::Six => 0.65,
        }
    }

    /// Markup applied to the base price.
    pub const fn markup_rate(&self) -> f64 {
        match self {
            InstallmentWeeks::Two => 0.0,
            InstallmentWeeks::Four => 0.05,
            InstallmentWeeks::Six => 0.10,
        }
    }
}

impl Default for InstallmentWeeks {
    fn default() -> Self {
        InstallmentWeeks::Two
    }
}

impl TryFrom<u32> for InstallmentWeeks {
    type Error = ValidationError;

    fn try_from(weeks: u32) -> Result<Self, Self::Error> {
        match weeks {
            2 => Ok(InstallmentWeeks::Two),
            4 => Ok(InstallmentWeeks::Four),
            6 => Ok(InstallmentWeeks::Six),
            _ => Err(ValidationError::NotAllowed {
                field: "weeks".to_string(),
                allowed: vec!["2".to_string(), "4".to_string(), "6".to_string()],
            }),
        }
    }
}

impl From<InstallmentWeeks> for u32 {
    fn from(weeks: InstallmentWeeks) -> Self {
        weeks.weeks()
    }
}

// =============================================================================
// Lease Duration
// =============================================================================

/// How long a lease runs, in whichever unit the customer picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "unit", rename_all = "camelCase")]
pub enum LeaseDuration {
    Days { count: u32 },
    Weeks { count: u32 },
    Months { count: u32 },
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl LeaseDuration {
    /// Month-equivalent length. Zero or negative for invalid durations.
    pub fn months(&self) -> f64 {
        match *self {
            LeaseDuration::Days { count } => f64::from(count) / DAYS_PER_MONTH,
            LeaseDuration::Weeks { count } => f64::from(count) / WEEKS_PER_MONTH,
            LeaseDuration::Months { count } => f64::from(count),
            LeaseDuration::DateRange { start, end } => {
                (end - start).num_days() as f64 / DAYS_PER_MONTH
            }
        }
    }

    /// Checks that the duration is usable.
    ///
    /// ## Rules
    /// - Counts must be positive
    /// - A date range must end after it starts
    pub fn validate(&self) -> ValidationResult<()> {
        let count = match *self {
            LeaseDuration::Days { count }
            | LeaseDuration::Weeks { count }
            | LeaseDuration::Months { count } => count,
            LeaseDuration::DateRange { start, end } => {
                if end <= start {
                    return Err(ValidationError::InvalidFormat {
                        field: "lease dates".to_string(),
                        reason: "end date must be after start date".to_string(),
                    });
                }
                return Ok(());
            }
        };

        if count == 0 {
            return Err(ValidationError::MustBePositive {
                field: "lease duration".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for LeaseDuration {
    fn default() -> Self {
        LeaseDuration::Months { count: 12 }
    }
}

/// Interest for a lease of `months`, linear against the 48-month baseline.
#[inline]
pub fn lease_interest_rate(months: f64) -> f64 {
    (months / LEASE_BASELINE_MONTHS) * LEASE_BASELINE_INTEREST
}

// =============================================================================
// Plan Terms
// =============================================================================

/// A plan type paired with the duration that applies to it.
///
/// Pairing them in one enum means a lease can never be priced with a
/// week count or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "planType", rename_all = "kebab-case")]
pub enum PlanTerms {
    PayToOwn { weeks: InstallmentWeeks },
    PayAsYouGo { weeks: InstallmentWeeks },
    PayToLease { duration: LeaseDuration },
}

impl PlanTerms {
    pub const fn plan_type(&self) -> PlanType {
        match self {
            PlanTerms::PayToOwn { .. } => PlanType::PayToOwn,
            PlanTerms::PayAsYouGo { .. } => PlanType::PayAsYouGo,
            PlanTerms::PayToLease { .. } => PlanType::PayToLease,
        }
    }
}

/// The customer's plan choices, kept for every plan type so switching
/// back and forth does not lose a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanParameters {
    pub plan_type: PlanType,
    #[ts(as = "u32")]
    pub weeks: InstallmentWeeks,
    pub lease: LeaseDuration,
    pub policy_accepted: bool,
}

impl PlanParameters {
    /// The terms that apply to the current plan type.
    pub fn terms(&self) -> PlanTerms {
        match self.plan_type {
            PlanType::PayToOwn => PlanTerms::PayToOwn { weeks: self.weeks },
            PlanType::PayAsYouGo => PlanTerms::PayAsYouGo { weeks: self.weeks },
            PlanType::PayToLease => PlanTerms::PayToLease {
                duration: self.lease,
            },
        }
    }
}

// =============================================================================
// Breakdown
// =============================================================================

/// Lease-specific figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeaseBreakdown {
    /// Month-equivalent duration.
    pub months: f64,
    pub lease_monthly_rate: f64,
    pub lease_total_cost: f64,
    /// Fraction, e.g. 0.0375 for a 12-month lease.
    pub lease_interest_rate: f64,
}

/// The financial picture for one (base price, terms) pair.
///
/// Always recomputed from inputs, never patched in place.
///
/// ## Lease Mapping
/// Leases carry no deposit: `adjusted_total` and `remaining_balance` are the
/// lease total, `weekly_amount` is the week-equivalent payment and
/// `total_adjustment_percentage` is the interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanBreakdown {
    pub plan_type: PlanType,

    /// False when the base price was not positive; every amount is then 0
    /// and the UI must not let the customer proceed.
    pub is_valid_calculation: bool,

    pub base_price: f64,
    pub adjusted_total: f64,
    pub deposit_amount: f64,
    pub remaining_balance: f64,
    pub weekly_amount: f64,

    /// Installment count for week-based plans.
    pub weeks: Option<u32>,

    /// Percentage, e.g. 35.0.
    pub deposit_percentage: f64,

    /// Percentage, e.g. 5.0.
    pub total_adjustment_percentage: f64,

    pub lease: Option<LeaseBreakdown>,
}

impl PlanBreakdown {
    /// An all-zero breakdown flagged invalid.
    pub fn invalid(plan_type: PlanType) -> Self {
        PlanBreakdown {
            plan_type,
            is_valid_calculation: false,
            base_price: 0.0,
            adjusted_total: 0.0,
            deposit_amount: 0.0,
            remaining_balance: 0.0,
            weekly_amount: 0.0,
            weeks: None,
            deposit_percentage: 0.0,
            total_adjustment_percentage: 0.0,
            lease: None,
        }
    }

    /// Rounds every amount to whole units for display or capture.
    pub fn to_money(&self, currency: Currency) -> MoneyBreakdown {
        let round = |amount: f64| Money::round_from(amount, currency);

        MoneyBreakdown {
            base_price: round(self.base_price),
            adjusted_total: round(self.adjusted_total),
            deposit_amount: round(self.deposit_amount),
            remaining_balance: round(self.remaining_balance),
            weekly_amount: round(self.weekly_amount),
            lease_monthly_rate: self.lease.map(|l| round(l.lease_monthly_rate)),
            lease_total_cost: self.lease.map(|l| round(l.lease_total_cost)),
        }
    }
}

/// A [`PlanBreakdown`] rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBreakdown {
    pub base_price: Money,
    pub adjusted_total: Money,
    pub deposit_amount: Money,
    pub remaining_balance: Money,
    pub weekly_amount: Money,
    pub lease_monthly_rate: Option<Money>,
    pub lease_total_cost: Option<Money>,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes the breakdown for a base price and plan terms.
///
/// Pure: identical inputs always give identical output.
///
/// ## Example
/// ```rust
/// use xtrapush_core::plan::{compute_breakdown, InstallmentWeeks, PlanTerms};
///
/// let b = compute_breakdown(100_000.0, &PlanTerms::PayToOwn { weeks: InstallmentWeeks::Four });
/// assert!((b.adjusted_total - 105_000.0).abs() < 1e-6);
/// assert!((b.weekly_amount - 13_125.0).abs() < 1e-6);
/// ```
pub fn compute_breakdown(base_price: f64, terms: &PlanTerms) -> PlanBreakdown {
    let plan_type = terms.plan_type();

    if !base_price.is_finite() || base_price <= 0.0 {
        return PlanBreakdown::invalid(plan_type);
    }

    match *terms {
        PlanTerms::PayToOwn { weeks } | PlanTerms::PayAsYouGo { weeks } => {
            installment_breakdown(base_price, plan_type, weeks)
        }
        PlanTerms::PayToLease { duration } => lease_breakdown(base_price, duration),
    }
}

fn installment_breakdown(base_price: f64, plan_type: PlanType, weeks: InstallmentWeeks) -> PlanBreakdown {
    let adjusted_total = base_price * (1.0 + weeks.markup_rate());
    let deposit_amount = adjusted_total * weeks.deposit_rate();
    let remaining_balance = adjusted_total - deposit_amount;
    let weekly_amount = remaining_balance / f64::from(weeks.weeks());

    PlanBreakdown {
        plan_type,
        is_valid_calculation: true,
        base_price,
        adjusted_total,
        deposit_amount,
        remaining_balance,
        weekly_amount,
        weeks: Some(weeks.weeks()),
        deposit_percentage: weeks.deposit_rate() * 100.0,
        total_adjustment_percentage: weeks.markup_rate() * 100.0,
        lease: None,
    }
}

fn lease_breakdown(base_price: f64, duration: LeaseDuration) -> PlanBreakdown {
    let months = duration.months();
    if !months.is_finite() || months <= 0.0 {
        return PlanBreakdown::invalid(PlanType::PayToLease);
    }

    let interest_rate = lease_interest_rate(months);
    let monthly_rate = base_price * LEASE_MONTHLY_RATE;
    let total_cost = monthly_rate * months * (1.0 + interest_rate);

    PlanBreakdown {
        plan_type: PlanType::PayToLease,
        is_valid_calculation: true,
        base_price,
        adjusted_total: total_cost,
        deposit_amount: 0.0,
        remaining_balance: total_cost,
        weekly_amount: total_cost / (months * WEEKS_PER_MONTH),
        weeks: None,
        deposit_percentage: 0.0,
        total_adjustment_percentage: interest_rate * 100.0,
        lease: Some(LeaseBreakdown {
            months,
            lease_monthly_rate: monthly_rate,
            lease_total_cost: total_cost,
            lease_interest_rate: interest_rate,
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
