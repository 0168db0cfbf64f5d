//! # Money Module
//!
//! Currencies, market locales and the presentation-time `Money` type.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PLAN MATH STAYS UNROUNDED                                              │
//! │                                                                         │
//! │  base price ──► adjusted total ──► deposit ──► remaining ──► weekly    │
//! │     f64            f64              f64          f64          f64       │
//! │                                                                         │
//! │  Rounding each step compounds error:                                    │
//! │    110000 × 0.65 = 71500, 38500 / 6 = 6416.67 (×6 = 38500.02)          │
//! │                                                                         │
//! │  OUR RULE: round to whole currency units ONCE, at capture/display      │
//! │    Money::round_from(6416.666…, Mwk) = MK 6,417                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use xtrapush_core::money::{Currency, Money};
//!
//! let weekly = Money::round_from(6416.666, Currency::Mwk);
//! assert_eq!(weekly.units(), 6417);
//! assert_eq!(weekly.to_string(), "MK 6,417");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Currency
// =============================================================================

/// Currencies a catalog price can be quoted in.
///
/// Every catalog item and variant carries up to two prices: the local
/// Malawian Kwacha price and a British Pound price for international buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Malawian Kwacha.
    Mwk,
    /// British Pound.
    Gbp,
}

impl Currency {
    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Mwk => "MWK",
            Currency::Gbp => "GBP",
        }
    }

    /// Display symbol. Kwacha is written with a trailing space ("MK 1,000").
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Mwk => "MK ",
            Currency::Gbp => "£",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Locale
// =============================================================================

/// The market the storefront is serving.
///
/// ## Price Routing
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Locale          1st choice        fallback                             │
/// │  ───────────     ──────────────    ──────────────                       │
/// │  Malawi          price (MWK)       priceGbp (GBP)                       │
/// │  International   priceGbp (GBP)    price (MWK)                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// Malawian storefront, prices in Kwacha.
    #[default]
    Malawi,
    /// Every other market, prices in Pounds.
    International,
}

impl Locale {
    /// Currency tried first for this locale.
    pub const fn primary_currency(&self) -> Currency {
        match self {
            Locale::Malawi => Currency::Mwk,
            Locale::International => Currency::Gbp,
        }
    }

    /// Picks a price from a `(price, price_gbp)` pair.
    ///
    /// Non-finite or non-positive amounts count as absent.
    /// Returns `None` when neither field holds a usable amount.
    pub fn route_price(&self, price_mwk: Option<f64>, price_gbp: Option<f64>) -> Option<ResolvedPrice> {
        let mwk = usable_amount(price_mwk).map(|amount| ResolvedPrice::new(amount, Currency::Mwk));
        let gbp = usable_amount(price_gbp).map(|amount| ResolvedPrice::new(amount, Currency::Gbp));

        match self {
            Locale::Malawi => mwk.or(gbp),
            Locale::International => gbp.or(mwk),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Malawi => write!(f, "malawi"),
            Locale::International => write!(f, "international"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "malawi" | "mw" | "mwk" => Ok(Locale::Malawi),
            "international" | "intl" | "gb" | "uk" | "gbp" => Ok(Locale::International),
            other => Err(format!(
                "Unknown locale: '{}'. Valid options: malawi, international",
                other
            )),
        }
    }
}

fn usable_amount(amount: Option<f64>) -> Option<f64> {
    amount.filter(|a| a.is_finite() && *a > 0.0)
}

// =============================================================================
// Resolved Price
// =============================================================================

/// An unrounded price together with the currency it was quoted in.
///
/// The amount stays `f64` because every plan calculation derives from it
/// and rounding is deferred to [`Money::round_from`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub amount: f64,
    pub currency: Currency,
}

impl ResolvedPrice {
    #[inline]
    pub const fn new(amount: f64, currency: Currency) -> Self {
        ResolvedPrice { amount, currency }
    }

    /// Rounds to whole currency units for display.
    pub fn to_money(&self) -> Money {
        Money::round_from(self.amount, self.currency)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units, ready for display or capture.
///
/// ## Design Decisions
/// - **Whole units**: Kwacha prices are never quoted in tambala, and the
///   storefront shows Pound amounts without pence.
/// - **Currency tagged**: a Kwacha amount can never be printed as Pounds.
/// - **Construction only through rounding**: there is no arithmetic on
///   `Money`, so rounded values never feed back into plan math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    units: i64,
    currency: Currency,
}

impl Money {
    /// Creates a value from whole units.
    #[inline]
    pub const fn from_units(units: i64, currency: Currency) -> Self {
        Money { units, currency }
    }

    /// Rounds an unrounded amount half away from zero.
    ///
    /// Non-finite input becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use xtrapush_core::money::{Currency, Money};
    ///
    /// assert_eq!(Money::round_from(32500.5, Currency::Mwk).units(), 32501);
    /// assert_eq!(Money::round_from(f64::NAN, Currency::Gbp).units(), 0);
    /// ```
    pub fn round_from(amount: f64, currency: Currency) -> Self {
        let units = if amount.is_finite() {
            amount.round() as i64
        } else {
            0
        };
        Money { units, currency }
    }

    /// Zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money { units: 0, currency }
    }

    /// Returns the value in whole units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.units
    }

    /// Returns the currency.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.units == 0
    }
}

/// Display groups thousands with commas: `MK 105,000`, `-£1,050`.
///
/// ## Note
/// This is for logs and the quote tool. The storefront formats amounts
/// itself to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let digits = self.units.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}{}{}", sign, self.currency.symbol(), grouped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_from() {
        assert_eq!(Money::round_from(6416.666_666, Currency::Mwk).units(), 6417);
        assert_eq!(Money::round_from(6416.4, Currency::Mwk).units(), 6416);
        assert_eq!(Money::round_from(0.5, Currency::Gbp).units(), 1);
        assert_eq!(Money::round_from(f64::INFINITY, Currency::Gbp).units(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(105_000, Currency::Mwk).to_string(), "MK 105,000");
        assert_eq!(Money::from_units(1_050, Currency::Gbp).to_string(), "£1,050");
        assert_eq!(Money::from_units(999, Currency::Gbp).to_string(), "£999");
        assert_eq!(Money::from_units(-1_234_567, Currency::Mwk).to_string(), "-MK 1,234,567");
        assert_eq!(Money::zero(Currency::Mwk).to_string(), "MK 0");
    }

    #[test]
    fn test_route_price_malawi_prefers_kwacha() {
        let price = Locale::Malawi.route_price(Some(850_000.0), Some(420.0)).unwrap();
        assert_eq!(price.currency, Currency::Mwk);
        assert_eq!(price.amount, 850_000.0);
    }

    #[test]
    fn test_route_price_international_prefers_pounds() {
        let price = Locale::International
            .route_price(Some(850_000.0), Some(420.0))
            .unwrap();
        assert_eq!(price.currency, Currency::Gbp);
        assert_eq!(price.amount, 420.0);
    }

    #[test]
    fn test_route_price_falls_back_to_other_field() {
        let price = Locale::Malawi.route_price(None, Some(420.0)).unwrap();
        assert_eq!(price.currency, Currency::Gbp);

        let price = Locale::International.route_price(Some(0.0), None);
        assert!(price.is_none());

        let price = Locale::International.route_price(Some(90_000.0), Some(f64::NAN)).unwrap();
        assert_eq!(price.currency, Currency::Mwk);
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("Malawi".parse::<Locale>().unwrap(), Locale::Malawi);
        assert_eq!("intl".parse::<Locale>().unwrap(), Locale::International);
        assert!("mars".parse::<Locale>().is_err());
    }
}
