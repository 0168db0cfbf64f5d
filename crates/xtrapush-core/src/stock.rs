//! # Stock Evaluation
//!
//! Decides, from a FRESHLY fetched catalog item, whether the current
//! selection can go to checkout.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Proceed clicked                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  xtrapush-checkout: live re-fetch (never the cached copy)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  evaluate_stock(fresh item, selection) ← THIS MODULE                   │
//! │       │                                                                 │
//! │       ├── variant matched ──► stock = variant.stock_quantity           │
//! │       ├── no variant ───────► stock = item.stock_quantity              │
//! │       │                                                                 │
//! │       ├── stock == 0 ───────► CoreError::OutOfStock                    │
//! │       ├── variant unpriced ─► CoreError::MissingVariantPrice           │
//! │       └── stock > 0 ────────► StockClearance (required by capture)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::{Locale, ResolvedPrice};
use crate::types::{CatalogItem, Condition, Selection};
use crate::variant::resolve_variant;

/// Coerces an upstream stock figure to a non-negative integer.
///
/// Missing, non-finite and negative values become 0; fractions are
/// truncated.
///
/// ## Example
/// ```rust
/// use xtrapush_core::stock::coerce_stock_quantity;
///
/// assert_eq!(coerce_stock_quantity(Some(4.9)), 4);
/// assert_eq!(coerce_stock_quantity(Some(-2.0)), 0);
/// assert_eq!(coerce_stock_quantity(Some(f64::NAN)), 0);
/// assert_eq!(coerce_stock_quantity(None), 0);
/// ```
pub fn coerce_stock_quantity(raw: Option<f64>) -> u32 {
    match raw {
        Some(value) if value.is_finite() && value > 0.0 => {
            if value >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                value.trunc() as u32
            }
        }
        _ => 0,
    }
}

// =============================================================================
// Stock Clearance
// =============================================================================

/// Proof that live stock was checked for one selection of one item.
///
/// Only [`evaluate_stock`] can create one, and
/// [`crate::capture::capture_application_data`] demands one, so an
/// application cannot be captured without a passing stock check.
#[derive(Debug, Clone, PartialEq)]
pub struct StockClearance {
    item_id: String,
    variant_id: Option<String>,
    color: Option<String>,
    storage: Option<String>,
    condition: Condition,
    available_stock: u32,
    refreshed_price: Option<ResolvedPrice>,
}

impl StockClearance {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// The variant the fresh data resolved to, if any.
    pub fn matched_variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    pub fn available_stock(&self) -> u32 {
        self.available_stock
    }

    /// The matched variant's current price; `None` when no variant matched.
    ///
    /// Prices can change between page load and checkout; the host should
    /// display this one.
    pub fn refreshed_price(&self) -> Option<ResolvedPrice> {
        self.refreshed_price
    }

    /// Whether this clearance was issued for `selection`'s picker values.
    pub fn covers(&self, selection: &Selection) -> bool {
        self.color == selection.color
            && self.storage == selection.storage
            && self.condition == selection.condition
    }
}

/// Evaluates live stock for the selection.
///
/// `fresh` must come from a fetch made for this decision. The selection's
/// own `variant_id` is ignored; resolution runs again on the fresh variants.
///
/// # Errors
/// - [`CoreError::OutOfStock`] when the available stock is zero.
/// - [`CoreError::MissingVariantPrice`] when the matched fresh variant has
///   neither price field.
pub fn evaluate_stock(fresh: &CatalogItem, selection: &Selection, locale: Locale) -> CoreResult<StockClearance> {
    let matched = resolve_variant(
        &fresh.variants,
        selection.color.as_deref(),
        selection.storage.as_deref(),
        selection.condition,
    );

    let (variant_id, available_stock) = match matched {
        Some(variant) => (Some(variant.id.clone()), variant.stock_quantity),
        None => (None, fresh.stock_quantity),
    };

    if available_stock == 0 {
        return Err(CoreError::OutOfStock {
            item_name: fresh.name.clone(),
            variant_id,
        });
    }

    // A matched variant must still be priceable; the cached price is not
    // carried past a fresh fetch that dropped it.
    let refreshed_price = match matched {
        Some(variant) => Some(variant.price_for(locale).ok_or_else(|| CoreError::MissingVariantPrice {
            item_id: fresh.id.clone(),
            variant_id: Some(variant.id.clone()),
        })?),
        None => None,
    };

    Ok(StockClearance {
        item_id: fresh.id.clone(),
        variant_id,
        color: selection.color.clone(),
        storage: selection.storage.clone(),
        condition: selection.condition,
        available_stock,
        refreshed_price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use crate::types::Variant;
    use std::collections::BTreeMap;

    fn fresh_item(variants: Vec<Variant>, item_stock: u32) -> CatalogItem {
        CatalogItem {
            id: "g-7".to_string(),
            name: "Galaxy S23".to_string(),
            category: "smartphone".to_string(),
            description: None,
            specifications: BTreeMap::new(),
            image: None,
            price: Some(1_200_000.0),
            price_gbp: Some(600.0),
            condition: Some(Condition::New),
            stock_quantity: item_stock,
            variants,
        }
    }

    fn variant(id: &str, storage: &str, stock: u32, price: f64) -> Variant {
        Variant {
            id: id.to_string(),
            color: Some("Phantom Black".to_string()),
            color_hex: Some("#1c1c1c".to_string()),
            storage: storage.to_string(),
            condition: Condition::New,
            stock_quantity: stock,
            price: Some(price),
            price_gbp: None,
            is_active: true,
        }
    }

    fn selection(storage: &str) -> Selection {
        Selection {
            color: Some("Phantom Black".to_string()),
            storage: Some(storage.to_string()),
            condition: Condition::New,
            variant_id: Some("stale-id".to_string()),
        }
    }

    #[test]
    fn test_matched_variant_stock_is_used() {
        let item = fresh_item(vec![variant("v-1", "256GB", 3, 1_300_000.0)], 0);
        let clearance = evaluate_stock(&item, &selection("256GB"), Locale::Malawi).unwrap();

        assert_eq!(clearance.available_stock(), 3);
        assert_eq!(clearance.matched_variant_id(), Some("v-1"));
        assert_eq!(
            clearance.refreshed_price(),
            Some(ResolvedPrice::new(1_300_000.0, Currency::Mwk))
        );
        assert!(clearance.covers(&selection("256GB")));
        assert!(!clearance.covers(&selection("512GB")));
    }

    #[test]
    fn test_zero_fresh_stock_blocks_even_if_cached_copy_had_stock() {
        // The cached copy showed 4 units; the fresh fetch says 0.
        let item = fresh_item(vec![variant("v-1", "256GB", 0, 1_300_000.0)], 10);
        let err = evaluate_stock(&item, &selection("256GB"), Locale::Malawi).unwrap_err();

        assert_eq!(
            err,
            CoreError::OutOfStock {
                item_name: "Galaxy S23".to_string(),
                variant_id: Some("v-1".to_string()),
            }
        );
    }

    #[test]
    fn test_item_stock_is_last_resort() {
        let inactive = Variant {
            is_active: false,
            ..variant("v-1", "256GB", 9, 1_300_000.0)
        };
        let item = fresh_item(vec![inactive], 2);
        let clearance = evaluate_stock(&item, &selection("256GB"), Locale::Malawi).unwrap();

        assert_eq!(clearance.available_stock(), 2);
        assert_eq!(clearance.matched_variant_id(), None);
        assert_eq!(clearance.refreshed_price(), None);

        let empty = fresh_item(Vec::new(), 0);
        assert!(evaluate_stock(&empty, &selection("256GB"), Locale::Malawi).is_err());
    }

    #[test]
    fn test_unpriced_fresh_variant_is_rejected() {
        let unpriced = Variant {
            price: None,
            price_gbp: None,
            ..variant("v-1", "256GB", 3, 0.0)
        };
        let item = fresh_item(vec![unpriced], 5);
        let err = evaluate_stock(&item, &selection("256GB"), Locale::Malawi).unwrap_err();

        assert_eq!(
            err,
            CoreError::MissingVariantPrice {
                item_id: "g-7".to_string(),
                variant_id: Some("v-1".to_string()),
            }
        );
    }

    #[test]
    fn test_fresh_variant_priced_in_other_currency_still_clears() {
        // Only the MWK field is set; international routing falls back to it.
        let item = fresh_item(vec![variant("v-1", "256GB", 3, 1_300_000.0)], 0);
        let clearance = evaluate_stock(&item, &selection("256GB"), Locale::International).unwrap();
        assert!(clearance.refreshed_price().is_some());
    }

    #[test]
    fn test_coerce_stock_quantity() {
        assert_eq!(coerce_stock_quantity(Some(12.0)), 12);
        assert_eq!(coerce_stock_quantity(Some(0.0)), 0);
        assert_eq!(coerce_stock_quantity(Some(f64::INFINITY)), 0);
        assert_eq!(coerce_stock_quantity(Some(1e12)), u32::MAX);
    }
}
