//! # Variant Resolution
//!
//! Turns the customer's picker state into a concrete variant and price.
//!
//! ## Matching Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (active variants only, first match wins)                               │
//! │                                                                         │
//! │  1. color + storage + condition   (needs color AND storage)            │
//! │  2. storage + condition           (needs storage)                      │
//! │  3. color + condition             (needs color)                        │
//! │  4. condition                                                          │
//! │  5. nothing ──► keep the previous price, clear variant_id              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here performs I/O. The variant list is whatever the caller
//! fetched last; the live re-check before checkout lives in [`crate::stock`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Locale, ResolvedPrice};
use crate::types::{CartItem, CatalogItem, Condition, Selection, Variant};

/// Default storage for phone-like categories without variant data.
pub const PHONE_DEFAULT_STORAGE: &str = "256GB";

/// Default storage for laptop-like categories without variant data.
pub const LAPTOP_DEFAULT_STORAGE: &str = "512GB";

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the variant for a picker state.
///
/// Empty strings count as "not selected". Never returns an inactive variant
/// and never mutates `variants`.
///
/// ## Example
/// ```rust
/// use xtrapush_core::types::{Condition, Variant};
/// use xtrapush_core::variant::resolve_variant;
///
/// let variants = vec![Variant {
///     id: "v-1".into(),
///     color: None,
///     color_hex: None,
///     storage: "128GB".into(),
///     condition: Condition::New,
///     stock_quantity: 5,
///     price: Some(900_000.0),
///     price_gbp: None,
///     is_active: true,
/// }];
///
/// let found = resolve_variant(&variants, None, Some("256GB"), Condition::New);
/// assert_eq!(found.map(|v| v.id.as_str()), Some("v-1"));
/// ```
pub fn resolve_variant<'a>(
    variants: &'a [Variant],
    color: Option<&str>,
    storage: Option<&str>,
    condition: Condition,
) -> Option<&'a Variant> {
    let color = color.map(str::trim).filter(|c| !c.is_empty());
    let storage = storage.map(str::trim).filter(|s| !s.is_empty());

    let candidates = || {
        variants
            .iter()
            .filter(move |v| v.is_active && v.condition == condition)
    };

    if let (Some(color), Some(storage)) = (color, storage) {
        if let Some(v) = candidates().find(|v| v.has_color(color) && v.storage == storage) {
            return Some(v);
        }
    }

    if let Some(storage) = storage {
        if let Some(v) = candidates().find(|v| v.storage == storage) {
            return Some(v);
        }
    }

    if let Some(color) = color {
        if let Some(v) = candidates().find(|v| v.has_color(color)) {
            return Some(v);
        }
    }

    candidates().next()
}

/// Outcome of re-resolving a selection: which variant is active and the
/// price to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceResolution {
    pub variant_id: Option<String>,
    pub price: ResolvedPrice,
}

/// Resolves the selection against the item's variants and routes the price.
///
/// ## Behavior
/// - Match found: the variant's price, routed by `locale`
/// - No match: `previous` is kept (stale-price fallback) and the variant id
///   is cleared; on first load there is no previous price, so the item's
///   list price is used
///
/// # Errors
/// [`CoreError::MissingVariantPrice`] when the matched variant (or the item,
/// for the first-load fallback) carries neither price field.
pub fn resolve_selection_price(
    item: &CatalogItem,
    selection: &Selection,
    locale: Locale,
    previous: Option<ResolvedPrice>,
) -> CoreResult<PriceResolution> {
    let matched = resolve_variant(
        &item.variants,
        selection.color.as_deref(),
        selection.storage.as_deref(),
        selection.condition,
    );

    match matched {
        Some(variant) => {
            let price = variant
                .price_for(locale)
                .ok_or_else(|| CoreError::MissingVariantPrice {
                    item_id: item.id.clone(),
                    variant_id: Some(variant.id.clone()),
                })?;

            Ok(PriceResolution {
                variant_id: Some(variant.id.clone()),
                price,
            })
        }
        None => {
            let price = previous
                .or_else(|| item.price_for(locale))
                .ok_or_else(|| CoreError::MissingVariantPrice {
                    item_id: item.id.clone(),
                    variant_id: None,
                })?;

            Ok(PriceResolution {
                variant_id: None,
                price,
            })
        }
    }
}

// =============================================================================
// Option Lists
// =============================================================================

/// A color swatch offered in the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub name: String,
    pub hex: Option<String>,
}

/// Everything the pickers can offer for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OptionLists {
    pub colors: Vec<ColorOption>,
    pub storages: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl OptionLists {
    /// Derives all three lists for an item.
    pub fn for_item(item: &CatalogItem) -> Self {
        OptionLists {
            colors: color_options(item),
            storages: storage_options(item),
            conditions: condition_options(item),
        }
    }
}

/// Distinct non-null colors among active variants, first-seen hex wins.
pub fn color_options(item: &CatalogItem) -> Vec<ColorOption> {
    let mut colors: Vec<ColorOption> = Vec::new();

    for variant in item.active_variants() {
        let Some(name) = variant.color.as_deref().map(str::trim) else {
            continue;
        };
        if name.is_empty() || colors.iter().any(|c| c.name == name) {
            continue;
        }
        colors.push(ColorOption {
            name: name.to_string(),
            hex: variant.color_hex.clone(),
        });
    }

    colors
}

/// Storage labels, in priority order:
/// 1. storages of active variants (first-seen order)
/// 2. the item's stated storage
/// 3. a category default
/// 4. nothing
pub fn storage_options(item: &CatalogItem) -> Vec<String> {
    let mut storages: Vec<String> = Vec::new();
    for variant in item.active_variants() {
        let storage = variant.storage.trim();
        if !storage.is_empty() && !storages.iter().any(|s| s == storage) {
            storages.push(storage.to_string());
        }
    }

    if !storages.is_empty() {
        return storages;
    }

    if let Some(stated) = item.stated_storage() {
        return vec![stated.to_string()];
    }

    default_storage_for_category(&item.category)
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

/// Conditions of active variants, else the item's own condition.
///
/// Always in [`Condition::ALL`] order.
pub fn condition_options(item: &CatalogItem) -> Vec<Condition> {
    let from_variants: Vec<Condition> = Condition::ALL
        .into_iter()
        .filter(|c| item.active_variants().any(|v| v.condition == *c))
        .collect();

    if !from_variants.is_empty() {
        return from_variants;
    }

    item.condition.into_iter().collect()
}

/// Storage a category gets when nothing else states one.
///
/// Matches whole words, singular or plural: "Smartphones" is phone-like,
/// "headphones" is not.
pub fn default_storage_for_category(category: &str) -> Option<&'static str> {
    const PHONE_WORDS: [&str; 6] = ["phone", "smartphone", "iphone", "mobile", "tablet", "ipad"];
    const LAPTOP_WORDS: [&str; 4] = ["laptop", "macbook", "notebook", "computer"];

    let category = category.to_lowercase();
    let words: Vec<&str> = category
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.strip_suffix('s').unwrap_or(w))
        .collect();

    if words.iter().any(|w| PHONE_WORDS.contains(w)) {
        Some(PHONE_DEFAULT_STORAGE)
    } else if words.iter().any(|w| LAPTOP_WORDS.contains(w)) {
        Some(LAPTOP_DEFAULT_STORAGE)
    } else {
        None
    }
}

// =============================================================================
// Initial Selection
// =============================================================================

/// Builds the selection a checkout opens with.
///
/// ## Precedence
/// 1. The cart line's variant, when it is still an active variant
/// 2. The cart line's individual choices
/// 3. Catalog defaults: first color, first storage, the item's condition
///
/// `variant_id` is left empty; the caller resolves it.
pub fn initial_selection(item: &CatalogItem, cart: Option<&CartItem>, options: &OptionLists) -> Selection {
    if let Some(variant) = cart
        .and_then(|c| c.variant_id.as_deref())
        .and_then(|id| item.variant(id))
        .filter(|v| v.is_active)
    {
        return Selection {
            color: variant.color.clone(),
            storage: Some(variant.storage.clone()),
            condition: variant.condition,
            variant_id: None,
        };
    }

    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    let color = cart
        .and_then(|c| non_empty(&c.color))
        .or_else(|| options.colors.first().map(|c| c.name.clone()));

    let storage = cart
        .and_then(|c| non_empty(&c.storage))
        .or_else(|| options.storages.first().cloned());

    let condition = cart
        .and_then(|c| c.condition)
        .or(item.condition)
        .or_else(|| options.conditions.first().copied())
        .unwrap_or_default();

    Selection {
        color,
        storage,
        condition,
        variant_id: None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use std::collections::BTreeMap;

    fn variant(id: &str, color: Option<&str>, storage: &str, condition: Condition) -> Variant {
        Variant {
            id: id.to_string(),
            color: color.map(str::to_string),
            color_hex: color.map(|_| "#000000".to_string()),
            storage: storage.to_string(),
            condition,
            stock_quantity: 5,
            price: Some(100_000.0),
            price_gbp: Some(50.0),
            is_active: true,
        }
    }

    fn item(category: &str, variants: Vec<Variant>) -> CatalogItem {
        CatalogItem {
            id: "g-1".to_string(),
            name: "iPhone 13".to_string(),
            category: category.to_string(),
            description: None,
            specifications: BTreeMap::new(),
            image: None,
            price: Some(80_000.0),
            price_gbp: Some(40.0),
            condition: Some(Condition::Good),
            stock_quantity: 2,
            variants,
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let variants = vec![
            variant("v-1", Some("Blue"), "128GB", Condition::New),
            variant("v-2", Some("Black"), "128GB", Condition::New),
        ];
        let found = resolve_variant(&variants, Some("Black"), Some("128GB"), Condition::New);
        assert_eq!(found.unwrap().id, "v-2");
    }

    #[test]
    fn test_storage_match_ignores_color() {
        let variants = vec![
            variant("v-1", Some("Blue"), "128GB", Condition::New),
            variant("v-2", Some("Blue"), "256GB", Condition::New),
        ];
        let found = resolve_variant(&variants, Some("Red"), Some("256GB"), Condition::New);
        assert_eq!(found.unwrap().id, "v-2");
    }

    #[test]
    fn test_color_match_ignores_storage() {
        let variants = vec![
            variant("v-1", Some("Blue"), "128GB", Condition::Good),
            variant("v-2", Some("Red"), "256GB", Condition::Good),
        ];
        let found = resolve_variant(&variants, Some("Red"), Some("1TB"), Condition::Good);
        assert_eq!(found.unwrap().id, "v-2");
    }

    #[test]
    fn test_condition_only_fallthrough() {
        let variants = vec![
            variant("v-1", None, "128GB", Condition::New),
            Variant {
                stock_quantity: 0,
                ..variant("v-2", Some("Black"), "256GB", Condition::Good)
            },
        ];
        let found = resolve_variant(&variants, None, Some("256GB"), Condition::New);
        assert_eq!(found.unwrap().id, "v-1");

        let found = resolve_variant(&variants, None, Some("256GB"), Condition::Fair);
        assert!(found.is_none());
    }

    #[test]
    fn test_inactive_variants_never_match() {
        let variants = vec![
            Variant {
                is_active: false,
                ..variant("v-1", Some("Black"), "256GB", Condition::New)
            },
            variant("v-2", Some("Blue"), "128GB", Condition::New),
        ];
        let found = resolve_variant(&variants, Some("Black"), Some("256GB"), Condition::New);
        assert_eq!(found.unwrap().id, "v-2");

        let only_inactive = vec![Variant {
            is_active: false,
            ..variant("v-1", None, "128GB", Condition::New)
        }];
        assert!(resolve_variant(&only_inactive, None, None, Condition::New).is_none());
    }

    #[test]
    fn test_empty_strings_are_unselected() {
        let variants = vec![
            variant("v-1", Some("Blue"), "128GB", Condition::New),
            variant("v-2", Some("Black"), "256GB", Condition::New),
        ];
        let found = resolve_variant(&variants, Some(""), Some("  "), Condition::New);
        assert_eq!(found.unwrap().id, "v-1");
    }

    #[test]
    fn test_resolution_keeps_previous_price_on_miss() {
        let item = item("smartphone", vec![variant("v-1", None, "128GB", Condition::New)]);
        let selection = Selection {
            condition: Condition::Fair,
            ..Selection::default()
        };
        let previous = ResolvedPrice::new(123_000.0, Currency::Mwk);

        let resolution =
            resolve_selection_price(&item, &selection, Locale::Malawi, Some(previous)).unwrap();
        assert_eq!(resolution.variant_id, None);
        assert_eq!(resolution.price, previous);
    }

    #[test]
    fn test_resolution_first_load_uses_item_price() {
        let item = item("smartphone", Vec::new());
        let resolution =
            resolve_selection_price(&item, &Selection::default(), Locale::International, None)
                .unwrap();
        assert_eq!(resolution.price, ResolvedPrice::new(40.0, Currency::Gbp));
    }

    #[test]
    fn test_resolution_routes_variant_price_by_locale() {
        let item = item("smartphone", vec![variant("v-1", None, "128GB", Condition::New)]);
        let selection = Selection {
            storage: Some("128GB".to_string()),
            ..Selection::default()
        };

        let mw = resolve_selection_price(&item, &selection, Locale::Malawi, None).unwrap();
        assert_eq!(mw.variant_id.as_deref(), Some("v-1"));
        assert_eq!(mw.price, ResolvedPrice::new(100_000.0, Currency::Mwk));

        let intl = resolve_selection_price(&item, &selection, Locale::International, None).unwrap();
        assert_eq!(intl.price, ResolvedPrice::new(50.0, Currency::Gbp));
    }

    #[test]
    fn test_resolution_rejects_unpriced_variant() {
        let unpriced = Variant {
            price: None,
            price_gbp: None,
            ..variant("v-1", None, "128GB", Condition::New)
        };
        let item = item("smartphone", vec![unpriced]);
        let err = resolve_selection_price(&item, &Selection::default(), Locale::Malawi, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingVariantPrice { variant_id: Some(_), .. }));
    }

    #[test]
    fn test_color_options_first_seen_wins() {
        let mut second_black = variant("v-3", Some("Black"), "512GB", Condition::New);
        second_black.color_hex = Some("#111111".to_string());
        let mut first_black = variant("v-1", Some("Black"), "128GB", Condition::New);
        first_black.color_hex = Some("#000000".to_string());
        let inactive_red = Variant {
            is_active: false,
            ..variant("v-4", Some("Red"), "128GB", Condition::New)
        };

        let item = item(
            "smartphone",
            vec![
                first_black,
                variant("v-2", None, "256GB", Condition::New),
                second_black,
                inactive_red,
            ],
        );

        let colors = color_options(&item);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].name, "Black");
        assert_eq!(colors[0].hex.as_deref(), Some("#000000"));
    }

    #[test]
    fn test_storage_options_precedence() {
        let with_variants = item(
            "smartphone",
            vec![
                variant("v-1", None, "128GB", Condition::New),
                variant("v-2", None, "256GB", Condition::New),
                variant("v-3", None, "128GB", Condition::Good),
            ],
        );
        assert_eq!(storage_options(&with_variants), vec!["128GB", "256GB"]);

        let mut stated = item("smartphone", Vec::new());
        stated
            .specifications
            .insert("storage".to_string(), "64GB".to_string());
        assert_eq!(storage_options(&stated), vec!["64GB"]);

        assert_eq!(storage_options(&item("Smartphone", Vec::new())), vec!["256GB"]);
        assert_eq!(storage_options(&item("Laptops", Vec::new())), vec!["512GB"]);
        assert!(storage_options(&item("headphones", Vec::new())).is_empty());
    }

    #[test]
    fn test_condition_options_precedence() {
        let with_variants = item(
            "smartphone",
            vec![
                variant("v-1", None, "128GB", Condition::Fair),
                variant("v-2", None, "128GB", Condition::New),
            ],
        );
        assert_eq!(
            condition_options(&with_variants),
            vec![Condition::New, Condition::Fair]
        );

        assert_eq!(
            condition_options(&item("smartphone", Vec::new())),
            vec![Condition::Good]
        );
    }

    #[test]
    fn test_initial_selection_from_catalog_defaults() {
        let item = item(
            "smartphone",
            vec![variant("v-1", Some("Blue"), "128GB", Condition::New)],
        );
        let options = OptionLists::for_item(&item);
        let selection = initial_selection(&item, None, &options);

        assert_eq!(selection.color.as_deref(), Some("Blue"));
        assert_eq!(selection.storage.as_deref(), Some("128GB"));
        assert_eq!(selection.condition, Condition::Good);
    }

    #[test]
    fn test_initial_selection_from_cart_variant() {
        let item = item(
            "smartphone",
            vec![
                variant("v-1", Some("Blue"), "128GB", Condition::New),
                variant("v-2", Some("Black"), "256GB", Condition::LikeNew),
            ],
        );
        let options = OptionLists::for_item(&item);
        let cart = CartItem {
            item_id: "g-1".to_string(),
            variant_id: Some("v-2".to_string()),
            color: None,
            storage: None,
            condition: None,
        };

        let selection = initial_selection(&item, Some(&cart), &options);
        assert_eq!(selection.color.as_deref(), Some("Black"));
        assert_eq!(selection.storage.as_deref(), Some("256GB"));
        assert_eq!(selection.condition, Condition::LikeNew);
    }

    #[test]
    fn test_initial_selection_from_cart_choices() {
        let item = item(
            "smartphone",
            vec![variant("v-1", Some("Blue"), "128GB", Condition::New)],
        );
        let options = OptionLists::for_item(&item);
        let cart = CartItem {
            item_id: "g-1".to_string(),
            variant_id: Some("gone".to_string()),
            color: Some("Green".to_string()),
            storage: Some(String::new()),
            condition: Some(Condition::Fair),
        };

        let selection = initial_selection(&item, Some(&cart), &options);
        assert_eq!(selection.color.as_deref(), Some("Green"));
        assert_eq!(selection.storage.as_deref(), Some("128GB"));
        assert_eq!(selection.condition, Condition::Fair);
    }
}
