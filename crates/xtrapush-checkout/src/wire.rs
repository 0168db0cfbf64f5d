//! # Wire Normalization
//!
//! Catalog payloads as the storefront API actually sends them, and their
//! one-way conversion into the canonical [`CatalogItem`].
//!
//! ## What Gets Normalized
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Upstream JSON                          Canonical type                  │
//! │  ─────────────                          ──────────────                  │
//! │  stock_quantity | stockQuantity  ─────► stock_quantity: u32             │
//! │    "4", 4.0, -1, null            ─────►   4, 4, 0, 0                    │
//! │  price_gbp | priceGbp            ─────► price_gbp: Option<f64>          │
//! │  condition "Like New"            ─────► Condition::LikeNew              │
//! │  condition "refurb-ish"          ─────► variant dropped                 │
//! │  is_active | isActive (absent)   ─────► true                            │
//! │  specifications {..} | "{..}"    ─────► BTreeMap<String, String>        │
//! │  { "data": {..} } envelope       ─────► unwrapped                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing past this module ever sees a second spelling of a field.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;
use xtrapush_core::stock::coerce_stock_quantity;
use xtrapush_core::{CatalogItem, Condition, Variant};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Wire Types
// =============================================================================

/// A variant as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,

    #[serde(default, alias = "color_hex", deserialize_with = "lenient_string")]
    pub color_hex: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub storage: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub condition: Option<String>,

    #[serde(default, alias = "stock_quantity", alias = "stock", deserialize_with = "lenient_f64")]
    pub stock_quantity: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    #[serde(default, alias = "price_gbp", deserialize_with = "lenient_f64")]
    pub price_gbp: Option<f64>,

    #[serde(default, alias = "is_active", deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,
}

/// A catalog item as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCatalogItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_specifications")]
    pub specifications: BTreeMap<String, String>,

    #[serde(default, alias = "image_url", alias = "imageUrl", deserialize_with = "lenient_string")]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    #[serde(default, alias = "price_gbp", deserialize_with = "lenient_f64")]
    pub price_gbp: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub condition: Option<String>,

    #[serde(default, alias = "stock_quantity", deserialize_with = "lenient_f64")]
    pub stock_quantity: Option<f64>,

    #[serde(default)]
    pub variants: Vec<WireVariant>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Wrapped { data: WireCatalogItem },
    Bare(WireCatalogItem),
}

// =============================================================================
// Conversion
// =============================================================================

impl WireVariant {
    /// Converts to the canonical variant.
    ///
    /// Returns `None` for variants without an id or with a condition token
    /// outside the known set.
    pub fn into_domain(self) -> Option<Variant> {
        let id = self.id?;

        let condition = match self.condition.as_deref() {
            Some(token) => match Condition::from_token(token) {
                Some(condition) => condition,
                None => {
                    debug!(variant_id = %id, condition = %token, "Dropping variant with unknown condition");
                    return None;
                }
            },
            None => Condition::default(),
        };

        Some(Variant {
            id,
            color: self.color,
            color_hex: self.color_hex,
            storage: self.storage.unwrap_or_default(),
            condition,
            stock_quantity: coerce_stock_quantity(self.stock_quantity),
            price: self.price,
            price_gbp: self.price_gbp,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

impl WireCatalogItem {
    /// Converts to the canonical catalog item.
    ///
    /// # Errors
    /// [`CheckoutError::TransientFetch`] when the payload has no item id.
    pub fn into_domain(self) -> CheckoutResult<CatalogItem> {
        let id = self
            .id
            .ok_or_else(|| CheckoutError::TransientFetch("catalog payload has no item id".to_string()))?;

        let condition = self.condition.as_deref().and_then(Condition::from_token);
        let variants = self
            .variants
            .into_iter()
            .filter_map(WireVariant::into_domain)
            .collect();

        Ok(CatalogItem {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            category: self.category.unwrap_or_default(),
            description: self.description,
            specifications: self.specifications,
            image: self.image,
            price: self.price,
            price_gbp: self.price_gbp,
            condition,
            stock_quantity: coerce_stock_quantity(self.stock_quantity),
            variants,
        })
    }
}

/// Parses a catalog response body, bare or wrapped in `{ "data": ... }`.
///
/// # Errors
/// [`CheckoutError::TransientFetch`] for malformed JSON or a missing id.
pub fn parse_catalog_item(body: &str) -> CheckoutResult<CatalogItem> {
    let wire = match serde_json::from_str::<CatalogPayload>(body)? {
        CatalogPayload::Wrapped { data } => data,
        CatalogPayload::Bare(item) => item,
    };
    wire.into_domain()
}

// =============================================================================
// Lenient Field Deserializers
// =============================================================================

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_specifications<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let object = match value {
        Some(Value::Object(map)) => map,
        // Some rows store the map as a JSON-encoded string.
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            _ => return Ok(BTreeMap::new()),
        },
        _ => return Ok(BTreeMap::new()),
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_and_camel_case_agree() {
        let snake = r##"{
            "id": "g-1", "name": "Pixel 8", "category": "smartphone",
            "price": 850000, "price_gbp": 420, "stock_quantity": 3,
            "variants": [{"id": "v-1", "storage": "128GB", "condition": "new",
                          "stock_quantity": 2, "price_gbp": 420, "is_active": true,
                          "color_hex": "#000000"}]
        }"##;
        let camel = r##"{
            "id": "g-1", "name": "Pixel 8", "category": "smartphone",
            "price": 850000, "priceGbp": 420, "stockQuantity": 3,
            "variants": [{"id": "v-1", "storage": "128GB", "condition": "new",
                          "stockQuantity": 2, "priceGbp": 420, "isActive": true,
                          "colorHex": "#000000"}]
        }"##;

        let a = parse_catalog_item(snake).unwrap();
        let b = parse_catalog_item(camel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.price_gbp, Some(420.0));
        assert_eq!(a.variants[0].stock_quantity, 2);
        assert_eq!(a.variants[0].color_hex.as_deref(), Some("#000000"));
    }

    #[test]
    fn test_messy_numbers_are_coerced() {
        let body = r#"{
            "id": 42, "price": "1,200,000", "stockQuantity": "-3",
            "variants": [
                {"id": "a", "stockQuantity": "4", "price": null},
                {"id": "b", "stockQuantity": 2.7, "price": "abc"},
                {"id": "c", "stockQuantity": null}
            ]
        }"#;
        let item = parse_catalog_item(body).unwrap();

        assert_eq!(item.id, "42");
        assert_eq!(item.price, Some(1_200_000.0));
        assert_eq!(item.stock_quantity, 0);
        assert_eq!(item.variants[0].stock_quantity, 4);
        assert_eq!(item.variants[1].stock_quantity, 2);
        assert_eq!(item.variants[1].price, None);
        assert_eq!(item.variants[2].stock_quantity, 0);
    }

    #[test]
    fn test_unknown_condition_drops_variant() {
        let body = r#"{
            "id": "g-1", "condition": "Like New",
            "variants": [
                {"id": "v-1", "condition": "like-new"},
                {"id": "v-2", "condition": "refurbished-ish"},
                {"storage": "64GB"}
            ]
        }"#;
        let item = parse_catalog_item(body).unwrap();

        assert_eq!(item.condition, Some(Condition::LikeNew));
        assert_eq!(item.variants.len(), 1);
        assert_eq!(item.variants[0].condition, Condition::LikeNew);
        assert!(item.variants[0].is_active);
    }

    #[test]
    fn test_envelope_and_string_specifications() {
        let body = r#"{
            "success": true,
            "data": {
                "id": "g-9",
                "specifications": "{\"ram\": \"8GB\", \"cores\": 8, \"notes\": null}"
            }
        }"#;
        let item = parse_catalog_item(body).unwrap();

        assert_eq!(item.id, "g-9");
        assert_eq!(item.specifications.get("ram").map(String::as_str), Some("8GB"));
        assert_eq!(item.specifications.get("cores").map(String::as_str), Some("8"));
        assert!(!item.specifications.contains_key("notes"));
    }

    #[test]
    fn test_missing_id_is_a_fetch_error() {
        let err = parse_catalog_item(r#"{"name": "Nameless"}"#).unwrap_err();
        assert!(matches!(err, CheckoutError::TransientFetch(_)));

        let err = parse_catalog_item("<html>502</html>").unwrap_err();
        assert!(matches!(err, CheckoutError::TransientFetch(_)));
    }

    #[test]
    fn test_inactive_flag_variants() {
        let body = r#"{"id": "g", "variants": [
            {"id": "a", "isActive": 0},
            {"id": "b", "is_active": "false"},
            {"id": "c", "isActive": "yes"}
        ]}"#;
        let item = parse_catalog_item(body).unwrap();
        let active: Vec<bool> = item.variants.iter().map(|v| v.is_active).collect();
        assert_eq!(active, vec![false, false, true]);
    }
}
