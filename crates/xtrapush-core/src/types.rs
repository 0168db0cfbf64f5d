//! # Domain Types
//!
//! Core domain types used throughout the financing checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │    Variant      │   │   Selection     │       │
//! │  │  ─────────────  │ 1 │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  color / hex    │   │  color          │       │
//! │  │  name, category │ n │  storage        │   │  storage        │       │
//! │  │  price / gbp    │   │  condition      │   │  condition      │       │
//! │  │  stock          │   │  stock, prices  │   │  variant_id     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   Condition     │   │  UserProfile    │                             │
//! │  │  New, LikeNew,  │   │  identity +     │                             │
//! │  │  Good, Fair     │   │  contact fields │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are the canonical shapes. Upstream payloads with mixed
//! snake_case/camelCase spellings are normalized into them before any
//! core logic runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::money::{Locale, ResolvedPrice};

// =============================================================================
// Condition
// =============================================================================

/// Physical condition grade of a gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
}

impl Condition {
    /// Every grade, in display order.
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Good,
        Condition::Fair,
    ];

    /// Parses a condition token leniently.
    ///
    /// Accepts `like_new`, `like-new`, `Like New` and `likenew`.
    /// Unknown tokens return `None` and are dropped by callers.
    ///
    /// ## Example
    /// ```rust
    /// use xtrapush_core::types::Condition;
    ///
    /// assert_eq!(Condition::from_token("Like New"), Some(Condition::LikeNew));
    /// assert_eq!(Condition::from_token("refurbished"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized: String = token
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        match normalized.as_str() {
            "new" => Some(Condition::New),
            "likenew" => Some(Condition::LikeNew),
            "good" => Some(Condition::Good),
            "fair" => Some(Condition::Fair),
            _ => None,
        }
    }

    /// The canonical token (`like_new`).
    pub const fn token(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::Good => "good",
            Condition::Fair => "fair",
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::New
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Variant
// =============================================================================

/// A purchasable configuration of a catalog item.
///
/// ## Invariants
/// - Belongs to exactly one [`CatalogItem`]
/// - `(color, storage, condition)` should be unique among active variants,
///   but resolution tolerates duplicates and gaps
/// - Inactive variants never take part in selection or matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,

    /// Color name ("Midnight Black"). Colorless variants are common.
    pub color: Option<String>,

    /// Swatch color (`#1f1f1f`).
    pub color_hex: Option<String>,

    /// Storage label ("256GB").
    pub storage: String,

    pub condition: Condition,

    /// Units on hand, already coerced to a non-negative integer.
    pub stock_quantity: u32,

    /// Kwacha price.
    pub price: Option<f64>,

    /// Pound price.
    pub price_gbp: Option<f64>,

    pub is_active: bool,
}

impl Variant {
    /// Routes this variant's price for the locale.
    #[inline]
    pub fn price_for(&self, locale: Locale) -> Option<ResolvedPrice> {
        locale.route_price(self.price, self.price_gbp)
    }

    /// Checks whether the color matches (`None` never matches a named color).
    pub fn has_color(&self, color: &str) -> bool {
        self.color.as_deref() == Some(color)
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A product listed on the storefront, fetched once per checkout open.
///
/// Immutable for the duration of a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,

    /// Category label ("smartphone", "laptop", ...).
    pub category: String,
    pub description: Option<String>,

    /// Free-form spec sheet (e.g. `"storage" => "256GB"`).
    pub specifications: BTreeMap<String, String>,
    pub image: Option<String>,

    /// Kwacha list price, used when no variant matches.
    pub price: Option<f64>,

    /// Pound list price.
    pub price_gbp: Option<f64>,

    /// Default condition the item is listed in.
    pub condition: Option<Condition>,

    /// Item-level stock, the last resort when no variant matches.
    pub stock_quantity: u32,

    pub variants: Vec<Variant>,
}

impl CatalogItem {
    /// Routes the item-level list price for the locale.
    #[inline]
    pub fn price_for(&self, locale: Locale) -> Option<ResolvedPrice> {
        locale.route_price(self.price, self.price_gbp)
    }

    /// The storage stated on the item's spec sheet, if any.
    pub fn stated_storage(&self) -> Option<&str> {
        self.specifications
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("storage"))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Active variants only.
    pub fn active_variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| v.is_active)
    }

    /// Looks up a variant by id.
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The customer's current picker state.
///
/// `variant_id == None` means no active variant matched and the displayed
/// price is a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub color: Option<String>,
    pub storage: Option<String>,
    pub condition: Condition,
    pub variant_id: Option<String>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A cart line the checkout can be opened from.
///
/// Its choices seed the [`Selection`] instead of the catalog defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub item_id: String,
    pub variant_id: Option<String>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub condition: Option<Condition>,
}

// =============================================================================
// User Profile
// =============================================================================

/// Identity and contact fields copied into an application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub national_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
