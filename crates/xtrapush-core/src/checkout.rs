//! # Checkout Reducer
//!
//! All picker and plan state for one open checkout, advanced by an
//! explicit `(state, action) -> state` function.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutState::open(item, cart line, locale, generation)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reduce(&state, SelectStorage("256GB"))                                 │
//! │       │                                                                 │
//! │       ├── resolve_selection_price   (variant + price, stale fallback)   │
//! │       └── compute_breakdown         (plan math on the new price)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  new CheckoutState  (old one untouched; Err leaves it current)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolver and calculator run synchronously inside the reducer, so a
//! state never holds a breakdown computed from an older selection.

use crate::capture::ApplicationDraft;
use crate::error::{CoreError, CoreResult};
use crate::money::{Locale, ResolvedPrice};
use crate::plan::{compute_breakdown, InstallmentWeeks, LeaseDuration, PlanBreakdown, PlanParameters, PlanType};
use crate::stock::StockClearance;
use crate::types::{CartItem, CatalogItem, Condition, Selection, UserProfile};
use crate::variant::{initial_selection, resolve_selection_price, OptionLists};

// =============================================================================
// State
// =============================================================================

/// Everything the checkout UI renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutState {
    pub item: CatalogItem,
    pub locale: Locale,
    pub options: OptionLists,
    pub selection: Selection,
    /// Base price for the current selection.
    pub price: ResolvedPrice,
    pub plan: PlanParameters,
    pub breakdown: PlanBreakdown,
    /// Tag of the fetch this state belongs to.
    pub generation: u64,
}

impl CheckoutState {
    /// Builds the initial state for a freshly opened checkout.
    ///
    /// # Errors
    /// [`CoreError::MissingVariantPrice`] when neither the resolved variant
    /// nor the item has a usable price.
    pub fn open(item: CatalogItem, cart: Option<&CartItem>, locale: Locale, generation: u64) -> CoreResult<Self> {
        let options = OptionLists::for_item(&item);
        let mut selection = initial_selection(&item, cart, &options);
        let resolution = resolve_selection_price(&item, &selection, locale, None)?;
        selection.variant_id = resolution.variant_id;

        let plan = PlanParameters::default();
        let breakdown = compute_breakdown(resolution.price.amount, &plan.terms());

        Ok(CheckoutState {
            item,
            locale,
            options,
            selection,
            price: resolution.price,
            plan,
            breakdown,
            generation,
        })
    }

    /// Whether the proceed control should be enabled.
    pub fn can_proceed(&self) -> bool {
        self.breakdown.is_valid_calculation && self.plan.policy_accepted && self.plan.plan_type.is_enabled()
    }

    /// Borrowed capture inputs for the current state.
    pub fn draft<'a>(&'a self, user: &'a UserProfile, use_case: Option<&'a str>) -> ApplicationDraft<'a> {
        ApplicationDraft {
            item: &self.item,
            selection: &self.selection,
            breakdown: &self.breakdown,
            currency: self.price.currency,
            plan: &self.plan,
            user,
            use_case,
        }
    }

    fn reprice(mut self) -> CoreResult<Self> {
        let resolution = resolve_selection_price(&self.item, &self.selection, self.locale, Some(self.price))?;
        self.selection.variant_id = resolution.variant_id;
        self.price = resolution.price;
        Ok(self.recalculate())
    }

    fn recalculate(mut self) -> Self {
        self.breakdown = compute_breakdown(self.price.amount, &self.plan.terms());
        self
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Everything that can change checkout state.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutAction {
    SelectColor(String),
    SelectStorage(String),
    SelectCondition(Condition),
    SelectPlanType(PlanType),
    SelectWeeks(InstallmentWeeks),
    SelectLeaseDuration(LeaseDuration),
    SetPolicyAccepted(bool),
    /// A background catalog fetch finished.
    CatalogLoaded { generation: u64, item: CatalogItem },
    /// The live stock check passed; adopt its refreshed price.
    StockCleared(StockClearance),
}

/// Applies one action.
///
/// On `Err` the caller keeps its current state; nothing is half-applied.
///
/// ## Discarded Without Error
/// - `CatalogLoaded` for another generation or another item
/// - `StockCleared` for a different selection
///
/// # Errors
/// - [`CoreError::PlanUnavailable`] when pay-as-you-go is chosen
/// - [`CoreError::Validation`] for an unusable lease duration
/// - [`CoreError::MissingVariantPrice`] when the new variant has no price
pub fn reduce(state: &CheckoutState, action: CheckoutAction) -> CoreResult<CheckoutState> {
    let mut next = state.clone();

    match action {
        CheckoutAction::SelectColor(color) => {
            next.selection.color = Some(color).filter(|c| !c.trim().is_empty());
            next.reprice()
        }
        CheckoutAction::SelectStorage(storage) => {
            next.selection.storage = Some(storage).filter(|s| !s.trim().is_empty());
            next.reprice()
        }
        CheckoutAction::SelectCondition(condition) => {
            next.selection.condition = condition;
            next.reprice()
        }
        CheckoutAction::SelectPlanType(plan_type) => {
            if !plan_type.is_enabled() {
                return Err(CoreError::PlanUnavailable {
                    plan: plan_type.to_string(),
                });
            }
            next.plan.plan_type = plan_type;
            Ok(next.recalculate())
        }
        CheckoutAction::SelectWeeks(weeks) => {
            next.plan.weeks = weeks;
            Ok(next.recalculate())
        }
        CheckoutAction::SelectLeaseDuration(duration) => {
            duration.validate()?;
            next.plan.lease = duration;
            Ok(next.recalculate())
        }
        CheckoutAction::SetPolicyAccepted(accepted) => {
            next.plan.policy_accepted = accepted;
            Ok(next)
        }
        CheckoutAction::CatalogLoaded { generation, item } => {
            if generation != state.generation || item.id != state.item.id {
                return Ok(next);
            }
            next.options = OptionLists::for_item(&item);
            next.item = item;
            next.reprice()
        }
        CheckoutAction::StockCleared(clearance) => {
            if clearance.item_id() != state.item.id || !clearance.covers(&state.selection) {
                return Ok(next);
            }
            next.selection.variant_id = clearance.matched_variant_id().map(str::to_string);
            if let Some(price) = clearance.refreshed_price() {
                next.price = price;
            }
            Ok(next.recalculate())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
