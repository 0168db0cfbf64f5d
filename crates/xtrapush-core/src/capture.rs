//! # Application Capture
//!
//! Freezes everything an installment or lease application needs into one
//! owned [`ApplicationSnapshot`].
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Live checkout state (mutable)          Snapshot (immutable, owned)     │
//! │  ─────────────────────────────          ───────────────────────────     │
//! │  CatalogItem ─────────────────────────► gadget: id, name, specs …      │
//! │  Selection + Variant ─────────────────► variant: color, storage …      │
//! │  UserProfile ─────────────────────────► applicant: name, email …       │
//! │  PlanBreakdown (f64) ──── round ──────► plan: Money amounts            │
//! │                                                                         │
//! │  Later picker changes cannot reach the snapshot: it holds copies.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A snapshot is created once per submission attempt and handed, by value,
//! to the submission collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};
use crate::plan::{LeaseDuration, PlanBreakdown, PlanParameters, PlanType};
use crate::stock::StockClearance;
use crate::types::{CatalogItem, Condition, Selection, UserProfile};
use crate::validation::validate_application;

// =============================================================================
// Snapshot Types
// =============================================================================

/// Catalog fields frozen at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GadgetSnapshot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub specifications: BTreeMap<String, String>,
}

/// The chosen configuration frozen at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantSnapshot {
    /// `None` when the price came from the item-level fallback.
    pub variant_id: Option<String>,
    pub color: Option<String>,
    pub color_hex: Option<String>,
    pub storage: Option<String>,
    pub condition: Condition,
    /// Live stock seen by the stock check.
    pub available_stock: u32,
}

/// Lease-only plan fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeaseSnapshot {
    pub duration: LeaseDuration,
    pub months: f64,
    pub monthly_rate: Money,
    pub total_cost: Money,
    pub interest_rate: f64,
    pub use_case: String,
}

/// Plan figures rounded to whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    pub plan_type: PlanType,
    pub currency: Currency,
    pub base_price: Money,
    pub adjusted_total: Money,
    pub deposit_amount: Money,
    pub remaining_balance: Money,
    pub weekly_amount: Money,
    pub weeks: Option<u32>,
    pub deposit_percentage: f64,
    pub total_adjustment_percentage: f64,
    /// Present only for pay-to-lease.
    pub lease: Option<LeaseSnapshot>,
}

/// Everything an application submission carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSnapshot {
    pub snapshot_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub gadget: GadgetSnapshot,
    pub variant: VariantSnapshot,
    pub applicant: UserProfile,
    pub plan: PlanSnapshot,
    pub policy_accepted: bool,
}

// =============================================================================
// Capture
// =============================================================================

/// Borrowed inputs for [`capture_application_data`].
#[derive(Debug, Clone, Copy)]
pub struct ApplicationDraft<'a> {
    pub item: &'a CatalogItem,
    pub selection: &'a Selection,
    pub breakdown: &'a PlanBreakdown,
    /// Currency the breakdown's base price was quoted in.
    pub currency: Currency,
    pub plan: &'a PlanParameters,
    pub user: &'a UserProfile,
    /// Required for pay-to-lease.
    pub use_case: Option<&'a str>,
}

/// Assembles the immutable application snapshot.
///
/// ## Preconditions
/// - The policy was accepted
/// - `clearance` came from a stock check of this item and this selection
/// - The breakdown is valid and matches the chosen plan type
///
/// Violations are caller bugs and come back as
/// [`CoreError::PreconditionViolation`]; no snapshot is produced.
///
/// # Errors
/// - [`CoreError::PreconditionViolation`] as above
/// - [`CoreError::PlanUnavailable`] for a disabled plan
/// - [`CoreError::Validation`] for incomplete profile or lease details
pub fn capture_application_data(
    draft: ApplicationDraft<'_>,
    clearance: &StockClearance,
) -> CoreResult<ApplicationSnapshot> {
    let ApplicationDraft {
        item,
        selection,
        breakdown,
        currency,
        plan,
        user,
        use_case,
    } = draft;

    if !plan.policy_accepted {
        return Err(CoreError::PreconditionViolation(
            "capture requested before the policy was accepted".to_string(),
        ));
    }

    if clearance.item_id() != item.id
        || !clearance.covers(selection)
        || clearance.matched_variant_id() != selection.variant_id.as_deref()
    {
        return Err(CoreError::PreconditionViolation(format!(
            "stock clearance for {} does not cover the current selection",
            clearance.item_id()
        )));
    }

    if !breakdown.is_valid_calculation || breakdown.plan_type != plan.plan_type {
        return Err(CoreError::PreconditionViolation(
            "breakdown is invalid or stale for the chosen plan".to_string(),
        ));
    }

    if !plan.plan_type.is_enabled() {
        return Err(CoreError::PlanUnavailable {
            plan: plan.plan_type.to_string(),
        });
    }

    validate_application(user, plan, use_case)?;

    let variant = selection
        .variant_id
        .as_deref()
        .and_then(|id| item.variant(id));

    let money = breakdown.to_money(currency);
    let lease = match (plan.plan_type, breakdown.lease) {
        (PlanType::PayToLease, Some(lease)) => Some(LeaseSnapshot {
            duration: plan.lease,
            months: lease.months,
            monthly_rate: Money::round_from(lease.lease_monthly_rate, currency),
            total_cost: Money::round_from(lease.lease_total_cost, currency),
            interest_rate: lease.lease_interest_rate,
            use_case: use_case.map(str::trim).unwrap_or_default().to_string(),
        }),
        _ => None,
    };

    Ok(ApplicationSnapshot {
        snapshot_id: Uuid::new_v4(),
        captured_at: Utc::now(),
        gadget: GadgetSnapshot {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            specifications: item.specifications.clone(),
        },
        variant: match variant {
            // The resolver may have relaxed color; record what was checked and priced.
            Some(v) => VariantSnapshot {
                variant_id: Some(v.id.clone()),
                color: v.color.clone(),
                color_hex: v.color_hex.clone(),
                storage: Some(v.storage.clone()),
                condition: v.condition,
                available_stock: clearance.available_stock(),
            },
            None => VariantSnapshot {
                variant_id: None,
                color: selection.color.clone(),
                color_hex: None,
                storage: selection.storage.clone(),
                condition: selection.condition,
                available_stock: clearance.available_stock(),
            },
        },
        applicant: UserProfile {
            user_id: user.user_id.trim().to_string(),
            full_name: user.full_name.trim().to_string(),
            email: user.email.trim().to_string(),
            phone: user.phone.trim().to_string(),
            address: user.address.trim().to_string(),
            national_id: user.national_id.clone(),
        },
        plan: PlanSnapshot {
            plan_type: plan.plan_type,
            currency,
            base_price: money.base_price,
            adjusted_total: money.adjusted_total,
            deposit_amount: money.deposit_amount,
            remaining_balance: money.remaining_balance,
            weekly_amount: money.weekly_amount,
            weeks: breakdown.weeks,
            deposit_percentage: breakdown.deposit_percentage,
            total_adjustment_percentage: breakdown.total_adjustment_percentage,
            lease,
        },
        policy_accepted: true,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Locale;
    use crate::plan::{compute_breakdown, InstallmentWeeks};
    use crate::stock::evaluate_stock;
    use crate::types::Variant;
    use crate::ValidationError;

    fn item() -> CatalogItem {
        CatalogItem {
            id: "g-3".to_string(),
            name: "iPhone 14".to_string(),
            category: "smartphone".to_string(),
            description: Some("A15 Bionic".to_string()),
            specifications: BTreeMap::from([("display".to_string(), "6.1\"".to_string())]),
            image: Some("https://cdn.example/iphone14.png".to_string()),
            price: Some(100_000.0),
            price_gbp: None,
            condition: Some(Condition::New),
            stock_quantity: 0,
            variants: vec![Variant {
                id: "v-1".to_string(),
                color: Some("Midnight".to_string()),
                color_hex: Some("#1f2020".to_string()),
                storage: "128GB".to_string(),
                condition: Condition::New,
                stock_quantity: 2,
                price: Some(100_000.0),
                price_gbp: None,
                is_active: true,
            }],
        }
    }

    fn selection() -> Selection {
        Selection {
            color: Some("Midnight".to_string()),
            storage: Some("128GB".to_string()),
            condition: Condition::New,
            variant_id: Some("v-1".to_string()),
        }
    }

    fn user() -> UserProfile {
        UserProfile {
            user_id: "u-9".to_string(),
            full_name: " Thandiwe Phiri ".to_string(),
            email: "thandiwe@example.mw".to_string(),
            phone: "0888123456".to_string(),
            address: "Chilomoni, Blantyre".to_string(),
            national_id: Some("MW-123".to_string()),
        }
    }

    fn own_plan() -> PlanParameters {
        PlanParameters {
            plan_type: PlanType::PayToOwn,
            weeks: InstallmentWeeks::Six,
            policy_accepted: true,
            ..PlanParameters::default()
        }
    }

    #[test]
    fn test_capture_pay_to_own() {
        let item = item();
        let selection = selection();
        let plan = own_plan();
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = user();

        let snapshot = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap();

        assert_eq!(snapshot.gadget.name, "iPhone 14");
        assert_eq!(snapshot.variant.variant_id.as_deref(), Some("v-1"));
        assert_eq!(snapshot.variant.color_hex.as_deref(), Some("#1f2020"));
        assert_eq!(snapshot.variant.available_stock, 2);
        assert_eq!(snapshot.applicant.full_name, "Thandiwe Phiri");
        assert_eq!(snapshot.plan.adjusted_total.units(), 110_000);
        assert_eq!(snapshot.plan.deposit_amount.units(), 71_500);
        assert_eq!(snapshot.plan.remaining_balance.units(), 38_500);
        assert_eq!(snapshot.plan.weekly_amount.units(), 6_417);
        assert_eq!(snapshot.plan.weeks, Some(6));
        assert!(snapshot.plan.lease.is_none());
        assert!(snapshot.policy_accepted);
    }

    #[test]
    fn test_capture_records_resolved_variant_when_color_is_relaxed() {
        use crate::checkout::{reduce, CheckoutAction, CheckoutState};

        let colored = |id: &str, color: &str, hex: &str, storage: &str| Variant {
            id: id.to_string(),
            color: Some(color.to_string()),
            color_hex: Some(hex.to_string()),
            storage: storage.to_string(),
            condition: Condition::New,
            stock_quantity: 3,
            price: Some(100_000.0),
            price_gbp: None,
            is_active: true,
        };
        let item = CatalogItem {
            variants: vec![
                colored("v-blue-128", "Blue", "#0000ff", "128GB"),
                colored("v-red-256", "Red", "#ff0000", "256GB"),
            ],
            ..item()
        };

        // Red/128GB does not exist; storage + condition lands on Blue/128GB.
        let mut state = CheckoutState::open(item, None, Locale::Malawi, 1).unwrap();
        for action in [
            CheckoutAction::SelectColor("Red".to_string()),
            CheckoutAction::SelectStorage("128GB".to_string()),
            CheckoutAction::SetPolicyAccepted(true),
        ] {
            state = reduce(&state, action).unwrap();
        }
        assert_eq!(state.selection.variant_id.as_deref(), Some("v-blue-128"));

        let clearance = evaluate_stock(&state.item, &state.selection, Locale::Malawi).unwrap();
        state = reduce(&state, CheckoutAction::StockCleared(clearance.clone())).unwrap();
        let user = user();
        let snapshot = capture_application_data(state.draft(&user, None), &clearance).unwrap();

        assert_eq!(snapshot.variant.variant_id.as_deref(), Some("v-blue-128"));
        assert_eq!(snapshot.variant.color.as_deref(), Some("Blue"));
        assert_eq!(snapshot.variant.color_hex.as_deref(), Some("#0000ff"));
        assert_eq!(snapshot.variant.storage.as_deref(), Some("128GB"));
        assert_eq!(snapshot.variant.condition, Condition::New);
    }

    #[test]
    fn test_capture_lease_includes_lease_fields() {
        let item = item();
        let selection = selection();
        let plan = PlanParameters {
            plan_type: PlanType::PayToLease,
            lease: LeaseDuration::Months { count: 24 },
            policy_accepted: true,
            ..PlanParameters::default()
        };
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = user();

        let snapshot = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: Some("  Mobile banking agent work "),
            },
            &clearance,
        )
        .unwrap();

        let lease = snapshot.plan.lease.unwrap();
        assert_eq!(lease.monthly_rate.units(), 2_200);
        assert_eq!(lease.total_cost.units(), 56_760); // 2200 × 24 × 1.075
        assert_eq!(lease.use_case, "Mobile banking agent work");
        assert_eq!(snapshot.plan.deposit_amount.units(), 0);
    }

    #[test]
    fn test_capture_rejects_unaccepted_policy() {
        let item = item();
        let selection = selection();
        let plan = PlanParameters {
            policy_accepted: false,
            ..own_plan()
        };
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = user();

        let err = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_capture_rejects_clearance_for_other_selection() {
        let item = item();
        let checked = selection();
        let clearance = evaluate_stock(&item, &checked, Locale::Malawi).unwrap();

        let changed = Selection {
            storage: Some("256GB".to_string()),
            ..selection()
        };
        let plan = own_plan();
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let user = user();

        let err = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &changed,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_capture_rejects_invalid_breakdown() {
        let item = item();
        let selection = selection();
        let plan = own_plan();
        let breakdown = compute_breakdown(0.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = user();

        let err = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_capture_surfaces_profile_errors() {
        let item = item();
        let selection = selection();
        let plan = own_plan();
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = UserProfile {
            email: String::new(),
            ..user()
        };

        let err = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::Required {
                field: "email".to_string()
            })
        );
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let item = item();
        let selection = selection();
        let plan = own_plan();
        let breakdown = compute_breakdown(100_000.0, &plan.terms());
        let clearance = evaluate_stock(&item, &selection, Locale::Malawi).unwrap();
        let user = user();

        let snapshot = capture_application_data(
            ApplicationDraft {
                item: &item,
                selection: &selection,
                breakdown: &breakdown,
                currency: Currency::Mwk,
                plan: &plan,
                user: &user,
                use_case: None,
            },
            &clearance,
        )
        .unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["plan"]["planType"], "pay-to-own");
        assert_eq!(json["plan"]["depositAmount"]["units"], 71_500);
        assert_eq!(json["variant"]["condition"], "new");
        assert!(json["plan"]["lease"].is_null());
    }
}
