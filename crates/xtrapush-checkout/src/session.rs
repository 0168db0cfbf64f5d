//! # Checkout Session
//!
//! Hosts the checkout reducer for one storefront tab and runs the two
//! async steps: proceed (stock gate + capture) and submit.
//!
//! ## Proceed Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  proceed(user, use_case)                                                │
//! │       │                                                                 │
//! │       ├── in-flight? ──────────────────────────► Err(InFlight)          │
//! │       │                                                                 │
//! │       ├── 1. validate form ────────────────────► Err(Validation)        │
//! │       ├── 2. live stock check (timeout) ───────► Err(Stock / Transient) │
//! │       ├── 3. StockCleared → reducer (price may refresh)                 │
//! │       └── 4. capture_application_data ─────────► ApplicationSnapshot    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stale Responses
//! Every `open` takes a new generation number. Background catalog refreshes
//! carry the generation they were started for; after a close or reopen
//! their results no longer match and are dropped.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ts_rs::TS;
use xtrapush_core::validation::validate_application;
use xtrapush_core::{
    capture_application_data, reduce, ApplicationSnapshot, CartItem, CatalogItem, CheckoutAction, CheckoutState,
    UserProfile,
};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutFailure, CheckoutResult};
use crate::events::{CheckoutEventEmitter, NoOpEmitter};
use crate::source::{ApplicationSink, CatalogSource, SubmissionReceipt};
use crate::stock::StockValidator;

// =============================================================================
// Proceed Outcome
// =============================================================================

/// Serializable result of [`CheckoutSession::proceed_outcome`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProceedOutcome {
    pub ok: bool,
    pub snapshot: Option<ApplicationSnapshot>,
    pub error: Option<CheckoutFailure>,
}

impl From<CheckoutResult<ApplicationSnapshot>> for ProceedOutcome {
    fn from(result: CheckoutResult<ApplicationSnapshot>) -> Self {
        match result {
            Ok(snapshot) => ProceedOutcome {
                ok: true,
                snapshot: Some(snapshot),
                error: None,
            },
            Err(e) => ProceedOutcome {
                ok: false,
                snapshot: None,
                error: Some(CheckoutFailure::from(&e)),
            },
        }
    }
}

// =============================================================================
// In-flight Guard
// =============================================================================

/// Holds the session's single in-flight slot until dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> CheckoutResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(flag))
            .map_err(|_| CheckoutError::InFlight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Session
// =============================================================================

/// One checkout surface: at most one open item at a time.
pub struct CheckoutSession {
    config: Arc<CheckoutConfig>,
    catalog: Arc<dyn CatalogSource>,
    sink: Arc<dyn ApplicationSink>,
    emitter: Arc<dyn CheckoutEventEmitter>,
    validator: StockValidator,
    state: Mutex<Option<CheckoutState>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
}

impl CheckoutSession {
    /// Creates a session without event notifications.
    pub fn new(config: CheckoutConfig, catalog: Arc<dyn CatalogSource>, sink: Arc<dyn ApplicationSink>) -> Self {
        Self::with_emitter(config, catalog, sink, Arc::new(NoOpEmitter))
    }

    /// Creates a session with a custom event emitter.
    pub fn with_emitter(
        config: CheckoutConfig,
        catalog: Arc<dyn CatalogSource>,
        sink: Arc<dyn ApplicationSink>,
        emitter: Arc<dyn CheckoutEventEmitter>,
    ) -> Self {
        let validator = StockValidator::new(Arc::clone(&catalog), config.stock_timeout(), config.locale());

        CheckoutSession {
            config: Arc::new(config),
            catalog,
            sink,
            emitter,
            validator,
            state: Mutex::new(None),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns a copy of the current state, if a checkout is open.
    pub async fn state(&self) -> Option<CheckoutState> {
        self.state.lock().await.clone()
    }

    /// Whether a proceed or submit is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens a checkout for `item`, which may be a cached copy.
    ///
    /// Returns the generation to pass to [`CheckoutSession::refresh`].
    pub async fn open(&self, item: CatalogItem, cart: Option<&CartItem>) -> CheckoutResult<u64> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let item_id = item.id.clone();

        let state = CheckoutState::open(item, cart, self.config.locale(), generation)
            .map_err(|e| self.fail(e.into()))?;

        self.emitter.on_selection_change(&state.selection);
        self.emitter.on_breakdown_change(&state.breakdown);
        *self.state.lock().await = Some(state);

        info!(item_id = %item_id, generation, "Checkout opened");
        Ok(generation)
    }

    /// Re-fetches the open item in the background of the UI.
    ///
    /// A result that arrives after the checkout was closed or reopened is
    /// discarded.
    pub async fn refresh(&self, generation: u64) -> CheckoutResult<()> {
        let item_id = {
            let guard = self.state.lock().await;
            match guard.as_ref().filter(|s| s.generation == generation) {
                Some(state) => state.item.id.clone(),
                None => {
                    debug!(generation, "Skipping refresh for a closed checkout");
                    return Ok(());
                }
            }
        };

        let fetched = tokio::time::timeout(self.config.stock_timeout(), self.catalog.fetch_item(&item_id)).await;
        let item = match fetched {
            Ok(Ok(item)) => item,
            Ok(Err(e)) => return Err(self.fail(e)),
            Err(_) => {
                return Err(self.fail(CheckoutError::TransientFetch(format!(
                    "catalog refresh for {} timed out",
                    item_id
                ))))
            }
        };

        let mut guard = self.state.lock().await;
        let Some(current) = guard.as_ref().filter(|s| s.generation == generation) else {
            debug!(item_id = %item_id, generation, "Discarding stale catalog response");
            return Ok(());
        };

        let next = reduce(current, CheckoutAction::CatalogLoaded { generation, item }).map_err(|e| self.fail(e.into()))?;
        self.emit_changes(current, &next);
        *guard = Some(next);

        debug!(item_id = %item_id, generation, "Catalog refreshed");
        Ok(())
    }

    /// Closes the checkout; in-flight refreshes become stale.
    pub async fn close(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(state) = self.state.lock().await.take() {
            debug!(item_id = %state.item.id, "Checkout closed");
        }
    }

    // =========================================================================
    // Picker / Plan Actions
    // =========================================================================

    /// Applies one reducer action and notifies the host of what changed.
    pub async fn dispatch(&self, action: CheckoutAction) -> CheckoutResult<CheckoutState> {
        let mut guard = self.state.lock().await;
        let Some(current) = guard.as_ref() else {
            return Err(self.fail(CheckoutError::PreconditionViolation(
                "no checkout is open".to_string(),
            )));
        };

        let next = reduce(current, action).map_err(|e| self.fail(e.into()))?;
        self.emit_changes(current, &next);
        *guard = Some(next.clone());
        Ok(next)
    }

    // =========================================================================
    // Proceed / Submit
    // =========================================================================

    /// Runs the stock gate and captures the application.
    ///
    /// # Errors
    /// - [`CheckoutError::InFlight`] while another proceed or submit runs
    /// - [`CheckoutError::Validation`] for form problems
    /// - [`CheckoutError::Stock`] when the live stock is zero
    /// - [`CheckoutError::TransientFetch`] when the live fetch fails
    pub async fn proceed(&self, user: &UserProfile, use_case: Option<&str>) -> CheckoutResult<ApplicationSnapshot> {
        let _guard = InFlightGuard::acquire(&self.in_flight).map_err(|e| self.fail(e))?;
        self.run_proceed(user, use_case).await.map_err(|e| self.fail(e))
    }

    /// [`CheckoutSession::proceed`] as a serializable outcome.
    pub async fn proceed_outcome(&self, user: &UserProfile, use_case: Option<&str>) -> ProceedOutcome {
        self.proceed(user, use_case).await.into()
    }

    async fn run_proceed(&self, user: &UserProfile, use_case: Option<&str>) -> CheckoutResult<ApplicationSnapshot> {
        let state = self
            .state()
            .await
            .ok_or_else(|| CheckoutError::PreconditionViolation("no checkout is open".to_string()))?;

        validate_application(user, &state.plan, use_case)?;

        if !state.breakdown.is_valid_calculation {
            return Err(CheckoutError::PreconditionViolation(
                "proceed requested without a valid breakdown".to_string(),
            ));
        }

        let clearance = self.validator.validate(&state.item.id, &state.selection).await?;

        let mut guard = self.state.lock().await;
        let current = guard
            .as_ref()
            .filter(|s| s.generation == state.generation)
            .ok_or_else(|| CheckoutError::PreconditionViolation("checkout closed during stock check".to_string()))?;

        if !clearance.covers(&current.selection) {
            warn!(item_id = %current.item.id, "Selection changed during stock check");
            return Err(CheckoutError::PreconditionViolation(
                "selection changed during stock check".to_string(),
            ));
        }

        let next = reduce(current, CheckoutAction::StockCleared(clearance.clone()))?;
        self.emit_changes(current, &next);
        *guard = Some(next.clone());
        drop(guard);

        let snapshot = capture_application_data(next.draft(user, use_case), &clearance)?;
        info!(
            snapshot_id = %snapshot.snapshot_id,
            item_id = %snapshot.gadget.id,
            variant_id = ?snapshot.variant.variant_id,
            plan = %snapshot.plan.plan_type,
            "Application captured"
        );
        Ok(snapshot)
    }

    /// Hands a captured snapshot to the submission sink.
    ///
    /// # Errors
    /// - [`CheckoutError::InFlight`] while another proceed or submit runs
    /// - [`CheckoutError::Submission`] on transport failure, timeout or
    ///   rejection
    pub async fn submit(&self, snapshot: ApplicationSnapshot) -> CheckoutResult<SubmissionReceipt> {
        let _guard = InFlightGuard::acquire(&self.in_flight).map_err(|e| self.fail(e))?;

        let outcome = tokio::time::timeout(self.config.submit_timeout(), self.sink.submit(&snapshot)).await;
        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => return Err(self.fail(CheckoutError::Submission(e.to_string()))),
            Err(_) => {
                return Err(self.fail(CheckoutError::Submission(format!(
                    "no answer after {} seconds",
                    self.config.submit_timeout().as_secs()
                ))))
            }
        };

        if !receipt.success {
            let reason = receipt
                .error
                .clone()
                .unwrap_or_else(|| "application rejected".to_string());
            return Err(self.fail(CheckoutError::Submission(reason)));
        }

        info!(
            snapshot_id = %snapshot.snapshot_id,
            reference = ?receipt.reference,
            "Application submitted"
        );
        Ok(receipt)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn emit_changes(&self, before: &CheckoutState, after: &CheckoutState) {
        if before.selection != after.selection {
            self.emitter.on_selection_change(&after.selection);
        }
        if before.breakdown != after.breakdown {
            self.emitter.on_breakdown_change(&after.breakdown);
        }
    }

    fn fail(&self, err: CheckoutError) -> CheckoutError {
        self.emitter.on_error(&CheckoutFailure::from(&err));
        err
    }
}
