//! # Live Stock Validator
//!
//! The blocking gate in front of capture: re-fetches the item, bypassing
//! any cache, and evaluates stock on the fresh data.
//!
//! ## Fail Closed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate(item_id, selection)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogSource::fetch_item ── bounded by stock_timeout ──┐             │
//! │       │                                                  │             │
//! │       ├── Ok(fresh) ──► evaluate_stock ──► StockClearance │             │
//! │       │                                   or Stock error  │             │
//! │       ├── Err ────────► TransientFetch (never "assume ok")│             │
//! │       └── timeout ────► TransientFetch ◄──────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use xtrapush_core::{evaluate_stock, Locale, Selection, StockClearance};

use crate::error::{CheckoutError, CheckoutResult};
use crate::source::CatalogSource;

/// Checks live stock for a selection.
#[derive(Clone)]
pub struct StockValidator {
    source: Arc<dyn CatalogSource>,
    timeout: Duration,
    locale: Locale,
}

impl StockValidator {
    pub fn new(source: Arc<dyn CatalogSource>, timeout: Duration, locale: Locale) -> Self {
        StockValidator {
            source,
            timeout,
            locale,
        }
    }

    /// Fetches `item_id` live and clears the selection if it has stock.
    ///
    /// # Errors
    /// - [`CheckoutError::Stock`] when the fresh stock is zero
    /// - [`CheckoutError::TransientFetch`] when the fetch fails or times out
    pub async fn validate(&self, item_id: &str, selection: &Selection) -> CheckoutResult<StockClearance> {
        let fresh = match tokio::time::timeout(self.timeout, self.source.fetch_item(item_id)).await {
            Ok(Ok(item)) => item,
            Ok(Err(e)) => {
                warn!(item_id, error = %e, "Stock check failed, blocking checkout");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    item_id,
                    timeout_secs = self.timeout.as_secs(),
                    "Stock check timed out, blocking checkout"
                );
                return Err(CheckoutError::TransientFetch(format!(
                    "stock check for {} timed out after {} seconds",
                    item_id,
                    self.timeout.as_secs()
                )));
            }
        };

        if fresh.id != item_id {
            return Err(CheckoutError::TransientFetch(format!(
                "catalog returned {} when {} was requested",
                fresh.id, item_id
            )));
        }

        let clearance = evaluate_stock(&fresh, selection, self.locale)?;
        debug!(
            item_id,
            variant_id = ?clearance.matched_variant_id(),
            available_stock = clearance.available_stock(),
            "Stock check passed"
        );
        Ok(clearance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
