//! # Collaborator Seams
//!
//! The two external services the checkout depends on, as traits the host
//! implements.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogSource::fetch_item(id)        ApplicationSink::submit(snapshot) │
//! │        │                                        │                       │
//! │        ▼                                        ▼                       │
//! │  host HTTP client / test fake         host HTTP client / test fake      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`StaticCatalog`] is an in-memory source used by the quote tool and by
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;
use ts_rs::TS;
use xtrapush_core::{ApplicationSnapshot, CatalogItem};

use crate::error::{CheckoutError, CheckoutResult};
use crate::wire::parse_catalog_item;

// =============================================================================
// Catalog Source
// =============================================================================

/// Fetches catalog items.
///
/// Every call must reach the live catalog. The stock validator relies on
/// this: a cached answer would let out-of-stock selections through.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches one item with all of its variants.
    ///
    /// Transport and parse failures should come back as
    /// [`CheckoutError::TransientFetch`].
    async fn fetch_item(&self, item_id: &str) -> CheckoutResult<CatalogItem>;
}

/// In-memory catalog.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: RwLock<HashMap<String, CatalogItem>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        StaticCatalog {
            items: RwLock::new(items.into_iter().map(|item| (item.id.clone(), item)).collect()),
        }
    }

    /// Loads a single catalog item from a JSON file in the upstream shape.
    pub async fn from_json_file(path: &Path) -> CheckoutResult<Self> {
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CheckoutError::TransientFetch(format!("{}: {}", path.display(), e)))?;
        let item = parse_catalog_item(&body)?;
        debug!(item_id = %item.id, variants = item.variants.len(), "Loaded catalog item from file");
        Ok(Self::from_items([item]))
    }

    /// Inserts or replaces an item.
    pub async fn upsert(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id.clone(), item);
    }

    pub async fn item_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.items.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_item(&self, item_id: &str) -> CheckoutResult<CatalogItem> {
        self.items
            .read()
            .await
            .get(item_id)
            .cloned()
            .ok_or_else(|| CheckoutError::TransientFetch(format!("catalog item {} not found", item_id)))
    }
}

// =============================================================================
// Application Sink
// =============================================================================

/// What the submission service answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    #[serde(default, alias = "reference_number", alias = "referenceNumber")]
    pub reference: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SubmissionReceipt {
    pub fn accepted(reference: impl Into<String>) -> Self {
        SubmissionReceipt {
            success: true,
            reference: Some(reference.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        SubmissionReceipt {
            success: false,
            reference: None,
            error: Some(error.into()),
        }
    }
}

/// Receives captured applications.
#[async_trait]
pub trait ApplicationSink: Send + Sync {
    /// Submits one snapshot.
    ///
    /// A business rejection is `Ok` with `success: false`; `Err` is for
    /// transport failures.
    async fn submit(&self, snapshot: &ApplicationSnapshot) -> CheckoutResult<SubmissionReceipt>;
}
