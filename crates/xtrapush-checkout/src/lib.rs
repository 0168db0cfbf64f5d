//! # xtrapush-checkout: Async Checkout Orchestration
//!
//! Everything between the pure financing core and the outside world: the
//! live stock gate, the collaborator traits, upstream payload
//! normalization, configuration and the session the UI host drives.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    xtrapush-checkout Architecture                       │
//! │                                                                         │
//! │   UI host                                                               │
//! │     │  open / dispatch / proceed / submit        ▲ events               │
//! │     ▼                                            │                      │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      CheckoutSession                             │  │
//! │  │   reducer state • generation counter • in-flight guard           │  │
//! │  └───────┬───────────────────────┬──────────────────────┬──────────┘  │
//! │          │                       │                      │             │
//! │          ▼                       ▼                      ▼             │
//! │  ┌───────────────┐      ┌─────────────────┐     ┌────────────────┐   │
//! │  │ xtrapush-core │      │ StockValidator  │     │ ApplicationSink│   │
//! │  │ reduce/capture│      │ CatalogSource   │     │ (host)         │   │
//! │  └───────────────┘      │ (host) + timeout│     └────────────────┘   │
//! │                         └─────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//! ```rust,ignore
//! use xtrapush_checkout::{CheckoutConfig, CheckoutSession};
//! use xtrapush_core::CheckoutAction;
//!
//! let session = Arc::new(CheckoutSession::new(CheckoutConfig::load_or_default(None), catalog, sink));
//! let generation = session.open(cached_item, cart_line.as_ref()).await?;
//!
//! let background = Arc::clone(&session);
//! tokio::spawn(async move { background.refresh(generation).await });
//!
//! session.dispatch(CheckoutAction::SetPolicyAccepted(true)).await?;
//! let snapshot = session.proceed(&profile, None).await?;
//! let receipt = session.submit(snapshot).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod source;
pub mod stock;
pub mod wire;

pub use config::CheckoutConfig;
pub use error::{CheckoutError, CheckoutFailure, CheckoutResult, ErrorCode};
pub use events::{CheckoutEvent, CheckoutEventEmitter, NoOpEmitter, RecordingEmitter};
pub use session::{CheckoutSession, ProceedOutcome};
pub use source::{ApplicationSink, CatalogSource, StaticCatalog, SubmissionReceipt};
pub use stock::StockValidator;
pub use wire::parse_catalog_item;
