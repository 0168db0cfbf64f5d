//! # Checkout Events
//!
//! Notifications the session pushes to its UI host.

use std::sync::Mutex;
use xtrapush_core::{PlanBreakdown, Selection};

use crate::error::CheckoutFailure;

/// Receives checkout notifications (implemented by the UI host).
pub trait CheckoutEventEmitter: Send + Sync {
    /// The picker selection or its resolved variant changed.
    fn on_selection_change(&self, selection: &Selection);

    /// The plan breakdown changed.
    fn on_breakdown_change(&self, breakdown: &PlanBreakdown);

    /// An operation failed.
    fn on_error(&self, failure: &CheckoutFailure);
}

/// No-op event emitter for headless use and tests.
pub struct NoOpEmitter;

impl CheckoutEventEmitter for NoOpEmitter {
    fn on_selection_change(&self, _selection: &Selection) {}
    fn on_breakdown_change(&self, _breakdown: &PlanBreakdown) {}
    fn on_error(&self, _failure: &CheckoutFailure) {}
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    SelectionChanged(Selection),
    BreakdownChanged(PlanBreakdown),
    Failed(CheckoutFailure),
}

/// Emitter that keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<CheckoutEvent>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<CheckoutEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, event: CheckoutEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl CheckoutEventEmitter for RecordingEmitter {
    fn on_selection_change(&self, selection: &Selection) {
        self.push(CheckoutEvent::SelectionChanged(selection.clone()));
    }

    fn on_breakdown_change(&self, breakdown: &PlanBreakdown) {
        self.push(CheckoutEvent::BreakdownChanged(*breakdown));
    }

    fn on_error(&self, failure: &CheckoutFailure) {
        self.push(CheckoutEvent::Failed(failure.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_recording_emitter_drains_in_order() {
        let emitter = RecordingEmitter::new();
        emitter.on_selection_change(&Selection::default());
        emitter.on_error(&CheckoutFailure::new(ErrorCode::OutOfStock, "gone"));

        let events = emitter.take();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CheckoutEvent::SelectionChanged(_)));
        assert!(matches!(events[1], CheckoutEvent::Failed(_)));
        assert!(emitter.take().is_empty());
    }
}
