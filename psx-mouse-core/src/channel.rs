//! Cross-core hand-off of mouse reports into the aggregation state.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::aggregation::{AggregationState, MergeOutcome, PollSnapshot};
use crate::types::{ButtonLevels, MouseReport};

/// Mutex-guarded [`AggregationState`] shared by the USB and protocol cores.
///
/// Both sides hold the lock only for a handful of field updates: once per
/// report on the producer side, and twice per poll cycle (snapshot and
/// commit) on the engine side. The lock is never held across any wire
/// activity, so neither side can stall the other for longer than that.
///
/// With `CriticalSectionRawMutex` on a dual-core target this is a hardware
/// spinlock plus disabled interrupts, which is what makes a `static`
/// instance safe to use from both cores.
pub struct ReportChannel<M: RawMutex> {
    state: Mutex<M, RefCell<AggregationState>>,
}

impl<M: RawMutex> Default for ReportChannel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ReportChannel<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(AggregationState::new())),
        }
    }

    /// Merge one report. Called from the USB side for every report.
    pub fn deliver(&self, report: &MouseReport) -> MergeOutcome {
        self.state
            .lock(|state| state.borrow_mut().merge_report(report))
    }

    /// Take the values for the poll cycle that is starting.
    pub fn begin_poll(&self) -> PollSnapshot {
        self.state.lock(|state| state.borrow_mut().snapshot())
    }

    /// Consume what `snapshot` transmitted. Only call after a complete
    /// transaction.
    pub fn commit(&self, snapshot: &PollSnapshot) {
        self.state.lock(|state| state.borrow_mut().commit(snapshot));
    }

    /// Button levels the console last received.
    pub fn reported(&self) -> ButtonLevels {
        self.state.lock(|state| state.borrow().reported())
    }

    /// Run `f` against a consistent view of the state.
    pub fn inspect<R>(&self, f: impl FnOnce(&AggregationState) -> R) -> R {
        self.state.lock(|state| f(&state.borrow()))
    }
}
