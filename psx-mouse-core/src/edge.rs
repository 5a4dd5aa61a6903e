//! Per-button queue of press/release transitions.

use heapless::Deque;

/// Number of pending transitions a single button can hold between polls.
///
/// Must be even: overflow drops transitions in complementary pairs.
pub const EDGE_QUEUE_CAPACITY: usize = 8;

const _: () = assert!(EDGE_QUEUE_CAPACITY >= 2 && EDGE_QUEUE_CAPACITY % 2 == 0);

/// What [`ButtonEdgeQueue::record`] did with a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordOutcome {
    /// Same level as last time; nothing recorded.
    Unchanged,
    /// A new transition was appended.
    Queued,
    /// The queue was full: its two oldest transitions (one press, one
    /// release) were dropped to make room for the new one.
    Coalesced,
}

/// Edge-triggered record of one button's level changes.
///
/// The producer side ([`record`](Self::record)) sees every report level;
/// only changes are stored. The consumer side surfaces at most one stored
/// transition per console poll, so a click shorter than one poll interval
/// still shows up as a press on one poll and a release on the next.
///
/// Queued levels always alternate, and the oldest one always differs from
/// the level last reported to the console.
#[derive(Debug)]
pub struct ButtonEdgeQueue {
    pending: Deque<bool, EDGE_QUEUE_CAPACITY>,
    last_observed: bool,
}

impl Default for ButtonEdgeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonEdgeQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            last_observed: false,
        }
    }

    /// Feed the button's instantaneous level from an incoming report.
    pub fn record(&mut self, level: bool) -> RecordOutcome {
        if level == self.last_observed {
            return RecordOutcome::Unchanged;
        }
        self.last_observed = level;

        let outcome = if self.pending.is_full() {
            // Dropping a pair keeps the queue alternating and its tail equal
            // to the real button level.
            self.pending.pop_front();
            self.pending.pop_front();
            RecordOutcome::Coalesced
        } else {
            RecordOutcome::Queued
        };

        // Cannot fail: there is at least one free slot at this point.
        let _ = self.pending.push_back(level);
        outcome
    }

    /// Level to report next, without consuming anything.
    ///
    /// Returns `current` unchanged when no transition is pending.
    #[inline]
    #[must_use]
    pub fn peek(&self, current: bool) -> bool {
        self.pending.front().copied().unwrap_or(current)
    }

    /// Drop the oldest transition once it has been delivered.
    #[inline]
    pub fn commit(&mut self) {
        self.pending.pop_front();
    }

    /// Pop the oldest transition and return it as the new reported level,
    /// or return `current` when nothing is pending.
    pub fn advance(&mut self, current: bool) -> bool {
        self.pending.pop_front().unwrap_or(current)
    }

    /// Number of transitions waiting to be surfaced.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Level seen in the most recent report.
    #[inline]
    #[must_use]
    pub fn last_observed(&self) -> bool {
        self.last_observed
    }
}
