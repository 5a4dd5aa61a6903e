//! Aggregation state shared between the USB side and the protocol engine.

use crate::accumulator::DeltaAccumulator;
use crate::edge::{ButtonEdgeQueue, RecordOutcome};
use crate::protocol::encode_buttons;
use crate::types::{ButtonLevels, MouseReport};

/// Result of merging one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MergeOutcome {
    /// A button queue overflowed and had to drop a press/release pair.
    pub coalesced: bool,
}

/// Values one poll cycle will transmit, plus what committing them consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollSnapshot {
    pub buttons: ButtonLevels,
    pub dx: i8,
    pub dy: i8,
    left_edge: bool,
    right_edge: bool,
}

impl PollSnapshot {
    /// Button byte as it goes on the wire (already complemented).
    #[inline]
    #[must_use]
    pub fn button_byte(&self) -> u8 {
        encode_buttons(self.buttons)
    }
}

/// Everything the console has not been told yet.
///
/// Motion is kept in two stages. `pending` collects report deltas; a
/// snapshot folds it into `in_flight`, which is what gets transmitted.
/// `in_flight` is only cleared by a commit, so an aborted transaction
/// retransmits the same motion plus whatever arrived meanwhile, and motion
/// that arrives while a transaction is on the wire waits for the next poll.
#[derive(Debug, Default)]
pub struct AggregationState {
    pending: DeltaAccumulator,
    in_flight: DeltaAccumulator,
    left: ButtonEdgeQueue,
    right: ButtonEdgeQueue,
    reported: ButtonLevels,
}

impl AggregationState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: DeltaAccumulator::new(),
            in_flight: DeltaAccumulator::new(),
            left: ButtonEdgeQueue::new(),
            right: ButtonEdgeQueue::new(),
            reported: ButtonLevels::RELEASED,
        }
    }

    /// Merge one USB report: sum its motion and record button edges.
    pub fn merge_report(&mut self, report: &MouseReport) -> MergeOutcome {
        self.pending.merge(report.dx, report.dy);

        let left = self.left.record(report.buttons.left());
        let right = self.right.record(report.buttons.right());

        MergeOutcome {
            coalesced: left == RecordOutcome::Coalesced || right == RecordOutcome::Coalesced,
        }
    }

    /// Start a poll cycle: fold fresh motion into the in-flight sums and
    /// peek the next level of each button.
    pub fn snapshot(&mut self) -> PollSnapshot {
        self.in_flight.absorb(&mut self.pending);

        let left = self.left.peek(self.reported.left);
        let right = self.right.peek(self.reported.right);

        PollSnapshot {
            buttons: ButtonLevels { left, right },
            dx: self.in_flight.x(),
            dy: self.in_flight.y(),
            left_edge: left != self.reported.left,
            right_edge: right != self.reported.right,
        }
    }

    /// Finish a poll cycle whose transaction reached its last byte.
    pub fn commit(&mut self, snapshot: &PollSnapshot) {
        self.in_flight.take_and_reset();
        if snapshot.left_edge {
            self.left.commit();
        }
        if snapshot.right_edge {
            self.right.commit();
        }
        self.reported = snapshot.buttons;
    }

    /// Button levels the console last received.
    #[inline]
    #[must_use]
    pub fn reported(&self) -> ButtonLevels {
        self.reported
    }

    /// Motion not yet delivered to the console, saturated.
    #[must_use]
    pub fn undelivered_motion(&self) -> (i8, i8) {
        let mut total = self.in_flight;
        total.merge(self.pending.x(), self.pending.y());
        (total.x(), total.y())
    }

    /// Transitions still queued for (left, right).
    #[must_use]
    pub fn pending_edges(&self) -> (usize, usize) {
        (self.left.pending(), self.right.pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MouseButtons;

    fn motion(dx: i8, dy: i8) -> MouseReport {
        MouseReport::new(MouseButtons::NONE, dx, dy)
    }

    #[test]
    fn test_snapshot_then_commit_clears_motion() {
        let mut state = AggregationState::new();
        state.merge_report(&motion(100, -3));
        state.merge_report(&motion(50, -3));
        state.merge_report(&motion(90, -3));

        let snap = state.snapshot();
        assert_eq!((snap.dx, snap.dy), (127, -9));

        state.commit(&snap);
        assert_eq!(state.undelivered_motion(), (0, 0));
    }

    #[test]
    fn test_abandoned_snapshot_keeps_motion_for_retry() {
        let mut state = AggregationState::new();
        state.merge_report(&motion(10, 20));

        let first = state.snapshot();
        // Transaction aborted: no commit. More motion arrives.
        state.merge_report(&motion(5, 0));

        let retry = state.snapshot();
        assert_eq!((first.dx, first.dy), (10, 20));
        assert_eq!((retry.dx, retry.dy), (15, 20));

        state.commit(&retry);
        assert_eq!(state.undelivered_motion(), (0, 0));
    }

    #[test]
    fn test_motion_during_transaction_is_deferred() {
        let mut state = AggregationState::new();
        state.merge_report(&motion(7, 0));

        let snap = state.snapshot();
        state.merge_report(&motion(3, 1));
        state.commit(&snap);

        assert_eq!(snap.dx, 7);
        assert_eq!(state.undelivered_motion(), (3, 1));
        let next = state.snapshot();
        assert_eq!((next.dx, next.dy), (3, 1));
    }

    #[test]
    fn test_click_within_one_interval_spans_two_polls() {
        let mut state = AggregationState::new();
        state.merge_report(&MouseReport::new(MouseButtons::LEFT, 0, 0));
        state.merge_report(&MouseReport::new(MouseButtons::NONE, 0, 0));
        assert_eq!(state.pending_edges(), (2, 0));

        let poll_n = state.snapshot();
        assert!(poll_n.buttons.left);
        state.commit(&poll_n);

        let poll_n1 = state.snapshot();
        assert!(!poll_n1.buttons.left);
        state.commit(&poll_n1);

        let poll_n2 = state.snapshot();
        assert!(!poll_n2.buttons.left);
        assert_eq!(state.pending_edges(), (0, 0));
    }

    #[test]
    fn test_abort_does_not_consume_edge() {
        let mut state = AggregationState::new();
        state.merge_report(&MouseReport::new(MouseButtons::RIGHT, 0, 0));

        let aborted = state.snapshot();
        assert!(aborted.buttons.right);
        assert_eq!(state.pending_edges(), (0, 1));
        assert_eq!(state.reported(), ButtonLevels::RELEASED);

        let retry = state.snapshot();
        assert_eq!(retry, aborted);
        state.commit(&retry);
        assert!(state.reported().right);
        assert_eq!(state.pending_edges(), (0, 0));
    }

    #[test]
    fn test_edge_arriving_after_empty_snapshot_is_not_popped() {
        let mut state = AggregationState::new();
        let snap = state.snapshot();
        state.merge_report(&MouseReport::new(MouseButtons::LEFT, 0, 0));
        state.commit(&snap);

        assert_eq!(state.pending_edges(), (1, 0));
        assert!(state.snapshot().buttons.left);
    }

    #[test]
    fn test_held_button_persists() {
        let mut state = AggregationState::new();
        state.merge_report(&MouseReport::new(MouseButtons::LEFT, 0, 0));
        let snap = state.snapshot();
        state.commit(&snap);

        for _ in 0..3 {
            state.merge_report(&MouseReport::new(MouseButtons::LEFT, 1, 0));
            let snap = state.snapshot();
            assert!(snap.buttons.left);
            state.commit(&snap);
        }
    }
}
