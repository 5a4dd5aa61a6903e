//! Platform-agnostic PlayStation mouse emulation: report aggregation and the
//! controller port protocol engine.
//!
//! This crate has no chip-specific dependencies. The engine is generic over
//! `embedded-hal` pins and delays, and the shared state is generic over an
//! `embassy-sync` raw mutex, so everything here runs in host tests as well
//! as on the target.
//!
//! # Overview
//!
//! - [`types`]: USB side data ([`MouseReport`], [`MouseButtons`], [`ButtonLevels`])
//! - [`accumulator`]: saturating motion sums ([`DeltaAccumulator`])
//! - [`edge`]: per-button transition queues ([`ButtonEdgeQueue`])
//! - [`aggregation`]: everything not yet sent to the console ([`AggregationState`])
//! - [`channel`]: mutex-guarded hand-off between cores ([`ReportChannel`])
//! - [`protocol`]: the seven-byte transaction as a table ([`TRANSACTION`])
//! - [`engine`]: bit-level console handshake ([`ProtocolEngine`])
//!
//! # Data flow
//!
//! ```text
//! USB report --deliver--> ReportChannel { AggregationState }
//!                               |
//!              begin_poll / commit (once per console poll)
//!                               |
//!                        ProtocolEngine --> ATT/CLK/CMD/DAT/ACK
//! ```
//!
//! # Example
//!
//! ```
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use psx_mouse_core::{MouseButtons, MouseReport, ReportChannel};
//!
//! let channel: ReportChannel<NoopRawMutex> = ReportChannel::new();
//! channel.deliver(&MouseReport::new(MouseButtons::LEFT, 100, 0));
//! channel.deliver(&MouseReport::new(MouseButtons::NONE, 90, 0));
//!
//! let poll = channel.begin_poll();
//! assert_eq!(poll.dx, 127);
//! assert!(poll.buttons.left);
//! channel.commit(&poll);
//!
//! // The release is still queued for the next poll.
//! assert!(!channel.begin_poll().buttons.left);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod accumulator;
pub mod aggregation;
pub mod channel;
pub mod edge;
pub mod engine;
pub mod protocol;
pub mod types;

// Re-export main types at crate root
pub use accumulator::DeltaAccumulator;
pub use aggregation::{AggregationState, MergeOutcome, PollSnapshot};
pub use channel::ReportChannel;
pub use edge::{ButtonEdgeQueue, RecordOutcome, EDGE_QUEUE_CAPACITY};
pub use engine::{
    EngineState, EngineStats, EngineStatus, NoAttention, PortLines, ProtocolEngine,
    StatusIndicator, Timing, TransactionError, DEFAULT_TIMING,
};
pub use protocol::{encode_buttons, Expect, Outgoing, Step, TRANSACTION, TRANSACTION_LEN};
pub use types::{ButtonLevels, MouseButtons, MouseReport, ReportError};
