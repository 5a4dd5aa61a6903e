//! Console-facing protocol engine.
//!
//! The engine impersonates the mouse on the controller port. It owns the
//! five port lines and busy-waits on the console clock; the console may
//! pause for any length of time between bits, so the only way out of a
//! wait is the console releasing the attention line.
//!
//! Nothing in here allocates, logs, or blocks on anything but line levels
//! and short fixed delays. It is meant to run alone on a core.

use core::convert::Infallible;
use core::hint::spin_loop;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::aggregation::PollSnapshot;
use crate::channel::ReportChannel;
use crate::protocol::{Expect, TRANSACTION};
use crate::types::ButtonLevels;

/// Fixed delays around each byte, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Hold after the last rising clock edge of a byte before releasing data.
    pub settle_us: u32,
    /// Further wait before the ack pulse starts.
    pub ack_delay_us: u32,
    /// Width of the ack pulse.
    pub ack_pulse_us: u32,
}

/// Ack starts ~10 us after the last clock edge and lasts 3 us.
pub const DEFAULT_TIMING: Timing = Timing {
    settle_us: 2,
    ack_delay_us: 8,
    ack_pulse_us: 3,
};

/// Where the engine is in the console's poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Attention deasserted, between poll cycles.
    Idle,
    /// Waiting for the console to assert attention.
    AwaitAssert,
    /// Exchanging byte `step` (0-based) of the transaction.
    InTransaction { step: u8 },
    /// The transaction was just abandoned.
    Aborted,
}

/// The console deasserted attention in the middle of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoAttention;

/// Why a transaction did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// Attention went away during byte `step`.
    NoAttention { step: u8 },
    /// The console sent something other than the mouse handshake.
    UnexpectedByte { step: u8, expected: u8, received: u8 },
}

/// Transaction counters, wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    pub completed: u32,
    /// Cut short by attention deassertion.
    pub aborted: u32,
    /// Handshake byte mismatch (console talking to another device).
    pub rejected: u32,
}

/// What the engine exposes to a status indicator between poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStatus {
    pub reported: ButtonLevels,
    pub stats: EngineStats,
}

/// Something to update while attention is deasserted, e.g. an LED.
///
/// Called from the real-time loop; implementations must return quickly
/// and must not touch any controller port line.
pub trait StatusIndicator {
    fn update(&mut self, status: &EngineStatus);
}

impl StatusIndicator for () {
    fn update(&mut self, _status: &EngineStatus) {}
}

/// The five controller port lines.
///
/// Inputs read `true` for a high level. `data` and `acknowledge` are open
/// drain: `set_high` releases the line to the console's pull-up and
/// `set_low` drives it low.
pub struct PortLines<ATT, CLK, CMD, DAT, ACK> {
    /// Active low, console driven.
    pub attention: ATT,
    pub clock: CLK,
    pub command: CMD,
    pub data: DAT,
    pub acknowledge: ACK,
}

/// PlayStation mouse protocol engine.
pub struct ProtocolEngine<ATT, CLK, CMD, DAT, ACK, D> {
    lines: PortLines<ATT, CLK, CMD, DAT, ACK>,
    delay: D,
    timing: Timing,
    state: EngineState,
    stats: EngineStats,
}

impl<ATT, CLK, CMD, DAT, ACK, D> ProtocolEngine<ATT, CLK, CMD, DAT, ACK, D>
where
    ATT: InputPin<Error = Infallible>,
    CLK: InputPin<Error = Infallible>,
    CMD: InputPin<Error = Infallible>,
    DAT: OutputPin<Error = Infallible>,
    ACK: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Create an engine with [`DEFAULT_TIMING`]. Both outputs are released.
    pub fn new(lines: PortLines<ATT, CLK, CMD, DAT, ACK>, delay: D) -> Self {
        Self::with_timing(lines, delay, DEFAULT_TIMING)
    }

    pub fn with_timing(
        lines: PortLines<ATT, CLK, CMD, DAT, ACK>,
        delay: D,
        timing: Timing,
    ) -> Self {
        let mut engine = Self {
            lines,
            delay,
            timing,
            state: EngineState::Idle,
            stats: EngineStats::default(),
        };
        engine.release_data();
        set_released(&mut engine.lines.acknowledge, true);
        engine
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Serve poll cycles forever.
    pub fn run<M: RawMutex>(
        &mut self,
        channel: &ReportChannel<M>,
        status: &mut impl StatusIndicator,
    ) -> ! {
        loop {
            let _ = self.serve_poll(channel, status);
        }
    }

    /// One poll cycle: wait for a fresh attention window, then answer it.
    pub fn serve_poll<M: RawMutex>(
        &mut self,
        channel: &ReportChannel<M>,
        status: &mut impl StatusIndicator,
    ) -> Result<PollSnapshot, TransactionError> {
        self.wait_for_attention(channel, status);
        self.transact(channel)
    }

    /// Wait out the current attention window, then wait for the next one.
    ///
    /// The status indicator is updated once, while attention is deasserted.
    pub fn wait_for_attention<M: RawMutex>(
        &mut self,
        channel: &ReportChannel<M>,
        status: &mut impl StatusIndicator,
    ) {
        while self.attention_asserted() {
            spin_loop();
        }

        self.state = EngineState::Idle;
        status.update(&EngineStatus {
            reported: channel.reported(),
            stats: self.stats,
        });

        self.state = EngineState::AwaitAssert;
        while !self.attention_asserted() {
            spin_loop();
        }
    }

    /// Run one transaction with attention asserted.
    ///
    /// The aggregation state is only consumed if all seven bytes went out.
    pub fn transact<M: RawMutex>(
        &mut self,
        channel: &ReportChannel<M>,
    ) -> Result<PollSnapshot, TransactionError> {
        let snapshot = channel.begin_poll();

        match self.exchange_all(&snapshot) {
            Ok(()) => {
                channel.commit(&snapshot);
                self.stats.completed = self.stats.completed.wrapping_add(1);
                self.state = EngineState::Idle;
                Ok(snapshot)
            }
            Err(err) => {
                self.state = EngineState::Aborted;
                match err {
                    TransactionError::NoAttention { .. } => {
                        self.stats.aborted = self.stats.aborted.wrapping_add(1);
                    }
                    TransactionError::UnexpectedByte { .. } => {
                        self.stats.rejected = self.stats.rejected.wrapping_add(1);
                    }
                }
                self.state = EngineState::AwaitAssert;
                Err(err)
            }
        }
    }

    fn exchange_all(&mut self, snapshot: &PollSnapshot) -> Result<(), TransactionError> {
        for (index, step) in TRANSACTION.iter().enumerate() {
            let step_no = index as u8;
            self.state = EngineState::InTransaction { step: step_no };

            let received = self
                .exchange_byte(step.outgoing.resolve(snapshot))
                .map_err(|NoAttention| TransactionError::NoAttention { step: step_no })?;

            match step.expect {
                Expect::Exactly(expected) if received != expected => {
                    return Err(TransactionError::UnexpectedByte {
                        step: step_no,
                        expected,
                        received,
                    });
                }
                _ => {}
            }

            if step.ack {
                self.acknowledge();
            }
        }
        Ok(())
    }

    /// Shift one byte in from the command line, and optionally one byte out
    /// on the data line, LSB first.
    pub fn exchange_byte(&mut self, outgoing: Option<u8>) -> Result<u8, NoAttention> {
        let mut received = 0u8;

        for bit in 0..8 {
            self.wait_for_clock(false)?;
            if let Some(byte) = outgoing {
                set_released(&mut self.lines.data, byte & (1 << bit) != 0);
            }

            self.wait_for_clock(true)?;
            if level(&mut self.lines.command) {
                received |= 1 << bit;
            }
        }

        self.delay.delay_us(self.timing.settle_us);
        self.release_data();
        Ok(received)
    }

    /// Pulse the acknowledge line low.
    fn acknowledge(&mut self) {
        self.delay.delay_us(self.timing.ack_delay_us);
        set_released(&mut self.lines.acknowledge, false);
        self.delay.delay_us(self.timing.ack_pulse_us);
        set_released(&mut self.lines.acknowledge, true);
    }

    /// Spin until the clock reads `high`, bailing out if attention drops.
    #[inline(always)]
    fn wait_for_clock(&mut self, high: bool) -> Result<(), NoAttention> {
        loop {
            let clock = level(&mut self.lines.clock);
            if !self.attention_asserted() {
                self.release_data();
                return Err(NoAttention);
            }
            if clock == high {
                return Ok(());
            }
            spin_loop();
        }
    }

    #[inline(always)]
    fn attention_asserted(&mut self) -> bool {
        !level(&mut self.lines.attention)
    }

    #[inline(always)]
    fn release_data(&mut self) {
        set_released(&mut self.lines.data, true);
    }
}

#[inline(always)]
fn level<P: InputPin<Error = Infallible>>(pin: &mut P) -> bool {
    match pin.is_high() {
        Ok(high) => high,
        Err(never) => match never {},
    }
}

#[inline(always)]
fn set_released<P: OutputPin<Error = Infallible>>(pin: &mut P, released: bool) {
    let result = if released {
        pin.set_high()
    } else {
        pin.set_low()
    };
    if let Err(never) = result {
        match never {}
    }
}
