//! Wire-level definition of the PlayStation mouse transaction.
//!
//! One poll is seven bytes, each shifted LSB first on the console clock
//! while the console shifts its own byte out on the command line:
//!
//! | # | Device sends | Console sends | Check    | Ack |
//! |---|--------------|---------------|----------|-----|
//! | 1 | (nothing)    | `0x01`        | `0x01`   | yes |
//! | 2 | `0x12`       | `0x42`        | `0x42`   | yes |
//! | 3 | `0x5A`       | any           |          | yes |
//! | 4 | `0xFF`       | any           |          | yes |
//! | 5 | `!buttons`   | any           |          | yes |
//! | 6 | dx           | any           |          | yes |
//! | 7 | dy           | any           |          | no  |
//!
//! The missing ack after byte 7 tells the console the reply is over.

use crate::aggregation::PollSnapshot;
use crate::types::ButtonLevels;

/// Console "address the controller port device" command.
pub const POLL_COMMAND: u8 = 0x01;
/// Low byte of the mouse device ID (`0x5A12`).
pub const MOUSE_ID_LOW: u8 = 0x12;
/// Console "read data" command.
pub const READ_COMMAND: u8 = 0x42;
/// High byte of the device ID; announces that data follows.
pub const DATA_HEADER: u8 = 0x5A;
/// Status filler preceding the button byte.
pub const STATUS_FILLER: u8 = 0xFF;

/// Button byte bits that are always set before complementing.
pub const BUTTON_FIXED_BITS: u8 = 0b0000_0011;
/// Right button bit before complementing.
pub const BUTTON_RIGHT_BIT: u8 = 0b0000_0100;
/// Left button bit before complementing.
pub const BUTTON_LEFT_BIT: u8 = 0b0000_1000;

/// Source of the byte the device shifts out during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outgoing {
    /// Leave the data line released; only listen.
    Nothing,
    Fixed(u8),
    Buttons,
    DeltaX,
    DeltaY,
}

impl Outgoing {
    /// Byte to put on the data line for this poll, if any.
    #[inline]
    #[must_use]
    pub fn resolve(self, snapshot: &PollSnapshot) -> Option<u8> {
        match self {
            Outgoing::Nothing => None,
            Outgoing::Fixed(byte) => Some(byte),
            Outgoing::Buttons => Some(snapshot.button_byte()),
            Outgoing::DeltaX => Some(snapshot.dx as u8),
            Outgoing::DeltaY => Some(snapshot.dy as u8),
        }
    }
}

/// Requirement on the byte received from the console during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expect {
    Exactly(u8),
    Anything,
}

/// One byte of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub outgoing: Outgoing,
    pub expect: Expect,
    /// Pulse the acknowledge line after this byte.
    pub ack: bool,
}

/// Number of bytes in a complete transaction.
pub const TRANSACTION_LEN: usize = 7;

/// The full mouse reply, in wire order.
pub const TRANSACTION: [Step; TRANSACTION_LEN] = [
    Step {
        outgoing: Outgoing::Nothing,
        expect: Expect::Exactly(POLL_COMMAND),
        ack: true,
    },
    Step {
        outgoing: Outgoing::Fixed(MOUSE_ID_LOW),
        expect: Expect::Exactly(READ_COMMAND),
        ack: true,
    },
    Step {
        outgoing: Outgoing::Fixed(DATA_HEADER),
        expect: Expect::Anything,
        ack: true,
    },
    Step {
        outgoing: Outgoing::Fixed(STATUS_FILLER),
        expect: Expect::Anything,
        ack: true,
    },
    Step {
        outgoing: Outgoing::Buttons,
        expect: Expect::Anything,
        ack: true,
    },
    Step {
        outgoing: Outgoing::DeltaX,
        expect: Expect::Anything,
        ack: true,
    },
    Step {
        outgoing: Outgoing::DeltaY,
        expect: Expect::Anything,
        ack: false,
    },
];

/// Encode button levels as the active-low byte the console expects.
#[inline]
#[must_use]
pub const fn encode_buttons(levels: ButtonLevels) -> u8 {
    let mut byte = BUTTON_FIXED_BITS;
    if levels.right {
        byte |= BUTTON_RIGHT_BIT;
    }
    if levels.left {
        byte |= BUTTON_LEFT_BIT;
    }
    !byte
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_byte_is_active_low() {
        assert_eq!(encode_buttons(ButtonLevels::RELEASED), 0xFC);
        assert_eq!(
            encode_buttons(ButtonLevels {
                left: true,
                right: false
            }),
            0xF4
        );
        assert_eq!(
            encode_buttons(ButtonLevels {
                left: false,
                right: true
            }),
            0xF8
        );
        assert_eq!(
            encode_buttons(ButtonLevels {
                left: true,
                right: true
            }),
            0xF0
        );
    }

    #[test]
    fn test_only_last_step_skips_ack() {
        let (last, rest) = TRANSACTION.split_last().unwrap();
        assert!(!last.ack);
        assert!(rest.iter().all(|step| step.ack));
    }

    #[test]
    fn test_only_handshake_bytes_are_checked() {
        assert_eq!(TRANSACTION[0].expect, Expect::Exactly(POLL_COMMAND));
        assert_eq!(TRANSACTION[0].outgoing, Outgoing::Nothing);
        assert_eq!(TRANSACTION[1].expect, Expect::Exactly(READ_COMMAND));
        assert!(TRANSACTION[2..].iter().all(|step| step.expect == Expect::Anything));
    }
}
