//! Core mouse types: MouseButtons, MouseReport, ButtonLevels.

use core::ops::{BitOr, BitOrAssign};

/// Button state of a boot-protocol mouse report, as a bitfield.
///
/// Only [`MouseButtons::LEFT`] and [`MouseButtons::RIGHT`] reach the console;
/// the remaining bits are kept so a report survives decoding untouched.
///
/// # Example
///
/// ```
/// use psx_mouse_core::MouseButtons;
///
/// let buttons = MouseButtons::LEFT | MouseButtons::RIGHT;
/// assert!(buttons.left());
/// assert!(buttons.right());
/// assert!(!buttons.contains(MouseButtons::MIDDLE));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseButtons(pub u8);

impl MouseButtons {
    pub const LEFT: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);
    pub const MIDDLE: Self = Self(1 << 2);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: MouseButtons) -> bool {
        (self.0 & button.0) == button.0
    }

    #[inline]
    #[must_use]
    pub const fn left(self) -> bool {
        self.contains(Self::LEFT)
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> bool {
        self.contains(Self::RIGHT)
    }

    /// Get the raw bitmask.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for MouseButtons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MouseButtons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Error type for decoding upstream reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Report shorter than buttons + dx + dy. Carries the received length.
    TooShort(usize),
}

/// One decoded HID boot-protocol mouse report.
///
/// Layout on the USB side: `[buttons, dx, dy, wheel]`, deltas signed.
/// The wheel byte is optional and never forwarded.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    pub buttons: MouseButtons,
    pub dx: i8,
    pub dy: i8,
    pub wheel: i8,
}

impl MouseReport {
    /// Length of a boot report with a wheel byte.
    pub const BOOT_REPORT_LEN: usize = 4;

    /// Shortest report that still carries buttons and both axes.
    pub const MIN_REPORT_LEN: usize = 3;

    #[must_use]
    pub const fn new(buttons: MouseButtons, dx: i8, dy: i8) -> Self {
        Self {
            buttons,
            dx,
            dy,
            wheel: 0,
        }
    }

    /// Decode a raw boot report. Bytes past the wheel byte are ignored.
    pub fn from_boot_report(data: &[u8]) -> Result<Self, ReportError> {
        if data.len() < Self::MIN_REPORT_LEN {
            return Err(ReportError::TooShort(data.len()));
        }

        Ok(Self {
            buttons: MouseButtons(data[0]),
            dx: data[1] as i8,
            dy: data[2] as i8,
            wheel: data.get(3).map_or(0, |&w| w as i8),
        })
    }
}

/// Levels of the two buttons the console knows about (`true` = pressed).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonLevels {
    pub left: bool,
    pub right: bool,
}

impl ButtonLevels {
    /// Both buttons released.
    pub const RELEASED: Self = Self {
        left: false,
        right: false,
    };

    #[must_use]
    pub const fn any_pressed(self) -> bool {
        self.left || self.right
    }
}
