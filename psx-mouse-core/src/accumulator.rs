//! Saturating motion accumulation between console polls.

/// Running per-axis motion sums, each clamped to `i8`.
///
/// Many USB reports usually arrive between two console polls, but the
/// console only takes one signed byte per axis. Sums saturate at
/// `-128`/`127` instead of wrapping, so a fast swipe reads as "as far as
/// possible" rather than reversing direction.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeltaAccumulator {
    x: i8,
    y: i8,
}

impl DeltaAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Add one report's deltas.
    #[inline]
    pub fn merge(&mut self, dx: i8, dy: i8) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Move everything from `other` into `self`, leaving `other` at zero.
    #[inline]
    pub fn absorb(&mut self, other: &mut DeltaAccumulator) {
        let (dx, dy) = other.take_and_reset();
        self.merge(dx, dy);
    }

    /// Return the current sums and reset them to zero.
    #[inline]
    pub fn take_and_reset(&mut self) -> (i8, i8) {
        let sums = (self.x, self.y);
        *self = Self::new();
        sums
    }

    #[inline]
    #[must_use]
    pub const fn x(&self) -> i8 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn y(&self) -> i8 {
        self.y
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}
