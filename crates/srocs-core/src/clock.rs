//! Simulation tick clock.
//!
//! The clock is the single source of truth for simulation time. It starts
//! at tick 0 and advances by exactly one per control-loop iteration; the
//! scenario engine only ever reads it.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic simulation tick counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickClock {
    /// Current tick number (0 before the first step).
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an arbitrary tick (state restoration, tests).
    pub const fn starting_at(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Rewind to tick 0 (scenario reset).
    pub const fn reset(&mut self) {
        self.tick = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        assert_eq!(TickClock::new().tick(), 0);
    }

    #[test]
    fn clock_advances_by_one() {
        let mut clock = TickClock::new();
        assert_eq!(clock.advance().ok(), Some(1));
        assert_eq!(clock.advance().ok(), Some(2));
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn clock_refuses_to_overflow() {
        let mut clock = TickClock::starting_at(u64::MAX);
        assert!(matches!(clock.advance(), Err(ClockError::TickOverflow)));
        assert_eq!(clock.tick(), u64::MAX);
    }

    #[test]
    fn reset_rewinds() {
        let mut clock = TickClock::starting_at(40);
        clock.reset();
        assert_eq!(clock.tick(), 0);
    }
}
