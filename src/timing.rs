//! Settle deadlines between transmissions.
//!
//! The controller is write only here (no busy flag polling), so after every
//! transmission the next one has to be held back until the controller has
//! finished executing. [Scheduler] keeps at most one outstanding deadline and
//! blocks on it right before the next transmission starts.

use embedded_hal::delay::DelayNs;

use crate::mapping::DATA_MASK;

/// Settle time after Clear Display or Return Home, in µs.
pub const SLOW_SETTLE_US: u32 = 16_000;

/// Settle time after any other instruction or data write, in µs.
pub const FAST_SETTLE_US: u32 = 40;

/// Settle time after a raw nibble of the power-on sequence, in µs.
///
/// During 8-bit/4-bit negotiation the controller state isn't known, so every
/// nibble gets the same long wait whatever its value.
pub const INIT_SETTLE_US: u32 = 5_000;

/// Monotonic microsecond time source used to measure deadlines.
pub trait Clock {
    /// Current time in µs. Must never go backwards.
    fn now_us(&mut self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_us(&mut self) -> u64 {
        T::now_us(self)
    }
}

/// Clock that never advances.
///
/// Every wait lasts the full settle time, which is always safe but ignores
/// time that already passed between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    fn now_us(&mut self) -> u64 {
        0
    }
}

/// Execution time class of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandClass {
    /// Clear Display or Return Home.
    Slow,
    /// Everything else.
    Fast,
}

impl CommandClass {
    /// Classifies the command sent as the nibble pair `hi`, `lo`.
    ///
    /// The value is rebuilt over the full nibble bytes, so a pair with RS set
    /// (a data write) always lands far above the slow range.
    pub fn of(hi: u8, lo: u8) -> Self {
        let value = (u16::from(hi) << 4) | u16::from(lo & DATA_MASK);
        if value < 4 {
            CommandClass::Slow
        } else {
            CommandClass::Fast
        }
    }

    /// Settle time the controller needs after a command of this class.
    pub const fn settle_us(self) -> u32 {
        match self {
            CommandClass::Slow => SLOW_SETTLE_US,
            CommandClass::Fast => FAST_SETTLE_US,
        }
    }
}

/// Idle/armed deadline state of one encoder instance.
#[derive(Debug, Default)]
pub struct Scheduler {
    deadline: Option<u64>,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Returns the pending deadline, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arms a deadline `settle_us` from now, replacing any pending one.
    pub fn arm<C: Clock>(&mut self, clock: &mut C, settle_us: u32) {
        let deadline = clock.now_us().saturating_add(u64::from(settle_us));
        #[cfg(feature = "defmt")]
        defmt::trace!("deadline armed: {=u32}us (at {=u64})", settle_us, deadline);
        self.deadline = Some(deadline);
    }

    /// Blocks until the pending deadline elapses and returns to idle.
    ///
    /// Returns the number of µs actually waited.
    pub fn wait<C: Clock, D: DelayNs>(&mut self, clock: &mut C, delay: &mut D) -> u32 {
        let Some(deadline) = self.deadline.take() else {
            return 0;
        };
        let now = clock.now_us();
        if deadline <= now {
            return 0;
        }
        let remaining = u32::try_from(deadline - now).unwrap_or(u32::MAX);
        #[cfg(feature = "defmt")]
        defmt::trace!("waiting {=u32}us for settle deadline", remaining);
        delay.delay_us(remaining);
        remaining
    }
}
