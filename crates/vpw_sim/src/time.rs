//! Tick counting and the trace offsets placed around each clock edge.
//!
//! [`TickCount`] is the harness's notion of simulated time: one unit per
//! completed `tick`. [`ClockSchedule`] maps a tick to the three trace times
//! of its evaluation steps, which are strictly increasing across the whole
//! simulation as long as `setup + hold < period`.

use std::fmt;

use serde::{Deserialize, Serialize};
use vpw_config::ClockConfig;

use crate::error::SimError;

/// Number of ticks started since `init`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TickCount(u64);

impl TickCount {
    /// The count before the first tick.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw count.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Advances the count by one tick and returns the new value.
    pub fn advance(&mut self) -> TickCount {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for TickCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

/// The three evaluation steps of a tick, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Clock low, inputs from `prep` settling.
    Settle,
    /// Clock driven high.
    Rising,
    /// Clock driven back low.
    Falling,
}

/// Trace time offsets around the rising edge of each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSchedule {
    period: u64,
    setup: u64,
    hold: u64,
}

impl ClockSchedule {
    /// Creates a schedule, or `None` if the offsets could collide.
    pub fn new(period: u64, setup: u64, hold: u64) -> Option<Self> {
        let ordered = setup
            .checked_add(hold)
            .is_some_and(|span| span < period);
        (setup >= 1 && hold >= 1 && ordered).then_some(Self {
            period,
            setup,
            hold,
        })
    }

    /// Returns the trace time of `phase` within `tick`.
    ///
    /// Tick 1 with the default schedule dumps at 8, 10 and 15. Fails with
    /// [`SimError::TimeOverflow`] when the time does not fit in a `u64`,
    /// which includes the settle step of tick zero.
    pub fn time_of(&self, tick: TickCount, phase: Phase) -> Result<u64, SimError> {
        let edge = tick.get().checked_mul(self.period);
        let time = match phase {
            Phase::Settle => edge.and_then(|e| e.checked_sub(self.setup)),
            Phase::Rising => edge,
            Phase::Falling => edge.and_then(|e| e.checked_add(self.hold)),
        };
        time.ok_or(SimError::TimeOverflow { tick: tick.get() })
    }

    /// Trace time units per tick.
    pub fn period(&self) -> u64 {
        self.period
    }
}

impl Default for ClockSchedule {
    fn default() -> Self {
        Self {
            period: 10,
            setup: 2,
            hold: 5,
        }
    }
}

impl TryFrom<ClockConfig> for ClockSchedule {
    type Error = SimError;

    fn try_from(c: ClockConfig) -> Result<Self, Self::Error> {
        Self::new(c.period, c.setup, c.hold).ok_or(SimError::InvalidSchedule {
            period: c.period,
            setup: c.setup,
            hold: c.hold,
        })
    }
}
