//! Trace timescale with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A time unit accepted in a VCD `$timescale` declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    /// Returns the unit suffix as written in a VCD file.
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

/// The length of one trace time unit, e.g. `1ps` or `10ns`.
///
/// The magnitude is restricted to 1, 10 or 100 as required by IEEE 1364.
/// Parses from and serializes to its display form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timescale {
    magnitude: u32,
    unit: TimeUnit,
}

impl Timescale {
    /// Creates a timescale, or `None` if `magnitude` is not 1, 10 or 100.
    pub fn new(magnitude: u32, unit: TimeUnit) -> Option<Self> {
        matches!(magnitude, 1 | 10 | 100).then_some(Self { magnitude, unit })
    }

    /// Returns the magnitude (1, 10 or 100).
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Returns the unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Ps,
        }
    }
}

impl fmt::Debug for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timescale({self})")
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Error type for parsing timescale strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timescale: '{input}'")]
pub struct ParseTimescaleError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Timescale {
    type Err = ParseTimescaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseTimescaleError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(err)?;
        let (num, unit) = lower.split_at(split);
        let magnitude: u32 = num.parse().map_err(|_| err())?;
        let unit = match unit.trim() {
            "s" => TimeUnit::S,
            "ms" => TimeUnit::Ms,
            "us" => TimeUnit::Us,
            "ns" => TimeUnit::Ns,
            "ps" => TimeUnit::Ps,
            "fs" => TimeUnit::Fs,
            _ => return Err(err()),
        };
        Timescale::new(magnitude, unit).ok_or_else(err)
    }
}

impl TryFrom<String> for Timescale {
    type Error = ParseTimescaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timescale> for String {
    fn from(ts: Timescale) -> Self {
        ts.to_string()
    }
}
