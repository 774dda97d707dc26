//! Port storage widths and directions as seen on a compiled circuit model.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pack::WORD_BITS;

/// The native storage of a port field on the simulation model.
///
/// Scalar ports are held in the smallest unsigned integer that fits their bit
/// width. Ports wider than 64 bits are held as an array of 32-bit words,
/// least significant word first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortWidth {
    /// 1 to 8 bits, stored in a `u8`.
    U8,
    /// 9 to 16 bits, stored in a `u16`.
    U16,
    /// 17 to 32 bits, stored in a `u32`.
    U32,
    /// 33 to 64 bits, stored in a `u64`.
    U64,
    /// More than 64 bits, stored as `words` 32-bit words.
    Wide {
        /// Number of 32-bit words backing the port.
        words: usize,
    },
}

impl PortWidth {
    /// Picks the storage class for a signal of the given bit width.
    ///
    /// A width of zero is treated as a single bit.
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            0..=8 => PortWidth::U8,
            9..=16 => PortWidth::U16,
            17..=32 => PortWidth::U32,
            33..=64 => PortWidth::U64,
            _ => PortWidth::Wide {
                words: bits.div_ceil(WORD_BITS) as usize,
            },
        }
    }

    /// Returns the number of bits in the native storage.
    pub fn storage_bits(self) -> u32 {
        match self {
            PortWidth::U8 => 8,
            PortWidth::U16 => 16,
            PortWidth::U32 => 32,
            PortWidth::U64 => 64,
            PortWidth::Wide { words } => words as u32 * WORD_BITS,
        }
    }

    /// Returns the number of words a driver supplies for this port.
    pub fn word_count(self) -> usize {
        match self {
            PortWidth::Wide { words } => words,
            _ => 1,
        }
    }

    /// Returns `true` for array-of-words ports.
    pub fn is_wide(self) -> bool {
        matches!(self, PortWidth::Wide { .. })
    }

    /// Truncates a value into the native word of this port.
    ///
    /// For wide ports the native word is 32 bits. Truncation wraps; there is
    /// no range check.
    pub fn truncate(self, value: u64) -> u64 {
        match self {
            PortWidth::U8 => value as u8 as u64,
            PortWidth::U16 => value as u16 as u64,
            PortWidth::U32 | PortWidth::Wide { .. } => value as u32 as u64,
            PortWidth::U64 => value,
        }
    }
}

impl fmt::Display for PortWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortWidth::U8 => write!(f, "u8"),
            PortWidth::U16 => write!(f, "u16"),
            PortWidth::U32 => write!(f, "u32"),
            PortWidth::U64 => write!(f, "u64"),
            PortWidth::Wide { words } => write!(f, "[u32; {words}]"),
        }
    }
}

/// The direction of a port relative to the circuit model.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven by the testbench, sampled by the model.
    Input,
    /// Driven by the model.
    Output,
    /// Bidirectional bus field, both driven and observed.
    Inout,
    /// The clock input, owned by the clock sequencer.
    Clock,
}

impl Direction {
    /// Returns `true` if a driver may write this port through `prep`.
    pub fn is_writable(self) -> bool {
        matches!(self, Direction::Input | Direction::Inout)
    }

    /// Returns `true` if the port is an output or a bidirectional field.
    pub fn is_observable(self) -> bool {
        matches!(self, Direction::Output | Direction::Inout)
    }

    /// Returns the keyword used for this direction in registry declarations.
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
            Direction::Clock => "clock",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_boundaries() {
        assert_eq!(PortWidth::from_bits(1), PortWidth::U8);
        assert_eq!(PortWidth::from_bits(8), PortWidth::U8);
        assert_eq!(PortWidth::from_bits(9), PortWidth::U16);
        assert_eq!(PortWidth::from_bits(16), PortWidth::U16);
        assert_eq!(PortWidth::from_bits(17), PortWidth::U32);
        assert_eq!(PortWidth::from_bits(32), PortWidth::U32);
        assert_eq!(PortWidth::from_bits(33), PortWidth::U64);
        assert_eq!(PortWidth::from_bits(64), PortWidth::U64);
        assert_eq!(PortWidth::from_bits(65), PortWidth::Wide { words: 3 });
        assert_eq!(PortWidth::from_bits(128), PortWidth::Wide { words: 4 });
    }

    #[test]
    fn zero_width_is_a_bit() {
        assert_eq!(PortWidth::from_bits(0), PortWidth::U8);
    }

    #[test]
    fn truncate_wraps() {
        assert_eq!(PortWidth::U8.truncate(0x1ff), 0xff);
        assert_eq!(PortWidth::U16.truncate(0x1_2345), 0x2345);
        assert_eq!(PortWidth::U32.truncate(u64::MAX), 0xffff_ffff);
        assert_eq!(PortWidth::U64.truncate(u64::MAX), u64::MAX);
        assert_eq!(
            PortWidth::Wide { words: 4 }.truncate(0xdead_beef_0000_0001),
            1
        );
    }

    #[test]
    fn storage_bits_and_words() {
        assert_eq!(PortWidth::U16.storage_bits(), 16);
        assert_eq!(PortWidth::Wide { words: 4 }.storage_bits(), 128);
        assert_eq!(PortWidth::U64.word_count(), 1);
        assert_eq!(PortWidth::Wide { words: 4 }.word_count(), 4);
        assert!(PortWidth::Wide { words: 2 }.is_wide());
        assert!(!PortWidth::U32.is_wide());
    }

    #[test]
    fn direction_capabilities() {
        assert!(Direction::Input.is_writable());
        assert!(Direction::Inout.is_writable());
        assert!(!Direction::Output.is_writable());
        assert!(!Direction::Clock.is_writable());
        assert!(Direction::Output.is_observable());
        assert!(Direction::Inout.is_observable());
        assert!(!Direction::Input.is_observable());
    }

    #[test]
    fn display() {
        assert_eq!(PortWidth::Wide { words: 4 }.to_string(), "[u32; 4]");
        assert_eq!(Direction::Inout.to_string(), "inout");
    }

    #[test]
    fn direction_serde() {
        let json = serde_json::to_string(&Direction::Output).unwrap();
        assert_eq!(json, "\"output\"");
    }
}
