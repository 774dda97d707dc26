//! Values read back from a simulation model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value of one signal in a snapshot.
///
/// Serializes untagged, so a snapshot renders as `{"rst": 1, "data": [1, 2]}`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// A port of up to 64 bits.
    Scalar(u64),
    /// A wide port as 32-bit words, least significant word first.
    Words(Vec<u64>),
}

impl SignalValue {
    /// Returns the scalar value, or `None` for a word array.
    pub fn as_scalar(&self) -> Option<u64> {
        match self {
            SignalValue::Scalar(v) => Some(*v),
            SignalValue::Words(_) => None,
        }
    }

    /// Returns the words of an array value, or `None` for a scalar.
    pub fn as_words(&self) -> Option<&[u64]> {
        match self {
            SignalValue::Scalar(_) => None,
            SignalValue::Words(w) => Some(w),
        }
    }
}

impl From<u64> for SignalValue {
    fn from(v: u64) -> Self {
        SignalValue::Scalar(v)
    }
}

impl From<Vec<u64>> for SignalValue {
    fn from(words: Vec<u64>) -> Self {
        SignalValue::Words(words)
    }
}

impl PartialEq<u64> for SignalValue {
    fn eq(&self, other: &u64) -> bool {
        self.as_scalar() == Some(*other)
    }
}

impl PartialEq<[u64]> for SignalValue {
    fn eq(&self, other: &[u64]) -> bool {
        self.as_words() == Some(other)
    }
}

impl<const N: usize> PartialEq<[u64; N]> for SignalValue {
    fn eq(&self, other: &[u64; N]) -> bool {
        self.as_words() == Some(&other[..])
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Scalar(v) => write!(f, "{v:#x}"),
            SignalValue::Words(words) => {
                write!(f, "[")?;
                for (i, w) in words.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{w:#x}")?;
                }
                write!(f, "]")
            }
        }
    }
}
