//! Conversion between integers and the word sequences carried by wide ports.
//!
//! Ports up to 64 bits travel as a single value. Wider ports travel as
//! `ceil(width / 32)` words of 32 bits, least significant word first, which is
//! the layout `prep` expects and `update` returns.

/// Bits per word in a wide port.
pub const WORD_BITS: u32 = 32;

/// The widest signal [`pack`] and [`unpack`] can represent.
pub const MAX_PACK_BITS: u32 = 128;

const WORD_MASK: u128 = 0xffff_ffff;

/// Errors from packing or unpacking word sequences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// The signal is wider than a `u128` can hold.
    #[error("signal width {width} exceeds the {MAX_PACK_BITS}-bit packing limit")]
    WidthTooLarge {
        /// The requested signal width in bits.
        width: u32,
    },

    /// No words were supplied to unpack.
    #[error("no words to unpack")]
    Empty,
}

/// Splits `value` into the word sequence for a port of `width` bits.
pub fn pack(width: u32, value: u128) -> Result<Vec<u64>, PackError> {
    if width > MAX_PACK_BITS {
        return Err(PackError::WidthTooLarge { width });
    }
    if width <= 64 {
        return Ok(vec![value as u64]);
    }
    let words = width.div_ceil(WORD_BITS);
    Ok((0..words)
        .map(|i| ((value >> (i * WORD_BITS)) & WORD_MASK) as u64)
        .collect())
}

/// Reassembles a value from the word sequence of a port of `width` bits.
///
/// Surplus words beyond the port width are ignored; each word contributes
/// only its low 32 bits.
pub fn unpack(width: u32, words: &[u64]) -> Result<u128, PackError> {
    if width > MAX_PACK_BITS {
        return Err(PackError::WidthTooLarge { width });
    }
    let first = words.first().ok_or(PackError::Empty)?;
    if width <= 64 {
        return Ok(*first as u128);
    }
    let count = width.div_ceil(WORD_BITS) as usize;
    Ok(words
        .iter()
        .take(count)
        .enumerate()
        .fold(0u128, |acc, (i, w)| {
            acc | ((*w as u128 & WORD_MASK) << (i as u32 * WORD_BITS))
        }))
}
