//! Level algebra and fixed-width bus conversions.
//!
//! The helpers are named for their active-high function: `and` is true
//! when every input is high, regardless of how the board later interprets
//! the result.

/// A single wire level: `0` (low) or `1` (high).
pub type Level = u8;

/// Convert a boolean to a level.
#[inline]
pub const fn bit(b: bool) -> Level {
    if b { 1 } else { 0 }
}

/// Invert a level.
///
/// # Panics
/// Panics if `b` is not a level.
#[inline]
pub fn invert(b: Level) -> Level {
    assert!(b <= 1, "invalid level {}", b);
    b ^ 1
}

/// High iff every input is high. An empty input is high.
#[inline]
pub fn and(bs: &[Level]) -> Level {
    bit(bs.iter().all(|&b| b == 1))
}

/// High iff any input is high. An empty input is low.
#[inline]
pub fn or(bs: &[Level]) -> Level {
    bit(bs.iter().any(|&b| b == 1))
}

/// Mask covering the low `width` bits.
#[inline]
pub const fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// One-hot decode of a `width`-bit value.
///
/// Returns a `2^width`-wide mask with exactly one bit set, at the index
/// equal to `value`.
///
/// # Panics
/// Panics if `value` does not fit in `width` bits or the result would not
/// fit in 32 bits.
pub fn decode(value: u32, width: u32) -> u32 {
    assert!(width <= 5, "decode width {} too large", width);
    assert!(
        value <= mask(width),
        "value {:#x} does not fit in {} bits",
        value,
        width
    );
    1 << value
}

/// Positional pick, 0-based.
///
/// # Panics
/// Panics if `index` is out of range. A selector outside the input set is
/// a wiring fault and is never clamped.
#[inline]
pub fn select(index: usize, values: &[Level]) -> Level {
    assert!(
        index < values.len(),
        "selector {} out of range for {} inputs",
        index,
        values.len()
    );
    values[index]
}

/// Level of bit `index` of `value`.
#[inline]
pub const fn bit_at(value: u32, index: u32) -> Level {
    ((value >> index) & 1) as Level
}

/// Unpack a `W`-bit value into levels, least-significant first.
///
/// # Panics
/// Panics if `value` does not fit in `W` bits.
pub fn to_bits<const W: usize>(value: u32) -> [Level; W] {
    assert!(
        value <= mask(W as u32),
        "value {:#x} does not fit in {} bits",
        value,
        W
    );
    let mut bits = [0; W];
    for (i, b) in bits.iter_mut().enumerate() {
        *b = bit_at(value, i as u32);
    }
    bits
}

/// Pack levels, least-significant first, into an integer.
///
/// # Panics
/// Panics if any element is not a level or there are more than 32 of them.
pub fn from_bits(bits: &[Level]) -> u32 {
    assert!(bits.len() <= 32, "bus of {} bits is too wide", bits.len());
    bits.iter().enumerate().fold(0, |acc, (shift, &b)| {
        assert!(b <= 1, "invalid level {} at bit {}", b, shift);
        acc | (u32::from(b) << shift)
    })
}

/// Split a byte into (low, high) nibbles.
#[inline]
pub const fn nibbles(byte: u8) -> (u8, u8) {
    (byte & 0x0f, byte >> 4)
}

/// Join (low, high) nibbles into a byte.
#[inline]
pub fn join_nibbles(low: u8, high: u8) -> u8 {
    assert!(low <= 0x0f && high <= 0x0f, "nibble out of range");
    (high << 4) | low
}
