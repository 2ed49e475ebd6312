//! Concrete bit primitives. A [`BitVector`] holds up to [`MAX_WIDTH`] bits in a
//! single `u128`, indexed from the most significant bit so that index 0 is the
//! leftmost character of the textual form.

use std::fmt;
use std::str::FromStr;

use super::error::VdtError;

/// Widest instruction word supported by the decode tree.
pub const MAX_WIDTH: u32 = 128;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bit(pub bool);

impl Bit {
    pub fn value(self) -> bool {
        self.0
    }

    pub fn and(self, other: Bit) -> Bit {
        Bit(self.0 && other.0)
    }

    pub fn or(self, other: Bit) -> Bit {
        Bit(self.0 || other.0)
    }

    pub fn not(self) -> Bit {
        Bit(!self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitVector {
    width: u32,
    bits: u128,
}

impl BitVector {
    /// Builds a vector from the low `width` bits of `value`. Higher bits are dropped.
    pub fn from_value(value: u128, width: u32) -> Self {
        debug_assert!(width > 0 && width <= MAX_WIDTH, "bit vector width {width}");
        Self {
            width,
            bits: value & mask_for_width(width),
        }
    }

    pub fn zeros(width: u32) -> Self {
        Self::from_value(0, width)
    }

    pub fn ones(width: u32) -> Self {
        Self::from_value(u128::MAX, width)
    }

    pub fn from_bits(bits: &[Bit]) -> Result<Self, VdtError> {
        if bits.is_empty() || bits.len() > MAX_WIDTH as usize {
            return Err(VdtError::pattern(format!(
                "bit vector of {} bits, expected 1..={MAX_WIDTH}",
                bits.len()
            )));
        }
        let value = bits
            .iter()
            .fold(0u128, |acc, bit| (acc << 1) | bit.value() as u128);
        Ok(Self::from_value(value, bits.len() as u32))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn get(&self, index: u32) -> Bit {
        debug_assert!(index < self.width);
        Bit((self.bits >> (self.width - 1 - index)) & 1 == 1)
    }

    pub fn and(&self, other: &BitVector) -> BitVector {
        debug_assert_eq!(self.width, other.width);
        BitVector::from_value(self.bits & other.bits, self.width)
    }

    pub fn or(&self, other: &BitVector) -> BitVector {
        debug_assert_eq!(self.width, other.width);
        BitVector::from_value(self.bits | other.bits, self.width)
    }

    pub fn xor(&self, other: &BitVector) -> BitVector {
        debug_assert_eq!(self.width, other.width);
        BitVector::from_value(self.bits ^ other.bits, self.width)
    }

    pub fn not(&self) -> BitVector {
        BitVector::from_value(!self.bits, self.width)
    }

    pub fn is_zero(&self) -> bool {
        self.bits == 0
    }

    pub fn count_ones(&self) -> u32 {
        self.bits.count_ones()
    }

    pub fn to_value(&self) -> u128 {
        self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = Bit> + '_ {
        (0..self.width).map(|idx| self.get(idx))
    }
}

impl FromStr for BitVector {
    type Err = VdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width = s.chars().count() as u32;
        if width == 0 || width > MAX_WIDTH {
            return Err(VdtError::pattern(format!(
                "bit vector '{s}' must have between 1 and {MAX_WIDTH} bits"
            )));
        }
        let mut value = 0u128;
        for ch in s.chars() {
            let bit = match ch {
                '0' => 0,
                '1' => 1,
                other => {
                    return Err(VdtError::pattern(format!(
                        "invalid character '{other}' in bit vector '{s}'"
                    )));
                }
            };
            value = (value << 1) | bit;
        }
        Ok(BitVector::from_value(value, width))
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit.value() { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::LowerHex for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.bits, f)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
    Little,
    Big,
}

/// Assembles an instruction word from its in-memory bytes. Only the 16 least
/// significant bytes fit in the word; the rest are dropped.
pub fn word_from_bytes(bytes: &[u8], endianness: Endianness) -> u128 {
    match endianness {
        Endianness::Little => bytes
            .iter()
            .take(16)
            .enumerate()
            .fold(0u128, |acc, (idx, byte)| acc | ((*byte as u128) << (idx * 8))),
        Endianness::Big => bytes
            .iter()
            .fold(0u128, |acc, byte| (acc << 8) | (*byte as u128)),
    }
}

#[inline]
pub(crate) fn mask_for_width(width: u32) -> u128 {
    if width >= MAX_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}
