//! Ternary bit patterns. A pattern is the fixed-bit template of an instruction
//! encoding and also serves as the branch key of an inner tree node.

use std::fmt;
use std::str::FromStr;

use super::bits::{BitVector, MAX_WIDTH, mask_for_width};
use super::error::{VdtError, VdtResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PBit {
    Zero,
    One,
    DontCare,
}

impl PBit {
    pub fn is_significant(self) -> bool {
        self != PBit::DontCare
    }

    fn from_char(ch: char) -> PBit {
        match ch {
            '0' => PBit::Zero,
            '1' => PBit::One,
            _ => PBit::DontCare,
        }
    }

    fn as_char(self) -> char {
        match self {
            PBit::Zero => '0',
            PBit::One => '1',
            PBit::DontCare => '-',
        }
    }
}

/// Fixed-width sequence of [`PBit`]s. Index 0 is the most significant bit.
///
/// Stored as a significance mask plus the fixed values; bits outside the mask
/// are always zero in `value`, so derived equality is bit-for-bit equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitPattern {
    width: u32,
    significance: u128,
    value: u128,
}

impl BitPattern {
    pub fn from_bits(bits: &[PBit]) -> VdtResult<Self> {
        let width = check_width(bits.len())?;
        let (significance, value) =
            bits.iter()
                .fold((0u128, 0u128), |(mask, value), bit| match bit {
                    PBit::Zero => ((mask << 1) | 1, value << 1),
                    PBit::One => ((mask << 1) | 1, (value << 1) | 1),
                    PBit::DontCare => (mask << 1, value << 1),
                });
        Ok(Self {
            width,
            significance,
            value,
        })
    }

    /// Builds a pattern from a significance mask and the fixed values under it.
    pub fn from_mask_value(width: u32, significance: u128, value: u128) -> VdtResult<Self> {
        let width = check_width(width as usize)?;
        Ok(Self::masked(width, significance, value))
    }

    /// Pattern of `width` bits that matches every word.
    pub fn empty(width: u32) -> VdtResult<Self> {
        Self::from_mask_value(width, 0, 0)
    }

    /// `width` must already be within `1..=MAX_WIDTH`.
    fn masked(width: u32, significance: u128, value: u128) -> Self {
        let significance = significance & mask_for_width(width);
        Self {
            width,
            significance,
            value: value & significance,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn get(&self, index: u32) -> PBit {
        debug_assert!(index < self.width);
        let shift = self.width - 1 - index;
        if (self.significance >> shift) & 1 == 0 {
            PBit::DontCare
        } else if (self.value >> shift) & 1 == 1 {
            PBit::One
        } else {
            PBit::Zero
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PBit> + '_ {
        (0..self.width).map(|idx| self.get(idx))
    }

    /// True when every fixed bit of the pattern equals the corresponding bit of `word`.
    pub fn test(&self, word: &BitVector) -> bool {
        word.width() == self.width && word.to_value() & self.significance == self.value
    }

    /// Mask with a 1 at every position that is not don't-care.
    pub fn significance(&self) -> BitVector {
        BitVector::from_value(self.significance, self.width)
    }

    /// The fixed values, with don't-care positions read as 0.
    pub fn to_bit_vector(&self) -> BitVector {
        BitVector::from_value(self.value, self.width)
    }

    pub fn matches_all(&self) -> bool {
        self.significance == 0
    }

    /// Keeps only the positions selected by `mask`; everything else becomes don't-care.
    pub fn restrict(&self, mask: &BitVector) -> BitPattern {
        debug_assert_eq!(mask.width(), self.width);
        Self::masked(self.width, self.significance & mask.to_value(), self.value)
    }

    /// Appends don't-care bits at the least significant end until `width` is reached.
    pub fn pad_to(&self, width: u32) -> VdtResult<BitPattern> {
        if width <= self.width {
            return Ok(*self);
        }
        let width = check_width(width as usize)?;
        let shift = width - self.width;
        Ok(Self::masked(width, self.significance << shift, self.value << shift))
    }

    /// True when `general` matches every word this pattern matches, i.e. each
    /// fixed bit of `general` is fixed to the same value here.
    pub fn is_subsumed_by(&self, general: &BitPattern) -> bool {
        self.width == general.width
            && general.significance & !self.significance == 0
            && self.value & general.significance == general.value
    }
}

impl FromStr for BitPattern {
    type Err = VdtError;

    /// `0` and `1` are fixed bits; any other character is don't-care.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: Vec<PBit> = s.chars().map(PBit::from_char).collect();
        if bits.is_empty() || bits.len() > MAX_WIDTH as usize {
            return Err(VdtError::pattern(format!(
                "invalid pattern '{s}': {} bits, expected 1..={MAX_WIDTH}",
                bits.len()
            )));
        }
        BitPattern::from_bits(&bits)
    }
}

fn check_width(width: usize) -> VdtResult<u32> {
    if width == 0 || width > MAX_WIDTH as usize {
        return Err(VdtError::pattern(format!(
            "pattern width {width} outside 1..={MAX_WIDTH}"
        )));
    }
    Ok(width as u32)
}

impl fmt::Display for BitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", bit.as_char())?;
        }
        Ok(())
    }
}
