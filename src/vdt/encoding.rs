//! Builds instruction patterns from format field encodings.
//!
//! Formats number their bits LSB-0 (`msb..lsb`), patterns index from the most
//! significant bit. Formats that are not a whole number of bytes are padded
//! with trailing don't-care bits. With [`Endianness::Little`] the pattern bytes
//! are swapped so the pattern describes the bytes in memory order; such trees
//! expect words assembled with [`Endianness::Big`] from the raw bytes.

use smallvec::SmallVec;

use super::bits::{Endianness, MAX_WIDTH};
use super::error::{VdtError, VdtResult};
use super::pattern::{BitPattern, PBit};

/// Inclusive LSB-0 bit range of a format field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitSlice {
    pub msb: u32,
    pub lsb: u32,
}

impl BitSlice {
    pub fn new(msb: u32, lsb: u32) -> Self {
        Self { msb, lsb }
    }

    pub fn bit(index: u32) -> Self {
        Self::new(index, index)
    }

    pub fn size(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

/// A constant assigned to a (possibly split) field. Parts are listed most
/// significant first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldEncoding {
    pub parts: SmallVec<[BitSlice; 2]>,
    pub value: u128,
}

pub struct FixedPatternBuilder {
    width: u32,
    fields: Vec<FieldEncoding>,
}

impl FixedPatternBuilder {
    /// `width` is the format width in bits.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, parts: &[BitSlice], value: u128) -> Self {
        self.fields.push(FieldEncoding {
            parts: parts.iter().copied().collect(),
            value,
        });
        self
    }

    pub fn range(self, msb: u32, lsb: u32, value: u128) -> Self {
        self.field(&[BitSlice::new(msb, lsb)], value)
    }

    pub fn finish(&self, endianness: Endianness) -> VdtResult<BitPattern> {
        let width = self.width;
        let aligned = width.div_ceil(8) * 8;
        if width == 0 || aligned > MAX_WIDTH {
            return Err(VdtError::encoding(format!(
                "format width {width} outside 1..={MAX_WIDTH} once byte aligned"
            )));
        }

        let mut bits = vec![PBit::DontCare; aligned as usize];
        for field in &self.fields {
            self.place_field(field, &mut bits)?;
        }

        if endianness == Endianness::Little && aligned > 8 {
            let bytes = bits.len() / 8;
            for idx in 0..bytes / 2 {
                for bit in 0..8 {
                    bits.swap(idx * 8 + bit, (bytes - 1 - idx) * 8 + bit);
                }
            }
        }

        BitPattern::from_bits(&bits)
    }

    fn place_field(&self, field: &FieldEncoding, bits: &mut [PBit]) -> VdtResult<()> {
        if let Some(part) = field
            .parts
            .iter()
            .find(|part| part.msb < part.lsb || part.msb >= self.width)
        {
            return Err(VdtError::encoding(format!(
                "bit slice {}..{} outside {}-bit format",
                part.msb, part.lsb, self.width
            )));
        }
        let total: u32 = field.parts.iter().map(BitSlice::size).sum();
        if total < 128 && field.value >> total != 0 {
            return Err(VdtError::encoding(format!(
                "value 0x{:x} does not fit in {total} bits",
                field.value
            )));
        }

        let mut offset = 0u32;
        for part in field.parts.iter().rev() {
            for bit in part.lsb..=part.msb {
                let shifted = field.value.checked_shr(offset + bit - part.lsb).unwrap_or(0);
                let fixed = if shifted & 1 == 1 {
                    PBit::One
                } else {
                    PBit::Zero
                };
                let slot = &mut bits[(self.width - (bit + 1)) as usize];
                if *slot != PBit::DontCare && *slot != fixed {
                    return Err(VdtError::encoding(format!(
                        "bit {bit} is encoded as both 0 and 1"
                    )));
                }
                *slot = fixed;
            }
            offset += part.size();
        }
        Ok(())
    }
}
