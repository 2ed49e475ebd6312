//! Instruction records consumed by the generator.

use std::fmt;

use super::bits::BitVector;
use super::error::VdtResult;
use super::pattern::BitPattern;

/// One encodable instruction form. `name` identifies the source definition and
/// is what the renderers print; `width` must agree with the pattern width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub name: String,
    pub width: u32,
    pub pattern: BitPattern,
}

impl Instruction {
    pub fn new(name: impl Into<String>, width: u32, pattern: BitPattern) -> Self {
        Self {
            name: name.into(),
            width,
            pattern,
        }
    }

    /// Builds an instruction whose width is taken from the textual pattern.
    pub fn from_pattern_str(name: impl Into<String>, pattern: &str) -> VdtResult<Self> {
        let pattern: BitPattern = pattern.parse()?;
        Ok(Self::new(name, pattern.width(), pattern))
    }

    pub fn significance(&self) -> BitVector {
        self.pattern.significance()
    }

    pub(crate) fn padded(&self, width: u32) -> VdtResult<Self> {
        if self.pattern.width() >= width {
            return Ok(self.clone());
        }
        Ok(Self::new(self.name.clone(), width, self.pattern.pad_to(width)?))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pattern_str_derives_width() {
        let insn = Instruction::from_pattern_str("addi", "0011----").expect("insn");
        assert_eq!(insn.width, 8);
        assert_eq!(insn.significance().to_value(), 0xF0);
        assert_eq!(insn.to_string(), "addi{0011----}");
    }

    #[test]
    fn padding_keeps_name_and_fixed_bits() {
        let insn = Instruction::from_pattern_str("se_b", "1110").expect("insn");
        let padded = insn.padded(8).expect("padded");
        assert_eq!(padded.name, "se_b");
        assert_eq!(padded.width, 8);
        assert_eq!(padded.pattern.to_string(), "1110----");
    }
}
