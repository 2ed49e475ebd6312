//! Decode tree synthesis for fixed-width encodings.
//!
//! Every inner node tests the bits that are fixed in all instructions still
//! reaching it and have not been tested by an ancestor. Instructions whose
//! fixed bits have all been consumed while more specific encodings remain
//! become the default (fallback) of that node, which is how a general pattern
//! and its special cases coexist.

use ahash::AHashMap;
use log::{debug, trace, warn};
use smallvec::SmallVec;

use super::bits::{BitVector, MAX_WIDTH};
use super::error::{VdtError, VdtResult};
use super::instruction::Instruction;
use super::pattern::BitPattern;
use super::tree::{InnerNode, Node};

type Subset<'a> = SmallVec<[&'a Instruction; 4]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Pad narrower instructions with trailing don't-care bits up to the widest
    /// instruction instead of rejecting mixed widths.
    pub pad_to_widest: bool,
}

impl GeneratorConfig {
    pub fn with_pad_to_widest(mut self, pad: bool) -> Self {
        self.pad_to_widest = pad;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecodeTreeGenerator {
    config: GeneratorConfig,
}

impl DecodeTreeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self, instructions: &[Instruction]) -> VdtResult<Node> {
        validate_each(instructions)?;
        let padded: Vec<Instruction>;
        let instructions: Vec<&Instruction> = if self.config.pad_to_widest {
            let widest = instructions.iter().map(|insn| insn.width).max().unwrap_or(0);
            padded = instructions
                .iter()
                .map(|insn| insn.padded(widest))
                .collect::<VdtResult<_>>()?;
            padded.iter().collect()
        } else {
            instructions.iter().collect()
        };

        let width = common_width(&instructions)?;
        debug!(
            "generating decode tree for {} instructions of width {width}",
            instructions.len()
        );
        let tree = generate_internal(BitVector::ones(width), instructions)?;
        debug!("decode tree complete, depth {}", tree.depth());
        Ok(tree)
    }
}

/// AND of every instruction's significance vector, restricted to `live`.
pub fn significance_mask(live: &BitVector, instructions: &[&Instruction]) -> BitVector {
    instructions
        .iter()
        .fold(*live, |mask, insn| mask.and(&insn.significance()))
}

fn generate_internal(live: BitVector, instructions: Vec<&Instruction>) -> VdtResult<Node> {
    let mut mask = significance_mask(&live, &instructions);

    if mask.is_zero() && instructions.len() == 1 {
        return Ok(Node::leaf(instructions[0].clone()));
    }

    let mut instructions = instructions;
    let mut default = None;
    if mask.is_zero() {
        let resolved = resolve_default(&live, &instructions)?;
        debug!(
            "'{}' is the default for {} more specific instructions",
            resolved.default.name,
            resolved.subsumed.len()
        );
        default = Some(resolved.default);
        instructions = resolved.subsumed;
        mask = resolved.mask;
    }

    let remaining = live.and(&mask.not());
    let mut children = Vec::new();
    for (key, subset) in partition(&mask, &instructions) {
        children.push((key, generate_internal(remaining, subset.into_vec())?));
    }
    trace!(
        "inner node mask={mask} children={} fallback={}",
        children.len(),
        default.is_some()
    );

    let node = InnerNode {
        mask,
        children,
        fallback: default.map(|insn| Box::new(Node::leaf(insn.clone()))),
    };
    if let (Some(default), true) = (default, node.fallback_is_shadowed()) {
        warn_shadowed_default(default, &instructions, &mask);
    }
    Ok(Node::Inner(node))
}

/// The refinements of `default` take every key under `mask`, so the default
/// leaf is generated but no word can reach it.
fn warn_shadowed_default(default: &Instruction, subsumed: &[&Instruction], mask: &BitVector) {
    let shadowing: Vec<&str> = subsumed
        .iter()
        .filter(|insn| insn.pattern.is_subsumed_by(&default.pattern))
        .map(|insn| insn.name.as_str())
        .collect();
    warn!(
        "default '{}' is unreachable: every key under mask {mask} is taken by {}",
        default.name,
        shadowing.join(", ")
    );
}

/// Groups instructions by their fixed bits under `mask`, in first-seen key order.
fn partition<'a>(mask: &BitVector, instructions: &[&'a Instruction]) -> Vec<(BitPattern, Subset<'a>)> {
    let mut index: AHashMap<BitPattern, usize> = AHashMap::new();
    let mut groups: Vec<(BitPattern, Subset<'a>)> = Vec::new();
    for insn in instructions {
        let key = insn.pattern.restrict(mask);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, SmallVec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(*insn);
    }
    groups
}

struct DefaultResolution<'a> {
    default: &'a Instruction,
    subsumed: Vec<&'a Instruction>,
    mask: BitVector,
}

fn resolve_default<'a>(
    live: &BitVector,
    instructions: &[&'a Instruction],
) -> VdtResult<DefaultResolution<'a>> {
    let candidates: Vec<usize> = instructions
        .iter()
        .enumerate()
        .filter(|(_, insn)| insn.significance().and(live).is_zero())
        .map(|(idx, _)| idx)
        .collect();

    let default_idx = match candidates.as_slice() {
        [idx] => *idx,
        [] => return Err(overlap(instructions.iter().copied())),
        many => return Err(overlap(many.iter().map(|idx| instructions[*idx]))),
    };

    let subsumed: Vec<&Instruction> = instructions
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != default_idx)
        .map(|(_, insn)| *insn)
        .collect();

    let mask = significance_mask(live, &subsumed);
    if mask.is_zero() {
        return Err(overlap(subsumed.iter().copied()));
    }

    Ok(DefaultResolution {
        default: instructions[default_idx],
        subsumed,
        mask,
    })
}

fn overlap<'a>(instructions: impl Iterator<Item = &'a Instruction>) -> VdtError {
    VdtError::OverlapAmbiguity {
        instructions: instructions.map(ToString::to_string).collect(),
    }
}

/// Checks every instruction on its own, before any padding touches it.
fn validate_each(instructions: &[Instruction]) -> VdtResult<()> {
    if instructions.is_empty() {
        return Err(VdtError::validation("instructions cannot be empty"));
    }
    for insn in instructions {
        if insn.width == 0 || insn.width > MAX_WIDTH {
            return Err(VdtError::validation(format!(
                "instruction '{}' has width {}, expected 1..={MAX_WIDTH}",
                insn.name, insn.width
            )));
        }
        if insn.width != insn.pattern.width() {
            return Err(VdtError::validation(format!(
                "instruction '{}' has width {} but its pattern has {} bits",
                insn.name,
                insn.width,
                insn.pattern.width()
            )));
        }
    }
    Ok(())
}

/// Returns the width shared by every instruction.
fn common_width(instructions: &[&Instruction]) -> VdtResult<u32> {
    let Some(first) = instructions.first() else {
        return Err(VdtError::validation("instructions cannot be empty"));
    };
    let expected = first.width;
    for insn in instructions {
        if insn.width != expected {
            return Err(VdtError::validation(format!(
                "all instructions must have the same width: '{}' has {} bits, '{}' has {}",
                insn.name, insn.width, first.name, expected
            )));
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insns(patterns: &[&str]) -> Vec<Instruction> {
        patterns
            .iter()
            .map(|pat| Instruction::from_pattern_str(*pat, pat).expect("insn"))
            .collect()
    }

    fn vector(src: &str) -> BitVector {
        src.parse().expect("vector")
    }

    #[test]
    fn significance_mask_intersects_live_bits() {
        let set = insns(&["10-", "011"]);
        let refs: Vec<&Instruction> = set.iter().collect();
        assert_eq!(significance_mask(&BitVector::ones(3), &refs), vector("110"));
        assert_eq!(significance_mask(&vector("011"), &refs), vector("010"));
    }

    #[test]
    fn root_tests_common_fixed_bits() {
        let tree = DecodeTreeGenerator::new()
            .generate(&insns(&["1--", "01-", "00-"]))
            .expect("tree");
        let Node::Inner(root) = &tree else {
            panic!("expected inner root");
        };
        assert_eq!(root.mask, vector("100"));
        let keys: Vec<String> = root.children.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["1--", "0--"], "keys keep first-insertion order");
        assert!(root.fallback.is_none());
        let Node::Inner(zero) = &root.children[1].1 else {
            panic!("expected inner node under 0--");
        };
        assert_eq!(zero.mask, vector("010"));
    }

    #[test]
    fn subsumed_pattern_becomes_fallback() {
        let tree = DecodeTreeGenerator::new()
            .generate(&insns(&["1--", "10-", "0--"]))
            .expect("tree");
        let Node::Inner(root) = &tree else {
            panic!("expected inner root");
        };
        let Node::Inner(one) = &root.children[0].1 else {
            panic!("expected inner node under 1--");
        };
        assert_eq!(one.mask, vector("010"));
        assert_eq!(one.children.len(), 1);
        let Some(Node::Leaf(default)) = one.fallback() else {
            panic!("expected default leaf");
        };
        assert_eq!(default.instruction.name, "1--");
    }

    #[test]
    fn duplicate_patterns_are_ambiguous() {
        let err = DecodeTreeGenerator::new()
            .generate(&insns(&["1--", "1--"]))
            .unwrap_err();
        let VdtError::OverlapAmbiguity { instructions } = err else {
            panic!("expected overlap error, got {err:?}");
        };
        assert_eq!(instructions.len(), 2);
    }

    #[test]
    fn overlapping_without_subsumption_is_ambiguous() {
        // Neither pattern is a special case of the other.
        let err = DecodeTreeGenerator::new()
            .generate(&insns(&["1-", "-1"]))
            .unwrap_err();
        assert!(matches!(err, VdtError::OverlapAmbiguity { .. }));
    }

    #[test]
    fn single_instruction_is_a_bare_leaf() {
        let tree = DecodeTreeGenerator::new().generate(&insns(&["---"])).expect("tree");
        assert!(tree.is_leaf());
    }

    #[test]
    fn validation_rejects_bad_input() {
        let generator = DecodeTreeGenerator::new();
        assert!(matches!(generator.generate(&[]), Err(VdtError::Validation(_))));

        let mixed = insns(&["10", "011"]);
        assert!(matches!(generator.generate(&mixed), Err(VdtError::Validation(_))));

        let mut mismatched = insns(&["101"]);
        mismatched[0].width = 4;
        assert!(matches!(generator.generate(&mismatched), Err(VdtError::Validation(_))));
    }

    #[test]
    fn default_covered_by_refinements_is_shadowed() {
        let tree = DecodeTreeGenerator::new()
            .generate(&insns(&["1--", "10-", "11-"]))
            .expect("tree");
        let Node::Inner(root) = &tree else {
            panic!("expected inner root");
        };
        let Node::Inner(one) = &root.children[0].1 else {
            panic!("expected inner node under 1--");
        };
        assert_eq!(one.children.len(), 2);
        assert!(one.fallback_is_shadowed(), "10- and 11- take both keys of mask 010");
        assert!(!root.fallback_is_shadowed());
    }

    #[test]
    fn reachable_default_is_not_shadowed() {
        let tree = DecodeTreeGenerator::new()
            .generate(&insns(&["1--", "10-", "0--"]))
            .expect("tree");
        let Node::Inner(root) = &tree else {
            panic!("expected inner root");
        };
        let Node::Inner(one) = &root.children[0].1 else {
            panic!("expected inner node under 1--");
        };
        assert!(!one.fallback_is_shadowed());
    }

    #[test]
    fn padding_validates_widths_first() {
        let generator =
            DecodeTreeGenerator::with_config(GeneratorConfig::default().with_pad_to_widest(true));
        let narrow = Instruction::from_pattern_str("a", "10").expect("insn");
        let wide = Instruction::new("b", 200, "01".parse().expect("pattern"));
        let err = generator.generate(&[narrow, wide]).unwrap_err();
        assert!(matches!(err, VdtError::Validation(_)), "got {err:?}");

        let zero = Instruction::new("z", 0, "1".parse().expect("pattern"));
        assert!(matches!(generator.generate(&[zero]), Err(VdtError::Validation(_))));
    }

    #[test]
    fn padding_accepts_mixed_widths() {
        let generator =
            DecodeTreeGenerator::with_config(GeneratorConfig::default().with_pad_to_widest(true));
        let tree = generator.generate(&insns(&["10", "0111"])).expect("tree");
        let Node::Inner(root) = &tree else {
            panic!("expected inner root");
        };
        assert_eq!(root.mask, vector("1100"));
        let widths: Vec<u32> = tree.instructions().iter().map(|i| i.width).collect();
        assert_eq!(widths, [4, 4]);
    }
}
