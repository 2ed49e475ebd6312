#![allow(dead_code)]

use isa_vdt::vdt::{BitVector, DecodeTreeGenerator, Instruction, InnerNode, Node, VdtResult, decide};

/// Instructions named after their own pattern text.
pub fn insns(patterns: &[&str]) -> Vec<Instruction> {
    patterns
        .iter()
        .map(|pat| Instruction::from_pattern_str(*pat, pat).expect("valid pattern"))
        .collect()
}

pub fn generate(patterns: &[&str]) -> VdtResult<Node> {
    DecodeTreeGenerator::new().generate(&insns(patterns))
}

pub fn decide_name(tree: &Node, word: &str) -> Option<String> {
    let word: BitVector = word.parse().expect("valid word");
    decide(tree, &word).map(|insn| insn.name.clone())
}

/// All words of `width` bits, in ascending order.
pub fn all_words(width: u32) -> impl Iterator<Item = BitVector> {
    (0u128..(1u128 << width)).map(move |value| BitVector::from_value(value, width))
}

pub fn inner_nodes(tree: &Node) -> Vec<&InnerNode> {
    let mut out = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        if let Node::Inner(inner) = node {
            out.push(inner);
            stack.extend(inner.children.iter().map(|(_, child)| child));
            stack.extend(inner.fallback());
        }
    }
    out
}
