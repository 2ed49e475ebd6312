//! Decode tree node model. Trees are built once by the generator and then only
//! read; every consumer is a traversal with an exhaustive match over [`Node`].

use super::bits::BitVector;
use super::instruction::Instruction;
use super::pattern::BitPattern;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Inner(InnerNode),
    Leaf(LeafNode),
}

/// Decision point: the bits under `mask` select a child by key. Children keep
/// the order in which their keys were first produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerNode {
    pub mask: BitVector,
    pub children: Vec<(BitPattern, Node)>,
    pub fallback: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub instruction: Instruction,
}

impl InnerNode {
    /// The child whose key matches `word`, ignoring the fallback.
    pub fn child_for(&self, word: &BitVector) -> Option<&Node> {
        self.children
            .iter()
            .find(|(key, _)| key.test(word))
            .map(|(_, child)| child)
    }

    pub fn fallback(&self) -> Option<&Node> {
        self.fallback.as_deref()
    }

    /// True when the children take every key under `mask`. Lookup never
    /// backtracks, so such a fallback can never be reached.
    pub fn fallback_is_shadowed(&self) -> bool {
        self.fallback.is_some()
            && 1u128
                .checked_shl(self.mask.count_ones())
                .is_some_and(|keys| self.children.len() as u128 == keys)
    }
}

impl Node {
    pub fn leaf(instruction: Instruction) -> Self {
        Node::Leaf(LeafNode { instruction })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of inner levels between this node and its deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Inner(inner) => {
                let children = inner.children.iter().map(|(_, child)| child.depth());
                let fallback = inner.fallback().map(Node::depth);
                1 + children.chain(fallback).max().unwrap_or(0)
            }
        }
    }

    /// Leaf instructions in traversal order: keyed children first, then the fallback.
    pub fn instructions(&self) -> Vec<&Instruction> {
        let mut out = Vec::new();
        self.collect_instructions(&mut out);
        out
    }

    fn collect_instructions<'a>(&'a self, out: &mut Vec<&'a Instruction>) {
        match self {
            Node::Leaf(leaf) => out.push(&leaf.instruction),
            Node::Inner(inner) => {
                for (_, child) in &inner.children {
                    child.collect_instructions(out);
                }
                if let Some(fallback) = inner.fallback() {
                    fallback.collect_instructions(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(name: &str, pattern: &str) -> Instruction {
        Instruction::from_pattern_str(name, pattern).expect("insn")
    }

    fn sample() -> Node {
        let mask: BitVector = "100".parse().unwrap();
        let one = insn("a", "1--");
        let zero = insn("b", "0--");
        Node::Inner(InnerNode {
            mask,
            children: vec![
                (one.pattern.restrict(&mask), Node::leaf(one.clone())),
                (zero.pattern.restrict(&mask), Node::leaf(zero.clone())),
            ],
            fallback: Some(Box::new(Node::leaf(insn("c", "---")))),
        })
    }

    #[test]
    fn depth_counts_inner_levels() {
        assert_eq!(sample().depth(), 1);
        assert_eq!(Node::leaf(insn("a", "1")).depth(), 0);
    }

    #[test]
    fn instructions_visit_children_before_fallback() {
        let tree = sample();
        let names: Vec<_> = tree.instructions().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn child_for_selects_matching_key() {
        let Node::Inner(inner) = sample() else {
            panic!("expected inner node");
        };
        let word: BitVector = "011".parse().unwrap();
        let Some(Node::Leaf(leaf)) = inner.child_for(&word) else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.instruction.name, "b");
    }

    #[test]
    fn fallback_is_shadowed_when_every_key_is_taken() {
        let Node::Inner(mut inner) = sample() else {
            panic!("expected inner node");
        };
        assert!(inner.fallback_is_shadowed(), "keys 1 and 0 cover the one-bit mask");
        inner.children.pop();
        assert!(!inner.fallback_is_shadowed());
        inner.fallback = None;
        assert!(!inner.fallback_is_shadowed());
    }
}
