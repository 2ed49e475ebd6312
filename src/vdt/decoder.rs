//! Runtime lookup over a generated tree.

use super::bits::{BitVector, Endianness, word_from_bytes};
use super::error::DecodeMiss;
use super::instruction::Instruction;
use super::tree::Node;

/// Walks `tree` for `word`. A keyed child wins over the fallback; `None` means
/// no child matched and no fallback was available.
pub fn decide<'a>(tree: &'a Node, word: &BitVector) -> Option<&'a Instruction> {
    match tree {
        Node::Leaf(leaf) => Some(&leaf.instruction),
        Node::Inner(inner) => {
            let next = inner.child_for(word).or_else(|| inner.fallback())?;
            decide(next, word)
        }
    }
}

/// Decoder bound to one tree and its word width.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    tree: &'a Node,
    width: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(tree: &'a Node) -> Self {
        let width = tree
            .instructions()
            .first()
            .map(|insn| insn.width)
            .unwrap_or(0);
        Self { tree, width }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn tree(&self) -> &'a Node {
        self.tree
    }

    pub fn decode(&self, word: &BitVector) -> Result<&'a Instruction, DecodeMiss> {
        decide(self.tree, word).ok_or(DecodeMiss { word: *word })
    }

    /// Decodes the low `width` bits of `word`.
    pub fn decode_word(&self, word: u128) -> Result<&'a Instruction, DecodeMiss> {
        self.decode(&BitVector::from_value(word, self.width))
    }

    /// Decodes one instruction word from the start of `bytes`. Returns `None`
    /// when fewer bytes than one word are available.
    pub fn decode_bytes(
        &self,
        bytes: &[u8],
        endianness: Endianness,
    ) -> Option<Result<&'a Instruction, DecodeMiss>> {
        let word_bytes = self.width.div_ceil(8) as usize;
        if bytes.len() < word_bytes {
            return None;
        }
        let word = word_from_bytes(&bytes[..word_bytes], endianness);
        Some(self.decode_word(word))
    }
}
