//! Decode tree generation. [`DecodeTreeGenerator`] turns a set of fixed-width
//! [`Instruction`] encodings into a [`Node`] tree; [`decide`] and [`Decoder`]
//! walk it at runtime and the [`target`] renderers turn it into code,
//! statistics and diagnostic dumps.

mod bits;
mod decoder;
mod encoding;
mod error;
mod generator;
mod instruction;
mod pattern;
mod tree;

pub mod target;

pub use bits::{Bit, BitVector, Endianness, MAX_WIDTH, word_from_bytes};
pub use decoder::{Decoder, decide};
pub use encoding::{BitSlice, FieldEncoding, FixedPatternBuilder};
pub use error::{DecodeMiss, VdtError, VdtResult};
pub use generator::{DecodeTreeGenerator, GeneratorConfig, significance_mask};
pub use instruction::Instruction;
pub use pattern::{BitPattern, PBit};
pub use tree::{InnerNode, LeafNode, Node};
