//! Consumers of a finished decode tree. Each one is a read-only traversal.

pub mod codegen;
pub mod dump;
pub mod stats;

pub use codegen::{CodegenConfig, DecodeTreeCodeGenerator, word_type};
pub use dump::{LeafPath, PathStep, dot_graph, leaf_paths, path_table};
pub use stats::{DecisionTreeStatistics, statistics};
