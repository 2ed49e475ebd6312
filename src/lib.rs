//! Instruction decode-tree synthesis for fixed-width instruction sets.
//!
//! The [`vdt`] module turns a set of ternary instruction encodings into a
//! decision tree and provides the consumers that walk it: a runtime decoder,
//! a C switch emitter, statistics and diagnostic dumps.

pub mod vdt;
