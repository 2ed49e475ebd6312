//! C/C++ emitter: renders a decode tree as nested `switch` statements over the
//! instruction word.

use std::fmt::Write;

use super::stats::statistics;
use crate::vdt::instruction::Instruction;
use crate::vdt::tree::{InnerNode, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    pub function_name: String,
    /// Leading parameter of the decode function, passed through to every translate call.
    pub context_param: String,
    pub translate_prefix: String,
    pub miss_value: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            function_name: "decode_insn".into(),
            context_param: "DisasContext *ctx".into(),
            translate_prefix: "trans_".into(),
            miss_value: "0".into(),
        }
    }
}

impl CodegenConfig {
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    pub fn with_context_param(mut self, param: impl Into<String>) -> Self {
        self.context_param = param.into();
        self
    }

    pub fn with_translate_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.translate_prefix = prefix.into();
        self
    }

    pub fn with_miss_value(mut self, value: impl Into<String>) -> Self {
        self.miss_value = value.into();
        self
    }

    /// Name of the context argument, i.e. the last identifier of `context_param`.
    fn context_arg(&self) -> &str {
        self.context_param
            .rsplit(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .find(|part| !part.is_empty())
            .unwrap_or("ctx")
    }
}

/// Smallest C integer type holding `width` bits.
pub fn word_type(width: u32) -> &'static str {
    match width {
        0..=8 => "uint8_t",
        9..=16 => "uint16_t",
        17..=32 => "uint32_t",
        33..=64 => "uint64_t",
        _ => "unsigned __int128",
    }
}

pub struct DecodeTreeCodeGenerator<'a> {
    tree: &'a Node,
    config: CodegenConfig,
    out: CodeWriter,
}

impl<'a> DecodeTreeCodeGenerator<'a> {
    pub fn new(tree: &'a Node) -> Self {
        Self::with_config(tree, CodegenConfig::default())
    }

    pub fn with_config(tree: &'a Node, config: CodegenConfig) -> Self {
        Self {
            tree,
            config,
            out: CodeWriter::default(),
        }
    }

    pub fn generate(mut self) -> String {
        let width = statistics(self.tree).max_instruction_width;
        let word = word_type(width);

        self.emit_declarations(word);

        self.out.line(format!(
            "static uint8_t {}({}, {word} insn) {{",
            self.config.function_name, self.config.context_param
        ));
        self.out.indent();
        self.emit_node(self.tree);
        self.out.line(format!("return {};", self.config.miss_value));
        self.out.unindent();
        self.out.line("}");
        self.out.finish()
    }

    fn emit_declarations(&mut self, word: &str) {
        let mut seen: Vec<String> = Vec::new();
        for insn in self.tree.instructions() {
            let name = self.translate_name(insn);
            if seen.contains(&name) {
                continue;
            }
            self.out.line(format!(
                "static bool {name}({}, {word} insn);",
                self.config.context_param
            ));
            seen.push(name);
        }
        self.out.blank();
    }

    fn emit_node(&mut self, node: &Node) {
        match node {
            Node::Inner(inner) => self.emit_inner(inner),
            Node::Leaf(leaf) => self.emit_leaf(&leaf.instruction),
        }
    }

    fn emit_inner(&mut self, node: &InnerNode) {
        self.out
            .line(format!("switch (insn & {}) {{", c_constant(node.mask.to_value())));
        self.out.indent();
        for (key, child) in &node.children {
            self.out
                .line(format!("case {}:", c_constant(key.to_bit_vector().to_value())));
            self.out.indent();
            self.emit_node(child);
            self.out.unindent();
        }
        self.out.line("default:");
        self.out.indent();
        match node.fallback() {
            Some(fallback) => self.emit_node(fallback),
            None => self.out.line(format!("return {};", self.config.miss_value)),
        }
        self.out.unindent();
        self.out.unindent();
        self.out.line("}");
    }

    fn emit_leaf(&mut self, insn: &Instruction) {
        let call = self.translate_name(insn);
        let bytes = insn.width.div_ceil(8);
        let ctx = self.config.context_arg().to_string();
        self.out.line(format!(
            "return {call}({ctx}, insn) ? {bytes} : {};",
            self.config.miss_value
        ));
    }

    fn translate_name(&self, insn: &Instruction) -> String {
        format!(
            "{}{}",
            self.config.translate_prefix,
            c_identifier(&insn.name)
        )
    }
}

/// Hex literal for `value`. C has no literals wider than 64 bits, so wider
/// values are assembled from two halves.
fn c_constant(value: u128) -> String {
    let high = (value >> 64) as u64;
    let low = value as u64;
    if high == 0 {
        format!("0x{low:x}")
    } else {
        format!("(((unsigned __int128)0x{high:x} << 64) | 0x{low:x})")
    }
}

/// Lowercases `name` and replaces characters C identifiers cannot hold.
fn c_identifier(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Default)]
struct CodeWriter {
    buf: String,
    depth: usize,
}

impl CodeWriter {
    fn indent(&mut self) {
        self.depth += 1;
    }

    fn unindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.buf.push_str("    ");
        }
        // Writing into a String cannot fail.
        let _ = writeln!(self.buf, "{}", text.as_ref());
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        self.buf
    }
}
