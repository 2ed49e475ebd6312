//! Diagnostic renderings of a decode tree: a Graphviz description and a
//! per-leaf path table. Neither feeds back into generation.

use std::fmt;

use smallvec::SmallVec;

use crate::vdt::instruction::Instruction;
use crate::vdt::tree::Node;

pub fn dot_graph(tree: &Node) -> String {
    let mut out = String::from("digraph G {\n    rankdir=TB;\n    node [shape=box];\n\n");
    let rendered = dot_node(tree, 0);
    for line in rendered.lines {
        out.push_str(&line);
    }
    out.push_str("}\n");
    out
}

/// Output of one subtree: its own id, the next free id and its lines.
struct DotFragment {
    id: usize,
    next_id: usize,
    lines: Vec<String>,
}

fn dot_node(node: &Node, next_id: usize) -> DotFragment {
    let id = next_id;
    match node {
        Node::Leaf(leaf) => DotFragment {
            id,
            next_id: id + 1,
            lines: vec![format!(
                "    {id} [label=\"{}\"];\n",
                escape_label(&leaf.instruction.name)
            )],
        },
        Node::Inner(inner) => {
            let mut lines = vec![format!(
                "    {id} [label=\"Mask 0x{:x}\"];\n",
                inner.mask.to_value()
            )];
            let mut next_id = id + 1;
            if let Some(fallback) = inner.fallback() {
                let child = dot_node(fallback, next_id);
                next_id = child.next_id;
                lines.extend(child.lines);
                lines.push(format!("    {id} -> {} [label=\"default\"];\n", child.id));
            }
            for (key, node) in &inner.children {
                let child = dot_node(node, next_id);
                next_id = child.next_id;
                lines.extend(child.lines);
                lines.push(format!(
                    "    {id} -> {} [label=\"0x{:x}\"];\n",
                    child.id,
                    key.to_bit_vector().to_value()
                ));
            }
            DotFragment { id, next_id, lines }
        }
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// One decision on the way from the root to a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    Key { mask: u128, key: u128 },
    Default,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key { mask, key } => write!(f, "0x{mask:x}=0x{key:x}"),
            PathStep::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeafPath<'a> {
    pub steps: SmallVec<[PathStep; 8]>,
    pub instruction: &'a Instruction,
}

/// Every leaf with the decisions leading to it, in traversal order.
pub fn leaf_paths(tree: &Node) -> Vec<LeafPath<'_>> {
    let mut rows = Vec::new();
    collect_paths(tree, SmallVec::new(), &mut rows);
    rows
}

fn collect_paths<'a>(
    node: &'a Node,
    steps: SmallVec<[PathStep; 8]>,
    rows: &mut Vec<LeafPath<'a>>,
) {
    match node {
        Node::Leaf(leaf) => rows.push(LeafPath {
            steps,
            instruction: &leaf.instruction,
        }),
        Node::Inner(inner) => {
            let mask = inner.mask.to_value();
            for (key, child) in &inner.children {
                let mut next = steps.clone();
                next.push(PathStep::Key {
                    mask,
                    key: key.to_bit_vector().to_value(),
                });
                collect_paths(child, next, rows);
            }
            if let Some(fallback) = inner.fallback() {
                let mut next = steps;
                next.push(PathStep::Default);
                collect_paths(fallback, next, rows);
            }
        }
    }
}

/// Text table with one row per leaf: `<path>  =>  <name> <pattern>`.
pub fn path_table(tree: &Node) -> String {
    let rows: Vec<(String, &Instruction)> = leaf_paths(tree)
        .into_iter()
        .map(|row| {
            let path = if row.steps.is_empty() {
                "(root)".to_string()
            } else {
                row.steps
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" > ")
            };
            (path, row.instruction)
        })
        .collect();
    let column = rows.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (path, insn) in rows {
        out.push_str(&format!(
            "{path:<column$}  =>  {} {}\n",
            insn.name, insn.pattern
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdt::generator::DecodeTreeGenerator;

    fn tree(named: &[(&str, &str)]) -> Node {
        let insns: Vec<Instruction> = named
            .iter()
            .map(|(name, pat)| Instruction::from_pattern_str(*name, pat).expect("insn"))
            .collect();
        DecodeTreeGenerator::new().generate(&insns).expect("tree")
    }

    #[test]
    fn dot_graph_numbers_nodes_depth_first() {
        let tree = tree(&[("ld", "1--"), ("ld.b", "10-"), ("st", "0--")]);
        let expected = "\
digraph G {
    rankdir=TB;
    node [shape=box];

    0 [label=\"Mask 0x4\"];
    1 [label=\"Mask 0x2\"];
    2 [label=\"ld\"];
    1 -> 2 [label=\"default\"];
    3 [label=\"ld.b\"];
    1 -> 3 [label=\"0x0\"];
    0 -> 1 [label=\"0x4\"];
    4 [label=\"st\"];
    0 -> 4 [label=\"0x0\"];
}
";
        assert_eq!(dot_graph(&tree), expected);
    }

    #[test]
    fn dot_graph_ids_restart_per_call() {
        let tree = tree(&[("a", "1"), ("b", "0")]);
        assert_eq!(dot_graph(&tree), dot_graph(&tree));
    }

    #[test]
    fn path_table_lists_every_leaf() {
        let tree = tree(&[("ld", "1--"), ("ld.b", "10-"), ("st", "0--")]);
        let table = path_table(&tree);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines,
            [
                "0x4=0x4 > 0x2=0x0  =>  ld.b 10-",
                "0x4=0x4 > default  =>  ld 1--",
                "0x4=0x0            =>  st 0--",
            ]
        );
    }

    #[test]
    fn bare_leaf_has_root_path() {
        let tree = tree(&[("any", "--")]);
        assert_eq!(path_table(&tree), "(root)  =>  any --\n");
        let paths = leaf_paths(&tree);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].steps.is_empty());
    }
}
