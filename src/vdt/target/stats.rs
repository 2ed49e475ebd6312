use crate::vdt::tree::Node;

/// Shape summary of a decode tree. The root sits at depth 0, so a leaf's depth
/// is the number of decisions taken to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionTreeStatistics {
    pub node_count: usize,
    pub leaf_count: usize,
    pub min_depth: usize,
    pub max_depth: usize,
    pub avg_depth: f64,
    pub max_instruction_width: u32,
}

pub fn statistics(tree: &Node) -> DecisionTreeStatistics {
    let acc = accumulate(tree, 0);
    let avg_depth = if acc.leaf_count == 0 {
        0.0
    } else {
        acc.depth_sum as f64 / acc.leaf_count as f64
    };
    DecisionTreeStatistics {
        node_count: acc.node_count,
        leaf_count: acc.leaf_count,
        min_depth: acc.min_depth,
        max_depth: acc.max_depth,
        avg_depth,
        max_instruction_width: acc.max_width,
    }
}

#[derive(Clone, Copy)]
struct Accumulator {
    node_count: usize,
    leaf_count: usize,
    min_depth: usize,
    max_depth: usize,
    depth_sum: usize,
    max_width: u32,
}

impl Accumulator {
    fn merge(self, other: Accumulator) -> Accumulator {
        Accumulator {
            node_count: self.node_count + other.node_count,
            leaf_count: self.leaf_count + other.leaf_count,
            min_depth: self.min_depth.min(other.min_depth),
            max_depth: self.max_depth.max(other.max_depth),
            depth_sum: self.depth_sum + other.depth_sum,
            max_width: self.max_width.max(other.max_width),
        }
    }
}

fn accumulate(node: &Node, depth: usize) -> Accumulator {
    match node {
        Node::Leaf(leaf) => Accumulator {
            node_count: 1,
            leaf_count: 1,
            min_depth: depth,
            max_depth: depth,
            depth_sum: depth,
            max_width: leaf.instruction.width,
        },
        Node::Inner(inner) => {
            let own = Accumulator {
                node_count: 1,
                leaf_count: 0,
                min_depth: usize::MAX,
                max_depth: 0,
                depth_sum: 0,
                max_width: inner.mask.width(),
            };
            inner
                .children
                .iter()
                .map(|(_, child)| child)
                .chain(inner.fallback())
                .map(|child| accumulate(child, depth + 1))
                .fold(own, Accumulator::merge)
        }
    }
}
