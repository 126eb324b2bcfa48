use std::cmp::Ordering;
use std::collections::HashSet;

use papas_id::{Category, IdError, IdSequence, Identifier, ObjectType, Subtype};
use tracing::debug;

use crate::graph::Graph;

const BLOCK: Category = Category::new(ObjectType::Block, Subtype::Undefined);

/// A maximal connected component of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Fresh identifier shared by every member.
    pub label: Identifier,
    /// Member identifiers in ascending order.
    pub members: Vec<Identifier>,
}

impl Block {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: Identifier) -> bool {
        self.members.binary_search(&id).is_ok()
    }

    /// Smallest member identifier.
    pub fn first(&self) -> Option<Identifier> {
        self.members.first().copied()
    }
}

/// Partitions `graph` into its connected components.
///
/// Nodes are seeded in ascending identifier order and each component gets a
/// block label from `labels` in discovery order. The result is sorted
/// largest first, ties broken by the smallest member identifier. Runs in
/// O(V + E).
///
/// Either every node ends up in exactly one block or an error is returned;
/// no partial partition escapes.
pub fn flood_fill<G: Graph + ?Sized>(
    graph: &G,
    labels: &mut IdSequence,
) -> Result<Vec<Block>, IdError> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for id in graph.node_ids() {
        if seen.contains(&id) {
            continue;
        }
        let mut members = graph.traverse(id, &mut seen);
        members.sort_unstable();
        let label = labels.next_id(BLOCK, members.len() as f32)?;
        blocks.push(Block { label, members });
    }

    blocks.sort_by(by_size_then_first);
    debug!(
        "flood fill: {} nodes in {} blocks",
        seen.len(),
        blocks.len()
    );
    Ok(blocks)
}

fn by_size_then_first(a: &Block, b: &Block) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| a.first().cmp(&b.first()))
}
