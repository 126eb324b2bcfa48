use std::collections::HashSet;

use papas_id::Identifier;

/// Graph is the interface consumed by traversal and flood fill.
///
/// Both the particle-flow object graph and the provenance history implement
/// it, the latter ignoring edge direction.
pub trait Graph {
    /// All node identifiers, in ascending order.
    fn node_ids(&self) -> Vec<Identifier>;

    /// Identifiers adjacent to `id`, in ascending order. Empty when `id` is
    /// not in the graph.
    fn adjacent(&self, id: Identifier) -> Vec<Identifier>;

    fn contains(&self, id: Identifier) -> bool;

    /// Depth-first visit of the component containing `start`.
    ///
    /// Each node is added to `seen` before its neighbours are explored, so
    /// the walk terminates on cyclic graphs and reports every node of the
    /// component exactly once. Returns the visitation order; empty when
    /// `start` is absent or already in `seen`.
    fn traverse(&self, start: Identifier, seen: &mut HashSet<Identifier>) -> Vec<Identifier> {
        let mut order = Vec::new();
        if !self.contains(start) {
            return order;
        }
        // Explicit stack; pushing neighbours in reverse keeps the recursive
        // pre-order.
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(
                self.adjacent(id)
                    .into_iter()
                    .rev()
                    .filter(|n| !seen.contains(n)),
            );
        }
        order
    }
}
