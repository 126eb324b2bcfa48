use std::collections::{BTreeMap, HashSet};

use papas_id::{IdSequence, Identifier};
use tracing::{debug, trace};

use crate::error::GraphError;
use crate::floodfill::{Block, flood_fill};
use crate::graph::Graph;
use crate::object::{Cluster, PfObject, Track};

/// The particle-flow object graph of one event.
///
/// Nodes are tracks and clusters keyed by identifier. Links are undirected:
/// [`ObjectGraph::link`] always records both directions, so `b` is a
/// neighbour of `a` exactly when `a` is a neighbour of `b`.
#[derive(Debug, Default, Clone)]
pub struct ObjectGraph {
    nodes: BTreeMap<Identifier, PfObject>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object without links. Fails if the identifier is taken.
    pub fn insert(&mut self, obj: impl Into<PfObject>) -> Result<Identifier, GraphError> {
        let obj = obj.into();
        let id = obj.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.nodes.insert(id, obj);
        Ok(id)
    }

    pub fn get(&self, id: Identifier) -> Option<&PfObject> {
        self.nodes.get(&id)
    }

    pub fn cluster(&self, id: Identifier) -> Option<&Cluster> {
        self.nodes.get(&id).and_then(PfObject::as_cluster)
    }

    pub fn track(&self, id: Identifier) -> Option<&Track> {
        self.nodes.get(&id).and_then(PfObject::as_track)
    }

    pub fn ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.nodes.keys().copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = &PfObject> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_mut(&mut self, id: Identifier) -> Result<&mut PfObject, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NotFound(id))
    }

    /// Links `a` and `b` in both directions. Idempotent.
    pub fn link(&mut self, a: Identifier, b: Identifier) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLink(a));
        }
        if !self.nodes.contains_key(&b) {
            return Err(GraphError::NotFound(b));
        }
        self.node_mut(a)?.linked.insert(b);
        self.node_mut(b)?.linked.insert(a);
        trace!("link {a} <-> {b}");
        Ok(())
    }

    /// Removes the link between `a` and `b`, if any.
    pub fn unlink(&mut self, a: Identifier, b: Identifier) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&b) {
            return Err(GraphError::NotFound(b));
        }
        self.node_mut(a)?.linked.remove(&b);
        self.node_mut(b)?.linked.remove(&a);
        Ok(())
    }

    pub fn is_linked(&self, a: Identifier, b: Identifier) -> bool {
        self.nodes
            .get(&a)
            .is_some_and(|n| n.linked.contains(&b))
    }

    /// Linked neighbours of `id` in ascending order.
    pub fn neighbors(&self, id: Identifier) -> Result<Vec<Identifier>, GraphError> {
        let node = self.nodes.get(&id).ok_or(GraphError::NotFound(id))?;
        Ok(node.linked.iter().copied().collect())
    }

    /// Marks `id` as consumed by reconstruction. Idempotent.
    pub fn lock(&mut self, id: Identifier) -> Result<(), GraphError> {
        self.node_mut(id)?.locked = true;
        Ok(())
    }

    pub fn unlock(&mut self, id: Identifier) -> Result<(), GraphError> {
        self.node_mut(id)?.locked = false;
        Ok(())
    }

    pub fn is_locked(&self, id: Identifier) -> Result<bool, GraphError> {
        self.nodes
            .get(&id)
            .map(PfObject::is_locked)
            .ok_or(GraphError::NotFound(id))
    }

    pub fn block_label(&self, id: Identifier) -> Result<Option<Identifier>, GraphError> {
        self.nodes
            .get(&id)
            .map(PfObject::block_label)
            .ok_or(GraphError::NotFound(id))
    }

    /// Splits the graph into blocks and stamps every node with the label of
    /// its block. See [`flood_fill`] for ordering.
    pub fn partition(&mut self, labels: &mut IdSequence) -> Result<Vec<Block>, GraphError> {
        let blocks = flood_fill(self, labels)?;
        for block in &blocks {
            for id in &block.members {
                self.node_mut(*id)?.block_label = Some(block.label);
            }
        }
        debug!(
            "partitioned {} objects into {} blocks",
            self.nodes.len(),
            blocks.len()
        );
        Ok(blocks)
    }
}

impl Graph for ObjectGraph {
    fn node_ids(&self) -> Vec<Identifier> {
        self.nodes.keys().copied().collect()
    }

    fn adjacent(&self, id: Identifier) -> Vec<Identifier> {
        self.nodes
            .get(&id)
            .map(|n| n.linked.iter().copied().collect())
            .unwrap_or_default()
    }

    fn contains(&self, id: Identifier) -> bool {
        self.nodes.contains_key(&id)
    }
}

impl ObjectGraph {
    /// See [`Graph::traverse`].
    pub fn traverse(&self, start: Identifier, seen: &mut HashSet<Identifier>) -> Vec<Identifier> {
        Graph::traverse(self, start, seen)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use papas_id::Subtype;

    use super::*;
    use crate::object::{Layer, Path};
    use crate::run::EnergyHighWater;

    fn track(seq: &mut IdSequence) -> Track {
        let p3 = Vector3::new(1.0, 0.0, 0.0);
        Track::create(seq, Subtype::Raw, p3, 1, Path::default()).unwrap()
    }

    fn ecal(seq: &mut IdSequence) -> Cluster {
        let mut hw = EnergyHighWater::default();
        let pos = Vector3::new(1.0, 0.0, 0.0);
        Cluster::create(seq, &mut hw, Layer::EcalIn, Subtype::Raw, pos, 1.0, 0.1).unwrap()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let t = track(&mut seq);
        g.insert(t.clone()).unwrap();
        assert_eq!(g.insert(t.clone()), Err(GraphError::DuplicateId(t.id)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn link_is_symmetric_and_idempotent() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let a = g.insert(track(&mut seq)).unwrap();
        let b = g.insert(ecal(&mut seq)).unwrap();

        g.link(a, b).unwrap();
        g.link(b, a).unwrap();
        assert!(g.is_linked(a, b));
        assert!(g.is_linked(b, a));
        assert_eq!(g.neighbors(a).unwrap(), vec![b]);
        assert_eq!(g.neighbors(b).unwrap(), vec![a]);

        g.unlink(a, b).unwrap();
        assert!(!g.is_linked(a, b));
        assert!(!g.is_linked(b, a));
    }

    #[test]
    fn link_errors() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let a = g.insert(track(&mut seq)).unwrap();
        let missing = ecal(&mut seq).id;

        assert_eq!(g.link(a, a), Err(GraphError::SelfLink(a)));
        assert_eq!(g.link(a, missing), Err(GraphError::NotFound(missing)));
        assert_eq!(g.link(missing, a), Err(GraphError::NotFound(missing)));
        // A failed link leaves no half edge behind.
        assert!(g.neighbors(a).unwrap().is_empty());
    }

    #[test]
    fn lock_and_unlock_are_idempotent() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let a = g.insert(track(&mut seq)).unwrap();

        assert!(!g.is_locked(a).unwrap());
        g.lock(a).unwrap();
        g.lock(a).unwrap();
        assert!(g.is_locked(a).unwrap());
        g.unlock(a).unwrap();
        g.unlock(a).unwrap();
        assert!(!g.is_locked(a).unwrap());

        let missing = ecal(&mut seq).id;
        assert_eq!(g.lock(missing), Err(GraphError::NotFound(missing)));
    }

    #[test]
    fn traverse_terminates_on_cycles() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let a = g.insert(track(&mut seq)).unwrap();
        let b = g.insert(ecal(&mut seq)).unwrap();
        let c = g.insert(ecal(&mut seq)).unwrap();
        g.link(a, b).unwrap();
        g.link(b, c).unwrap();
        g.link(c, a).unwrap();

        let mut seen = HashSet::new();
        let mut order = g.traverse(b, &mut seen);
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], b);
        order.sort();
        order.dedup();
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn partition_sets_block_labels() {
        let mut seq = IdSequence::new();
        let mut g = ObjectGraph::new();
        let a = g.insert(track(&mut seq)).unwrap();
        let b = g.insert(ecal(&mut seq)).unwrap();
        let c = g.insert(ecal(&mut seq)).unwrap();
        g.link(a, b).unwrap();

        assert_eq!(g.block_label(a).unwrap(), None);
        let blocks = g.partition(&mut seq).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(g.block_label(a).unwrap(), Some(blocks[0].label));
        assert_eq!(g.block_label(b).unwrap(), Some(blocks[0].label));
        assert_eq!(g.block_label(c).unwrap(), Some(blocks[1].label));
    }
}
