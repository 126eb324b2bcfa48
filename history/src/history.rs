use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use papas_graph::{Cluster, Graph, Particle, Track, flood_fill};
use papas_id::{Category, IdSequence, Identifier, ObjectType, Subtype, parse_pretty};
use tracing::{debug, trace};

use crate::error::HistoryError;
use crate::store::ObjectStore;

/// Which edges a lineage query follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    /// Towards the objects `id` was derived from.
    Parents,
    /// Towards the objects derived from `id`.
    Children,
    /// Both ways, ignoring orientation.
    Undirected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    parents: BTreeSet<Identifier>,
    children: BTreeSet<Identifier>,
}

/// Derivation edges between the objects of one event.
///
/// An edge `parent -> child` means `child` was made from `parent`, for
/// instance a smeared cluster from a raw one. Edges always run from an
/// earlier processing stage to a later one, so the graph is acyclic;
/// [`History::register`] refuses edges that would break this.
#[derive(Debug, Clone, Default)]
pub struct History {
    nodes: BTreeMap<Identifier, Node>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` without edges. No-op if present.
    pub fn add_node(&mut self, id: Identifier) {
        self.nodes.entry(id).or_default();
    }

    pub fn contains(&self, id: Identifier) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Records that `child` was derived from `parent`.
    ///
    /// Refusing cycles walks the descendants of `child`, so building a chain
    /// of n edges from the leaves upwards costs O(n²). Edges added in
    /// processing order hit the early exit for childless nodes instead.
    pub fn register(&mut self, parent: Identifier, child: Identifier) -> Result<(), HistoryError> {
        if parent == child || self.reaches(child, parent) {
            return Err(HistoryError::Cycle { parent, child });
        }
        self.nodes.entry(parent).or_default().children.insert(child);
        self.nodes.entry(child).or_default().parents.insert(parent);
        trace!("history {parent} -> {child}");
        Ok(())
    }

    /// Registers every `(parent, child)` pair, stopping at the first error.
    pub fn register_all<I>(&mut self, edges: I) -> Result<(), HistoryError>
    where
        I: IntoIterator<Item = (Identifier, Identifier)>,
    {
        for (parent, child) in edges {
            self.register(parent, child)?;
        }
        Ok(())
    }

    /// Adds a cluster and, if set, the edge from its source.
    pub fn record_cluster(&mut self, cluster: &Cluster) -> Result<(), HistoryError> {
        self.record(cluster.id, cluster.source)
    }

    pub fn record_track(&mut self, track: &Track) -> Result<(), HistoryError> {
        self.record(track.id, track.source)
    }

    /// Adds the particle and the chain particle -> raw -> smeared for its
    /// track and each of its clusters.
    pub fn record_particle(&mut self, particle: &Particle) -> Result<(), HistoryError> {
        self.add_node(particle.id);
        self.record_chain(particle.id, particle.track, particle.track_smeared)?;
        for (layer, raw) in &particle.clusters {
            let smeared = particle.clusters_smeared.get(layer).copied();
            self.record_chain(particle.id, Some(*raw), smeared)?;
        }
        for (layer, smeared) in &particle.clusters_smeared {
            if !particle.clusters.contains_key(layer) {
                self.register(particle.id, *smeared)?;
            }
        }
        Ok(())
    }

    fn record(&mut self, id: Identifier, source: Option<Identifier>) -> Result<(), HistoryError> {
        match source {
            Some(parent) => self.register(parent, id),
            None => {
                self.add_node(id);
                Ok(())
            }
        }
    }

    fn record_chain(
        &mut self,
        root: Identifier,
        raw: Option<Identifier>,
        smeared: Option<Identifier>,
    ) -> Result<(), HistoryError> {
        match (raw, smeared) {
            (Some(r), Some(s)) => {
                self.register(root, r)?;
                self.register(r, s)
            }
            (Some(r), None) => self.register(root, r),
            (None, Some(s)) => self.register(root, s),
            (None, None) => Ok(()),
        }
    }

    /// Direct parents of `id`. Empty when unknown.
    pub fn parents(&self, id: Identifier) -> Vec<Identifier> {
        self.nodes
            .get(&id)
            .map(|n| n.parents.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Direct children of `id`. Empty when unknown.
    pub fn children(&self, id: Identifier) -> Vec<Identifier> {
        self.nodes
            .get(&id)
            .map(|n| n.children.iter().copied().collect())
            .unwrap_or_default()
    }

    fn reaches(&self, from: Identifier, to: Identifier) -> bool {
        match self.nodes.get(&from) {
            Some(node) if !node.children.is_empty() => {
                self.lineage(from, Lineage::Children).contains(&to)
            }
            _ => false,
        }
    }

    /// Breadth-first walk from `id` along the edges selected by `direction`.
    ///
    /// The result starts with `id` and lists every reached identifier once,
    /// even where paths reconverge. An identifier that is not in the history
    /// yields an empty result.
    pub fn lineage(&self, id: Identifier, direction: Lineage) -> Vec<Identifier> {
        if !self.contains(id) {
            debug!("lineage: {id} not in history");
            return Vec::new();
        }
        let mut seen = HashSet::from([id]);
        let mut order = vec![id];
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            let Some(node) = self.nodes.get(&cur) else {
                continue;
            };
            let mut visit = |next: &BTreeSet<Identifier>| {
                for &n in next {
                    if seen.insert(n) {
                        order.push(n);
                        queue.push_back(n);
                    }
                }
            };
            match direction {
                Lineage::Parents => visit(&node.parents),
                Lineage::Children => visit(&node.children),
                Lineage::Undirected => {
                    visit(&node.parents);
                    visit(&node.children);
                }
            }
        }
        order
    }

    /// Keeps the identifiers of one category, preserving order.
    pub fn filter(ids: &[Identifier], category: Category) -> Vec<Identifier> {
        ids.iter().copied().filter(|id| id.is_a(category)).collect()
    }

    /// Resolves the identifiers of one category through `store`. Identifiers
    /// the store does not know are skipped.
    pub fn project<'a, S: ObjectStore>(
        ids: &[Identifier],
        category: Category,
        store: &'a S,
    ) -> BTreeMap<Identifier, &'a S::Object> {
        Self::filter(ids, category)
            .into_iter()
            .filter_map(|id| store.lookup(id).map(|obj| (id, obj)))
            .collect()
    }

    /// Objects of `category` linked to `id` in `direction`.
    pub fn linked_collection<'a, S: ObjectStore>(
        &self,
        id: Identifier,
        category: Category,
        direction: Lineage,
        store: &'a S,
    ) -> BTreeMap<Identifier, &'a S::Object> {
        Self::project(&self.lineage(id, direction), category, store)
    }

    /// Looks up the identifier whose pretty form is `pretty` (e.g. `"pg66"`).
    pub fn id_from_pretty(&self, pretty: &str) -> Option<Identifier> {
        let (category, index) = parse_pretty(pretty).ok()?;
        self.ids().find(|id| id.index() == index && id.is_a(category))
    }

    /// Splits the history into groups of related objects that share no
    /// edges, largest group first. Each group lists its identifiers in
    /// descending order.
    pub fn connected_subgroups(&self) -> Result<Vec<Vec<Identifier>>, HistoryError> {
        let blocks = flood_fill(self, &mut IdSequence::new())?;
        Ok(blocks
            .into_iter()
            .map(|b| b.members.into_iter().rev().collect())
            .collect())
    }

    /// One line per category listing the pretty ids of `ids` in it.
    pub fn summary(&self, ids: &[Identifier]) -> String {
        let mut out = String::new();
        for (category, label) in SUMMARY_SECTIONS {
            let names: Vec<String> = Self::filter(ids, category)
                .into_iter()
                .map(|id| id.pretty())
                .collect();
            out.push_str(&format!("{label:>13}: {}\n", names.join(", ")));
        }
        out
    }

    /// [`History::summary`] for the `top` largest subgroups (all if `None`).
    pub fn subgroup_summary(&self, top: Option<usize>) -> Result<String, HistoryError> {
        let groups = self.connected_subgroups()?;
        let top = top.unwrap_or(groups.len()).min(groups.len());
        let mut out = String::from("Subgroups:\n");
        for (i, group) in groups.iter().take(top).enumerate() {
            out.push_str(&format!("SubGroup {i}\n"));
            out.push_str(&self.summary(group));
        }
        Ok(out)
    }
}

const fn cat(t: ObjectType, s: Subtype) -> Category {
    Category::new(t, s)
}

/// Categories printed by [`History::summary`], in pipeline order.
pub const SUMMARY_SECTIONS: [(Category, &str); 10] = [
    (cat(ObjectType::Particle, Subtype::Generated), "gen_particles"),
    (cat(ObjectType::Track, Subtype::Raw), "gen_tracks"),
    (cat(ObjectType::Track, Subtype::Smeared), "tracks"),
    (cat(ObjectType::EcalCluster, Subtype::Raw), "ecals"),
    (cat(ObjectType::EcalCluster, Subtype::Smeared), "smeared_ecals"),
    (cat(ObjectType::EcalCluster, Subtype::Merged), "merged_ecals"),
    (cat(ObjectType::HcalCluster, Subtype::Raw), "hcals"),
    (cat(ObjectType::HcalCluster, Subtype::Smeared), "smeared_hcals"),
    (cat(ObjectType::HcalCluster, Subtype::Merged), "merged_hcals"),
    (cat(ObjectType::Particle, Subtype::Reconstructed), "rec_particles"),
];

impl Graph for History {
    fn node_ids(&self) -> Vec<Identifier> {
        self.nodes.keys().copied().collect()
    }

    /// Parents and children together: subgroups ignore edge direction.
    fn adjacent(&self, id: Identifier) -> Vec<Identifier> {
        self.nodes
            .get(&id)
            .map(|n| n.parents.union(&n.children).copied().collect())
            .unwrap_or_default()
    }

    fn contains(&self, id: Identifier) -> bool {
        self.nodes.contains_key(&id)
    }
}
