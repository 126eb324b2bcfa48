use std::collections::BTreeMap;

use nalgebra::Vector3;
use papas_id::{Category, IdSequence, Identifier, Subtype};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;
use crate::object::{Cluster, Layer, Leaf};
use crate::objectgraph::ObjectGraph;
use crate::run::EnergyHighWater;

/// Merges two clusters of the same layer into a new merged cluster.
///
/// Neither input is modified. The merged energy is the sum, the position is
/// the energy-weighted mean and the sub-cluster list is `a`'s followed by
/// `b`'s.
pub fn merge(
    a: &Cluster,
    b: &Cluster,
    seq: &mut IdSequence,
    high_water: &mut EnergyHighWater,
) -> Result<Cluster, GraphError> {
    merge_all(&[a, b], seq, high_water)
}

/// Merges any number of same-layer clusters, in the given order.
///
/// The radius is taken from the first cluster. When the total energy is
/// zero the position falls back to the plain mean. The merged energy is
/// recorded in `high_water`.
pub fn merge_all(
    clusters: &[&Cluster],
    seq: &mut IdSequence,
    high_water: &mut EnergyHighWater,
) -> Result<Cluster, GraphError> {
    let first = *clusters.first().ok_or(GraphError::EmptyMerge)?;
    for c in &clusters[1..] {
        if c.layer != first.layer {
            return Err(GraphError::LayerMismatch {
                a: first.id,
                a_layer: first.layer,
                b: c.id,
                b_layer: c.layer,
            });
        }
    }

    let energy: f64 = clusters.iter().map(|c| c.energy).sum();
    let position = if energy != 0.0 {
        clusters
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, c| acc + c.position * c.energy)
            / energy
    } else {
        clusters
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, c| acc + c.position)
            / clusters.len() as f64
    };
    let subclusters: Vec<Leaf> = clusters
        .iter()
        .flat_map(|c| c.subclusters.iter().copied())
        .collect();

    let t = first
        .layer
        .cluster_type()
        .ok_or(GraphError::InvalidLayer(first.layer))?;
    let category = Category::new(t, Subtype::Merged);
    let id = seq.next_id(category, energy.max(0.0) as f32)?;
    high_water.observe(category, energy);

    Ok(Cluster {
        id,
        position,
        energy,
        radius: first.radius,
        layer: first.layer,
        subclusters,
        source: None,
    })
}

/// Which layers the merger combines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Layers in which overlapping clusters are merged. Clusters of other
    /// layers are passed through as single-member merged clusters.
    pub layers: Vec<Layer>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            layers: vec![Layer::EcalIn, Layer::HcalIn],
        }
    }
}

impl MergeConfig {
    pub fn with_layers(mut self, layers: &[Layer]) -> Self {
        self.layers = layers.to_vec();
        self
    }
}

/// Result of [`ClusterMerger::merge_overlapping`].
#[derive(Debug, Clone, Default)]
pub struct MergeOutput {
    pub clusters: Vec<Cluster>,
    /// `(input, merged)` derivation pairs, one per input cluster.
    pub derivations: Vec<(Identifier, Identifier)>,
}

/// Combines overlapping clusters of the same layer.
#[derive(Debug, Clone, Default)]
pub struct ClusterMerger {
    cfg: MergeConfig,
}

impl ClusterMerger {
    pub fn new(cfg: MergeConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.cfg
    }

    /// Links every overlapping pair within a layer, splits the result into
    /// blocks and merges each block into one cluster. Every input ends up in
    /// exactly one output cluster, singletons included.
    ///
    /// Output is grouped by layer, then by block size, largest first.
    pub fn merge_overlapping(
        &self,
        clusters: &[Cluster],
        seq: &mut IdSequence,
        high_water: &mut EnergyHighWater,
    ) -> Result<MergeOutput, GraphError> {
        let mut by_layer: BTreeMap<Layer, ObjectGraph> = BTreeMap::new();
        for c in clusters {
            by_layer.entry(c.layer).or_default().insert(c.clone())?;
        }

        let mut out = MergeOutput::default();
        for (layer, mut graph) in by_layer {
            let ids: Vec<Identifier> = graph.ids().collect();
            if self.cfg.layers.contains(&layer) {
                for (i, &a) in ids.iter().enumerate() {
                    for &b in &ids[i + 1..] {
                        let (ca, cb) = match (graph.cluster(a), graph.cluster(b)) {
                            (Some(ca), Some(cb)) => (ca, cb),
                            _ => continue,
                        };
                        if ca.overlaps(cb)?.0 {
                            graph.link(a, b)?;
                        }
                    }
                }
            }

            // Block labels are scratch; they never leave this function.
            let blocks = graph.partition(&mut IdSequence::new())?;
            for block in &blocks {
                let members: Vec<&Cluster> = block
                    .members
                    .iter()
                    .filter_map(|id| graph.cluster(*id))
                    .collect();
                let merged = merge_all(&members, seq, high_water)?;
                for m in &members {
                    out.derivations.push((m.id, merged.id));
                }
                out.clusters.push(merged);
            }
            debug!(
                "merged {} {layer} clusters into {}",
                ids.len(),
                blocks.len()
            );
        }
        Ok(out)
    }
}
