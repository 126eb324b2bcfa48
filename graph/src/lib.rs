//! Particle-flow object graph.
//!
//! Tracks and clusters are nodes of an [`ObjectGraph`]. An external linking
//! pass connects them with [`ObjectGraph::link`]; [`flood_fill`] then splits
//! the graph into [`Block`]s that reconstruction handles one at a time.
//! Same-layer clusters are combined with [`merge`] or, in bulk, with a
//! [`ClusterMerger`].

pub mod error;
pub mod floodfill;
pub mod geometry;
pub mod graph;
pub mod merge;
pub mod object;
pub mod objectgraph;
pub mod particle;
pub mod run;


pub use error::GraphError;
pub use floodfill::{Block, flood_fill};
pub use geometry::Direction;
pub use graph::Graph;
pub use merge::{ClusterMerger, MergeConfig, MergeOutput, merge, merge_all};
pub use object::{Cluster, Layer, Leaf, Path, PathPoint, PfKind, PfObject, Track};
pub use objectgraph::ObjectGraph;
pub use particle::{Collider, Particle};
pub use run::{EnergyHighWater, Run};
