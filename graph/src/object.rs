use std::collections::BTreeSet;
use std::fmt;

use nalgebra::Vector3;
use papas_id::{Category, IdSequence, Identifier, ObjectType, Subtype};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::geometry::{self, Direction};
use crate::run::EnergyHighWater;

/// Detector subsystem an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Tracker,
    EcalIn,
    HcalIn,
}

impl Layer {
    /// Identifier type for clusters in this layer. `None` for the tracker.
    pub fn cluster_type(self) -> Option<ObjectType> {
        match self {
            Layer::Tracker => None,
            Layer::EcalIn => Some(ObjectType::EcalCluster),
            Layer::HcalIn => Some(ObjectType::HcalCluster),
        }
    }

    pub fn of_type(t: ObjectType) -> Option<Layer> {
        match t {
            ObjectType::EcalCluster => Some(Layer::EcalIn),
            ObjectType::HcalCluster => Some(Layer::HcalIn),
            ObjectType::Track => Some(Layer::Tracker),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layer::Tracker => "tracker",
            Layer::EcalIn => "ecal_in",
            Layer::HcalIn => "hcal_in",
        })
    }
}

/// Geometry of one unmerged cluster.
///
/// Every cluster carries the leaves it was built from, so a merged cluster
/// still answers overlap and containment questions per deposit rather than
/// through its energy-weighted centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
    pub id: Identifier,
    pub position: Vector3<f64>,
    pub radius: f64,
}

impl Leaf {
    /// Half-opening angle of the deposit seen from the origin.
    pub fn angular_size(&self) -> Result<f64, GraphError> {
        let d = self.position.norm();
        if d == 0.0 {
            return Err(GraphError::DegenerateGeometry(self.id));
        }
        Ok((self.radius / d).atan())
    }

    pub fn direction(&self) -> Direction {
        Direction::of(&self.position)
    }

    /// Angular overlap of two leaves and the distance between their centres.
    pub fn overlaps(&self, other: &Leaf) -> Result<(bool, f64), GraphError> {
        let reach = self.angular_size()? + other.angular_size()?;
        let dr = self.direction().delta_r(&other.direction());
        Ok((dr < reach, dr))
    }
}

/// An energy deposit in a calorimeter layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: Identifier,
    pub position: Vector3<f64>,
    pub energy: f64,
    /// Radius of the deposit, in the same unit as `position`.
    pub radius: f64,
    pub layer: Layer,
    /// Leaf deposits this cluster is made of, captured at construction.
    /// A leaf cluster holds exactly itself.
    pub subclusters: Vec<Leaf>,
    /// Object this one was derived from (e.g. the unsmeared cluster).
    pub source: Option<Identifier>,
}

impl Cluster {
    /// Builds a leaf cluster. The layer is taken from the identifier type.
    pub fn new(
        id: Identifier,
        position: Vector3<f64>,
        energy: f64,
        radius: f64,
    ) -> Result<Self, GraphError> {
        let layer = id
            .object_type()
            .filter(|t| t.is_cluster())
            .and_then(Layer::of_type)
            .ok_or(GraphError::NotACluster { id })?;
        Ok(Self {
            id,
            position,
            energy,
            radius,
            layer,
            subclusters: vec![Leaf {
                id,
                position,
                radius,
            }],
            source: None,
        })
    }

    /// Allocates an identifier from `seq` and builds a leaf cluster. The
    /// energy is recorded in `high_water` under the cluster's category.
    pub fn create(
        seq: &mut IdSequence,
        high_water: &mut EnergyHighWater,
        layer: Layer,
        subtype: Subtype,
        position: Vector3<f64>,
        energy: f64,
        radius: f64,
    ) -> Result<Self, GraphError> {
        let t = layer.cluster_type().ok_or(GraphError::InvalidLayer(layer))?;
        let category = Category::new(t, subtype);
        let id = seq.next_id(category, energy.max(0.0) as f32)?;
        let cluster = Self::new(id, position, energy, radius)?;
        high_water.observe(category, energy);
        Ok(cluster)
    }

    pub fn with_source(mut self, source: Identifier) -> Self {
        self.source = Some(source);
        self
    }

    pub fn theta(&self) -> f64 {
        geometry::theta(&self.position)
    }

    pub fn phi(&self) -> f64 {
        geometry::phi(&self.position)
    }

    pub fn direction(&self) -> Direction {
        Direction::of(&self.position)
    }

    /// Transverse energy.
    pub fn pt(&self) -> f64 {
        self.energy * self.theta().sin()
    }

    /// Half-opening angle of the deposit seen from the origin. Only exact
    /// for leaf clusters; merged clusters keep the radius of their first leaf.
    pub fn angular_size(&self) -> Result<f64, GraphError> {
        let d = self.position.norm();
        if d == 0.0 {
            return Err(GraphError::DegenerateGeometry(self.id));
        }
        Ok((self.radius / d).atan())
    }

    /// Reports whether any leaf of `self` overlaps any leaf of `other`,
    /// together with the angular distance between the two cluster centres.
    pub fn overlaps(&self, other: &Cluster) -> Result<(bool, f64), GraphError> {
        let dr = geometry::delta_r(self.theta(), self.phi(), other.theta(), other.phi());
        for a in &self.subclusters {
            for b in &other.subclusters {
                if a.overlaps(b)?.0 {
                    return Ok((true, dr));
                }
            }
        }
        Ok((false, dr))
    }

    /// Reports whether `point` lies inside the radius of any leaf.
    ///
    /// The distance is to the nearest leaf centre that contains the point,
    /// or to the nearest leaf centre overall when none does.
    pub fn is_inside(&self, point: &Vector3<f64>) -> (bool, f64) {
        let mut containing = f64::INFINITY;
        let mut nearest = f64::INFINITY;
        for leaf in &self.subclusters {
            let dist = (leaf.position - point).norm();
            if dist < leaf.radius {
                containing = containing.min(dist);
            }
            nearest = nearest.min(dist);
        }
        if containing.is_finite() {
            (true, containing)
        } else {
            (false, nearest)
        }
    }

    /// Identifiers of the leaves, in merge order.
    pub fn subcluster_ids(&self) -> Vec<Identifier> {
        self.subclusters.iter().map(|l| l.id).collect()
    }

    pub fn is_merged(&self) -> bool {
        self.id.subtype() == Some(Subtype::Merged)
    }

    pub fn info(&self) -> String {
        let subs: Vec<String> = self.subclusters.iter().map(|l| l.id.pretty()).collect();
        format!(
            "{:7.2} {:5.2} {:5.2} sub({})",
            self.energy,
            std::f64::consts::FRAC_PI_2 - self.theta(),
            self.phi(),
            subs.join(", ")
        )
    }
}

/// A named point along a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub name: String,
    pub position: Vector3<f64>,
}

/// Trajectory of a track, ordered from the vertex outwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<PathPoint>,
}

impl Path {
    pub fn push(&mut self, name: &str, position: Vector3<f64>) {
        self.points.push(PathPoint {
            name: name.to_string(),
            position,
        });
    }

    pub fn point(&self, name: &str) -> Option<&Vector3<f64>> {
        self.points.iter().find(|p| p.name == name).map(|p| &p.position)
    }
}

/// A charged-particle trajectory measured in the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: Identifier,
    pub p3: Vector3<f64>,
    pub charge: i32,
    pub path: Path,
    pub source: Option<Identifier>,
}

impl Track {
    pub fn new(
        id: Identifier,
        p3: Vector3<f64>,
        charge: i32,
        path: Path,
    ) -> Result<Self, GraphError> {
        if id.object_type() != Some(ObjectType::Track) {
            return Err(GraphError::NotATrack { id });
        }
        Ok(Self {
            id,
            p3,
            charge,
            path,
            source: None,
        })
    }

    /// Allocates a track identifier carrying `|p|`.
    pub fn create(
        seq: &mut IdSequence,
        subtype: Subtype,
        p3: Vector3<f64>,
        charge: i32,
        path: Path,
    ) -> Result<Self, GraphError> {
        let id = seq.next_id(Category::new(ObjectType::Track, subtype), p3.norm() as f32)?;
        Self::new(id, p3, charge, path)
    }

    pub fn with_source(mut self, source: Identifier) -> Self {
        self.source = Some(source);
        self
    }

    pub fn p(&self) -> f64 {
        self.p3.norm()
    }

    pub fn pt(&self) -> f64 {
        geometry::perp(&self.p3)
    }

    pub fn theta(&self) -> f64 {
        geometry::theta(&self.p3)
    }

    pub fn phi(&self) -> f64 {
        geometry::phi(&self.p3)
    }

    pub fn direction(&self) -> Direction {
        Direction::of(&self.p3)
    }

    pub fn info(&self) -> String {
        format!(
            "{:7.2} {:7.2} {:5.2} {:5.2}",
            self.p(),
            self.pt(),
            std::f64::consts::FRAC_PI_2 - self.theta(),
            self.phi()
        )
    }
}

/// Payload of a graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum PfKind {
    Cluster(Cluster),
    Track(Track),
}

/// A node of the particle-flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct PfObject {
    pub kind: PfKind,
    /// Linked neighbours. Kept symmetric by [`crate::ObjectGraph`].
    pub(crate) linked: BTreeSet<Identifier>,
    pub(crate) locked: bool,
    pub(crate) block_label: Option<Identifier>,
}

impl PfObject {
    pub fn new(kind: PfKind) -> Self {
        Self {
            kind,
            linked: BTreeSet::new(),
            locked: false,
            block_label: None,
        }
    }

    pub fn id(&self) -> Identifier {
        match &self.kind {
            PfKind::Cluster(c) => c.id,
            PfKind::Track(t) => t.id,
        }
    }

    pub fn layer(&self) -> Layer {
        match &self.kind {
            PfKind::Cluster(c) => c.layer,
            PfKind::Track(_) => Layer::Tracker,
        }
    }

    pub fn linked(&self) -> &BTreeSet<Identifier> {
        &self.linked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn block_label(&self) -> Option<Identifier> {
        self.block_label
    }

    pub fn as_cluster(&self) -> Option<&Cluster> {
        match &self.kind {
            PfKind::Cluster(c) => Some(c),
            PfKind::Track(_) => None,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match &self.kind {
            PfKind::Track(t) => Some(t),
            PfKind::Cluster(_) => None,
        }
    }

    pub fn info(&self) -> String {
        match &self.kind {
            PfKind::Cluster(c) => c.info(),
            PfKind::Track(t) => t.info(),
        }
    }
}

impl From<Cluster> for PfObject {
    fn from(c: Cluster) -> Self {
        PfObject::new(PfKind::Cluster(c))
    }
}

impl From<Track> for PfObject {
    fn from(t: Track) -> Self {
        PfObject::new(PfKind::Track(t))
    }
}

impl fmt::Display for PfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            PfKind::Cluster(_) => "Cluster",
            PfKind::Track(_) => "Track",
        };
        write!(f, "{name}: {:>6}: {}", self.id().pretty(), self.info())
    }
}
