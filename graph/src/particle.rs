use std::collections::BTreeMap;

use nalgebra::Vector3;
use papas_id::{Category, IdSequence, Identifier, ObjectType, Subtype};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::geometry::{self, Direction};
use crate::object::Layer;

/// Beam configuration. Decides which quantity a particle identifier carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collider {
    /// Lepton collider: identifiers carry the energy.
    #[default]
    Ee,
    /// Hadron collider: identifiers carry the transverse momentum.
    Pp,
}

/// A generated, simulated or reconstructed particle.
///
/// Particles are not graph nodes. The track and cluster references exist
/// for provenance bookkeeping only.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: Identifier,
    pub pdgid: i32,
    pub charge: i32,
    pub energy: f64,
    pub p3: Vector3<f64>,
    pub vertex: Vector3<f64>,
    pub track: Option<Identifier>,
    pub track_smeared: Option<Identifier>,
    pub clusters: BTreeMap<Layer, Identifier>,
    pub clusters_smeared: BTreeMap<Layer, Identifier>,
}

impl Particle {
    /// Allocates a particle identifier from `seq` and builds the particle.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        seq: &mut IdSequence,
        subtype: Subtype,
        collider: Collider,
        pdgid: i32,
        charge: i32,
        energy: f64,
        p3: Vector3<f64>,
        vertex: Vector3<f64>,
    ) -> Result<Self, GraphError> {
        let value = match collider {
            Collider::Ee => energy,
            Collider::Pp => geometry::perp(&p3),
        };
        let id = seq.next_id(
            Category::new(ObjectType::Particle, subtype),
            value.max(0.0) as f32,
        )?;
        Ok(Self {
            id,
            pdgid,
            charge,
            energy,
            p3,
            vertex,
            track: None,
            track_smeared: None,
            clusters: BTreeMap::new(),
            clusters_smeared: BTreeMap::new(),
        })
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

    /// Invariant mass; zero when rounding makes `E² - p²` negative.
    pub fn mass(&self) -> f64 {
        (self.energy * self.energy - self.p3.norm_squared()).max(0.0).sqrt()
    }

    /// Electrons and photons.
    pub fn is_em(&self) -> bool {
        matches!(self.pdgid.abs(), 11 | 22)
    }

    /// Every track and cluster this particle points at.
    pub fn derived_ids(&self) -> Vec<Identifier> {
        self.track
            .iter()
            .chain(self.track_smeared.iter())
            .chain(self.clusters.values())
            .chain(self.clusters_smeared.values())
            .copied()
            .collect()
    }

    pub fn short_info(&self) -> String {
        // Neutral antiparticles print like their particle.
        let pid = if self.charge == 0 && self.pdgid < 0 {
            -self.pdgid
        } else {
            self.pdgid
        };
        format!("{pid} ({:.1})", self.energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(
        seq: &mut IdSequence,
        collider: Collider,
        pdgid: i32,
        e: f64,
        p: [f64; 3],
    ) -> Particle {
        let charge = match pdgid {
            22 | 130 | -130 => 0,
            _ if pdgid < 0 => -1,
            _ => 1,
        };
        let p3 = Vector3::from(p);
        Particle::create(seq, Subtype::Generated, collider, pdgid, charge, e, p3, Vector3::zeros())
            .unwrap()
    }

    #[test]
    fn id_value_depends_on_collider() {
        let mut seq = IdSequence::new();
        let ee = generated(&mut seq, Collider::Ee, 211, 13.5, [3.0, 4.0, 12.0]);
        let pp = generated(&mut seq, Collider::Pp, 211, 13.5, [3.0, 4.0, 12.0]);
        assert_eq!(ee.id.value(), 13.5);
        assert_eq!(pp.id.value(), 5.0);
        assert_eq!(ee.id.pretty(), "pg1");
    }

    #[test]
    fn em_and_mass() {
        let mut seq = IdSequence::new();
        let photon = generated(&mut seq, Collider::Ee, 22, 5.0, [0.0, 0.0, 5.0]);
        assert!(photon.is_em());
        assert_eq!(photon.mass(), 0.0);

        let pion = generated(&mut seq, Collider::Ee, -211, 5.0, [0.0, 3.0, 0.0]);
        assert!(!pion.is_em());
        assert!((pion.mass() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn derived_ids_collects_references() {
        let mut seq = IdSequence::new();
        let mut p = generated(&mut seq, Collider::Ee, 22, 5.0, [1.0, 0.0, 0.0]);
        let e = seq.next_id(Category::new(ObjectType::EcalCluster, Subtype::Raw), 5.0).unwrap();
        let es = seq
            .next_id(Category::new(ObjectType::EcalCluster, Subtype::Smeared), 4.8)
            .unwrap();
        p.clusters.insert(Layer::EcalIn, e);
        p.clusters_smeared.insert(Layer::EcalIn, es);
        assert_eq!(p.derived_ids(), vec![e, es]);
    }

    #[test]
    fn short_info_flips_neutral_antiparticles() {
        let mut seq = IdSequence::new();
        let k0 = generated(&mut seq, Collider::Ee, -130, 2.0, [1.0, 0.0, 0.0]);
        assert_eq!(k0.charge, 0);
        assert_eq!(k0.short_info(), "130 (2.0)");
    }
}
