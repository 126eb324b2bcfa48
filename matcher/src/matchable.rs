use papas_graph::{Cluster, Direction, Particle, Track};
use papas_id::Identifier;

/// Something with an identity and a direction in the detector.
pub trait Matchable {
    fn id(&self) -> Identifier;

    fn direction(&self) -> Direction;

    /// PDG code, for objects that carry one.
    fn pdgid(&self) -> Option<i32> {
        None
    }
}

impl Matchable for Particle {
    fn id(&self) -> Identifier {
        self.id
    }

    fn direction(&self) -> Direction {
        Particle::direction(self)
    }

    fn pdgid(&self) -> Option<i32> {
        Some(self.pdgid)
    }
}

impl Matchable for Cluster {
    fn id(&self) -> Identifier {
        self.id
    }

    fn direction(&self) -> Direction {
        Cluster::direction(self)
    }
}

impl Matchable for Track {
    fn id(&self) -> Identifier {
        self.id
    }

    fn direction(&self) -> Direction {
        Track::direction(self)
    }
}

impl<T: Matchable + ?Sized> Matchable for &T {
    fn id(&self) -> Identifier {
        (**self).id()
    }

    fn direction(&self) -> Direction {
        (**self).direction()
    }

    fn pdgid(&self) -> Option<i32> {
        (**self).pdgid()
    }
}

/// Distance between two directions. Smaller is closer.
pub trait Metric {
    fn distance(&self, a: &Direction, b: &Direction) -> f64;
}

/// `sqrt(dθ² + dφ²)` with `dφ` wrapped into (-π, π].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaR;

impl Metric for DeltaR {
    fn distance(&self, a: &Direction, b: &Direction) -> f64 {
        a.delta_r(b)
    }
}

impl<F> Metric for F
where
    F: Fn(&Direction, &Direction) -> f64,
{
    fn distance(&self, a: &Direction, b: &Direction) -> f64 {
        self(a, b)
    }
}
