use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Polar angle measured from the +z axis, in `[0, π]`.
pub fn theta(v: &Vector3<f64>) -> f64 {
    let perp = v.x.hypot(v.y);
    if perp == 0.0 && v.z == 0.0 {
        return 0.0;
    }
    perp.atan2(v.z)
}

/// Azimuthal angle in `(-π, π]`.
pub fn phi(v: &Vector3<f64>) -> f64 {
    if v.x == 0.0 && v.y == 0.0 {
        return 0.0;
    }
    v.y.atan2(v.x)
}

/// Transverse component (distance from the beam axis).
pub fn perp(v: &Vector3<f64>) -> f64 {
    v.x.hypot(v.y)
}

/// Wraps an azimuthal difference into `(-π, π]`.
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut d = phi1 - phi2;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// Angular distance `sqrt(dθ² + dφ²)` with φ wrapped around the circle.
pub fn delta_r(theta1: f64, phi1: f64, theta2: f64, phi2: f64) -> f64 {
    let dt = theta1 - theta2;
    let dp = delta_phi(phi1, phi2);
    (dt * dt + dp * dp).sqrt()
}

/// A point in angular detector coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub theta: f64,
    pub phi: f64,
}

impl Direction {
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    pub fn of(v: &Vector3<f64>) -> Self {
        Self::new(theta(v), phi(v))
    }

    pub fn delta_r(&self, other: &Direction) -> f64 {
        delta_r(self.theta, self.phi, other.theta, other.phi)
    }
}
