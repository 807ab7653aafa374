//! Distance and intersection queries between convex bodies.
//!
//! Bodies are described only by their support functions (see [`Support`]); the engine never
//! builds their full geometry. [`Gjk`] answers two queries with the Gilbert-Johnson-Keerthi
//! algorithm:
//!
//! - [`Gjk::distance`] computes the minimum distance between two bodies.
//! - [`Gjk::intersect`] tests whether two bodies overlap.
//!
//! A `Gjk` owns its scratch simplex, so each thread that runs queries keeps its own engine. The
//! [`batch`] module does this for rayon workers.
//!
//! ```
//! use glam::DVec3;
//! use gjk_proximity::{Gjk, PointSet, Segment};
//!
//! let tile = PointSet::new([
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0),
//! ])
//! .unwrap();
//! let pick_ray = Segment::new(DVec3::new(0.5, 0.5, 10.0), -DVec3::Z, 0.0, 20.0).unwrap();
//!
//! let mut gjk = Gjk::new();
//! assert!(gjk.intersect(&pick_ray, &tile, None));
//! assert!((gjk.distance(&DVec3::new(0.5, 0.5, 5.0), &tile) - 5.0).abs() < 1e-6);
//! ```

use std::ops::Mul;

use glam::{DQuat, DVec3};

pub mod batch;
pub mod body;
mod error;
pub mod gjk;
pub mod simplex;

#[doc(inline)]
pub use body::{Body, Placed, PointSet, Segment, Support};
#[doc(inline)]
pub use error::BodyError;
#[doc(inline)]
pub use gjk::{Gjk, Tolerance};

/// An isometry, or rigid transformation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isometry {
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Default for Isometry {
    fn default() -> Self {
        Isometry::IDENTITY
    }
}

impl Isometry {
    pub const IDENTITY: Self = Isometry {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn from_translation(v: DVec3) -> Isometry {
        Isometry {
            translation: v,
            ..Default::default()
        }
    }

    pub fn from_rotation(rotation: DQuat) -> Isometry {
        Isometry {
            rotation,
            ..Default::default()
        }
    }

    /// Returns the inverse transformation.
    #[inline]
    pub fn inverse(self) -> Isometry {
        let rotation = self.rotation.inverse();
        Isometry {
            rotation,
            translation: rotation * -self.translation,
        }
    }
}

impl Mul<Isometry> for Isometry {
    type Output = Isometry;

    /// Composes two isometries; `self` is applied after `rhs`.
    fn mul(self, rhs: Isometry) -> Self::Output {
        Isometry {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation * rhs.translation + self.translation,
        }
    }
}

impl Mul<DVec3> for Isometry {
    type Output = DVec3;

    #[inline]
    fn mul(self, rhs: DVec3) -> Self::Output {
        self.rotation * rhs + self.translation
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn isometry() {
        let iso = Isometry {
            rotation: DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
            translation: DVec3::new(1.0, 2.0, 3.0),
        };

        assert_abs_diff_eq!(iso * DVec3::X, DVec3::new(1.0, 3.0, 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(iso.inverse() * (iso * DVec3::ONE), DVec3::ONE, epsilon = 1e-12);

        let shift = Isometry::from_translation(DVec3::Z);
        assert_abs_diff_eq!(
            (shift * iso) * DVec3::X,
            DVec3::new(1.0, 3.0, 4.0),
            epsilon = 1e-12
        );

        let turn = Isometry::from_rotation(iso.rotation);
        assert_abs_diff_eq!(turn * DVec3::Y, -DVec3::X, epsilon = 1e-12);
        assert_eq!(Isometry::default(), Isometry::IDENTITY);
    }
}
