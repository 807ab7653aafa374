//! The Gilbert-Johnson-Keerthi distance and intersection queries.
// Implementation based on "A Fast and Robust GJK Implementation for Collision Detection of Convex
// Objects" by Gino van den Bergen (https://doi.org/10.1080/10867651.1999.10487502).

use glam::DVec3;

use crate::{
    body::Support,
    simplex::{Simplex, Stall},
};

/// Numerical tolerances for the GJK queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Relative error bound for distance convergence, and the separation threshold for
    /// intersection tests.
    pub epsilon: f64,

    /// Upper bound on support-point iterations per query.
    pub max_iterations: usize,
}

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance {
        epsilon: 1.0e-7,
        max_iterations: 128,
    };

    /// Magnitude below which a vector is treated as the origin.
    #[inline]
    pub fn near_zero(&self) -> f64 {
        self.epsilon * 1000.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::DEFAULT
    }
}

#[derive(Copy, Clone, Debug)]
struct LowerBound(f64);

impl LowerBound {
    #[inline(always)]
    fn new() -> LowerBound {
        LowerBound(0.0)
    }

    #[inline(always)]
    fn get(&self) -> f64 {
        self.0
    }

    #[inline(always)]
    fn update(&mut self, delta: f64) {
        self.0 = delta.max(self.0)
    }
}

/// Best-effort distance once the simplex stops making progress at the estimate `v`.
///
/// A full simplex encloses the origin, so the bodies are treated as touching.
fn stalled_distance(stall: Stall, v: DVec3) -> f64 {
    match stall {
        Stall::Full => 0.0,
        Stall::DuplicatePoint | Stall::NoValidSubset => v.length(),
    }
}

/// Best-effort intersection verdict once the simplex stops making progress at the estimate `v`.
///
/// This is an approximation: a stalled estimate near the origin is reported as an intersection
/// without proof that the origin lies in the Minkowski difference.
fn stalled_intersect(stall: Stall, v: DVec3, near_zero: f64) -> bool {
    match stall {
        Stall::Full => true,
        Stall::DuplicatePoint | Stall::NoValidSubset => v.length() <= near_zero,
    }
}

/// Computes the supporting point of the Minkowski difference `A - B` in the direction `dir`.
#[inline]
fn support_difference<A, B>(a: &A, b: &B, dir: DVec3) -> DVec3
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    a.support(dir) - b.support(-dir)
}

/// A GJK query engine.
///
/// The engine owns the simplex workspace reused by every query. Queries take `&mut self`, so an
/// engine serves one caller at a time; concurrent workers each keep their own engine.
#[derive(Clone, Debug, Default)]
pub struct Gjk {
    simplex: Simplex,
    tolerance: Tolerance,
}

impl Gjk {
    pub fn new() -> Gjk {
        Gjk::with_tolerance(Tolerance::DEFAULT)
    }

    pub fn with_tolerance(tolerance: Tolerance) -> Gjk {
        Gjk {
            simplex: Simplex::new(),
            tolerance,
        }
    }

    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Computes the minimum distance between the convex bodies `a` and `b`.
    ///
    /// The result is never negative. Intersecting bodies yield a distance of at most
    /// [`Tolerance::near_zero`]. If the simplex stops making progress, the current estimate is
    /// returned.
    pub fn distance<A, B>(&mut self, a: &A, b: &B) -> f64
    where
        A: Support + ?Sized,
        B: Support + ?Sized,
    {
        let Tolerance {
            epsilon,
            max_iterations,
        } = self.tolerance;

        self.simplex.initialize();

        // Initialize v with an arbitrary point on the Minkowski difference.
        let mut v = a.support(DVec3::ZERO) - b.support(DVec3::ZERO);
        let mut lower_bound = LowerBound::new();

        for iteration in 0..max_iterations {
            let dist = v.length();
            if dist <= self.tolerance.near_zero() {
                return dist;
            }

            // Compute the support point on the Minkowski difference.
            let w = support_difference(a, b, -v);

            // Update the lower bound.
            lower_bound.update(v.dot(w) / dist);
            tracing::trace!(iteration, ?v, ?w, dist, lower = lower_bound.get());

            // If the previous distance is within the relative error of the lower bound, terminate.
            if dist - lower_bound.get() <= epsilon * dist {
                return dist;
            }

            match self.simplex.update(w) {
                Ok(closest) => v = closest,
                Err(stall) => {
                    tracing::debug!(?stall, dist, "simplex stalled");
                    return stalled_distance(stall, v);
                }
            }
        }

        tracing::warn!(max_iterations, "distance query did not converge");
        v.length()
    }

    /// Returns `true` _iff_ the convex bodies `a` and `b` intersect.
    ///
    /// `hint` seeds the search direction; passing the separating direction from a previous query
    /// on slowly moving bodies speeds up convergence. A zero or absent hint falls back to an
    /// arbitrary point on the Minkowski difference.
    ///
    /// If the simplex stops making progress, the bodies are reported as intersecting when the
    /// simplex is full or the current estimate is within [`Tolerance::near_zero`] of the origin.
    /// This is an approximation and may misclassify bodies that nearly touch.
    pub fn intersect<A, B>(&mut self, a: &A, b: &B, hint: Option<DVec3>) -> bool
    where
        A: Support + ?Sized,
        B: Support + ?Sized,
    {
        let Tolerance {
            epsilon,
            max_iterations,
        } = self.tolerance;
        let near_zero = self.tolerance.near_zero();

        self.simplex.initialize();

        let mut v = hint.unwrap_or(DVec3::ZERO);
        if v == DVec3::ZERO {
            v = a.support(DVec3::ZERO) - b.support(DVec3::ZERO);
        }

        let mut iteration = 0;
        while !v.abs().cmple(DVec3::splat(near_zero)).all() {
            if iteration == max_iterations {
                tracing::warn!(max_iterations, "intersection query did not converge");
                return v.length() <= near_zero;
            }
            iteration += 1;

            let w = support_difference(a, b, -v);
            tracing::trace!(iteration, ?v, ?w);

            // `v` is a separating axis.
            if v.dot(w) > epsilon {
                tracing::trace!(?v, "found separating axis");
                return false;
            }

            match self.simplex.update(w) {
                Ok(closest) => v = closest,
                Err(stall) => {
                    tracing::debug!(?stall, ?v, "simplex stalled");
                    return stalled_intersect(stall, v, near_zero);
                }
            }
        }

        true
    }
}
