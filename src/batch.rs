//! Data-parallel queries over many body pairs.
//!
//! Each rayon worker lazily creates its own [`Gjk`] engine and reuses it for every pair it
//! processes, so no engine is ever shared between threads.

use glam::DVec3;
use rayon::prelude::*;

use crate::{body::Support, gjk::Gjk, gjk::Tolerance};

/// Computes the distance between each pair of bodies, in input order.
pub fn distances<A, B>(pairs: &[(A, B)]) -> Vec<f64>
where
    A: Support + Sync,
    B: Support + Sync,
{
    distances_with(pairs, Tolerance::DEFAULT)
}

/// Computes the distance between each pair of bodies using the given tolerance.
pub fn distances_with<A, B>(pairs: &[(A, B)], tolerance: Tolerance) -> Vec<f64>
where
    A: Support + Sync,
    B: Support + Sync,
{
    pairs
        .par_iter()
        .map_init(
            || Gjk::with_tolerance(tolerance),
            |gjk, (a, b)| gjk.distance(a, b),
        )
        .collect()
}

/// Tests each pair of bodies for intersection, in input order.
///
/// `hint` seeds every query; see [`Gjk::intersect`].
pub fn intersections<A, B>(pairs: &[(A, B)], hint: Option<DVec3>) -> Vec<bool>
where
    A: Support + Sync,
    B: Support + Sync,
{
    intersections_with(pairs, hint, Tolerance::DEFAULT)
}

/// Tests each pair of bodies for intersection using the given tolerance.
pub fn intersections_with<A, B>(
    pairs: &[(A, B)],
    hint: Option<DVec3>,
    tolerance: Tolerance,
) -> Vec<bool>
where
    A: Support + Sync,
    B: Support + Sync,
{
    pairs
        .par_iter()
        .map_init(
            || Gjk::with_tolerance(tolerance),
            |gjk, (a, b)| gjk.intersect(a, b, hint),
        )
        .collect()
}
