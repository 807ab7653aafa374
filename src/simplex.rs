//! The simplex and closest-point sub-algorithm used by GJK.
//!
//! A simplex holds up to four points of the Minkowski difference. Each update adds one point and
//! reduces the simplex to the smallest subset whose affine hull contains the point closest to the
//! origin, using Johnson's recursive determinant formulation.
// Implementation based on "A Fast and Robust GJK Implementation for Collision Detection of Convex
// Objects" by Gino van den Bergen (https://doi.org/10.1080/10867651.1999.10487502).

use glam::DVec3;

/// Number of point slots. Four points suffice in three dimensions.
pub const MAX_POINTS: usize = 4;

/// Number of distinct slot subsets, including the empty set.
const NUM_SUBSETS: usize = 1 << MAX_POINTS;

bitflags::bitflags! {
    /// A subset of the four simplex point slots.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Slots: u8 {
        const S0 = 0b0001;
        const S1 = 0b0010;
        const S2 = 0b0100;
        const S3 = 0b1000;
    }
}

impl Slots {
    const BY_INDEX: [Slots; MAX_POINTS] = [Slots::S0, Slots::S1, Slots::S2, Slots::S3];

    /// Returns the singleton set for slot `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= MAX_POINTS`.
    #[inline]
    pub fn slot(i: usize) -> Slots {
        Slots::BY_INDEX[i]
    }

    /// Returns the row of the determinant table for this subset.
    #[inline]
    pub fn index(self) -> usize {
        let idx = self.bits() as usize;
        debug_assert!(idx < NUM_SUBSETS);
        idx
    }

    /// Iterates over the slot indices in this set, in increasing order.
    #[inline]
    pub fn members(self) -> impl Iterator<Item = usize> {
        (0..MAX_POINTS).filter(move |&i| self.contains(Slots::slot(i)))
    }

    /// Returns the lowest slot index in this set.
    #[inline]
    pub fn first(self) -> Option<usize> {
        self.members().next()
    }

    /// Iterates over the non-empty subsets of this set, in increasing order of their bit
    /// patterns.
    ///
    /// Every proper subset of a set is yielded before the set itself.
    pub fn subsets(self) -> impl DoubleEndedIterator<Item = Slots> {
        (1..NUM_SUBSETS as u8)
            .map(Slots::from_bits_truncate)
            .filter(move |&sub| self.contains(sub))
    }

    /// Returns the number of slots in this set.
    #[inline]
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

/// Reasons a simplex update makes no progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stall {
    /// The new point is already in the simplex.
    DuplicatePoint,
    /// All four slots are occupied. Callers treat the closest point as the origin.
    Full,
    /// No subset passed the closest-point test, due to accumulated numerical error.
    NoValidSubset,
}

/// Scratch state for the closest-point sub-algorithm.
#[derive(Clone, Debug)]
pub struct Simplex {
    active: Slots,

    points: [DVec3; MAX_POINTS],

    // self.dot[i][j] stores the value of points[i].dot(points[j]).
    dot: [[f64; MAX_POINTS]; MAX_POINTS],

    // self.det[x][i] is the cofactor of point `i` in subset `x`. Only meaningful when `x` contains
    // slot `i`.
    det: [[f64; MAX_POINTS]; NUM_SUBSETS],
}

impl Default for Simplex {
    fn default() -> Self {
        Simplex::new()
    }
}

impl Simplex {
    pub fn new() -> Simplex {
        Simplex {
            active: Slots::empty(),
            points: [DVec3::ZERO; MAX_POINTS],
            dot: [[0.0; MAX_POINTS]; MAX_POINTS],
            det: [[0.0; MAX_POINTS]; NUM_SUBSETS],
        }
    }

    /// Empties the simplex. Stored points and tables are left in place and overwritten on use.
    #[inline]
    pub fn initialize(&mut self) {
        self.active = Slots::empty();
    }

    /// Returns the set of occupied slots.
    #[inline]
    pub fn active(&self) -> Slots {
        self.active
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterates over the points in the occupied slots.
    pub fn points(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.active.members().map(|i| self.points[i])
    }

    /// Adds `w` to the simplex and returns the point of the reduced simplex closest to the origin.
    ///
    /// On success, the simplex is reduced to the smallest subset containing the closest point.
    /// On any stall the active points are unchanged. After `Stall::NoValidSubset` the cached
    /// determinants of the rejected point's slot are stale, but they are recomputed when the slot
    /// is filled again.
    pub fn update(&mut self, w: DVec3) -> Result<DVec3, Stall> {
        if self.points().any(|p| p == w) {
            return Err(Stall::DuplicatePoint);
        }

        let Some(new_idx) = self.free_slot() else {
            return Err(Stall::Full);
        };
        let new_bit = Slots::slot(new_idx);

        let prev = self.active;
        self.points[new_idx] = w;
        self.active |= new_bit;

        self.update_dot(new_idx);
        self.update_det(new_bit);

        let closest = self.find_closest(new_bit);
        if closest.is_err() {
            tracing::debug!(active = ?self.active, "no valid subset for closest point");
            self.active = prev;
        }

        closest
    }

    fn free_slot(&self) -> Option<usize> {
        (0..MAX_POINTS).find(|&i| !self.active.contains(Slots::slot(i)))
    }

    // Recompute dot products which change with the new point.
    fn update_dot(&mut self, new_idx: usize) {
        let w = self.points[new_idx];

        for i in self.active.members() {
            let d = self.points[i].dot(w);
            self.dot[i][new_idx] = d;
            self.dot[new_idx][i] = d;
        }
    }

    // Recompute the determinants of every subset of the active set that contains `new_bit`.
    //
    // Subsets without `new_bit` keep their values from earlier updates: all of their points were
    // active when the last of them was added, and none has moved since.
    fn update_det(&mut self, new_bit: Slots) {
        for sub in self.active.subsets().filter(|s| s.contains(new_bit)) {
            if sub.count() == 1 {
                for i in sub.members() {
                    self.det[sub.index()][i] = 1.0;
                }
                continue;
            }

            for i in sub.members() {
                let rest = sub - Slots::slot(i);

                // `rest` is non-empty because `sub` has at least two members.
                let Some(k) = rest.first() else {
                    continue;
                };

                let d: f64 = rest
                    .members()
                    .map(|j| self.det[rest.index()][j] * (self.dot[j][k] - self.dot[j][i]))
                    .sum();

                self.det[sub.index()][i] = d;
            }
        }
    }

    // Finds the subset containing `new_bit` whose affine hull holds the closest point to the
    // origin, starting from the full set.
    fn find_closest(&mut self, new_bit: Slots) -> Result<DVec3, Stall> {
        let found = self
            .active
            .subsets()
            .rev()
            .filter(|s| s.contains(new_bit))
            .find(|&s| self.is_valid_solution(s));

        let Some(sub) = found else {
            return Err(Stall::NoValidSubset);
        };

        let mut v = DVec3::ZERO;
        let mut sum = 0.0;
        for i in sub.members() {
            let det = self.det[sub.index()][i];
            sum += det;
            v += det * self.points[i];
        }

        self.active = sub;
        tracing::trace!(subset = ?sub, ?v, "closest subset");

        Ok(v / sum)
    }

    // Determines whether `sub` of the active set is a valid solution.
    //
    // A subset is valid iff the determinants of its members are positive and the determinants of
    // the remaining active points, each added to the subset, are non-positive.
    fn is_valid_solution(&self, sub: Slots) -> bool {
        debug_assert!(self.active.contains(sub));

        self.active.members().all(|i| {
            let bit = Slots::slot(i);
            let det = self.det[(sub | bit).index()][i];

            if sub.contains(bit) {
                det > 0.0
            } else {
                det <= 0.0
            }
        })
    }
}
