//! Convex bodies described by their support functions.

use glam::DVec3;
use smallvec::SmallVec;

use crate::{error::BodyError, Isometry};

/// A trait for types which can compute supporting points in a given direction.
pub trait Support {
    /// Computes the supporting point of this convex set in the direction given by `dir`.
    ///
    /// The returned point maximizes `dir.dot(point)` over the set. When `dir` is the zero vector,
    /// implementations return a fixed point of the set; the result must be deterministic for a
    /// given input.
    fn support(&self, dir: DVec3) -> DVec3;
}

impl<T: Support + ?Sized> Support for &T {
    #[inline]
    fn support(&self, dir: DVec3) -> DVec3 {
        (**self).support(dir)
    }
}

impl<T: Support + ?Sized> Support for Box<T> {
    #[inline]
    fn support(&self, dir: DVec3) -> DVec3 {
        (**self).support(dir)
    }
}

/// A single point.
impl Support for DVec3 {
    #[inline]
    fn support(&self, _dir: DVec3) -> DVec3 {
        *self
    }
}

/// The convex hull of a finite, non-empty set of points.
///
/// The hull is never computed; support queries scan the points directly.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    points: SmallVec<[DVec3; 8]>,
    // Returned for the zero direction, if set.
    anchor: Option<DVec3>,
}

impl PointSet {
    /// Constructs a point set from `points`.
    ///
    /// Returns an error if `points` is empty or contains a non-finite coordinate.
    pub fn new<I>(points: I) -> Result<PointSet, BodyError>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let points: SmallVec<[DVec3; 8]> = points.into_iter().collect();

        if points.is_empty() {
            return Err(BodyError::EmptyPointSet);
        }

        if !points.iter().all(|p| p.is_finite()) {
            return Err(BodyError::NonFinite);
        }

        Ok(PointSet {
            points,
            anchor: None,
        })
    }

    /// Constructs a point set which reports `anchor` as its supporting point for the zero
    /// direction.
    ///
    /// `anchor` should lie inside the hull of `points`, e.g. the center of a terrain tile.
    pub fn with_anchor<I>(points: I, anchor: DVec3) -> Result<PointSet, BodyError>
    where
        I: IntoIterator<Item = DVec3>,
    {
        if !anchor.is_finite() {
            return Err(BodyError::NonFinite);
        }

        let mut set = PointSet::new(points)?;
        set.anchor = Some(anchor);
        Ok(set)
    }

    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a point set cannot be empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn anchor(&self) -> Option<DVec3> {
        self.anchor
    }
}

impl Support for PointSet {
    fn support(&self, dir: DVec3) -> DVec3 {
        if dir == DVec3::ZERO {
            if let Some(anchor) = self.anchor {
                return anchor;
            }
        }

        // Strict comparison keeps the lowest index on ties.
        let mut best = self.points[0];
        let mut best_dot = dir.dot(best);
        for &p in &self.points[1..] {
            let d = dir.dot(p);
            if d > best_dot {
                best = p;
                best_dot = d;
            }
        }

        best
    }
}

/// The points `origin + t * dir` for `t` in `[t1, t2]`.
///
/// Pick rays are modeled as segments clipped to the visible range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    dir: DVec3,
    start: DVec3,
    end: DVec3,
    origin: DVec3,
    t1: f64,
    t2: f64,
}

impl Segment {
    /// Constructs a segment from its origin, direction and parameter interval.
    pub fn new(origin: DVec3, dir: DVec3, t1: f64, t2: f64) -> Result<Segment, BodyError> {
        if !(origin.is_finite() && dir.is_finite() && t1.is_finite() && t2.is_finite()) {
            return Err(BodyError::NonFinite);
        }

        if dir.length_squared() == 0.0 {
            return Err(BodyError::DegenerateSegment);
        }

        if t1 > t2 {
            return Err(BodyError::InvalidInterval { t1, t2 });
        }

        Ok(Segment {
            dir,
            start: origin + t1 * dir,
            end: origin + t2 * dir,
            origin,
            t1,
            t2,
        })
    }

    /// Constructs the segment from `a` to `b`, parameterized over `[0, 1]`.
    pub fn from_endpoints(a: DVec3, b: DVec3) -> Result<Segment, BodyError> {
        Segment::new(a, b - a, 0.0, 1.0)
    }

    /// Returns the point at parameter `t1`.
    #[inline]
    pub fn start(&self) -> DVec3 {
        self.start
    }

    /// Returns the point at parameter `t2`.
    #[inline]
    pub fn end(&self) -> DVec3 {
        self.end
    }

    #[inline]
    pub fn dir(&self) -> DVec3 {
        self.dir
    }

    /// Returns the point at parameter `t`. `t` is not clamped to the interval.
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + t * self.dir
    }

    #[inline]
    pub fn interval(&self) -> (f64, f64) {
        (self.t1, self.t2)
    }
}

impl Support for Segment {
    #[inline]
    fn support(&self, dir: DVec3) -> DVec3 {
        if dir.dot(self.dir) <= 0.0 {
            self.start
        } else {
            self.end
        }
    }
}

/// One of the supported convex body variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Point(DVec3),
    PointSet(PointSet),
    Segment(Segment),
}

impl Support for Body {
    #[inline]
    fn support(&self, dir: DVec3) -> DVec3 {
        match self {
            Body::Point(p) => p.support(dir),
            Body::PointSet(set) => set.support(dir),
            Body::Segment(seg) => seg.support(dir),
        }
    }
}

impl From<DVec3> for Body {
    fn from(p: DVec3) -> Body {
        Body::Point(p)
    }
}

impl From<PointSet> for Body {
    fn from(set: PointSet) -> Body {
        Body::PointSet(set)
    }
}

impl From<Segment> for Body {
    fn from(seg: Segment) -> Body {
        Body::Segment(seg)
    }
}

/// A body placed in world space by an isometry.
#[derive(Clone, Debug)]
pub struct Placed<T> {
    pub body: T,
    pub isometry: Isometry,
}

impl<T> Placed<T> {
    pub fn new(body: T, isometry: Isometry) -> Placed<T> {
        Placed { body, isometry }
    }
}

impl<T: Support> Support for Placed<T> {
    /// Rotates `dir` by the inverse of the isometry's rotation, queries the body in its local
    /// frame, and maps the local support point back to world space.
    #[inline]
    fn support(&self, dir: DVec3) -> DVec3 {
        let Isometry {
            rotation,
            translation,
        } = self.isometry;
        translation + rotation * self.body.support(rotation.inverse() * dir)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::DQuat;

    use super::*;

    fn unit_cube(offset: DVec3) -> PointSet {
        let corners = (0..8).map(|i| {
            let corner = DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64);
            corner + offset
        });
        PointSet::new(corners).unwrap()
    }

    #[test]
    fn segment_support() {
        let seg = Segment::new(DVec3::ZERO, DVec3::X, 0.0, 1.0).unwrap();

        assert_eq!(seg.support(DVec3::X), seg.end());
        assert_eq!(seg.support(-DVec3::X), seg.start());
        // Zero dot product selects the start point.
        assert_eq!(seg.support(DVec3::Y), seg.start());
        assert_eq!(seg.support(DVec3::ZERO), seg.start());

        assert_eq!(seg.start(), DVec3::ZERO);
        assert_eq!(seg.end(), DVec3::X);
    }

    #[test]
    fn segment_interval() {
        let seg = Segment::new(DVec3::new(0.0, 2.0, 0.0), DVec3::Z, -1.0, 3.0).unwrap();

        assert_eq!(seg.start(), DVec3::new(0.0, 2.0, -1.0));
        assert_eq!(seg.end(), DVec3::new(0.0, 2.0, 3.0));
        assert_eq!(seg.at(0.5), DVec3::new(0.0, 2.0, 0.5));
        assert_eq!(seg.interval(), (-1.0, 3.0));

        let seg = Segment::from_endpoints(DVec3::ONE, DVec3::new(1.0, 1.0, 4.0)).unwrap();
        assert_eq!(seg.support(DVec3::Z), DVec3::new(1.0, 1.0, 4.0));
        assert_eq!(seg.support(-DVec3::Z), DVec3::ONE);
    }

    #[test]
    fn segment_errors() {
        assert_eq!(
            Segment::new(DVec3::ZERO, DVec3::ZERO, 0.0, 1.0),
            Err(BodyError::DegenerateSegment)
        );
        assert_eq!(
            Segment::from_endpoints(DVec3::ONE, DVec3::ONE),
            Err(BodyError::DegenerateSegment)
        );
        assert_eq!(
            Segment::new(DVec3::ZERO, DVec3::X, 2.0, 1.0),
            Err(BodyError::InvalidInterval { t1: 2.0, t2: 1.0 })
        );
        assert_eq!(
            Segment::new(DVec3::ZERO, DVec3::X, 0.0, f64::INFINITY),
            Err(BodyError::NonFinite)
        );
        assert_eq!(
            Segment::new(DVec3::splat(f64::NAN), DVec3::X, 0.0, 1.0),
            Err(BodyError::NonFinite)
        );
    }

    #[test]
    fn point_set_errors() {
        assert_eq!(PointSet::new(Vec::<DVec3>::new()), Err(BodyError::EmptyPointSet));
        assert_eq!(
            PointSet::new([DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 0.0)]),
            Err(BodyError::NonFinite)
        );
        assert_eq!(
            PointSet::with_anchor([DVec3::ZERO], DVec3::splat(f64::INFINITY)),
            Err(BodyError::NonFinite)
        );
    }

    #[test]
    fn point_set_support() {
        let cube = unit_cube(DVec3::ZERO);
        assert_eq!(cube.len(), 8);
        assert!(!cube.is_empty());

        assert_eq!(cube.support(DVec3::ONE), DVec3::ONE);
        assert_eq!(cube.support(-DVec3::ONE), DVec3::ZERO);
        assert_eq!(cube.support(DVec3::new(1.0, -1.0, 1.0)), DVec3::new(1.0, 0.0, 1.0));

        // Ties resolve to the lowest index.
        assert_eq!(cube.support(DVec3::X), DVec3::X);
        assert_eq!(cube.support(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn point_set_anchor() {
        let center = DVec3::splat(0.5);
        let tile = PointSet::with_anchor(unit_cube(DVec3::ZERO).points().to_vec(), center).unwrap();

        assert_eq!(tile.anchor(), Some(center));
        assert_eq!(tile.support(DVec3::ZERO), center);
        assert_eq!(tile.support(DVec3::ONE), DVec3::ONE);
    }

    #[test]
    fn point_support() {
        let p = DVec3::new(3.0, 4.0, 0.0);
        assert_eq!(p.support(DVec3::X), p);
        assert_eq!(p.support(DVec3::ZERO), p);
        assert_eq!(Body::from(p).support(-DVec3::Y), p);
    }

    #[test]
    fn body_dispatch() {
        let seg = Segment::from_endpoints(DVec3::ZERO, DVec3::Y).unwrap();
        let body = Body::from(seg);
        assert_eq!(body.support(DVec3::Y), DVec3::Y);

        let body = Body::from(unit_cube(DVec3::X));
        assert_eq!(body.support(DVec3::ONE), DVec3::new(2.0, 1.0, 1.0));

        let boxed: Box<dyn Support> = Box::new(body);
        assert_eq!(boxed.support(-DVec3::ONE), DVec3::X);
    }

    #[test]
    fn placed_support() {
        let local = PointSet::new([DVec3::X, -DVec3::X]).unwrap();
        let placed = Placed::new(
            &local,
            Isometry {
                rotation: DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
                translation: DVec3::new(0.0, 0.0, 5.0),
            },
        );

        assert_abs_diff_eq!(
            placed.support(DVec3::Y),
            DVec3::new(0.0, 1.0, 5.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            placed.support(-DVec3::Y),
            DVec3::new(0.0, -1.0, 5.0),
            epsilon = 1e-12
        );

        let moved = Placed::new(DVec3::ONE, Isometry::from_translation(DVec3::X));
        assert_eq!(moved.support(DVec3::Z), DVec3::new(2.0, 1.0, 1.0));
    }
}
