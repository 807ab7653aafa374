//! Error types for body construction.

/// Errors that can occur when constructing a convex body.
///
/// Queries on a successfully constructed body never fail; every geometric
/// precondition is checked here instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BodyError {
    /// A point set must contain at least one point.
    #[error("point set must contain at least one point")]
    EmptyPointSet,

    /// A segment's direction vector has zero length.
    #[error("segment direction must have nonzero length")]
    DegenerateSegment,

    /// A segment's parameter interval is reversed.
    #[error("segment interval is reversed: t1 = {t1}, t2 = {t2}")]
    InvalidInterval {
        /// Parameter of the start point.
        t1: f64,
        /// Parameter of the end point.
        t2: f64,
    },

    /// An input coordinate or parameter is NaN or infinite.
    #[error("body input is not finite")]
    NonFinite,
}
