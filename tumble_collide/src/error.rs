// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Reasons a shape constructor rejects its input.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    /// A polygon was given fewer than 3 or more than `max` vertices.
    #[error("a polygon needs between 3 and {max} vertices, got {count}")]
    VertexCount {
        /// Number of vertices supplied.
        count: usize,
        /// Upper bound, [`MAX_POLYGON_VERTICES`](crate::MAX_POLYGON_VERTICES).
        max: usize,
    },
    /// Fewer than 3 vertices survived welding of near-duplicates.
    #[error("only {0} unique vertices remain after welding, need at least 3")]
    TooFewUniqueVertices(usize),
    /// The convex hull of the input is a point or a segment.
    #[error("the convex hull has {0} vertices, need at least 3")]
    TooFewHullVertices(usize),
    /// A hull edge has (numerically) zero length.
    #[error("hull edge {index} has zero length")]
    DegenerateEdge {
        /// Index of the edge's first vertex.
        index: usize,
    },
    /// The enclosed area is at or below [`EPSILON`](crate::EPSILON).
    #[error("enclosed area {0} is too small")]
    AreaTooSmall(f64),
    /// A closed chain was given fewer than 3 vertices.
    #[error("a loop needs at least 3 vertices, got {0}")]
    LoopTooShort(usize),
    /// An open chain was given fewer than 2 vertices.
    #[error("a chain needs at least 2 vertices, got {0}")]
    ChainTooShort(usize),
    /// Two consecutive chain vertices are within [`LINEAR_SLOP`](crate::LINEAR_SLOP).
    #[error("vertex {index} is too close to its predecessor")]
    VerticesTooClose {
        /// Index of the second vertex of the offending pair.
        index: usize,
    },
}
