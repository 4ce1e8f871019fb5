// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by tree queries.

use thiserror::Error;

/// Error returned by [`DynamicTree::ray_cast`](crate::DynamicTree::ray_cast).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The ray's start and end points coincide, so it has no direction.
    #[error("cannot cast a ray of zero length")]
    ZeroLengthRay,
}
