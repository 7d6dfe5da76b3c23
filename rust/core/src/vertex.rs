// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The vertex set `V`: an ordered array of points, addressed by 0-based
//! index internally (spec §3's 1-based addressing is a file-format
//! convention, applied only at the mesh I/O boundary in `cellcx-geometry`).

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered set of vertex coordinates in 2D or 3D.
///
/// 2D vertex sets are stored with `z = 0.0` so every downstream routine can
/// operate on `Point3` uniformly; 2D-specific code reads back through
/// [`VertexSet::xy`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexSet(pub Vec<Point3<f64>>);

impl VertexSet {
    /// Build a vertex set from 3D coordinates.
    pub fn from_3d(points: impl IntoIterator<Item = (f64, f64, f64)>) -> Self {
        Self(
            points
                .into_iter()
                .map(|(x, y, z)| Point3::new(x, y, z))
                .collect(),
        )
    }

    /// Build a vertex set from 2D coordinates, with `z` fixed at zero.
    pub fn from_2d(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self(
            points
                .into_iter()
                .map(|(x, y)| Point3::new(x, y, 0.0))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Point3<f64> {
        self.0[i]
    }

    pub fn xy(&self, i: usize) -> (f64, f64) {
        let p = self.0[i];
        (p.x, p.y)
    }

    pub fn push(&mut self, p: Point3<f64>) {
        self.0.push(p);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.0.iter()
    }

    /// Vertically stack two vertex sets (used by `skel_merge`). Indices in
    /// the second set are offset by `self.len()` in the caller's incidence
    /// operators — this method performs no remapping itself.
    pub fn stacked(mut self, other: VertexSet) -> VertexSet {
        self.0.extend(other.0);
        self
    }
}

impl FromIterator<Point3<f64>> for VertexSet {
    fn from_iter<T: IntoIterator<Item = Point3<f64>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
