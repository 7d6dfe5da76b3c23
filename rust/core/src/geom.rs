// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry primitives shared by every layer: bounding boxes, tolerant vertex
//! equality, and signed triangle area.

use nalgebra::Point3;

/// Absolute per-coordinate tolerance used for all vertex-equality checks in
/// this crate and in `cellcx-geometry`.
pub const EPSILON: f64 = 1e-8;

/// Axis-aligned bounding box, stored as (min, max) corners.
pub type Bbox = (Point3<f64>, Point3<f64>);

/// Per-axis min/max reduction over a set of points.
///
/// Returns `None` for an empty input — there is no box to report.
pub fn bbox(points: &[Point3<f64>]) -> Option<Bbox> {
    let first = *points.first()?;
    let (min, max) = points.iter().skip(1).fold((first, first), |(min, max), p| {
        (
            Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    });
    Some((min, max))
}

/// Componentwise containment: `outer.min <= inner.min <= inner.max <= outer.max`.
pub fn bbox_contains(outer: &Bbox, inner: &Bbox) -> bool {
    let (o_min, o_max) = outer;
    let (i_min, i_max) = inner;
    o_min.x <= i_min.x
        && o_min.y <= i_min.y
        && o_min.z <= i_min.z
        && i_min.x <= i_max.x
        && i_min.y <= i_max.y
        && i_min.z <= i_max.z
        && i_max.x <= o_max.x
        && i_max.y <= o_max.y
        && i_max.z <= o_max.z
}

/// Signed area of the triangle (p1, p2, p3), i.e. half the determinant of the
/// 3x3 matrix whose rows are `(x_i, y_i, 1)`. Positive for counter-clockwise
/// winding. Only the x/y coordinates are used — callers triangulating planar
/// faces project to 2D first.
#[inline]
pub fn triangle_area(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> f64 {
    0.5 * ((p2.0 - p1.0) * (p3.1 - p1.1) - (p3.0 - p1.0) * (p2.1 - p1.1))
}

/// Coordinate-wise equality within `EPSILON` on every axis.
#[inline]
pub fn vequals(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON && (a.z - b.z).abs() < EPSILON
}

/// Index of the first point in `set` equal to `v` within `EPSILON`, if any.
///
/// Tolerant equality is not transitive, so this is a single linear scan
/// against the existing set rather than a pairwise union — the same
/// constraint spec §3 places on the vertex-merge sweep.
pub fn vin(v: &Point3<f64>, set: &[Point3<f64>]) -> Option<usize> {
    set.iter().position(|p| vequals(p, v))
}
