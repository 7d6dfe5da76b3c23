// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face triangulator (spec §4.E): recover a face's ordered boundary,
//! project it to its own plane, triangulate, and repair orientation from
//! signed planar area.

use cellcx_core::geom::triangle_area;
use cellcx_core::{recover_cycle, ChainOp, FaceRepr, VertexSet};
use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};

/// The constrained-triangulation primitive this library treats as an
/// external collaborator (spec §6): given a simple planar polygon as 2D
/// points labeled by their original vertex indices, plus the boundary
/// edges as constraints, return triangles as triples of those labels.
pub trait ConstrainedTriangulator {
    fn triangulate(
        &self,
        points: &[Point2<f64>],
        labels: &[usize],
        constraints: &[(usize, usize)],
    ) -> Result<Vec<[usize; 3]>>;
}

/// Default triangulator, backed by `earcutr`. Treats the supplied boundary
/// as the polygon to ear-clip; since the polygon itself is the only
/// constraint this library's faces carry, its edges are present in the
/// output by construction and `constraints` is not consulted further.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarcutTriangulator;

impl ConstrainedTriangulator for EarcutTriangulator {
    fn triangulate(
        &self,
        points: &[Point2<f64>],
        labels: &[usize],
        _constraints: &[(usize, usize)],
    ) -> Result<Vec<[usize; 3]>> {
        let mut flat = Vec::with_capacity(points.len() * 2);
        for p in points {
            flat.push(p.x);
            flat.push(p.y);
        }
        let indices = earcutr::earcut(&flat, &[], 2).map_err(|e| Error::TriangulationError {
            face: usize::MAX,
            reason: format!("{e:?}"),
        })?;
        Ok(indices
            .chunks_exact(3)
            .map(|t| [labels[t[0]], labels[t[1]], labels[t[2]]])
            .collect())
    }
}

/// Sum of signed fan-triangle areas `(v0, vi, vi+1)` over an already-ordered
/// planar polygon.
fn fan_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let v0 = points[0];
    (1..points.len() - 1)
        .map(|i| triangle_area(v0, points[i], points[i + 1]))
        .sum()
}

/// `face_area(V, copEV, face)`: reconstruct the face's boundary cycle from
/// `copFE`'s signed row and sum the fan-triangle areas of `V`'s own x/y
/// coordinates. Sign reveals orientation; used directly for already-planar
/// complexes and, rotated into a face's own plane, inside
/// [`triangulate_face`].
pub fn face_area(v: &VertexSet, copEV: &ChainOp, copFE: &ChainOp, face_idx: usize) -> Result<f64> {
    let cycle = recover_cycle(copEV, FaceRepr::SignedChain(copFE.row(face_idx)), face_idx)?;
    let points: Vec<(f64, f64)> = cycle.iter().map(|&i| v.xy(i)).collect();
    Ok(fan_area(&points))
}

/// The cross product of any two non-parallel in-plane vectors lies along the
/// face's normal axis, but its sign depends on which two vertices happened to
/// produce it — i.e. on the traversal, not the plane. Forcing the dominant
/// axis component non-negative picks one of the two normal directions by a
/// rule that depends only on the plane, so the same face gets the same `v3`
/// regardless of which vertex order it's walked in.
fn canonicalize_normal(v3: Vector3<f64>) -> Vector3<f64> {
    let (ax, ay, az) = (v3.x.abs(), v3.y.abs(), v3.z.abs());
    let dominant = if az >= ax && az >= ay {
        v3.z
    } else if ay >= ax {
        v3.y
    } else {
        v3.x
    };
    if dominant < 0.0 {
        -v3
    } else {
        v3
    }
}

/// Build an orthonormal basis on the face's plane: `v1` along the first
/// edge, `v2`/`v3` found by scanning further vertices until a non-parallel
/// direction yields a stable cross product (spec §4.E step 3), with the
/// normal's sign canonicalized so the projected winding reflects the face's
/// own traversal direction instead of an artifact of which vertex produced
/// the basis.
fn build_basis(vs: &[Point3<f64>], face_idx: usize) -> Result<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
    if vs.len() < 3 {
        return Err(Error::DegenerateGeometry {
            face: face_idx,
            reason: "face has fewer than three vertices".to_string(),
        });
    }
    let origin = vs[0];
    let v1 = (vs[1] - origin).normalize();
    for candidate_vertex in vs.iter().skip(2) {
        let candidate = (candidate_vertex - origin).normalize();
        let v3_candidate = v1.cross(&candidate);
        let norm = v3_candidate.norm();
        if norm > 1e-8 {
            let v3 = canonicalize_normal(v3_candidate / norm);
            let v2 = v3.cross(&v1);
            return Ok((v1, v2, v3));
        }
    }
    Err(Error::DegenerateGeometry {
        face: face_idx,
        reason: "all candidate planar-basis vectors are parallel: face is collinear".to_string(),
    })
}

/// Triangulate face `face_idx` of a 3D complex (spec §4.E).
///
/// 1. Recovers the ordered cycle via the signed-chain walk (variant 1).
/// 2. Gathers the face's vertex coordinates.
/// 3. Builds an orthonormal planar basis.
/// 4. Rotates the face into that plane and drops the (zero) third axis.
/// 5. Builds the boundary-edge constraint list.
/// 6. Invokes the constrained-triangulation collaborator.
/// 7. Reverses triangles if the rotated-plane signed area came out negative.
pub fn triangulate_face(
    v: &VertexSet,
    copEV: &ChainOp,
    copFE: &ChainOp,
    face_idx: usize,
    triangulator: &dyn ConstrainedTriangulator,
) -> Result<Vec<[usize; 3]>> {
    let span = tracing::debug_span!("triangulate_face", face = face_idx);
    let _enter = span.enter();

    let fv = recover_cycle(copEV, FaceRepr::SignedChain(copFE.row(face_idx)), face_idx)?;
    let vs: Vec<Point3<f64>> = fv.iter().map(|&i| v.get(i)).collect();

    let (v1, v2, _v3) = build_basis(&vs, face_idx)?;
    let origin = vs[0];
    let points2d: Vec<Point2<f64>> = vs
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&v1), d.dot(&v2))
        })
        .collect();

    let n = fv.len();
    let constraints: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();

    let mut triangles = triangulator
        .triangulate(&points2d, &fv, &constraints)
        .map_err(|e| match e {
            Error::TriangulationError { reason, .. } => Error::TriangulationError {
                face: face_idx,
                reason,
            },
            other => other,
        })?;

    let flat: Vec<(f64, f64)> = points2d.iter().map(|p| (p.x, p.y)).collect();
    if fan_area(&flat) < 0.0 {
        for tri in triangles.iter_mut() {
            tri.swap(0, 1);
        }
    }

    tracing::debug!(triangle_count = triangles.len(), "face triangulated");
    Ok(triangles)
}
