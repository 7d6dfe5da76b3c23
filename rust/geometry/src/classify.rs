// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-face classifier (spec §4.F): a tile-code (Cohen-Sutherland
//! style) crossing-number test against a face's boundary edges, returning
//! {inside, outside, on-boundary} and handling on-boundary, through-vertex,
//! and horizontal-edge degeneracies deterministically.

use cellcx_core::{recover_cycle, ChainOp, FaceRepr, VertexSet};

use crate::error::Result;

/// The classifier's three-valued result (design notes §9: an explicit enum,
/// never a string sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Inside,
    Outside,
    OnBoundary,
}

/// 4-bit tile code of `q` relative to the query point `p`: bit0 `q.y > p.y`,
/// bit1 `q.y < p.y`, bit2 `q.x > p.x`, bit3 `q.x < p.x`. Code 0 means `q`
/// coincides with `p` in both coordinates.
#[inline]
fn tile_code(p: (f64, f64), q: (f64, f64)) -> u8 {
    let mut code = 0u8;
    if q.1 > p.1 {
        code |= 1;
    }
    if q.1 < p.1 {
        code |= 2;
    }
    if q.0 > p.0 {
        code |= 4;
    }
    if q.0 < p.0 {
        code |= 8;
    }
    code
}

/// Explicit local state for the horizontal axis-grazing state machine:
/// `status` tracks which side (1 or 2) the in-progress graze entered from,
/// `count` is the running (possibly half-integer) crossing count.
fn crossing_test(new: u8, status: &mut u8, count: &mut f64) {
    if *status == 0 {
        *status = new;
        *count += 0.5;
    } else if *status == new {
        *count += 0.5;
    } else {
        *status = 0;
        *count -= 0.5;
    }
}

/// Classify `p` against an ordered list of boundary edges using the
/// tile-code crossing-number method (spec §4.F). Returns immediately on the
/// first edge that reports on-boundary; otherwise the final rounded count's
/// parity decides inside vs. outside.
pub fn classify_point_against_edges(p: (f64, f64), edges: &[((f64, f64), (f64, f64))]) -> Classification {
    let mut count = 0.0f64;
    let mut status = 0u8;

    for &(a, b) in edges {
        let c1 = tile_code(p, a);
        let c2 = tile_code(p, b);
        let c_edge = c1 ^ c2;
        let c_un = c1 | c2;
        let c_int = c1 & c2;

        match c_edge {
            0 if c_un == 0 => return Classification::OnBoundary,
            12 if c_un == c_edge => return Classification::OnBoundary,
            3 => {
                if c_int == 0 {
                    return Classification::OnBoundary;
                }
                if c_int == 4 {
                    count += 1.0;
                }
            }
            15 => {
                let (x1, y1) = a;
                let (x2, y2) = b;
                let x_int = x2 + (p.1 - y2) * (x1 - x2) / (y1 - y2);
                if x_int > p.0 {
                    count += 1.0;
                } else if x_int == p.0 {
                    return Classification::OnBoundary;
                }
            }
            13 | 14 => {
                if c1 == 4 || c2 == 4 {
                    let new = if c_edge == 13 { 1 } else { 2 };
                    crossing_test(new, &mut status, &mut count);
                }
            }
            7 => count += 1.0,
            11 => {}
            1 | 2 => {
                if c_int == 0 {
                    return Classification::OnBoundary;
                }
                if c_int == 4 {
                    let new = if c_edge == 1 { 1 } else { 2 };
                    crossing_test(new, &mut status, &mut count);
                }
            }
            4 | 8 => {
                if c_un == c_edge {
                    return Classification::OnBoundary;
                }
            }
            5 | 6 => {
                if c1 == 0 || c2 == 0 {
                    return Classification::OnBoundary;
                }
                let new = if c_edge == 5 { 1 } else { 2 };
                crossing_test(new, &mut status, &mut count);
            }
            9 | 10 => {
                if c1 == 0 || c2 == 0 {
                    return Classification::OnBoundary;
                }
            }
            _ => {}
        }
    }

    if (count.round() as i64).rem_euclid(2) != 0 {
        Classification::Inside
    } else {
        Classification::Outside
    }
}

/// Classify `point` against face `face_idx` of a complex, recovering the
/// face's boundary cycle via the signed-chain walk first.
pub fn classify_point(
    v: &VertexSet,
    copEV: &ChainOp,
    copFE: &ChainOp,
    face_idx: usize,
    point: (f64, f64),
) -> Result<Classification> {
    let cycle = recover_cycle(copEV, FaceRepr::SignedChain(copFE.row(face_idx)), face_idx)?;
    let n = cycle.len();
    let edges: Vec<((f64, f64), (f64, f64))> = (0..n)
        .map(|i| (v.xy(cycle[i]), v.xy(cycle[(i + 1) % n])))
        .collect();
    Ok(classify_point_against_edges(point, &edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_edges() -> Vec<((f64, f64), (f64, f64))> {
        let v = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        (0..4).map(|i| (v[i], v[(i + 1) % 4])).collect()
    }

    #[test]
    fn unit_square_classification_scenarios() {
        let edges = unit_square_edges();
        assert_eq!(classify_point_against_edges((0.5, 0.5), &edges), Classification::Inside);
        assert_eq!(classify_point_against_edges((1.5, 0.5), &edges), Classification::Outside);
        assert_eq!(classify_point_against_edges((1.0, 0.5), &edges), Classification::OnBoundary);
        assert_eq!(classify_point_against_edges((0.0, 0.0), &edges), Classification::OnBoundary);
    }

    #[test]
    fn classification_is_always_exactly_one_of_three() {
        let edges = unit_square_edges();
        for (x, y) in [(0.5, 0.5), (-1.0, -1.0), (2.0, 2.0), (0.5, 0.0), (0.5, 1.0)] {
            // trichotomy: classify_point_against_edges always returns, never panics.
            let _ = classify_point_against_edges((x, y), &edges);
        }
    }

    #[test]
    fn interior_point_stable_under_small_horizontal_translation() {
        let edges = unit_square_edges();
        let base = classify_point_against_edges((0.5, 0.5), &edges);
        let shifted = classify_point_against_edges((0.5 + 0.0137, 0.5), &edges);
        assert_eq!(base, shifted);
        assert_eq!(base, Classification::Inside);
    }

    #[test]
    fn exterior_point_stable_under_small_horizontal_translation() {
        let edges = unit_square_edges();
        let base = classify_point_against_edges((1.5, 0.5), &edges);
        let shifted = classify_point_against_edges((1.5 + 0.0137, 0.5), &edges);
        assert_eq!(base, shifted);
        assert_eq!(base, Classification::Outside);
    }
}
