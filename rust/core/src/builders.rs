// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sparse incidence builders: constructing `copEV`/`copFE` from cell lists,
//! and converting between list-of-lists cell representations and sparse
//! operators (spec §4.B).

use rustc_hash::FxHashMap;

use crate::chain::ChainOp;
use crate::cycle::recover_cycle_vertex_list;
use crate::error::{Error, Result};

/// Build the vertex/edge incidence operator from a list of edges.
///
/// For edge `(a, b)` the endpoints are sorted; when `signed` the column of
/// the lower index holds `-1` and the higher holds `+1`, otherwise both
/// columns hold `+1`. Row count is `|EV|`; column count is one past the
/// largest vertex index referenced.
pub fn build_copEV(ev: &[(usize, usize)], signed: bool) -> ChainOp {
    let cols = ev
        .iter()
        .flat_map(|&(a, b)| [a, b])
        .max()
        .map_or(0, |m| m + 1);
    let mut op = ChainOp::new(ev.len(), cols);
    for (i, &(a, b)) in ev.iter().enumerate() {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if signed {
            op.set(i, lo, -1);
            op.set(i, hi, 1);
        } else {
            op.set(i, lo, 1);
            op.set(i, hi, 1);
        }
    }
    op
}

/// Map from a sorted `(low, high)` vertex pair to the row of `copEV` that
/// represents that edge.
fn edge_lookup(copEV: &ChainOp) -> FxHashMap<(usize, usize), usize> {
    let mut map = FxHashMap::default();
    for e in 0..copEV.rows() {
        let row = copEV.row(e);
        if row.len() == 2 {
            let (a, b) = (row[0].0, row[1].0);
            map.insert(if a < b { (a, b) } else { (b, a) }, e);
        }
    }
    map
}

/// Build the edge/face incidence operator. Each face is an ordered vertex
/// cycle; for every consecutive pair (wrapping last to first) the canonical
/// sorted edge is looked up in `copEV` and signed `+1` if the face walks it
/// low-to-high, `-1` otherwise. Fails with [`Error::MalformedComplex`] if a
/// required edge is absent.
pub fn build_copFE(fv: &[Vec<usize>], copEV: &ChainOp) -> Result<ChainOp> {
    let lookup = edge_lookup(copEV);
    let mut op = ChainOp::new(fv.len(), copEV.rows());
    for (f, verts) in fv.iter().enumerate() {
        let n = verts.len();
        if n < 2 {
            return Err(Error::MalformedComplex {
                face: f,
                reason: "face has fewer than two vertices".to_string(),
            });
        }
        for i in 0..n {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            let key = if a < b { (a, b) } else { (b, a) };
            let e = *lookup.get(&key).ok_or_else(|| Error::MalformedComplex {
                face: f,
                reason: format!("edge ({a}, {b}) is absent from copEV"),
            })?;
            let sign: i8 = if b > a { 1 } else { -1 };
            op.set(f, e, sign);
        }
    }
    Ok(op)
}

/// Build `(copEV, copFE)` from raw edge and face-vertex cell lists.
///
/// Recovers each face's ordered boundary cycle with the unsigned walk
/// (variant 2, spec §4.D) before calling [`build_copFE`], so the input face
/// vertex lists need only enumerate the face's vertices — not necessarily in
/// cycle order.
pub fn build_cops(ev: &[(usize, usize)], fv: &[Vec<usize>]) -> Result<(ChainOp, ChainOp)> {
    let cop_ev = build_copEV(ev, true);
    let mut ordered_fv = Vec::with_capacity(fv.len());
    for (f, face) in fv.iter().enumerate() {
        ordered_fv.push(recover_cycle_vertex_list(&cop_ev, face, f)?);
    }
    let cop_fe = build_copFE(&ordered_fv, &cop_ev)?;
    Ok((cop_ev, cop_fe))
}

/// Unsigned conversion from a list-of-lists cell representation.
pub fn lar2cop(cells: &[Vec<usize>], cols: usize) -> ChainOp {
    ChainOp::from_cells_unsigned(cells, cols)
}

/// Unsigned conversion back to a list-of-lists cell representation, ignoring
/// sign. Mutual inverse of [`lar2cop`] up to row/column ordering.
pub fn cop2lar(op: &ChainOp) -> Vec<Vec<usize>> {
    op.to_cells()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_square_copEV_signs() {
        let ev = build_copEV(&[(0, 1), (1, 2), (2, 3), (3, 0)], true);
        assert_eq!(ev.rows(), 4);
        assert_eq!(ev.cols(), 4);
        assert_eq!(ev.get(0, 0), -1);
        assert_eq!(ev.get(0, 1), 1);
        assert_eq!(ev.get(3, 0), 1);
        assert_eq!(ev.get(3, 3), -1);
    }

    #[test]
    fn unit_square_copFE_signs() {
        let (ev, fe) = build_cops(&[(0, 1), (1, 2), (2, 3), (3, 0)], &[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(fe.rows(), 1);
        assert_eq!(fe.cols(), ev.rows());
        // canonical edge order is (0,1),(1,2),(2,3),(0,3); the face walks the
        // first three low->high (+1) and the last one high->low (-1).
        assert_eq!(fe.row(0).iter().map(|&(_, s)| s).collect::<Vec<_>>(), vec![1, 1, 1, -1]);
    }

    #[test]
    fn missing_edge_is_malformed_complex() {
        let ev = build_copEV(&[(0, 1), (1, 2)], true);
        let err = build_copFE(&[vec![0, 1, 2]], &ev).unwrap_err();
        assert!(matches!(err, Error::MalformedComplex { face: 0, .. }));
    }

    #[test]
    fn lar_cop_are_mutual_inverses() {
        let cells = vec![vec![0, 2], vec![1, 3]];
        let op = lar2cop(&cells, 4);
        assert_eq!(cop2lar(&op), cells);
    }
}
