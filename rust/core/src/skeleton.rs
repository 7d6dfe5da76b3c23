// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skeleton operations: block-diagonal merge of two 1- or 2-skeletons, and
//! edge deletion with dangling-vertex cleanup (spec §4.C).

use rustc_hash::FxHashSet;

use crate::chain::ChainOp;
use crate::vertex::VertexSet;

/// Merge two 1-skeletons (vertex set + `copEV`) by vertically stacking the
/// vertex sets and block-diagonally merging the incidence operators. No
/// vertex deduplication is performed — that is the job of a dedicated
/// vertex-merge sweep (spec §3, §4.H), never pairwise union.
pub fn skel_merge_1(v1: VertexSet, ev1: ChainOp, v2: VertexSet, ev2: ChainOp) -> (VertexSet, ChainOp) {
    let merged_ev = ev1.block_diag(&ev2);
    let merged_v = v1.stacked(v2);
    (merged_v, merged_ev)
}

/// Merge two 2-skeletons (vertex set + `copEV` + `copFE`).
pub fn skel_merge_2(
    v1: VertexSet,
    ev1: ChainOp,
    fe1: ChainOp,
    v2: VertexSet,
    ev2: ChainOp,
    fe2: ChainOp,
) -> (VertexSet, ChainOp, ChainOp) {
    let merged_ev = ev1.block_diag(&ev2);
    let merged_fe = fe1.block_diag(&fe2);
    let merged_v = v1.stacked(v2);
    (merged_v, merged_ev, merged_fe)
}

/// Drop the edges at `todel`, then drop any vertex (and its `V` row) that
/// has become incident to no remaining edge.
pub fn delete_edges(todel: &[usize], v: &VertexSet, copEV: &ChainOp) -> (VertexSet, ChainOp) {
    let todel_set: FxHashSet<usize> = todel.iter().copied().collect();
    let keep_rows: Vec<usize> = (0..copEV.rows()).filter(|r| !todel_set.contains(r)).collect();
    let trimmed = copEV.select_rows(&keep_rows);

    let keep_cols = trimmed.nonempty_cols();
    let new_ev = trimmed.select_cols(&keep_cols);
    let new_v = VertexSet(keep_cols.iter().map(|&c| v.get(c)).collect());
    (new_v, new_ev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::build_copEV;

    #[test]
    fn skel_merge_shifts_second_skeleton_indices() {
        let v1 = VertexSet::from_2d([(0.0, 0.0), (1.0, 0.0)]);
        let ev1 = build_copEV(&[(0, 1)], true);
        let v2 = VertexSet::from_2d([(2.0, 0.0), (3.0, 0.0)]);
        let ev2 = build_copEV(&[(0, 1)], true);

        let (v, ev) = skel_merge_1(v1, ev1, v2, ev2);
        assert_eq!(v.len(), 4);
        assert_eq!(ev.rows(), 2);
        assert_eq!(ev.row(1), &[(2, -1), (3, 1)]);
    }

    #[test]
    fn delete_edges_drops_dangling_vertex() {
        // path 0-1-2; deleting edge 1 (1,2) leaves vertex 2 dangling.
        let v = VertexSet::from_2d([(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let ev = build_copEV(&[(0, 1), (1, 2)], true);
        let (new_v, new_ev) = delete_edges(&[1], &v, &ev);
        assert_eq!(new_v.len(), 2);
        assert_eq!(new_ev.rows(), 1);
        assert_eq!(new_ev.cols(), 2);
    }
}
