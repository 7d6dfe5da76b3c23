// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 3D spatial-arrangement orchestrator (spec §4.H, §5): drives
//! per-face fragmentation across a caller-provided collaborator, merges
//! the fragments' vertex sets and operators, deduplicates vertices within
//! tolerance, and invokes a caller-provided 3-cycle extractor to recover
//! `copCF`.
//!
//! Fan-out across `frag_face` calls is the one place this crate is not
//! single-threaded: a producer feeds face indices through a bounded
//! rendezvous channel (capacity 0, so send and receive pair up directly),
//! a fixed worker pool drains it and reports fragments on a second
//! channel, and a sentinel value per worker signals shutdown. Ordering of
//! arrival is not observable in the output: the final vertex-merge sweep
//! renumbers everything by lexicographic coordinate order regardless of
//! which worker produced which fragment first.

use rustc_hash::FxHashMap;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use cellcx_core::geom::vequals;
use cellcx_core::{ChainOp, VertexSet};
use nalgebra::Point3;

use crate::error::{Error, Result};

/// Maps each face to the set of candidate neighbor faces it should be
/// fragmented against (spec §6 `spatial_index`).
pub trait SpatialIndex: Sync {
    fn candidates(&self, v: &VertexSet, copEV: &ChainOp, copFE: &ChainOp) -> Result<Vec<Vec<usize>>>;
}

/// One face's fragmentation result: a local vertex set and operators to be
/// block-diagonal-merged into the arrangement's accumulators.
pub struct FragmentResult {
    pub vertices: VertexSet,
    pub cop_ev: ChainOp,
    pub cop_fe: ChainOp,
}

/// Fragments a face against its candidate neighbors (spec §6 `frag_face`).
/// Implementations must be safe to call concurrently from multiple
/// worker threads — `arrange_3d` fans these calls out across a fixed pool.
pub trait FaceFragmenter: Sync {
    fn frag_face(
        &self,
        v: &VertexSet,
        copEV: &ChainOp,
        copFE: &ChainOp,
        neighbors: &[usize],
        face: usize,
    ) -> Result<FragmentResult>;
}

/// Deduplicates vertices within tolerance after all fragments are merged
/// (spec §6 `merge_vertices`). The tolerance sweep is not transitive
/// (spec §3), so the default implementation performs a single
/// lexicographic-order sweep rather than pairwise union.
pub trait VertexMerger {
    fn merge_vertices(&self, v: VertexSet, copEV: ChainOp, copFE: ChainOp) -> Result<(VertexSet, ChainOp, ChainOp)> {
        epsilon_merge_vertices(v, copEV, copFE)
    }
}

/// Default [`VertexMerger`]: a single lexicographic-order sweep with
/// tolerance `ε = 10⁻⁸` (spec §4.H step 4).
#[derive(Debug, Default, Clone, Copy)]
pub struct EpsilonVertexMerger;

impl VertexMerger for EpsilonVertexMerger {}

/// Computes `copCF` from the merged, deduplicated operators (spec §6
/// `minimal_3cycles`).
pub trait CycleExtractor3: Sync {
    fn minimal_3cycles(&self, v: &VertexSet, copEV: &ChainOp, copFE: &ChainOp) -> Result<ChainOp>;
}

/// Remap `op`'s columns through `remap`, combining entries that land on the
/// same new column (e.g. two edge endpoints merging to the same vertex)
/// and dropping any that cancel to zero.
fn remap_cols(op: &ChainOp, remap: &[usize], new_cols: usize) -> ChainOp {
    let mut out = ChainOp::new(op.rows(), new_cols);
    for r in 0..op.rows() {
        let mut acc: FxHashMap<usize, i64> = FxHashMap::default();
        for &(c, s) in op.row(r) {
            *acc.entry(remap[c]).or_insert(0) += s as i64;
        }
        for (c, v) in acc {
            if v != 0 {
                out.set(r, c, v.clamp(-127, 127) as i8);
            }
        }
    }
    out
}

/// Sweep the vertex set in lexicographic coordinate order, merging any
/// vertex within `ε` of the current cluster's anchor into that cluster.
/// Because the comparison is always against the cluster's first member
/// rather than pairwise against every prior vertex, this is the single
/// sweep spec §3 requires in place of transitive pairwise union.
fn epsilon_merge_vertices(v: VertexSet, copEV: ChainOp, copFE: ChainOp) -> Result<(VertexSet, ChainOp, ChainOp)> {
    let n = v.len();
    if n == 0 {
        return Ok((v, copEV, copFE));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let pa = v.get(a);
        let pb = v.get(b);
        (pa.x, pa.y, pa.z)
            .partial_cmp(&(pb.x, pb.y, pb.z))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut remap = vec![0usize; n];
    let mut new_points: Vec<Point3<f64>> = Vec::new();
    let mut anchor: Option<Point3<f64>> = None;
    for &i in &order {
        let p = v.get(i);
        let same_cluster = anchor.map(|a| vequals(&a, &p)).unwrap_or(false);
        if !same_cluster {
            new_points.push(p);
            anchor = Some(p);
        }
        remap[i] = new_points.len() - 1;
    }
    let new_v: VertexSet = new_points.into_iter().collect();

    let remapped_ev = remap_cols(&copEV, &remap, new_v.len());
    let (deduped_ev, deduped_fe) = dedup_edge_rows(remapped_ev, copFE);
    Ok((new_v, deduped_ev, deduped_fe))
}

/// Merge duplicate rows of `copEV` (edges sharing the same vertex pair
/// after vertex merging) and drop rows that collapsed to zero-length
/// edges, remapping `copFE`'s columns to match.
fn dedup_edge_rows(ev: ChainOp, fe: ChainOp) -> (ChainOp, ChainOp) {
    let mut row_key_to_new: FxHashMap<Vec<(usize, i8)>, usize> = FxHashMap::default();
    let mut new_rows: Vec<Vec<(usize, i8)>> = Vec::new();
    let mut old_to_new = vec![usize::MAX; ev.rows()];

    for r in 0..ev.rows() {
        let row = ev.row(r).to_vec();
        if row.is_empty() {
            continue;
        }
        match row_key_to_new.get(&row) {
            Some(&idx) => old_to_new[r] = idx,
            None => {
                let idx = new_rows.len();
                old_to_new[r] = idx;
                row_key_to_new.insert(row.clone(), idx);
                new_rows.push(row);
            }
        }
    }

    let mut new_ev = ChainOp::new(new_rows.len(), ev.cols());
    for (r, entries) in new_rows.into_iter().enumerate() {
        for (c, s) in entries {
            new_ev.set(r, c, s);
        }
    }

    let mut new_fe = ChainOp::new(fe.rows(), new_ev.rows());
    for f in 0..fe.rows() {
        let mut acc: FxHashMap<usize, i64> = FxHashMap::default();
        for &(c, s) in fe.row(f) {
            let nc = old_to_new[c];
            if nc == usize::MAX {
                continue;
            }
            *acc.entry(nc).or_insert(0) += s as i64;
        }
        for (c, v) in acc {
            if v != 0 {
                new_fe.set(f, c, v.clamp(-127, 127) as i8);
            }
        }
    }

    (new_ev, new_fe)
}

/// Drive the 3D spatial arrangement (spec §4.H).
///
/// 1. Obtain per-face candidate neighbors from `spatial_index`.
/// 2. Fan `fragmenter.frag_face` out across a fixed worker pool sized from
///    `rayon::current_num_threads()`, feeding face indices through a
///    capacity-0 rendezvous channel and draining fragments from a second
///    channel in arrival order (spec §5).
/// 3. Block-diagonal-merge every fragment's vertex set and operators.
/// 4. Deduplicate vertices within tolerance via `merger`.
/// 5. Invoke `cycle_extractor` to compute `copCF`.
pub fn arrange_3d(
    v: &VertexSet,
    copEV: &ChainOp,
    copFE: &ChainOp,
    spatial_index: &dyn SpatialIndex,
    fragmenter: &dyn FaceFragmenter,
    merger: &dyn VertexMerger,
    cycle_extractor: &dyn CycleExtractor3,
) -> Result<(VertexSet, ChainOp, ChainOp, ChainOp)> {
    let span = tracing::info_span!("arrange_3d", faces = copFE.rows());
    let _enter = span.enter();

    let neighbors = spatial_index.candidates(v, copEV, copFE)?;
    let num_faces = copFE.rows();

    let fragments = fragment_all_faces(v, copEV, copFE, &neighbors, fragmenter, num_faces)?;

    let mut acc_v = VertexSet::default();
    let mut acc_ev = ChainOp::new(0, 0);
    let mut acc_fe = ChainOp::new(0, 0);
    for fragment in fragments {
        acc_v = acc_v.stacked(fragment.vertices);
        acc_ev = acc_ev.block_diag(&fragment.cop_ev);
        acc_fe = acc_fe.block_diag(&fragment.cop_fe);
    }

    let (merged_v, merged_ev, merged_fe) = merger.merge_vertices(acc_v, acc_ev, acc_fe)?;
    let cop_cf = cycle_extractor.minimal_3cycles(&merged_v, &merged_ev, &merged_fe)?;

    tracing::debug!(
        vertices = merged_v.len(),
        faces = merged_fe.rows(),
        cells = cop_cf.rows(),
        "spatial arrangement complete"
    );
    Ok((merged_v, merged_ev, merged_fe, cop_cf))
}

/// The bounded-channel producer/worker-pool/consumer pipeline of spec §5.
fn fragment_all_faces(
    v: &VertexSet,
    copEV: &ChainOp,
    copFE: &ChainOp,
    neighbors: &[Vec<usize>],
    fragmenter: &dyn FaceFragmenter,
    num_faces: usize,
) -> Result<Vec<FragmentResult>> {
    if num_faces == 0 {
        return Ok(Vec::new());
    }

    let worker_count = rayon::current_num_threads().max(1).min(num_faces);
    let (tx_work, rx_work) = mpsc::sync_channel::<isize>(0);
    let (tx_result, rx_result) = mpsc::sync_channel::<Result<FragmentResult>>(0);
    let rx_work = Mutex::new(rx_work);

    thread::scope(|scope| -> Result<Vec<FragmentResult>> {
        for _ in 0..worker_count {
            let rx_work = &rx_work;
            let tx_result = tx_result.clone();
            scope.spawn(move || loop {
                let job = rx_work.lock().expect("work channel mutex poisoned").recv();
                let sigma = match job {
                    Ok(s) if s >= 0 => s as usize,
                    _ => break,
                };
                let result = fragmenter.frag_face(v, copEV, copFE, &neighbors[sigma], sigma);
                if tx_result.send(result).is_err() {
                    break;
                }
            });
        }
        drop(tx_result);

        scope.spawn(move || {
            for sigma in 0..num_faces {
                if tx_work.send(sigma as isize).is_err() {
                    break;
                }
            }
            // One sentinel per worker: each worker's loop exits on its own -1.
            for _ in 0..worker_count {
                let _ = tx_work.send(-1);
            }
        });

        // Fragmentation runs to completion with no cancellation (spec §5); a
        // failing face is fatal to the arrangement but does not shrink the
        // drain count. Always receiving exactly `num_faces` results, instead
        // of short-circuiting with `?` on the first error, guarantees every
        // worker's `tx_result.send` and the producer's `tx_work.send` find a
        // receiver: short-circuiting here would leave them blocked on the
        // capacity-0 channels and hang `thread::scope`'s join forever.
        let mut collected = Vec::with_capacity(num_faces);
        let mut first_err: Option<Error> = None;
        for _ in 0..num_faces {
            match rx_result.recv() {
                Ok(Ok(fragment)) => collected.push(fragment),
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(_) => {
                    first_err.get_or_insert(Error::CollaboratorError {
                        collaborator: "frag_face",
                        reason: "a worker terminated before producing its result".to_string(),
                    });
                }
            };
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(collected),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcx_core::build_cops;

    struct AllPairsIndex;
    impl SpatialIndex for AllPairsIndex {
        fn candidates(&self, _v: &VertexSet, _copEV: &ChainOp, copFE: &ChainOp) -> Result<Vec<Vec<usize>>> {
            let n = copFE.rows();
            Ok((0..n).map(|f| (0..n).filter(|&g| g != f).collect()).collect())
        }
    }

    /// A fragmenter that performs no actual fragmentation: it returns each
    /// face's own single-face slice of V/copEV/copFE unchanged.
    struct IdentityFragmenter;
    impl FaceFragmenter for IdentityFragmenter {
        fn frag_face(
            &self,
            v: &VertexSet,
            copEV: &ChainOp,
            copFE: &ChainOp,
            _neighbors: &[usize],
            face: usize,
        ) -> Result<FragmentResult> {
            let row = copFE.row(face);
            let mut local_verts = Vec::new();
            let mut vertex_remap = FxHashMap::default();
            for &(edge, _) in row {
                for &(vert, _) in copEV.row(edge) {
                    vertex_remap.entry(vert).or_insert_with(|| {
                        local_verts.push(v.get(vert));
                        local_verts.len() - 1
                    });
                }
            }
            let vertices: VertexSet = local_verts.into_iter().collect();
            let mut cop_ev = ChainOp::new(row.len(), vertices.len());
            let mut edge_remap = FxHashMap::default();
            for (local_e, &(edge, _)) in row.iter().enumerate() {
                edge_remap.insert(edge, local_e);
                for &(vert, sign) in copEV.row(edge) {
                    cop_ev.set(local_e, vertex_remap[&vert], sign);
                }
            }
            let mut cop_fe = ChainOp::new(1, row.len());
            for &(edge, sign) in row {
                cop_fe.set(0, edge_remap[&edge], sign);
            }
            Ok(FragmentResult { vertices, cop_ev, cop_fe })
        }
    }

    struct StubCycleExtractor;
    impl CycleExtractor3 for StubCycleExtractor {
        fn minimal_3cycles(&self, _v: &VertexSet, _copEV: &ChainOp, copFE: &ChainOp) -> Result<ChainOp> {
            let mut op = ChainOp::new(1, copFE.rows());
            for f in 0..copFE.rows() {
                op.set(0, f, 1);
            }
            Ok(op)
        }
    }

    #[test]
    fn arrange_3d_round_trips_a_single_triangle() {
        let v = VertexSet::from_3d([(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let (ev, fe) = build_cops(&[(0, 1), (1, 2), (2, 0)], &[vec![0, 1, 2]]).unwrap();

        let (merged_v, merged_ev, merged_fe, cop_cf) =
            arrange_3d(&v, &ev, &fe, &AllPairsIndex, &IdentityFragmenter, &EpsilonVertexMerger, &StubCycleExtractor)
                .unwrap();

        assert_eq!(merged_v.len(), 3);
        assert_eq!(merged_ev.rows(), 3);
        assert_eq!(merged_fe.rows(), 1);
        assert_eq!(cop_cf.rows(), 1);
    }

    #[test]
    fn epsilon_merge_deduplicates_coincident_vertices() {
        // Two disjoint "fragments" of the same unit-square edge sharing
        // vertex (1,0) at two independently-numbered indices.
        let v = VertexSet::from_3d([(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        let ev = {
            let mut op = ChainOp::new(2, 4);
            op.set(0, 0, -1);
            op.set(0, 1, 1);
            op.set(1, 2, -1);
            op.set(1, 3, 1);
            op
        };
        let fe = ChainOp::new(0, 2);

        let (merged_v, merged_ev, _merged_fe) = epsilon_merge_vertices(v, ev, fe).unwrap();
        assert_eq!(merged_v.len(), 3);
        assert_eq!(merged_ev.rows(), 2);
    }

    #[test]
    fn merge_result_is_independent_of_worker_count() {
        let v = VertexSet::from_3d([(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let (ev, fe) = build_cops(&[(0, 1), (1, 2), (2, 0)], &[vec![0, 1, 2]]).unwrap();

        let run = || {
            arrange_3d(&v, &ev, &fe, &AllPairsIndex, &IdentityFragmenter, &EpsilonVertexMerger, &StubCycleExtractor)
                .unwrap()
        };
        let (v1, ev1, fe1, cf1) = run();
        let (v2, ev2, fe2, cf2) = run();
        assert_eq!(v1.len(), v2.len());
        assert_eq!(ev1.to_cells_signed(), ev2.to_cells_signed());
        assert_eq!(fe1.to_cells_signed(), fe2.to_cells_signed());
        assert_eq!(cf1.to_cells_signed(), cf2.to_cells_signed());
    }

    /// A fragmenter that fails a single face, delegating every other face to
    /// `IdentityFragmenter`.
    struct FailingFragmenter {
        failing_face: usize,
    }
    impl FaceFragmenter for FailingFragmenter {
        fn frag_face(
            &self,
            v: &VertexSet,
            copEV: &ChainOp,
            copFE: &ChainOp,
            neighbors: &[usize],
            face: usize,
        ) -> Result<FragmentResult> {
            if face == self.failing_face {
                return Err(Error::CollaboratorError {
                    collaborator: "frag_face",
                    reason: "synthetic failure for test coverage".to_string(),
                });
            }
            IdentityFragmenter.frag_face(v, copEV, copFE, neighbors, face)
        }
    }

    fn unit_cube() -> (VertexSet, ChainOp, ChainOp) {
        let v = VertexSet::from_3d([
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ]);
        let ev_list = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let fv = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        let (ev, fe) = build_cops(&ev_list, &fv).unwrap();
        (v, ev, fe)
    }

    /// A failing collaborator must surface its error (spec §7: fatal at the
    /// call site, no retry) rather than hang the worker pool's channels.
    /// Regression test for the deadlock where short-circuiting on the first
    /// error left other workers' `tx_result.send` calls with no receiver.
    #[test]
    fn failing_fragmenter_surfaces_error_instead_of_hanging() {
        let (v, ev, fe) = unit_cube();
        let fragmenter = FailingFragmenter { failing_face: 3 };

        let err = arrange_3d(&v, &ev, &fe, &AllPairsIndex, &fragmenter, &EpsilonVertexMerger, &StubCycleExtractor)
            .unwrap_err();
        assert!(matches!(err, Error::CollaboratorError { collaborator: "frag_face", .. }));
    }
}
