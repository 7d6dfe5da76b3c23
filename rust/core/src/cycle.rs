// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face-boundary traversal: recovering the ordered vertex cycle of a face
//! from its edge incidences (spec §4.D). Three variants share one output
//! contract — a single closed boundary traversal, consistent orientation,
//! no repeated start vertex — and differ only in what they're given.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::chain::ChainOp;
use crate::error::{Error, Result};
use crate::face::FaceRepr;

/// Dispatches to the matching variant based on the tagged [`FaceRepr`].
pub fn recover_cycle(copEV: &ChainOp, face: FaceRepr<'_>, face_idx: usize) -> Result<Vec<usize>> {
    match face {
        FaceRepr::SignedChain(chain) => recover_cycle_signed(copEV, chain, face_idx),
        FaceRepr::VertexList(verts) => recover_cycle_vertex_list(copEV, verts, face_idx),
        FaceRepr::EdgeVector(edges) => recover_cycle_edge_vector(copEV, edges, face_idx),
    }
}

fn edge_endpoints(copEV: &ChainOp, edge: usize, face_idx: usize) -> Result<(usize, usize)> {
    let row = copEV.row(edge);
    if row.len() != 2 {
        return Err(Error::MalformedComplex {
            face: face_idx,
            reason: format!("edge {edge} does not have exactly two endpoints in copEV"),
        });
    }
    let lo = row.iter().find(|(_, s)| *s < 0).map(|(v, _)| *v);
    let hi = row.iter().find(|(_, s)| *s > 0).map(|(v, _)| *v);
    match (lo, hi) {
        (Some(l), Some(h)) => Ok((l, h)),
        _ => {
            // Unsigned copEV: both entries are +1; fall back to column order.
            if row[0].1 != 0 && row[1].1 != 0 {
                let (a, b) = (row[0].0, row[1].0);
                Ok(if a < b { (a, b) } else { (b, a) })
            } else {
                Err(Error::MalformedComplex {
                    face: face_idx,
                    reason: format!("edge {edge} is not signed in copEV"),
                })
            }
        }
    }
}

/// Variant 1: signed-chain walk. Builds a tail-to-head permutation from the
/// face's signed edge vector and follows the orbit containing the first
/// edge's tail back to itself.
///
/// Returns only the orbit reachable from that seed: a face with holes
/// decomposes into several orbits, and this routine — matching the
/// reference behavior this library's traversal pattern is drawn from —
/// returns the first one. Use [`recover_all_cycles_signed`] to recover
/// every orbit, which callers dealing with faces that may have holes
/// should prefer (see spec §9's open question on faces with holes).
pub fn recover_cycle_signed(
    copEV: &ChainOp,
    face_edges: &[(usize, i8)],
    face_idx: usize,
) -> Result<Vec<usize>> {
    let tail_to_head = signed_tail_to_head(copEV, face_edges, face_idx)?;
    if face_edges.is_empty() {
        return Err(Error::MalformedComplex {
            face: face_idx,
            reason: "face has no incident edges".to_string(),
        });
    }
    let (lo, hi) = edge_endpoints(copEV, face_edges[0].0, face_idx)?;
    let start = if face_edges[0].1 > 0 { lo } else { hi };
    walk_orbit(&tail_to_head, start, face_edges.len(), face_idx)
}

/// Every orbit of the tail-to-head permutation built from the face's signed
/// edge vector — one per boundary loop (outer boundary plus any holes).
pub fn recover_all_cycles_signed(
    copEV: &ChainOp,
    face_edges: &[(usize, i8)],
    face_idx: usize,
) -> Result<Vec<Vec<usize>>> {
    let tail_to_head = signed_tail_to_head(copEV, face_edges, face_idx)?;
    let mut visited: FxHashSet<usize> = FxHashSet::default();
    let mut cycles = Vec::new();
    let mut tails: Vec<usize> = tail_to_head.keys().copied().collect();
    tails.sort_unstable();
    for start in tails {
        if visited.contains(&start) {
            continue;
        }
        let cycle = walk_orbit(&tail_to_head, start, tail_to_head.len(), face_idx)?;
        visited.extend(cycle.iter().copied());
        cycles.push(cycle);
    }
    Ok(cycles)
}

fn signed_tail_to_head(
    copEV: &ChainOp,
    face_edges: &[(usize, i8)],
    face_idx: usize,
) -> Result<FxHashMap<usize, usize>> {
    let mut tail_to_head = FxHashMap::default();
    for &(e, sign) in face_edges {
        let (lo, hi) = edge_endpoints(copEV, e, face_idx)?;
        let (tail, head) = if sign > 0 { (lo, hi) } else { (hi, lo) };
        if tail_to_head.insert(tail, head).is_some() {
            return Err(Error::MalformedComplex {
                face: face_idx,
                reason: format!(
                    "vertex {tail} is the tail of more than one edge; the signed chain is not a permutation"
                ),
            });
        }
    }
    Ok(tail_to_head)
}

fn walk_orbit(
    tail_to_head: &FxHashMap<usize, usize>,
    start: usize,
    bound: usize,
    face_idx: usize,
) -> Result<Vec<usize>> {
    let mut cycle = vec![start];
    let mut current = start;
    for _ in 0..=bound {
        let next = *tail_to_head.get(&current).ok_or_else(|| Error::MalformedComplex {
            face: face_idx,
            reason: format!("orbit has no outgoing edge at vertex {current}"),
        })?;
        if next == start {
            return Ok(cycle);
        }
        cycle.push(next);
        current = next;
    }
    Err(Error::MalformedComplex {
        face: face_idx,
        reason: "signed-chain orbit did not close into a permutation on the face's edges"
            .to_string(),
    })
}

/// Variant 2: unsigned walk. Starting at `face[0]`, repeatedly follows an
/// edge whose other endpoint is an unvisited face vertex (or the start, to
/// close the cycle), breaking ties by first encountered.
pub fn recover_cycle_vertex_list(
    copEV: &ChainOp,
    face: &[usize],
    face_idx: usize,
) -> Result<Vec<usize>> {
    if face.len() < 3 {
        return Err(Error::MalformedComplex {
            face: face_idx,
            reason: "face has fewer than three vertices".to_string(),
        });
    }
    let face_set: FxHashSet<usize> = face.iter().copied().collect();
    let mut incident: FxHashMap<usize, Vec<(usize, usize)>> = FxHashMap::default();
    for e in 0..copEV.rows() {
        let row = copEV.row(e);
        if row.len() != 2 {
            continue;
        }
        let (a, b) = (row[0].0, row[1].0);
        if face_set.contains(&a) && face_set.contains(&b) {
            incident.entry(a).or_default().push((e, b));
            incident.entry(b).or_default().push((e, a));
        }
    }

    let start = face[0];
    let mut cycle = vec![start];
    let mut used_edges: FxHashSet<usize> = FxHashSet::default();
    let mut current = start;
    loop {
        let candidates = incident.get(&current).map(Vec::as_slice).unwrap_or(&[]);
        let next = candidates
            .iter()
            .find(|(e, other)| !used_edges.contains(e) && (*other == start || !cycle.contains(other)));
        match next {
            Some(&(e, other)) => {
                used_edges.insert(e);
                if other == start {
                    return Ok(cycle);
                }
                cycle.push(other);
                current = other;
            }
            None => {
                return Err(Error::AmbiguousTraversal {
                    face: face_idx,
                    vertex: current,
                    reason: "no unused incident edge leads to the start or an unvisited face vertex"
                        .to_string(),
                })
            }
        }
    }
}

/// Variant 3: edge-structural walk. Given only the (unsigned) edge indices
/// incident to the face, reconstructs a consistent orientation from the
/// nonzero pattern alone — equivalent to variant 1, but without a signed
/// input to read direction from.
pub fn recover_cycle_edge_vector(
    copEV: &ChainOp,
    edges: &[usize],
    face_idx: usize,
) -> Result<Vec<usize>> {
    if edges.is_empty() {
        return Err(Error::MalformedComplex {
            face: face_idx,
            reason: "face has no incident edges".to_string(),
        });
    }
    let mut endpoints = Vec::with_capacity(edges.len());
    for &e in edges {
        endpoints.push(edge_endpoints(copEV, e, face_idx)?);
    }

    let mut adjacency: FxHashMap<usize, Vec<(usize, usize)>> = FxHashMap::default();
    for (i, &(lo, hi)) in endpoints.iter().enumerate() {
        adjacency.entry(lo).or_default().push((i, hi));
        adjacency.entry(hi).or_default().push((i, lo));
    }

    let start = endpoints[0].0;
    let mut cycle = vec![start];
    let mut used = vec![false; endpoints.len()];
    let mut current = start;
    for _ in 0..endpoints.len() {
        let candidates = adjacency.get(&current).map(Vec::as_slice).unwrap_or(&[]);
        let next = candidates.iter().find(|(i, _)| !used[*i]);
        match next {
            Some(&(i, other)) => {
                used[i] = true;
                if other == start {
                    return Ok(cycle);
                }
                cycle.push(other);
                current = other;
            }
            None => {
                return Err(Error::MalformedComplex {
                    face: face_idx,
                    reason: format!("edge-structural orbit breaks at vertex {current}"),
                })
            }
        }
    }
    Err(Error::MalformedComplex {
        face: face_idx,
        reason: "edge-structural orbit did not close".to_string(),
    })
}
