// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ChainOp`: a sparse signed-integer incidence (boundary/coboundary)
//! operator between cells of successive dimension. Rows are stored as
//! ascending `(column, sign)` pairs — CSR-style adjacency lists — chosen
//! because entries are always in `{-1, 0, +1}` and every row is built
//! incrementally, one cell at a time, rather than assembled from a
//! pre-known nonzero pattern.

use rustc_hash::FxHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sparse signed incidence matrix of shape `(rows, cols)`.
///
/// `copEV` has edges as rows and vertices as columns; `copFE` has faces as
/// rows and edges as columns; `copCF` has 3-cells as rows and faces as
/// columns. See spec §3 for the sign conventions of each.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainOp {
    rows: usize,
    cols: usize,
    data: Vec<Vec<(usize, i8)>>,
}

impl ChainOp {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Vec::new(); rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.data.iter().map(|r| r.len()).sum()
    }

    /// Set (or overwrite) the entry at `(row, col)`. Keeps each row sorted by
    /// column so `row()` can be consumed as an ascending iterator.
    pub fn set(&mut self, row: usize, col: usize, sign: i8) {
        assert!(row < self.rows && col < self.cols, "ChainOp index out of bounds");
        match self.data[row].iter().position(|(c, _)| *c == col) {
            Some(i) => self.data[row][i].1 = sign,
            None => {
                self.data[row].push((col, sign));
                self.data[row].sort_unstable_by_key(|(c, _)| *c);
            }
        }
    }

    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.data[row]
            .iter()
            .find(|(c, _)| *c == col)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    /// The nonzero `(column, sign)` pairs of `row`, ascending by column.
    pub fn row(&self, row: usize) -> &[(usize, i8)] {
        &self.data[row]
    }

    /// Append a new row, sorting its entries by column. Returns the new
    /// row's index.
    pub fn push_row(&mut self, mut entries: Vec<(usize, i8)>) -> usize {
        entries.sort_unstable_by_key(|(c, _)| *c);
        self.data.push(entries);
        self.rows += 1;
        self.rows - 1
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        self.data[row].is_empty()
    }

    pub fn nonempty_rows(&self) -> Vec<usize> {
        (0..self.rows).filter(|&r| !self.is_row_empty(r)).collect()
    }

    /// Column indices that have at least one nonzero entry in some row.
    pub fn nonempty_cols(&self) -> Vec<usize> {
        let mut seen = vec![false; self.cols];
        for row in &self.data {
            for &(c, _) in row {
                seen[c] = true;
            }
        }
        (0..self.cols).filter(|&c| seen[c]).collect()
    }

    /// Keep only `keep` rows, in the given order, remapping row indices.
    pub fn select_rows(&self, keep: &[usize]) -> ChainOp {
        ChainOp {
            rows: keep.len(),
            cols: self.cols,
            data: keep.iter().map(|&r| self.data[r].clone()).collect(),
        }
    }

    /// Keep only `keep` columns, in the given order, remapping column
    /// indices. Entries in dropped columns are discarded.
    pub fn select_cols(&self, keep: &[usize]) -> ChainOp {
        let mut remap = vec![None; self.cols];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx] = Some(new_idx);
        }
        let data = self
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|&(c, s)| remap[c].map(|nc| (nc, s)))
                    .collect()
            })
            .collect();
        ChainOp {
            rows: self.rows,
            cols: keep.len(),
            data,
        }
    }

    /// Block-diagonal merge: `self` occupies the top-left block, `other` the
    /// bottom-right; no entries appear in the off-diagonal blocks. Used by
    /// `skel_merge` — shifting indices is enough, no value copying needed
    /// beyond the row vectors themselves (design notes §9).
    pub fn block_diag(&self, other: &ChainOp) -> ChainOp {
        let mut data = self.data.clone();
        data.extend(
            other
                .data
                .iter()
                .map(|row| row.iter().map(|&(c, s)| (c + self.cols, s)).collect()),
        );
        ChainOp {
            rows: self.rows + other.rows,
            cols: self.cols + other.cols,
            data,
        }
    }

    /// Integer matrix product `self * other`.
    ///
    /// Used to check the closedness property `copFE . copEV = 0` (spec §3,
    /// §8.3) on closed complexes.
    pub fn matmul(&self, other: &ChainOp) -> ChainOp {
        assert_eq!(self.cols, other.rows, "ChainOp matmul shape mismatch");
        let mut op = ChainOp::new(self.rows, other.cols);
        for i in 0..self.rows {
            let mut acc: FxHashMap<usize, i64> = FxHashMap::default();
            for &(k, s_ik) in self.row(i) {
                for &(j, s_kj) in other.row(k) {
                    *acc.entry(j).or_insert(0) += s_ik as i64 * s_kj as i64;
                }
            }
            let mut entries: Vec<(usize, i8)> = acc
                .into_iter()
                .filter(|&(_, v)| v != 0)
                .map(|(j, v)| (j, v.clamp(-127, 127) as i8))
                .collect();
            entries.sort_unstable_by_key(|(c, _)| *c);
            op.data[i] = entries;
        }
        op
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|row| row.is_empty())
    }

    /// Unsigned incidence operator from a list-of-lists cell representation:
    /// every nonzero entry is `+1` (`lar2cop`).
    pub fn from_cells_unsigned(cells: &[Vec<usize>], cols: usize) -> ChainOp {
        let mut op = ChainOp::new(0, cols);
        for cell in cells {
            let mut entries: Vec<(usize, i8)> = cell.iter().map(|&c| (c, 1)).collect();
            entries.sort_unstable_by_key(|(c, _)| *c);
            entries.dedup_by_key(|(c, _)| *c);
            op.push_row(entries);
        }
        op
    }

    /// Per-row nonzero column indices in ascending order, ignoring sign
    /// (`cop2lar`).
    pub fn to_cells(&self) -> Vec<Vec<usize>> {
        self.data
            .iter()
            .map(|row| row.iter().map(|&(c, _)| c).collect())
            .collect()
    }

    /// Per-row `(column, sign)` pairs, ascending by column. Useful for
    /// exact equality checks between two operators, e.g. to confirm a
    /// computation is independent of execution order.
    pub fn to_cells_signed(&self) -> Vec<Vec<(usize, i8)>> {
        self.data.clone()
    }
}
