// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single tagged variant standing in for the two shapes a cell can arrive
//! in: an ordered list of vertex indices, or a sparse signed edge vector
//! (a row of `copFE`). The three face-cycle-extractor variants in
//! [`crate::cycle`] dispatch on this instead of each taking its own
//! bespoke parameter shape (design notes §9).

/// A face as presented to the cycle extractor.
#[derive(Debug, Clone, Copy)]
pub enum FaceRepr<'a> {
    /// Variant 2 input: an ordered (or merely enumerated) list of the
    /// face's vertex indices.
    VertexList(&'a [usize]),
    /// Variant 1 input: a signed sparse chain — `(edge index, sign)` pairs,
    /// typically a row of `copFE`.
    SignedChain(&'a [(usize, i8)]),
    /// Variant 3 input: an unsigned sparse edge vector — just the edge
    /// indices incident to the face, sign reconstructed structurally.
    EdgeVector(&'a [usize]),
}
