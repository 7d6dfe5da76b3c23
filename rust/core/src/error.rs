// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for chain-complex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the sparse incidence and boundary-traversal layer.
///
/// Every variant is fatal at the call site: there is no local recovery, and
/// partial progress is not preserved (spec §7).
#[derive(Error, Debug)]
pub enum Error {
    /// A face's signed-chain orbit is not a permutation of its edges, or a
    /// face references an edge absent from `copEV`.
    #[error("face {face} boundary is malformed: {reason}")]
    MalformedComplex { face: usize, reason: String },

    /// The unsigned walk (variant 2) found no valid next edge at a vertex.
    #[error("face {face} traversal is ambiguous at vertex {vertex}: {reason}")]
    AmbiguousTraversal {
        face: usize,
        vertex: usize,
        reason: String,
    },
}
