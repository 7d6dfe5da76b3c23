// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by triangulation, classification, mesh I/O, and the
/// spatial-arrangement orchestrator. `MalformedComplex`/`AmbiguousTraversal`
/// are raised one layer down, by the combinatorial boundary walk in
/// `cellcx-core`, and reach callers here through [`Error::Core`].
#[derive(Error, Debug)]
pub enum Error {
    /// A face's vertices are collinear, have zero area, or its planar basis
    /// cannot be formed (spec §7, §4.E step 3).
    #[error("face {face} is degenerate: {reason}")]
    DegenerateGeometry { face: usize, reason: String },

    /// The underlying constrained-triangulation primitive rejected the
    /// input (spec §4.E step 6).
    #[error("triangulation failed for face {face}: {reason}")]
    TriangulationError { face: usize, reason: String },

    /// An external collaborator (spatial index, fragmenter, 3-cycle
    /// extractor, planar arrangement) failed. Not one of spec §7's four
    /// named kinds, but fatal for the same reason: no local recovery is
    /// attempted for a collaborator fault.
    #[error("collaborator {collaborator} failed: {reason}")]
    CollaboratorError {
        collaborator: &'static str,
        reason: String,
    },

    /// A mesh line could not be parsed.
    #[error("malformed mesh input at line {line}: {message}")]
    IOFormatError { line: usize, message: String },

    /// Propagated from the chain-complex / boundary-traversal layer
    /// (`MalformedComplex`, `AmbiguousTraversal`).
    #[error(transparent)]
    Core(#[from] cellcx_core::Error),
}
