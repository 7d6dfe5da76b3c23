// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cellcx-geometry
//!
//! Geometry-consuming operations on cellular complexes built with
//! [`cellcx_core`]: constrained face triangulation, point-in-face
//! classification, mesh I/O, and the 3D spatial-arrangement orchestrator.
//!
//! ## Overview
//!
//! - **Triangulation**: recover a face's ordered boundary, project it to
//!   its own plane, and triangulate via an external [`ConstrainedTriangulator`]
//!   collaborator (default: [`EarcutTriangulator`], backed by `earcutr`),
//!   repairing orientation from signed planar area ([`triangulate`]).
//! - **Classification**: a tile-code crossing-number test returning
//!   {inside, outside, on-boundary} ([`classify`]).
//! - **Mesh I/O**: a minimal Wavefront-like indexed-face text format
//!   ([`mesh`]).
//! - **Spatial arrangement**: the top-level 3D driver composing skeleton
//!   merge, a caller-provided fragmenter, vertex deduplication, and a
//!   caller-provided 3-cycle extractor ([`arrangement`]).

pub mod arrangement;
pub mod classify;
pub mod error;
pub mod mesh;
pub mod triangulate;

// Re-export core chain-complex types for convenience.
pub use cellcx_core::{ChainOp, VertexSet};
pub use nalgebra::{Point2, Point3, Vector3};

pub use arrangement::{
    arrange_3d, EpsilonVertexMerger, CycleExtractor3, FaceFragmenter, FragmentResult, SpatialIndex,
    VertexMerger,
};
pub use classify::{classify_point, classify_point_against_edges, Classification};
pub use error::{Error, Result};
pub use mesh::{read_mesh, write_mesh};
pub use triangulate::{face_area, triangulate_face, ConstrainedTriangulator, EarcutTriangulator};
