// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cellcx-core
//!
//! The data model and combinatorial algebra for cellular complexes
//! described by sparse signed incidence (boundary/coboundary) operators —
//! vertices, edges, faces, and the 3-cells they bound.
//!
//! ## Overview
//!
//! - **Incidence builders**: construct `copEV`/`copFE` from cell lists, and
//!   convert between list-of-lists and sparse representations
//!   ([`builders`]).
//! - **Face-cycle extraction**: recover a face's ordered vertex boundary
//!   from its edge incidences, in three input shapes ([`cycle`]).
//! - **Skeleton ops**: block-diagonal merge and edge/vertex deletion
//!   ([`skeleton`]).
//! - **Geometry primitives**: bounding boxes, tolerant vertex equality,
//!   signed triangle area ([`geom`]).
//!
//! Operators are immutable per logical stage: a stage takes a vertex set and
//! operators and produces new ones. There is no in-place mutation exposed
//! through the public contract.
//!
//! ## Feature Flags
//!
//! - `serde`: derive `Serialize`/`Deserialize` on [`VertexSet`] and
//!   [`ChainOp`].

pub mod builders;
pub mod chain;
pub mod cycle;
pub mod error;
pub mod face;
pub mod geom;
pub mod skeleton;
pub mod vertex;

pub use builders::{build_copEV, build_copFE, build_cops, cop2lar, lar2cop};
pub use chain::ChainOp;
pub use cycle::{recover_all_cycles_signed, recover_cycle};
pub use error::{Error, Result};
pub use face::FaceRepr;
pub use geom::{bbox, bbox_contains, triangle_area, vequals, vin, Bbox, EPSILON};
pub use skeleton::{delete_edges, skel_merge_1, skel_merge_2};
pub use vertex::VertexSet;
