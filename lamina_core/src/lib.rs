// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree and transform composition engine.
//!
//! `lamina_core` holds the logical half of Lamina: what is drawn where. It is
//! `no_std` compatible (with `alloc`) and never touches a graphics API; the
//! GPU side lives in `lamina_render`.
//!
//! # Architecture
//!
//! ```text
//!   Scene::set_transform / mark_dirty
//!       │  (version bump, dirty flag up to the root)
//!       ▼
//!   Scene::transform_to(node, root) ──► TransformChain
//!                                           │  stamp check, lazy fold
//!                                           ▼
//!                                       Transform ──► as_matrix() ──► GPU
//! ```
//!
//! **[`transform`]**: The [`Transform`](transform::Transform) enum (identity,
//! scale-translate, affine, perspective, log, polar, chain) with `map`,
//! `imap`, and `compose`, plus the cached
//! [`TransformChain`](transform::TransformChain).
//!
//! **[`matrix`]**: The 4×4 column-major [`Transform3d`](matrix::Transform3d)
//! backing every matrix kind.
//!
//! **[`scene`]**: Struct-of-arrays node arena with generational handles,
//! ordered children, per-node versions, and subtree dirty flags.
//!
//! **[`dirty`]**: `understory_dirty` channels drained by
//! [`Scene::evaluate`](scene::Scene::evaluate).
//!
//! **[`error`]**: The crate's [`Error`] type.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod error;
pub mod matrix;
pub mod scene;
pub mod transform;

pub use error::Error;
