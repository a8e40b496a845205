// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is a position in the drawing hierarchy. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, so use-after-free is reported instead of reading
//!   a recycled slot.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Children draw in insertion order.
//! - A local [`Transform`](crate::transform::Transform) with a version
//!   counter bumped on every edit made through the scene.
//! - A visibility flag and an optional [`VisualKey`] naming the visual it
//!   draws.
//! - A subtree dirty flag, set on the node and all of its ancestors whenever
//!   something below changes, cleared by the draw pass.
//!
//! Composite transforms are never stored on nodes. They are pulled on demand
//! through a [`TransformChain`](crate::transform::TransformChain) obtained
//! from [`Scene::transform_to`].

mod evaluate;
mod id;
mod store;
mod traverse;

pub use evaluate::SceneChanges;
pub use id::{INVALID, NodeId, VisualKey};
pub use store::Scene;
pub use traverse::Children;
