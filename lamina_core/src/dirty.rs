// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Alongside the per-node subtree dirty flag, the scene records *what* kind
//! of change happened through [`understory_dirty`] channels. They are drained
//! by [`Scene::evaluate`](crate::scene::Scene::evaluate) once per frame.
//!
//! - [`TRANSFORM`] uses [`EagerPolicy`](understory_dirty::EagerPolicy) with a
//!   dependency edge from each child to its parent, so editing a transform
//!   reports the whole subtree whose composite transform moved.
//! - [`VISUAL`] is local-only: attaching content or calling
//!   [`mark_dirty`](crate::scene::Scene::mark_dirty) reports just that node.
//! - [`TOPOLOGY`] is marked on structural edits and visibility toggles.

use understory_dirty::Channel;

/// Local transform changed; every descendant's composite transform moved.
pub const TRANSFORM: Channel = Channel::new(0);

/// Visual payload attached to the node changed.
pub const VISUAL: Channel = Channel::new(1);

/// Tree structure or visibility changed.
pub const TOPOLOGY: Channel = Channel::new(2);
