// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for transform and scene-tree operations.
//!
//! Structural errors ([`Error::NotFound`], [`Error::NotInSubtree`],
//! [`Error::AlreadyAttached`], [`Error::CycleDetected`], [`Error::StaleNode`])
//! are caller bugs. The operation that reports one has not mutated the tree.

use crate::scene::NodeId;
use crate::transform::TransformKind;

/// Errors reported by `lamina_core`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An inverse mapping was requested from a transform that has none.
    #[error("{kind:?} transform is not invertible")]
    NonInvertible {
        /// Kind of the offending transform (or chain step).
        kind: TransformKind,
    },
    /// A matrix was requested from a transform that cannot be expressed as one.
    #[error("{kind:?} transform has no matrix representation")]
    NotMatrixRepresentable {
        /// Kind of the offending transform.
        kind: TransformKind,
    },
    /// A transform path was requested between unrelated nodes.
    #[error("{ancestor:?} is not an ancestor of {node:?}")]
    NotInSubtree {
        /// The node the path starts from.
        node: NodeId,
        /// The requested target.
        ancestor: NodeId,
    },
    /// `child` is not a direct child of `parent`.
    #[error("{child:?} is not a child of {parent:?}")]
    NotFound {
        /// The parent that was searched.
        parent: NodeId,
        /// The node that was not found.
        child: NodeId,
    },
    /// The handle refers to a destroyed node.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
    /// The node already has a parent and must be detached first.
    #[error("{0:?} already has a parent")]
    AlreadyAttached(NodeId),
    /// Attaching `child` under `parent` would make the tree cyclic.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// The requested parent.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },
}
