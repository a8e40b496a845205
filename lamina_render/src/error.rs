// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for resources, visuals, and draw passes.

use alloc::string::String;

use lamina_core::scene::VisualKey;

use crate::context::{GpuObjectId, ResourceKind};
use crate::visual::AttributeType;

/// Why an attribute assignment was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeIssue {
    /// The visual kind has no attribute with that name.
    Unknown,
    /// The value has the wrong shape.
    WrongType {
        /// The type the descriptor declares.
        expected: AttributeType,
    },
    /// The value is outside the declared range, or not finite.
    OutOfRange,
    /// The value is a string not among the declared choices.
    UnknownChoice,
    /// The value is internally inconsistent (e.g. a face referencing a
    /// missing vertex, or a pixel buffer of the wrong length).
    Malformed,
}

/// Errors reported by `lamina_render`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// An attribute assignment failed validation. The visual is unchanged.
    #[error("invalid attribute `{name}`: {issue:?}")]
    InvalidAttribute {
        /// The attribute name as given by the caller.
        name: String,
        /// What was wrong with it.
        issue: AttributeIssue,
    },
    /// A write does not fit a fixed-capacity resource.
    #[error("write of {required} bytes exceeds {kind:?} capacity of {capacity} bytes")]
    SizeMismatch {
        /// Kind of the resource written to.
        kind: ResourceKind,
        /// Declared capacity.
        capacity: usize,
        /// Bytes the write needs (offset + length).
        required: usize,
    },
    /// A resource was released a second time.
    #[error("{0:?} resource released twice")]
    DoubleRelease(ResourceKind),
    /// A resource was used after release.
    #[error("{0:?} resource used after release")]
    Released(ResourceKind),
    /// A node's content refers to a visual that does not exist.
    #[error("unknown visual {0:?}")]
    UnknownVisual(VisualKey),
    /// The graphics context does not know the object.
    #[error("unknown GPU object {0:?}")]
    UnknownObject(GpuObjectId),
    /// The graphics context failed to carry out a command.
    #[error("graphics context error: {0}")]
    Context(String),
    /// A scene or transform operation failed.
    #[error(transparent)]
    Scene(#[from] lamina_core::Error),
}
