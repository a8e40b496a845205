// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle roles and role sets.

use core::fmt;

use crate::context::{BindTarget, ResourceKind};

/// The job a GPU handle does for its visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleRole {
    /// Vertex positions (`[f32; 3]`).
    Position,
    /// Vertex colors (`[f32; 4]`).
    Color,
    /// Texture coordinates (`[f32; 2]`).
    TexCoord,
    /// Triangle or line indices (`u32`).
    Index,
    /// Per-visual style uniform block.
    Uniform,
    /// Image texels.
    Texture,
}

impl HandleRole {
    /// Every role, in bind order.
    pub const ALL: [Self; 6] = [
        Self::Position,
        Self::Color,
        Self::TexCoord,
        Self::Index,
        Self::Uniform,
        Self::Texture,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Position => 1 << 0,
            Self::Color => 1 << 1,
            Self::TexCoord => 1 << 2,
            Self::Index => 1 << 3,
            Self::Uniform => 1 << 4,
            Self::Texture => 1 << 5,
        }
    }

    /// Where the handle is attached before drawing.
    #[must_use]
    pub const fn target(self) -> BindTarget {
        match self {
            Self::Position => BindTarget::Vertex(0),
            Self::Color | Self::TexCoord => BindTarget::Vertex(1),
            Self::Index => BindTarget::Index,
            Self::Uniform => BindTarget::Uniform(1),
            Self::Texture => BindTarget::Texture(2),
        }
    }

    /// The resource kind backing the role.
    #[must_use]
    pub const fn kind(self) -> ResourceKind {
        match self {
            Self::Position | Self::Color | Self::TexCoord => ResourceKind::Vertex,
            Self::Index => ResourceKind::Index,
            Self::Uniform => ResourceKind::Uniform,
            Self::Texture => ResourceKind::Texture,
        }
    }

    /// Returns `true` for roles rebuilt by `build_geometry`.
    #[must_use]
    pub const fn is_geometry(self) -> bool {
        matches!(
            self,
            Self::Position | Self::Color | Self::TexCoord | Self::Index
        )
    }
}

/// A small set of [`HandleRole`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// No roles.
    pub const EMPTY: Self = Self(0);

    /// A set with one role.
    #[must_use]
    pub const fn only(role: HandleRole) -> Self {
        Self(role.bit())
    }

    /// Adds a role (const builder form).
    #[must_use]
    pub const fn with(self, role: HandleRole) -> Self {
        Self(self.0 | role.bit())
    }

    /// Adds every role of `other`.
    pub fn insert_all(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns `true` if `role` is in the set.
    #[must_use]
    pub const fn contains(self, role: HandleRole) -> bool {
        self.0 & role.bit() != 0
    }

    /// Returns `true` if the set has no roles.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the roles in bind order.
    pub fn iter(self) -> impl Iterator<Item = HandleRole> {
        HandleRole::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn set_operations() {
        let mut set = RoleSet::only(HandleRole::Index);
        assert!(set.contains(HandleRole::Index));
        assert!(!set.contains(HandleRole::Position));
        set.insert_all(RoleSet::EMPTY.with(HandleRole::Position));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            &[HandleRole::Position, HandleRole::Index]
        );
        assert!(RoleSet::default().is_empty());
    }
}
