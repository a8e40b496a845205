// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-pass configuration.

/// Configuration for the [`DrawScheduler`](crate::DrawScheduler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawConfig {
    /// Leave invisible nodes and their subtrees out of the traversal.
    pub skip_hidden: bool,
    /// Skip visuals with no elements or no draw ranges instead of binding
    /// them.
    pub cull_empty: bool,
    /// Keep each node's transform chain across frames so unchanged paths are
    /// served from the chain cache. When off, chains are rebuilt every frame.
    pub retain_chains: bool,
}

impl DrawConfig {
    /// Settings for interactive rendering: every shortcut enabled.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            skip_hidden: true,
            cull_empty: true,
            retain_chains: true,
        }
    }

    /// Settings for verification runs: every visual is bound and every chain
    /// recomputed from scratch.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            skip_hidden: true,
            cull_empty: false,
            retain_chains: false,
        }
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self::interactive()
    }
}
