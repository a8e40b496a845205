// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slab storage for visuals keyed by [`VisualKey`].

use alloc::vec::Vec;

use lamina_core::scene::VisualKey;

use super::Visual;

/// One slot of the store. The generation is bumped on removal.
#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    visual: Option<Visual>,
}

/// Owns every live [`Visual`]. Slots of removed visuals are recycled under a
/// new generation, so old keys stop resolving.
#[derive(Debug, Default)]
pub struct Visuals {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl Visuals {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live visuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no visuals are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `visual` and returns its key.
    pub fn insert(&mut self, visual: Visual) -> VisualKey {
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.visual = Some(visual);
            return VisualKey::new(idx, slot.generation);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "visual count cannot exceed u32::MAX in practice"
        )]
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            visual: Some(visual),
        });
        VisualKey::new(idx, 0)
    }

    fn slot(&self, key: VisualKey) -> Option<&Slot> {
        self.slots
            .get(key.index() as usize)
            .filter(|s| s.generation == key.generation())
    }

    fn slot_mut(&mut self, key: VisualKey) -> Option<&mut Slot> {
        self.slots
            .get_mut(key.index() as usize)
            .filter(|s| s.generation == key.generation())
    }

    /// Returns `true` if `key` names a live visual.
    #[must_use]
    pub fn contains(&self, key: VisualKey) -> bool {
        self.get(key).is_some()
    }

    /// Looks up a visual. Keys of removed visuals resolve to `None`, even
    /// after their slot has been reused.
    #[must_use]
    pub fn get(&self, key: VisualKey) -> Option<&Visual> {
        self.slot(key)?.visual.as_ref()
    }

    /// Looks up a visual mutably.
    pub fn get_mut(&mut self, key: VisualKey) -> Option<&mut Visual> {
        self.slot_mut(key)?.visual.as_mut()
    }

    /// Removes and returns a visual. The caller is responsible for
    /// releasing its GPU handles.
    pub fn remove(&mut self, key: VisualKey) -> Option<Visual> {
        let slot = self.slot_mut(key)?;
        let visual = slot.visual.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.index());
        self.len -= 1;
        Some(visual)
    }

    /// Iterates live visuals in key order.
    pub fn iter(&self) -> impl Iterator<Item = (VisualKey, &Visual)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "slot indices were issued as u32"
            )]
            let key = VisualKey::new(i as u32, s.generation);
            s.visual.as_ref().map(|v| (key, v))
        })
    }
}

#[cfg(test)]
mod tests {
    use lamina_core::scene::Scene;

    use super::*;
    use crate::visual::VisualKind;

    #[test]
    fn slots_are_recycled_under_a_new_generation() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mut visuals = Visuals::new();
        let a = visuals.insert(Visual::new(node, VisualKind::Line));
        let b = visuals.insert(Visual::new(node, VisualKind::Mesh));
        assert_eq!(visuals.len(), 2);

        assert_eq!(visuals.remove(a).map(|v| v.kind()), Some(VisualKind::Line));
        assert!(visuals.get(a).is_none());
        assert!(visuals.remove(a).is_none());

        let c = visuals.insert(Visual::new(node, VisualKind::Image));
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert_eq!(visuals.get(b).map(Visual::kind), Some(VisualKind::Mesh));
        let keys: Vec<_> = visuals.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, [c, b]);
    }

    #[test]
    fn stale_key_does_not_resolve_to_new_owner() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mut visuals = Visuals::new();
        let old = visuals.insert(Visual::new(node, VisualKind::Line));
        visuals.remove(old).unwrap();
        let new = visuals.insert(Visual::new(node, VisualKind::Ellipse));

        assert!(!visuals.contains(old));
        assert!(visuals.get(old).is_none());
        assert!(visuals.get_mut(old).is_none());
        assert!(visuals.remove(old).is_none());
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals.get(new).map(Visual::kind), Some(VisualKind::Ellipse));
    }
}
