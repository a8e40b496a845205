// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable content attached to scene nodes.
//!
//! A [`Visual`] pairs a typed attribute bag (its [`Shape`]) with the GPU
//! handles derived from it. Attribute edits never touch the GPU: they
//! validate, update the bag, and record which handles went stale. The draw
//! pass later calls [`update`](Visual::update) to re-encode exactly those
//! payloads and [`bind`](Visual::bind) to upload them.
//!
//! Attributes that change element counts (e.g. an ellipse's `num_segments`)
//! are *topology* attributes. They set a flag that makes the next update run
//! [`build_geometry`](Visual::build_geometry), which rewrites every geometry
//! handle at once.

mod attribute;
mod ellipse;
mod image;
mod line;
mod markers;
mod mesh;
mod role;
mod shape;
mod store;

pub use attribute::{AttributeDescriptor, AttributeType, AttributeValue};
pub use ellipse::Ellipse;
pub use image::Image;
pub use line::{Connect, Line};
pub use markers::Markers;
pub use mesh::Mesh;
pub use role::{HandleRole, RoleSet};
pub use shape::{DrawRange, Shape, VisualKind};
pub use store::Visuals;

use alloc::string::String;
use alloc::vec::Vec;

use lamina_core::scene::NodeId;

use self::shape::Payload;
use crate::context::{GraphicsContext, ProgramKind, ResourceKind};
use crate::error::{AttributeIssue, RenderError};
use crate::resource::GpuResource;

/// One GPU handle owned by a visual.
#[derive(Debug)]
struct Handle {
    role: HandleRole,
    resource: GpuResource,
}

/// What [`Visual::update`] re-encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// `build_geometry` ran.
    pub rebuilt: bool,
    /// Handles whose payload was rewritten.
    pub written: RoleSet,
}

/// A GPU upload performed while binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Which handle.
    pub role: HandleRole,
    /// Its resource kind.
    pub kind: ResourceKind,
    /// Bytes uploaded.
    pub bytes: usize,
}

/// Drawable content for one scene node.
#[derive(Debug)]
pub struct Visual {
    node: NodeId,
    shape: Shape,
    handles: Vec<Handle>,
    dirty: RoleSet,
    topology_dirty: bool,
    rebuild_count: u64,
    draws: Vec<DrawRange>,
}

impl Visual {
    /// Creates a visual with default attributes for `node`.
    ///
    /// Nothing is encoded yet; the first [`update`](Self::update) builds the
    /// geometry.
    #[must_use]
    pub fn new(node: NodeId, kind: VisualKind) -> Self {
        Self::with_shape(node, Shape::new(kind))
    }

    /// Creates a visual from a prepared shape.
    #[must_use]
    pub fn with_shape(node: NodeId, shape: Shape) -> Self {
        let handles = shape
            .data()
            .roles()
            .iter()
            .map(|role| Handle {
                role,
                resource: match role {
                    HandleRole::Texture => GpuResource::texture(),
                    HandleRole::Uniform => {
                        GpuResource::fixed(ResourceKind::Uniform, image::STYLE_SIZE)
                    }
                    other => GpuResource::growable(other.kind()),
                },
            })
            .collect();
        Self {
            node,
            shape,
            handles,
            dirty: RoleSet::EMPTY,
            topology_dirty: true,
            rebuild_count: 0,
            draws: Vec::new(),
        }
    }

    /// The node that draws this visual.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The visual's kind.
    #[must_use]
    pub fn kind(&self) -> VisualKind {
        self.shape.kind()
    }

    /// The attribute state.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The program this visual draws with.
    #[must_use]
    pub fn program(&self) -> ProgramKind {
        self.shape.data().program()
    }

    /// Number of drawable elements (faces, markers, segments, ...).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.data().element_count()
    }

    /// The current value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        let data = self.shape.data();
        let index = data.descriptors().iter().position(|d| d.name == name)?;
        data.get(index)
    }

    /// Validates and assigns an attribute.
    ///
    /// On success the handles derived from the attribute are marked stale
    /// (every geometry handle for a topology attribute, which also schedules
    /// a full rebuild). Encoding and GPU work wait for the next
    /// [`update`](Self::update) and [`bind`](Self::bind).
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidAttribute`] for an unknown name, a value of the
    /// wrong type, or a value out of range. The visual is left unchanged.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), RenderError> {
        let value = value.into();
        let invalid = |issue| RenderError::InvalidAttribute {
            name: String::from(name),
            issue,
        };
        let data = self.shape.data_mut();
        let (index, desc) = data
            .descriptors()
            .iter()
            .enumerate()
            .find(|(_, d)| d.name == name)
            .ok_or_else(|| invalid(AttributeIssue::Unknown))?;
        desc.validate(&value).map_err(invalid)?;
        data.assign(index, value).map_err(invalid)?;

        let stale = if desc.topology {
            self.topology_dirty = true;
            let mut geometry = RoleSet::EMPTY;
            for h in &self.handles {
                if h.role.is_geometry() {
                    geometry.insert_all(RoleSet::only(h.role));
                }
            }
            geometry
        } else {
            self.dirty.insert_all(desc.roles);
            desc.roles
        };
        for h in &mut self.handles {
            if stale.contains(h.role) {
                h.resource.mark_stale();
            }
        }
        Ok(())
    }

    /// Returns `true` if an [`update`](Self::update) has work to do.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.topology_dirty || !self.dirty.is_empty()
    }

    /// Returns `true` if the next update will rebuild geometry.
    #[must_use]
    pub fn topology_dirty(&self) -> bool {
        self.topology_dirty
    }

    /// How many times [`build_geometry`](Self::build_geometry) has run.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Re-encodes stale payloads into the local handle buffers.
    ///
    /// # Errors
    ///
    /// Resource write errors, e.g. [`RenderError::Released`].
    pub fn update(&mut self) -> Result<UpdateReport, RenderError> {
        let mut report = UpdateReport::default();
        if self.topology_dirty {
            report.written = self.build_geometry()?;
            report.rebuilt = true;
        } else if !self.dirty.is_empty() {
            let roles = self.dirty;
            self.write_roles(roles)?;
            report.written = roles;
        }
        self.dirty = RoleSet::EMPTY;
        self.draws = self.shape.data().draws();
        Ok(report)
    }

    /// Recomputes every geometry payload (plus anything else pending) and
    /// clears the topology flag.
    ///
    /// The first build also writes the non-geometry handles, so a fresh
    /// visual is complete after one update.
    ///
    /// # Errors
    ///
    /// Resource write errors. The topology flag stays set so the next update
    /// retries.
    pub fn build_geometry(&mut self) -> Result<RoleSet, RenderError> {
        let mut roles = self.dirty;
        for h in &self.handles {
            if h.role.is_geometry() || self.rebuild_count == 0 {
                roles.insert_all(RoleSet::only(h.role));
            }
        }
        self.write_roles(roles)?;
        self.topology_dirty = false;
        self.dirty = RoleSet::EMPTY;
        self.rebuild_count += 1;
        Ok(roles)
    }

    fn write_roles(&mut self, roles: RoleSet) -> Result<(), RenderError> {
        let data = self.shape.data();
        for h in &mut self.handles {
            if !roles.contains(h.role) {
                continue;
            }
            match data.encode(h.role) {
                Payload::Bytes(bytes) => h.resource.replace(&bytes)?,
                Payload::Texture {
                    width,
                    height,
                    rgba,
                } => h.resource.write_texture(width, height, &rgba)?,
            }
        }
        Ok(())
    }

    /// The draw ranges computed by the last update.
    #[must_use]
    pub fn draws(&self) -> &[DrawRange] {
        &self.draws
    }

    /// The handle for `role`, if this kind has one.
    #[must_use]
    pub fn handle(&self, role: HandleRole) -> Option<&GpuResource> {
        self.handles
            .iter()
            .find(|h| h.role == role)
            .map(|h| &h.resource)
    }

    /// Syncs and binds every handle to its target.
    ///
    /// Runs a pending [`update`](Self::update) first, so stale handles never
    /// upload old bytes. Returns the uploads that were needed; an
    /// already-synced visual binds without uploading.
    ///
    /// # Errors
    ///
    /// Update errors, context failures or [`RenderError::Released`]. Handles
    /// bound before the failure stay synced.
    pub fn bind(&mut self, ctx: &mut dyn GraphicsContext) -> Result<Vec<Upload>, RenderError> {
        if self.needs_update() {
            self.update()?;
        }
        let mut uploads = Vec::new();
        for h in &mut self.handles {
            let outcome = h.resource.bind(ctx, h.role.target())?;
            if outcome.uploaded > 0 {
                uploads.push(Upload {
                    role: h.role,
                    kind: h.resource.kind(),
                    bytes: outcome.uploaded,
                });
            }
        }
        Ok(uploads)
    }

    /// Releases every handle.
    ///
    /// # Errors
    ///
    /// [`RenderError::DoubleRelease`] if the visual was already released.
    /// Every handle is still visited.
    pub fn release(&mut self, ctx: &mut dyn GraphicsContext) -> Result<(), RenderError> {
        let mut first_err = None;
        for h in &mut self.handles {
            if let Err(e) = h.resource.release(ctx) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use lamina_core::scene::Scene;

    use super::*;
    use crate::headless::HeadlessContext;

    fn ellipse() -> Visual {
        let mut scene = Scene::new();
        Visual::new(scene.create_node(), VisualKind::Ellipse)
    }

    #[test]
    fn first_update_builds_everything() {
        let mut v = ellipse();
        assert!(v.topology_dirty());
        let report = v.update().unwrap();
        assert!(report.rebuilt);
        assert_eq!(v.rebuild_count(), 1);
        assert!(!v.needs_update());
        assert!(!v.handle(HandleRole::Position).unwrap().is_empty());
    }

    #[test]
    fn color_edit_leaves_position_synced() {
        let mut ctx = HeadlessContext::new();
        let mut v = ellipse();
        v.update().unwrap();
        v.bind(&mut ctx).unwrap();

        v.set_attribute("color", [1.0, 0.0, 0.0, 1.0]).unwrap();
        let report = v.update().unwrap();
        assert!(!report.rebuilt);
        assert_eq!(report.written, RoleSet::only(HandleRole::Color));
        assert!(v.handle(HandleRole::Position).unwrap().is_synced());
        assert!(!v.handle(HandleRole::Color).unwrap().is_synced());

        let uploads = v.bind(&mut ctx).unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].role, HandleRole::Color);
        assert_eq!(v.handle(HandleRole::Position).unwrap().upload_count(), 1);
    }

    #[test]
    fn color_edit_invalidates_only_color_before_update() {
        let mut ctx = HeadlessContext::new();
        let mut v = ellipse();
        v.update().unwrap();
        v.bind(&mut ctx).unwrap();

        v.set_attribute("color", [0.0, 1.0, 0.0, 1.0]).unwrap();
        assert!(!v.handle(HandleRole::Color).unwrap().is_synced());
        assert!(v.handle(HandleRole::Position).unwrap().is_synced());
        assert!(v.handle(HandleRole::Index).unwrap().is_synced());
        assert!(v.needs_update());

        // bind re-encodes before uploading, so the new color reaches the GPU.
        let uploads = v.bind(&mut ctx).unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].role, HandleRole::Color);
        assert!(!v.needs_update());
        let color = v.handle(HandleRole::Color).unwrap();
        assert!(color.is_synced());
        assert_eq!(ctx.contents(color.object().unwrap()), Some(color.data()));
    }

    #[test]
    fn topology_edit_invalidates_geometry_before_update() {
        let mut ctx = HeadlessContext::new();
        let mut v = ellipse();
        v.update().unwrap();
        v.bind(&mut ctx).unwrap();

        v.set_attribute("num_segments", 12_u32).unwrap();
        assert!(!v.handle(HandleRole::Position).unwrap().is_synced());
        assert!(!v.handle(HandleRole::Index).unwrap().is_synced());
        assert!(!v.handle(HandleRole::Color).unwrap().is_synced());
        assert_eq!(v.rebuild_count(), 1);

        let uploads = v.bind(&mut ctx).unwrap();
        assert_eq!(uploads.len(), 3);
        assert_eq!(v.rebuild_count(), 2);
    }

    #[test]
    fn topology_edit_rebuilds_all_geometry() {
        let mut v = ellipse();
        v.update().unwrap();
        v.set_attribute("num_segments", 12_u32).unwrap();
        assert!(v.topology_dirty());
        let report = v.update().unwrap();
        assert!(report.rebuilt);
        assert!(report.written.contains(HandleRole::Position));
        assert!(report.written.contains(HandleRole::Index));
        assert_eq!(v.rebuild_count(), 2);
        assert_eq!(v.draws()[0].indices, 0..36);
    }

    #[test]
    fn invalid_attributes_leave_state_unchanged() {
        let mut v = ellipse();
        let before = v.attribute("radius");
        assert_eq!(
            v.set_attribute("radius", [-1.0, 2.0]),
            Err(RenderError::InvalidAttribute {
                name: "radius".into(),
                issue: AttributeIssue::OutOfRange
            })
        );
        assert_eq!(
            v.set_attribute("radius", 3.0_f32),
            Err(RenderError::InvalidAttribute {
                name: "radius".into(),
                issue: AttributeIssue::WrongType {
                    expected: AttributeType::Vec2
                }
            })
        );
        assert!(matches!(
            v.set_attribute("bogus", 1.0_f32),
            Err(RenderError::InvalidAttribute {
                issue: AttributeIssue::Unknown,
                ..
            })
        ));
        assert_eq!(v.attribute("radius"), before);
        v.update().unwrap();
        v.set_attribute("num_segments", 2_u32).unwrap_err();
        assert!(!v.needs_update());
    }

    #[test]
    fn image_uses_texture_and_uniform_handles() {
        let mut ctx = HeadlessContext::new();
        let mut scene = Scene::new();
        let mut v = Visual::new(scene.create_node(), VisualKind::Image);
        v.update().unwrap();
        let uploads = v.bind(&mut ctx).unwrap();
        assert_eq!(uploads.len(), 5);

        v.set_attribute("opacity", 0.5_f32).unwrap();
        v.set_attribute(
            "pixels",
            AttributeValue::Pixels {
                width: 2,
                height: 1,
                rgba: vec![0; 8],
            },
        )
        .unwrap();
        v.update().unwrap();
        let kinds: Vec<_> = v.bind(&mut ctx).unwrap().iter().map(|u| u.kind).collect();
        assert_eq!(kinds, &[ResourceKind::Uniform, ResourceKind::Texture]);
        assert_eq!(v.handle(HandleRole::Texture).unwrap().extent(), (2, 1));
    }

    #[test]
    fn release_is_reported_twice() {
        let mut ctx = HeadlessContext::new();
        let mut v = ellipse();
        v.update().unwrap();
        v.bind(&mut ctx).unwrap();
        assert_eq!(ctx.live_objects(), 3);
        v.release(&mut ctx).unwrap();
        assert_eq!(ctx.live_objects(), 0);
        assert!(matches!(
            v.release(&mut ctx),
            Err(RenderError::DoubleRelease(_))
        ));
        assert!(matches!(v.bind(&mut ctx), Err(RenderError::Released(_))));
    }
}
