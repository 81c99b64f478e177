#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless entity registry standing in for a renderer.
//!
//! [`EntityArena`] stores one plain record per entity, keyed by the handle it
//! allocated. Drop animations are modelled as a state flag; calling
//! [`EntityArena::finish_drops`] plays the role of the animation completing and
//! removes every dropping entity.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use hexpop_core::{BubbleColor, EntityFactory, EntityHandle, FactoryError};
use tracing::debug;

/// Lifecycle state of an entity record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityState {
    /// Visible at its recorded position.
    Alive,
    /// Falling towards `target`; removed when the animation finishes.
    Dropping {
        /// Final world position of the drop animation.
        target: Vec2,
    },
}

/// Plain data describing a single renderable bubble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityRecord {
    /// Color the entity was created with.
    pub color: BubbleColor,
    /// Last world position assigned to the entity.
    pub position: Vec2,
    /// Current opacity.
    pub alpha: f32,
    /// Lifecycle state.
    pub state: EntityState,
}

/// Registry that stores entity records and manages handle allocation.
#[derive(Debug)]
pub struct EntityArena {
    entries: BTreeMap<EntityHandle, EntityRecord>,
    next_handle: EntityHandle,
    unsupported: BTreeSet<BubbleColor>,
}

impl EntityArena {
    /// Creates an empty arena able to produce every color.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_handle: EntityHandle::new(1),
            unsupported: BTreeSet::new(),
        }
    }

    /// Removes the template for `color`, making [`EntityFactory::create`] fail for it.
    #[must_use]
    pub fn without_color(mut self, color: BubbleColor) -> Self {
        let _ = self.unsupported.insert(color);
        self
    }

    /// Record stored for the handle, if the entity still exists.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&EntityRecord> {
        self.entries.get(&handle)
    }

    /// Number of live or dropping entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the arena holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates every record in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &EntityRecord)> {
        self.entries.iter().map(|(handle, record)| (*handle, record))
    }

    /// Number of entities currently playing a drop animation.
    #[must_use]
    pub fn dropping_count(&self) -> usize {
        self.entries
            .values()
            .filter(|record| matches!(record.state, EntityState::Dropping { .. }))
            .count()
    }

    /// Completes every running drop animation, removing the dropped entities.
    pub fn finish_drops(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, record| record.state == EntityState::Alive);
        before - self.entries.len()
    }

    fn allocate(&mut self) -> EntityHandle {
        let handle = self.next_handle;
        self.next_handle = EntityHandle::new(handle.get().wrapping_add(1));
        handle
    }

    fn record_mut(&mut self, handle: EntityHandle, operation: &str) -> Option<&mut EntityRecord> {
        let record = self.entries.get_mut(&handle);
        if record.is_none() {
            debug!(handle = handle.get(), operation, "request for unknown entity ignored");
        }
        record
    }
}

impl Default for EntityArena {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityFactory for EntityArena {
    fn create(&mut self, color: BubbleColor, position: Vec2) -> Result<EntityHandle, FactoryError> {
        if self.unsupported.contains(&color) {
            return Err(FactoryError::UnsupportedColor(color));
        }

        let handle = self.allocate();
        let _ = self.entries.insert(
            handle,
            EntityRecord {
                color,
                position,
                alpha: 1.0,
                state: EntityState::Alive,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: EntityHandle) {
        if self.entries.remove(&handle).is_none() {
            debug!(handle = handle.get(), "destroy of unknown entity ignored");
        }
    }

    fn animate_drop(&mut self, handle: EntityHandle, target: Vec2) {
        if let Some(record) = self.record_mut(handle, "animate_drop") {
            record.state = EntityState::Dropping { target };
        }
    }

    fn set_alpha(&mut self, handle: EntityHandle, alpha: f32) {
        if let Some(record) = self.record_mut(handle, "set_alpha") {
            record.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn set_position(&mut self, handle: EntityHandle, position: Vec2) {
        if let Some(record) = self.record_mut(handle, "set_position") {
            record.position = position;
        }
    }
}
