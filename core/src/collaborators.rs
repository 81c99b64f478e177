//! Interfaces the core consumes but never implements itself.

use std::ops::BitOr;

use glam::Vec2;

use crate::{BubbleColor, EntityHandle, FactoryError};

/// Presentation-side registry that owns renderable entity lifetimes.
///
/// The core only ever issues requests through this trait; animations it
/// starts are fire-and-forget and never awaited.
pub trait EntityFactory {
    /// Instantiates a bubble entity of the given color at a world position.
    fn create(&mut self, color: BubbleColor, position: Vec2) -> Result<EntityHandle, FactoryError>;

    /// Removes the entity immediately.
    fn destroy(&mut self, handle: EntityHandle);

    /// Starts a drop animation towards `target`; the entity removes itself when done.
    fn animate_drop(&mut self, handle: EntityHandle, target: Vec2);

    /// Sets the entity opacity in the range `0.0..=1.0`.
    fn set_alpha(&mut self, handle: EntityHandle, alpha: f32);

    /// Moves the entity to a new world position.
    fn set_position(&mut self, handle: EntityHandle, position: Vec2);
}

/// Classification of the surface struck by a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitTag {
    /// Reflective boundary on the left side of the play field.
    LeftWall,
    /// Reflective boundary on the right side of the play field.
    RightWall,
    /// Terminal boundary above the anchor row.
    UpperWall,
    /// A settled bubble.
    Bubble,
}

impl HitTag {
    /// Reports whether a trajectory bounces off this surface.
    #[must_use]
    pub const fn is_side_wall(self) -> bool {
        matches!(self, Self::LeftWall | Self::RightWall)
    }
}

/// Nearest intersection reported by a [`CollisionQuery`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World position of the intersection.
    pub point: Vec2,
    /// Unit surface normal at the intersection, facing the ray origin.
    pub normal: Vec2,
    /// Distance travelled along the ray before the intersection.
    pub distance: f32,
    /// Surface that was struck.
    pub tag: HitTag,
}

/// Set of collidable classes a ray cast should consider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CollisionMask(u8);

impl CollisionMask {
    /// Side and upper boundary walls.
    pub const WALLS: Self = Self(0b01);
    /// Settled bubbles.
    pub const BUBBLES: Self = Self(0b10);
    /// Every collidable class.
    pub const ALL: Self = Self(0b11);

    /// Reports whether every class in `other` is part of this mask.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CollisionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Opaque ray casting service backing trajectory prediction.
pub trait CollisionQuery {
    /// Casts a ray and returns the nearest hit within `max_distance`, if any.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<RayHit>;
}

/// Aim origin and direction already projected into world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aim {
    /// Launch point of the projectile.
    pub origin: Vec2,
    /// Raw aim direction; need not be normalised or inside the firing cone.
    pub direction: Vec2,
}

/// Discrete fire button transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireSignal {
    /// The player started aiming.
    Pressed,
    /// The player let go; fires when the aim is valid, cancels otherwise.
    Released,
}

/// Per-tick source of aiming input.
pub trait AimController {
    /// Current aim, or `None` when no direction is available this tick.
    fn aim(&mut self) -> Option<Aim>;

    /// Fire transition observed since the previous tick, if any.
    fn take_fire_signal(&mut self) -> Option<FireSignal>;
}
