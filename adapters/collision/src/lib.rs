#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Geometric ray casting against the play-field walls and settled bubbles.
//!
//! [`ArenaCollider`] is a snapshot: it copies wall positions and bubble centres
//! out of the world when built and must be rebuilt after the grid changes.

use glam::Vec2;
use hexpop_core::{CollisionMask, CollisionQuery, HexLayout, HitTag, RayHit};
use hexpop_world::{query, World};

/// Circle and wall colliders derived from a grid layout.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaCollider {
    left: f32,
    right: f32,
    top: f32,
    radius: f32,
    bubbles: Vec<Vec2>,
}

impl ArenaCollider {
    /// Builds the walls that enclose the layout with no bubble colliders.
    #[must_use]
    pub fn walls(layout: &HexLayout) -> Self {
        Self {
            left: layout.left_edge(),
            right: layout.right_edge(),
            top: layout.top_edge(),
            radius: layout.radius(),
            bubbles: Vec::new(),
        }
    }

    /// Captures the walls and every settled bubble of the world.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let layout = query::layout(world);
        let mut collider = Self::walls(layout);
        collider.bubbles = query::occupancy_view(world)
            .settled_cells()
            .map(|(cell, _)| layout.grid_to_world(cell))
            .collect();
        collider
    }

    /// Number of bubble colliders in the snapshot.
    #[must_use]
    pub fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    fn wall_hits(&self, origin: Vec2, direction: Vec2) -> [Option<RayHit>; 3] {
        let left = (direction.x < 0.0 && origin.x >= self.left).then(|| {
            let distance = (self.left - origin.x) / direction.x;
            hit(origin, direction, distance, Vec2::X, HitTag::LeftWall)
        });
        let right = (direction.x > 0.0 && origin.x <= self.right).then(|| {
            let distance = (self.right - origin.x) / direction.x;
            hit(origin, direction, distance, Vec2::NEG_X, HitTag::RightWall)
        });
        let upper = (direction.y > 0.0 && origin.y <= self.top).then(|| {
            let distance = (self.top - origin.y) / direction.y;
            hit(origin, direction, distance, Vec2::NEG_Y, HitTag::UpperWall)
        });
        [left, right, upper]
    }

    fn bubble_hit(&self, origin: Vec2, direction: Vec2, centre: Vec2) -> Option<RayHit> {
        let offset = origin - centre;
        let c = offset.length_squared() - self.radius * self.radius;
        if c < 0.0 {
            // Rays starting inside a bubble ignore it.
            return None;
        }
        let b = offset.dot(direction);
        if b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let distance = -b - discriminant.sqrt();
        let point = origin + direction * distance;
        let normal = (point - centre).normalize_or_zero();
        Some(RayHit {
            point,
            normal,
            distance,
            tag: HitTag::Bubble,
        })
    }
}

impl CollisionQuery for ArenaCollider {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        let walls = mask
            .contains(CollisionMask::WALLS)
            .then(|| self.wall_hits(origin, direction))
            .into_iter()
            .flatten()
            .flatten();
        let bubbles = self
            .bubbles
            .iter()
            .filter(|_| mask.contains(CollisionMask::BUBBLES))
            .filter_map(|centre| self.bubble_hit(origin, direction, *centre));

        walls
            .chain(bubbles)
            .filter(|hit| hit.distance >= 0.0 && hit.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

fn hit(origin: Vec2, direction: Vec2, distance: f32, normal: Vec2, tag: HitTag) -> RayHit {
    RayHit {
        point: origin + direction * distance,
        normal,
        distance,
        tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexpop_core::{BubbleColor, CellCoord, Command, EntityHandle, Occupant};
    use hexpop_world::apply;

    #[test]
    fn side_walls_face_inwards() {
        let layout = HexLayout::default();
        let collider = ArenaCollider::walls(&layout);
        let origin = Vec2::new(0.0, 0.0);

        let left = collider
            .raycast(origin, Vec2::NEG_X, 100.0, CollisionMask::ALL)
            .expect("left wall");
        assert_eq!(left.tag, HitTag::LeftWall);
        assert_eq!(left.normal, Vec2::X);
        assert!((left.point.x - layout.left_edge()).abs() < 1e-5);

        let right = collider
            .raycast(origin, Vec2::X, 100.0, CollisionMask::ALL)
            .expect("right wall");
        assert_eq!(right.tag, HitTag::RightWall);
        assert_eq!(right.normal, Vec2::NEG_X);
    }

    #[test]
    fn rays_from_outside_a_wall_pass_through_it() {
        let layout = HexLayout::default();
        let collider = ArenaCollider::walls(&layout);
        let outside = Vec2::new(layout.left_edge() - 0.1, 0.0);

        let hit = collider
            .raycast(outside, Vec2::X, 100.0, CollisionMask::ALL)
            .expect("right wall");
        assert_eq!(hit.tag, HitTag::RightWall);
    }

    #[test]
    fn upper_wall_is_reported_above_the_anchor_row() {
        let layout = HexLayout::default();
        let collider = ArenaCollider::walls(&layout);
        let hit = collider
            .raycast(Vec2::ZERO, Vec2::Y, 100.0, CollisionMask::WALLS)
            .expect("upper wall");
        assert_eq!(hit.tag, HitTag::UpperWall);
        assert!((hit.point.y - layout.top_edge()).abs() < 1e-5);
    }

    #[test]
    fn settled_bubbles_block_rays_before_walls() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Occupy {
                cell,
                occupant: Occupant::settled(EntityHandle::new(1), BubbleColor::Blue),
            },
            &mut events,
        );
        let collider = ArenaCollider::from_world(&world);
        let centre = query::layout(&world).grid_to_world(cell);
        let origin = Vec2::new(centre.x, 0.0);

        assert_eq!(collider.bubble_count(), 1);
        let hit = collider
            .raycast(origin, Vec2::Y, 100.0, CollisionMask::ALL)
            .expect("bubble");
        assert_eq!(hit.tag, HitTag::Bubble);
        assert!((hit.point.y - (centre.y - 0.5)).abs() < 1e-4);
        assert!((hit.normal - Vec2::NEG_Y).length() < 1e-4);

        let walls_only = collider
            .raycast(origin, Vec2::Y, 100.0, CollisionMask::WALLS)
            .expect("upper wall");
        assert_eq!(walls_only.tag, HitTag::UpperWall);
    }

    #[test]
    fn hits_beyond_max_distance_are_ignored() {
        let collider = ArenaCollider::walls(&HexLayout::default());
        assert_eq!(
            collider.raycast(Vec2::ZERO, Vec2::Y, 1.0, CollisionMask::ALL),
            None
        );
    }
}
