#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure trajectory prediction for fired bubbles.
//!
//! The simulator marches a projectile through the play field using the
//! [`CollisionQuery`] supplied by an adapter, mirroring off side walls and
//! stopping at the first bubble or the upper wall.

use glam::Vec2;
use hexpop_core::{CollisionMask, CollisionQuery, HitTag, RayHit};

/// Tuning values that bound a trajectory prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySettings {
    /// Total path length the simulation may cover.
    pub max_distance: f32,
    /// Maximum number of ray casts, which also caps the number of wall reflections.
    pub max_bounces: u32,
    /// Perpendicular offset of the two side rays cast next to the centreline.
    pub ray_half_width: f32,
    /// Distance the origin is moved along the reflected direction after a bounce.
    pub wall_nudge: f32,
    /// Smallest permitted launch angle, in degrees from the +x axis.
    pub min_aim_degrees: f32,
    /// Largest permitted launch angle, in degrees from the +x axis.
    pub max_aim_degrees: f32,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            max_distance: 30.0,
            max_bounces: 3,
            ray_half_width: 0.15,
            wall_nudge: 0.01,
            min_aim_degrees: 20.0,
            max_aim_degrees: 160.0,
        }
    }
}

/// Terminal contact of a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Point on the trajectory centreline where the projectile stops.
    pub point: Vec2,
    /// Unit direction of travel when the contact happened.
    pub direction: Vec2,
    /// Surface that stopped the projectile.
    pub tag: HitTag,
}

/// Predicted path of a projectile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Polyline vertices starting at the launch origin.
    pub points: Vec<Vec2>,
    /// Where the projectile stops, or `None` when it never touched a terminal surface.
    pub contact: Option<Contact>,
}

impl Trajectory {
    /// Total length of the polyline.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|segment| segment[0].distance(segment[1]))
            .sum()
    }

    /// Position after travelling `distance` along the polyline.
    ///
    /// Distances beyond the end of the path return the final vertex.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Option<Vec2> {
        let mut remaining = distance.max(0.0);
        for segment in self.points.windows(2) {
            let (start, end) = (segment[0], segment[1]);
            let length = start.distance(end);
            if remaining <= length {
                if length <= f32::EPSILON {
                    return Some(end);
                }
                return Some(start.lerp(end, remaining / length));
            }
            remaining -= length;
        }
        self.points.last().copied()
    }
}

/// Clamps a raw aim direction into the upward firing cone.
///
/// Directions pointing sideways or downwards snap to the cone edge on their
/// side; a zero vector snaps to the right edge. The result is a unit vector.
#[must_use]
pub fn clamp_aim(direction: Vec2, min_degrees: f32, max_degrees: f32) -> Vec2 {
    let degrees = if direction.y <= 0.0 || !direction.is_finite() {
        if direction.x < 0.0 {
            max_degrees
        } else {
            min_degrees
        }
    } else {
        direction
            .y
            .atan2(direction.x)
            .to_degrees()
            .clamp(min_degrees, max_degrees)
    };
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Mirrors `direction` about a surface with the given unit normal.
#[must_use]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Predicts the path of a projectile launched from `origin` towards `direction`.
///
/// The direction is first clamped into the firing cone. Side walls reflect the
/// path; a bubble or the upper wall ends it with a [`Contact`]. When the
/// distance or bounce budget runs out the path is extended in a straight line
/// by whatever distance remains and no contact is reported.
pub fn simulate(
    collision: &dyn CollisionQuery,
    origin: Vec2,
    direction: Vec2,
    settings: &TrajectorySettings,
) -> Trajectory {
    let mut position = origin;
    let mut heading = clamp_aim(direction, settings.min_aim_degrees, settings.max_aim_degrees);
    let mut remaining = settings.max_distance.max(0.0);
    let mut points = vec![origin];

    for _ in 0..settings.max_bounces {
        if remaining <= 0.0 {
            return Trajectory {
                points,
                contact: None,
            };
        }

        let Some(hit) = nearest_hit(collision, position, heading, remaining, settings) else {
            points.push(position + heading * remaining);
            return Trajectory {
                points,
                contact: None,
            };
        };

        let point = position + heading * hit.distance;
        points.push(point);
        remaining -= hit.distance;

        if !hit.tag.is_side_wall() {
            return Trajectory {
                points,
                contact: Some(Contact {
                    point,
                    direction: heading,
                    tag: hit.tag,
                }),
            };
        }

        heading = reflect(heading, hit.normal).normalize_or_zero();
        position = point + heading * settings.wall_nudge;
    }

    if remaining > 0.0 {
        points.push(position + heading * remaining);
    }
    Trajectory {
        points,
        contact: None,
    }
}

// Casts the centreline and both side rays, keeping the hit that travelled the least.
fn nearest_hit(
    collision: &dyn CollisionQuery,
    position: Vec2,
    heading: Vec2,
    max_distance: f32,
    settings: &TrajectorySettings,
) -> Option<RayHit> {
    let side = heading.perp() * settings.ray_half_width;
    [position, position - side, position + side]
        .into_iter()
        .filter_map(|origin| collision.raycast(origin, heading, max_distance, CollisionMask::ALL))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
