//! Tunable parameters for the grid geometry and the shooter.

use std::time::Duration;

use hexpop_core::{
    HexLayout, LayoutError, DEFAULT_COLUMNS, DEFAULT_ORIGIN_LIFT, DEFAULT_RADIUS, DEFAULT_ROWS,
};
use hexpop_system_trajectory::TrajectorySettings;
use serde::Deserialize;

/// Geometry used when no level dictates the grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Bubble radius in world units.
    pub radius: f32,
    /// Height added to the origin of row zero.
    pub origin_lift: f32,
}

impl GridConfig {
    /// Builds the layout described by this configuration.
    pub fn layout(&self) -> Result<HexLayout, LayoutError> {
        self.layout_with_dimensions(self.columns, self.rows)
    }

    /// Builds a layout with this radius and lift but caller-provided dimensions.
    pub fn layout_with_dimensions(
        &self,
        columns: u32,
        rows: u32,
    ) -> Result<HexLayout, LayoutError> {
        HexLayout::with_origin_lift(columns, rows, self.radius, self.origin_lift)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            radius: DEFAULT_RADIUS,
            origin_lift: DEFAULT_ORIGIN_LIFT,
        }
    }
}

/// Aiming, flight and match parameters of the shooter.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Path length covered by trajectory prediction.
    pub max_prediction_distance: f32,
    /// Ray casts allowed per prediction, capping wall reflections.
    pub max_bounces: u32,
    /// Offset of the two side rays from the centreline.
    pub ray_half_width: f32,
    /// Distance a reflected ray is moved off the wall.
    pub wall_nudge: f32,
    /// Lower edge of the firing cone in degrees.
    pub min_aim_degrees: f32,
    /// Upper edge of the firing cone in degrees.
    pub max_aim_degrees: f32,
    /// Projectile speed in world units per second.
    pub shot_speed: f32,
    /// Seconds the fire button must be held before a release fires.
    pub min_aim_duration: f32,
    /// Seconds after which an unresolved projectile is discarded.
    pub max_projectile_lifetime: f32,
    /// Smallest same-colored group that pops.
    pub min_match: usize,
    /// Vertical distance covered by a drop animation.
    pub drop_distance: f32,
    /// Opacity of the aim preview bubble.
    pub preview_alpha: f32,
    /// Seed of the magazine color generator.
    pub magazine_seed: u64,
}

impl ShooterConfig {
    /// Trajectory limits derived from this configuration.
    #[must_use]
    pub fn trajectory_settings(&self) -> TrajectorySettings {
        TrajectorySettings {
            max_distance: self.max_prediction_distance,
            max_bounces: self.max_bounces,
            ray_half_width: self.ray_half_width,
            wall_nudge: self.wall_nudge,
            min_aim_degrees: self.min_aim_degrees,
            max_aim_degrees: self.max_aim_degrees,
        }
    }

    /// Minimum hold time as a duration.
    #[must_use]
    pub fn min_aim_hold(&self) -> Duration {
        seconds(self.min_aim_duration)
    }

    /// Projectile lifetime as a duration.
    #[must_use]
    pub fn projectile_lifetime(&self) -> Duration {
        seconds(self.max_projectile_lifetime)
    }
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            max_prediction_distance: 30.0,
            max_bounces: 3,
            ray_half_width: 0.15,
            wall_nudge: 0.01,
            min_aim_degrees: 20.0,
            max_aim_degrees: 160.0,
            shot_speed: 10.0,
            min_aim_duration: 0.2,
            max_projectile_lifetime: 5.0,
            min_match: 3,
            drop_distance: 10.0,
            preview_alpha: 0.5,
            magazine_seed: 0,
        }
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shooter_defaults_match_trajectory_defaults() {
        assert_eq!(
            ShooterConfig::default().trajectory_settings(),
            TrajectorySettings::default()
        );
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: ShooterConfig =
            toml::from_str("shot_speed = 20.0\nmin_match = 4\n").expect("valid toml");
        assert_eq!(config.shot_speed, 20.0);
        assert_eq!(config.min_match, 4);
        assert_eq!(config.max_bounces, 3);
        assert_eq!(config.min_aim_hold(), Duration::from_secs_f32(0.2));
    }

    #[test]
    fn default_grid_builds_the_default_layout() {
        assert_eq!(GridConfig::default().layout(), Ok(HexLayout::default()));
    }

    #[test]
    fn zero_radius_grid_is_rejected() {
        let config = GridConfig {
            radius: 0.0,
            ..GridConfig::default()
        };
        assert_eq!(config.layout(), Err(LayoutError::InvalidRadius(0.0)));
    }
}
