#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snaps continuous contact points onto free grid cells.

use glam::Vec2;
use hexpop_core::CellCoord;
use hexpop_world::query::OccupancyView;

/// Resolves the cell a projectile touching `contact` should attach to.
///
/// The contact snaps to its nearest cell. When that cell is taken, the free
/// neighbor closest to the contact point is chosen instead, with ties going to
/// the earlier neighbor in enumeration order. Returns `None` when the snapped
/// cell and all of its neighbors are occupied. The direction of travel is
/// accepted for callers that carry it but does not influence the result.
#[must_use]
pub fn resolve_target(
    view: &OccupancyView<'_>,
    contact: Vec2,
    _direction: Vec2,
) -> Option<CellCoord> {
    let layout = view.layout();
    let cell = layout.world_to_grid(contact);
    if !layout.contains(cell) {
        return None;
    }

    if !view.is_occupied(cell) {
        return Some(cell);
    }

    let mut best: Option<(CellCoord, f32)> = None;
    for neighbor in layout.neighbors(cell) {
        if view.is_occupied(neighbor) {
            continue;
        }
        let distance = layout.grid_to_world(neighbor).distance_squared(contact);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((neighbor, distance));
        }
    }

    best.map(|(neighbor, _)| neighbor)
}
