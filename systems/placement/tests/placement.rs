use glam::Vec2;
use hexpop_core::{BubbleColor, CellCoord, Command, EntityHandle, HexLayout, Occupant};
use hexpop_system_placement::resolve_target;
use hexpop_world::{apply, query, World};
use proptest::prelude::*;

fn world_with(cells: &[CellCoord]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for (id, cell) in (1..).zip(cells.iter()) {
        apply(
            &mut world,
            Command::Occupy {
                cell: *cell,
                occupant: Occupant::settled(EntityHandle::new(id), BubbleColor::Blue),
            },
            &mut events,
        );
    }
    world
}

#[test]
fn occupied_snap_falls_back_to_the_nearest_free_neighbor() {
    let world = world_with(&[
        CellCoord::new(3, 0),
        CellCoord::new(4, 0),
        CellCoord::new(5, 0),
    ]);
    let layout = query::layout(&world);
    let below_gap = layout.origin() + Vec2::new(4.5, -0.357);

    assert_eq!(layout.world_to_grid(below_gap), CellCoord::new(5, 0));
    assert_eq!(
        resolve_target(&query::occupancy_view(&world), below_gap, Vec2::Y),
        Some(CellCoord::new(4, 1)),
        "the slot under the gap is closer than (5,1) or (6,0)",
    );
}

#[test]
fn fully_enclosed_cell_resolves_to_none() {
    let layout = HexLayout::default();
    let centre = CellCoord::new(5, 5);
    let mut cells: Vec<_> = layout.neighbors(centre).collect();
    cells.push(centre);
    let world = world_with(&cells);

    let contact = layout.grid_to_world(centre);
    assert_eq!(
        resolve_target(&query::occupancy_view(&world), contact, Vec2::Y),
        None
    );
}

#[test]
fn equidistant_neighbors_resolve_in_enumeration_order() {
    let centre = CellCoord::new(5, 4);
    let world = world_with(&[
        centre,
        CellCoord::new(5, 3),
        CellCoord::new(4, 3),
        CellCoord::new(4, 5),
        CellCoord::new(5, 5),
    ]);
    let layout = query::layout(&world);

    // Only east and west remain free and both are one spacing away; east is enumerated first.
    let contact = layout.grid_to_world(centre);
    assert_eq!(
        resolve_target(&query::occupancy_view(&world), contact, Vec2::Y),
        Some(CellCoord::new(6, 4))
    );
}

proptest! {
    #[test]
    fn resolution_picks_the_nearest_free_neighbor(
        column in 1u32..10,
        row in 1u32..11,
        dx in -0.45f32..0.45,
        dy in -0.4f32..0.4,
        blocked in prop::collection::vec(any::<bool>(), 6),
    ) {
        let layout = HexLayout::default();
        let target = CellCoord::new(column, row);
        let neighbors: Vec<_> = layout.neighbors(target).collect();
        let mut occupied = vec![target];
        occupied.extend(
            neighbors
                .iter()
                .zip(blocked.iter())
                .filter(|(_, blocked)| **blocked)
                .map(|(cell, _)| *cell),
        );
        let world = world_with(&occupied);
        let contact = layout.grid_to_world(target) + Vec2::new(dx, dy);
        prop_assume!(layout.world_to_grid(contact) == target);

        let resolved = resolve_target(&query::occupancy_view(&world), contact, Vec2::Y);
        let free: Vec<_> = neighbors
            .iter()
            .copied()
            .filter(|cell| !occupied.contains(cell))
            .collect();

        match resolved {
            None => prop_assert!(free.is_empty()),
            Some(cell) => {
                prop_assert!(free.contains(&cell));
                let chosen = layout.grid_to_world(cell).distance_squared(contact);
                for other in &free {
                    prop_assert!(chosen <= layout.grid_to_world(*other).distance_squared(contact));
                }
            }
        }
    }
}
