use std::collections::BTreeSet;

use hexpop_core::{BubbleColor, CellCoord, Command, EntityHandle, HexLayout, Occupant};
use hexpop_system_connectivity::{floating, same_color_group};
use hexpop_world::{apply, query, World};
use proptest::prelude::*;

fn world_with(layout: HexLayout, bubbles: &[(CellCoord, BubbleColor)]) -> World {
    let mut world = World::with_layout(layout);
    let mut events = Vec::new();
    for (id, (cell, color)) in (1..).zip(bubbles.iter()) {
        apply(
            &mut world,
            Command::Occupy {
                cell: *cell,
                occupant: Occupant::settled(EntityHandle::new(id), *color),
            },
            &mut events,
        );
    }
    world
}

fn cells(raw: &[(u32, u32)]) -> BTreeSet<CellCoord> {
    raw.iter()
        .map(|&(column, row)| CellCoord::new(column, row))
        .collect()
}

#[test]
fn same_color_group_includes_start_and_stops_at_other_colors() {
    let world = world_with(
        HexLayout::default(),
        &[
            (CellCoord::new(3, 0), BubbleColor::Red),
            (CellCoord::new(4, 0), BubbleColor::Red),
            (CellCoord::new(5, 0), BubbleColor::Blue),
            (CellCoord::new(6, 0), BubbleColor::Red),
            (CellCoord::new(3, 1), BubbleColor::Red),
        ],
    );
    let view = query::occupancy_view(&world);

    let group: BTreeSet<_> = same_color_group(&view, CellCoord::new(4, 0), BubbleColor::Red)
        .into_iter()
        .collect();

    assert_eq!(
        group,
        cells(&[(3, 0), (4, 0), (3, 1)]),
        "the blue bubble at (5,0) must separate (6,0) from the group",
    );
}

#[test]
fn same_color_group_is_empty_for_mismatched_start() {
    let world = world_with(
        HexLayout::default(),
        &[(CellCoord::new(2, 0), BubbleColor::Green)],
    );
    let view = query::occupancy_view(&world);

    assert!(same_color_group(&view, CellCoord::new(2, 0), BubbleColor::Red).is_empty());
    assert!(same_color_group(&view, CellCoord::new(7, 7), BubbleColor::Green).is_empty());
}

#[test]
fn same_color_group_ignores_pending_placements() {
    let mut world = world_with(
        HexLayout::default(),
        &[(CellCoord::new(2, 0), BubbleColor::Green)],
    );
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Occupy {
            cell: CellCoord::new(3, 0),
            occupant: Occupant::pending(EntityHandle::new(99), BubbleColor::Green),
        },
        &mut events,
    );
    let view = query::occupancy_view(&world);

    assert_eq!(
        same_color_group(&view, CellCoord::new(2, 0), BubbleColor::Green),
        vec![CellCoord::new(2, 0)],
    );
}

#[test]
fn floating_reports_cells_detached_from_the_anchor_row() {
    let world = world_with(
        HexLayout::default(),
        &[
            (CellCoord::new(0, 0), BubbleColor::Red),
            (CellCoord::new(0, 1), BubbleColor::Blue),
            (CellCoord::new(5, 3), BubbleColor::Green),
            (CellCoord::new(5, 4), BubbleColor::Red),
        ],
    );
    let view = query::occupancy_view(&world);

    assert_eq!(
        floating(&view),
        vec![CellCoord::new(5, 3), CellCoord::new(5, 4)],
        "only the island below the ceiling should fall",
    );
}

#[test]
fn floating_is_empty_when_everything_hangs_from_row_zero() {
    let world = world_with(
        HexLayout::default(),
        &[
            (CellCoord::new(4, 0), BubbleColor::Red),
            (CellCoord::new(4, 1), BubbleColor::Red),
            (CellCoord::new(4, 2), BubbleColor::Blue),
            (CellCoord::new(4, 3), BubbleColor::Green),
        ],
    );
    let view = query::occupancy_view(&world);
    assert!(floating(&view).is_empty());
}

#[test]
fn removing_the_anchor_releases_the_whole_chain() {
    let mut world = world_with(
        HexLayout::default(),
        &[
            (CellCoord::new(4, 0), BubbleColor::Red),
            (CellCoord::new(4, 1), BubbleColor::Red),
            (CellCoord::new(4, 2), BubbleColor::Blue),
        ],
    );
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::Vacate {
            cell: CellCoord::new(4, 0),
            plane: hexpop_core::Plane::Settled,
        },
        &mut events,
    );

    let view = query::occupancy_view(&world);
    assert_eq!(
        floating(&view),
        vec![CellCoord::new(4, 1), CellCoord::new(4, 2)]
    );
}

fn arbitrary_board() -> impl Strategy<Value = Vec<Option<BubbleColor>>> {
    let slot = prop_oneof![
        2 => Just(None),
        1 => Just(Some(BubbleColor::Red)),
        1 => Just(Some(BubbleColor::Blue)),
        1 => Just(Some(BubbleColor::Green)),
    ];
    prop::collection::vec(slot, 6 * 5)
}

fn board_world(board: &[Option<BubbleColor>]) -> World {
    let layout = HexLayout::new(6, 5, 0.5).expect("valid layout");
    let bubbles: Vec<_> = board
        .iter()
        .enumerate()
        .filter_map(|(index, color)| {
            let cell = layout.cell_at(index)?;
            color.map(|color| (cell, color))
        })
        .collect();
    world_with(layout, &bubbles)
}

proptest! {
    #[test]
    fn same_color_groups_are_sound(board in arbitrary_board(), start in 0usize..30) {
        let world = board_world(&board);
        let view = query::occupancy_view(&world);
        let layout = view.layout();
        let start = layout.cell_at(start).expect("start inside grid");
        let Some(color) = view.settled_color(start) else {
            prop_assert!(same_color_group(&view, start, BubbleColor::Red).is_empty());
            return Ok(());
        };

        let group = same_color_group(&view, start, color);
        let members: BTreeSet<_> = group.iter().copied().collect();
        prop_assert_eq!(members.len(), group.len());
        prop_assert!(members.contains(&start));

        for cell in &group {
            prop_assert_eq!(view.settled_color(*cell), Some(color));
            for neighbor in layout.neighbors(*cell) {
                if view.settled_color(neighbor) == Some(color) {
                    prop_assert!(
                        members.contains(&neighbor),
                        "group is not closed at {:?}",
                        neighbor
                    );
                }
            }
        }
    }

    #[test]
    fn support_is_closed_over_neighbors(board in arbitrary_board()) {
        let world = board_world(&board);
        let view = query::occupancy_view(&world);
        let layout = view.layout();
        let falling: BTreeSet<_> = floating(&view).into_iter().collect();

        for (cell, _) in view.settled_cells() {
            if cell.row() == 0 {
                prop_assert!(!falling.contains(&cell));
            }
            if falling.contains(&cell) {
                for neighbor in layout.neighbors(cell) {
                    if view.settled(neighbor).is_some() {
                        prop_assert!(
                            falling.contains(&neighbor),
                            "{:?} falls while touching supported {:?}",
                            cell,
                            neighbor
                        );
                    }
                }
            }
        }

        for cell in &falling {
            prop_assert!(view.settled(*cell).is_some());
        }

        let anchored = anchored_by_relaxation(&view);
        for (cell, _) in view.settled_cells() {
            prop_assert_eq!(
                falling.contains(&cell),
                !anchored.contains(&cell),
                "{:?} disagrees with an independent reachability walk",
                cell
            );
        }
    }
}

// Grows the anchored set from row 0 until no settled neighbor can be added.
fn anchored_by_relaxation(view: &query::OccupancyView<'_>) -> BTreeSet<CellCoord> {
    let layout = view.layout();
    let settled: Vec<CellCoord> = view.settled_cells().map(|(cell, _)| cell).collect();
    let mut anchored: BTreeSet<CellCoord> = settled
        .iter()
        .copied()
        .filter(|cell| cell.row() == 0)
        .collect();

    loop {
        let before = anchored.len();
        for cell in &settled {
            if !anchored.contains(cell)
                && layout
                    .neighbors(*cell)
                    .into_iter()
                    .any(|neighbor| anchored.contains(&neighbor))
            {
                let _ = anchored.insert(*cell);
            }
        }
        if anchored.len() == before {
            return anchored;
        }
    }
}

#[test]
fn island_without_an_anchor_is_reported_in_full() {
    let world = world_with(
        HexLayout::new(6, 5, 0.5).expect("valid layout"),
        &[
            (CellCoord::new(1, 0), BubbleColor::Red),
            (CellCoord::new(2, 2), BubbleColor::Blue),
            (CellCoord::new(3, 2), BubbleColor::Green),
            (CellCoord::new(2, 3), BubbleColor::Red),
        ],
    );
    let view = query::occupancy_view(&world);

    let falling: BTreeSet<_> = floating(&view).into_iter().collect();
    assert_eq!(falling, cells(&[(2, 2), (3, 2), (2, 3)]));
    assert_eq!(
        falling,
        view.settled_cells()
            .map(|(cell, _)| cell)
            .filter(|cell| !anchored_by_relaxation(&view).contains(cell))
            .collect::<BTreeSet<_>>(),
    );
}
