#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flood-fill queries over the settled plane of the bubble grid.
//!
//! Both match discovery and support discovery are breadth-first traversals
//! that differ only in their seed cells and in which neighbors they accept.
//! They share [`flood_fill`] so adjacency is derived from a single place,
//! [`HexLayout::neighbors`].

use std::collections::VecDeque;

use hexpop_core::{BubbleColor, CellCoord, HexLayout};
use hexpop_world::query::OccupancyView;

/// Breadth-first traversal from every accepted seed simultaneously.
///
/// Seeds and neighbors are visited only when `accept` returns `true`. Cells
/// are returned in visitation order and never repeat.
pub fn flood_fill<I, F>(layout: &HexLayout, seeds: I, mut accept: F) -> Vec<CellCoord>
where
    I: IntoIterator<Item = CellCoord>,
    F: FnMut(CellCoord) -> bool,
{
    let mut visited = vec![false; layout.cell_count()];
    let mut reached = Vec::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        if mark(layout, &mut visited, seed) && accept(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(cell) = queue.pop_front() {
        reached.push(cell);

        for neighbor in layout.neighbors(cell) {
            if mark(layout, &mut visited, neighbor) && accept(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    reached
}

/// Connected group of settled bubbles sharing `color` that contains `start`.
///
/// Returns an empty group when `start` does not hold a settled bubble of that
/// color, so the result is always a subset of matching cells.
#[must_use]
pub fn same_color_group(
    view: &OccupancyView<'_>,
    start: CellCoord,
    color: BubbleColor,
) -> Vec<CellCoord> {
    flood_fill(view.layout(), [start], |cell| {
        view.settled_color(cell) == Some(color)
    })
}

/// Settled bubbles that are not connected to the anchor row.
///
/// Support is recomputed from scratch on every call. The result is sorted in
/// row-major order.
#[must_use]
pub fn floating(view: &OccupancyView<'_>) -> Vec<CellCoord> {
    let layout = view.layout();
    let anchors = view
        .settled_cells()
        .map(|(cell, _)| cell)
        .take_while(|cell| cell.row() == 0);
    let supported = flood_fill(layout, anchors, |cell| view.settled(cell).is_some());

    let mut is_supported = vec![false; layout.cell_count()];
    for cell in supported {
        if let Some(slot) = layout.index(cell).and_then(|index| is_supported.get_mut(index)) {
            *slot = true;
        }
    }

    view.settled_cells()
        .map(|(cell, _)| cell)
        .filter(|cell| {
            layout
                .index(*cell)
                .and_then(|index| is_supported.get(index).copied())
                != Some(true)
        })
        .collect()
}

// Marks the cell as visited, returning `false` when it was already seen or lies outside the grid.
fn mark(layout: &HexLayout, visited: &mut [bool], cell: CellCoord) -> bool {
    match layout.index(cell).and_then(|index| visited.get_mut(index)) {
        Some(seen) if !*seen => {
            *seen = true;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_fill_visits_seeds_before_neighbors() {
        let layout = HexLayout::new(5, 3, 0.5).expect("valid layout");
        let seeds = [CellCoord::new(0, 0), CellCoord::new(4, 0)];
        let reached = flood_fill(&layout, seeds, |cell| cell.row() == 0);

        assert_eq!(&reached[..2], &seeds);
        assert_eq!(reached.len(), 5);
    }

    #[test]
    fn flood_fill_ignores_duplicate_and_outside_seeds() {
        let layout = HexLayout::new(3, 3, 0.5).expect("valid layout");
        let seeds = [
            CellCoord::new(1, 1),
            CellCoord::new(1, 1),
            CellCoord::new(9, 9),
        ];
        let reached = flood_fill(&layout, seeds, |cell| cell == CellCoord::new(1, 1));
        assert_eq!(reached, vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn rejected_seed_yields_nothing() {
        let layout = HexLayout::default();
        let reached = flood_fill(&layout, [CellCoord::new(0, 0)], |_| false);
        assert!(reached.is_empty());
    }
}
