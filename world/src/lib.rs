#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative bubble grid state.
//!
//! The world owns the two occupancy planes of every cell and the geometry used
//! to address them. It is mutated exclusively through [`apply`], which reports
//! every change as an [`Event`] so callers can keep entity lifetimes in sync.

use hexpop_core::{CellCoord, Command, Event, HexLayout, Occupant, OccupancyError, Plane};
use tracing::{debug, error};

/// Represents the authoritative bubble grid.
#[derive(Debug)]
pub struct World {
    layout: HexLayout,
    settled: OccupancyPlane,
    pending: OccupancyPlane,
}

impl World {
    /// Creates an empty world using the default grid geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(HexLayout::default())
    }

    /// Creates an empty world using the provided grid geometry.
    #[must_use]
    pub fn with_layout(layout: HexLayout) -> Self {
        Self {
            settled: OccupancyPlane::new(&layout),
            pending: OccupancyPlane::new(&layout),
            layout,
        }
    }

    fn plane(&self, plane: Plane) -> &OccupancyPlane {
        match plane {
            Plane::Settled => &self.settled,
            Plane::Pending => &self.pending,
        }
    }

    fn plane_mut(&mut self, plane: Plane) -> &mut OccupancyPlane {
        match plane {
            Plane::Settled => &mut self.settled,
            Plane::Pending => &mut self.pending,
        }
    }

    fn release_all(&mut self, out_events: &mut Vec<Event>) {
        for cell in self.layout.cells() {
            for plane in [Plane::Settled, Plane::Pending] {
                if let Some(occupant) = self.plane_mut(plane).take(cell) {
                    out_events.push(Event::CellVacated { cell, occupant });
                }
            }
        }
    }

    fn occupy(&mut self, cell: CellCoord, occupant: Occupant, out_events: &mut Vec<Event>) {
        if !self.layout.contains(cell) {
            reject(cell, occupant.plane, OccupancyError::OutOfBounds, out_events);
            return;
        }

        match occupant.plane {
            Plane::Pending => {
                if self.settled.get(cell).is_some() {
                    reject(cell, Plane::Pending, OccupancyError::PendingOverSettled, out_events);
                    return;
                }
            }
            Plane::Settled => {
                if let Some(pending) = self.pending.take(cell) {
                    displaced(cell, pending, occupant, out_events);
                }
            }
        }

        if let Some(previous) = self.plane_mut(occupant.plane).replace(cell, occupant) {
            if previous.plane == Plane::Settled && previous.color != occupant.color {
                error!(
                    column = cell.column(),
                    row = cell.row(),
                    previous = ?previous.color,
                    incoming = ?occupant.color,
                    "settled bubble overwritten with a different color"
                );
            }
            displaced(cell, previous, occupant, out_events);
        }

        out_events.push(Event::CellOccupied { cell, occupant });
    }

    fn vacate(&mut self, cell: CellCoord, plane: Plane, out_events: &mut Vec<Event>) {
        if !self.layout.contains(cell) {
            reject(cell, plane, OccupancyError::OutOfBounds, out_events);
            return;
        }

        match self.plane_mut(plane).take(cell) {
            Some(occupant) => out_events.push(Event::CellVacated { cell, occupant }),
            None => reject(cell, plane, OccupancyError::Empty, out_events),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { layout } => {
            world.release_all(out_events);
            world.layout = layout;
            world.settled = OccupancyPlane::new(&layout);
            world.pending = OccupancyPlane::new(&layout);
            out_events.push(Event::GridConfigured {
                columns: layout.columns(),
                rows: layout.rows(),
            });
        }
        Command::ClearGrid => world.release_all(out_events),
        Command::Occupy { cell, occupant } => world.occupy(cell, occupant, out_events),
        Command::Vacate { cell, plane } => world.vacate(cell, plane, out_events),
    }
}

fn reject(cell: CellCoord, plane: Plane, reason: OccupancyError, out_events: &mut Vec<Event>) {
    debug!(
        column = cell.column(),
        row = cell.row(),
        ?plane,
        ?reason,
        "occupancy command rejected"
    );
    out_events.push(Event::OccupancyRejected {
        cell,
        plane,
        reason,
    });
}

fn displaced(
    cell: CellCoord,
    previous: Occupant,
    incoming: Occupant,
    out_events: &mut Vec<Event>,
) {
    // Re-placing the same entity on another plane moves it rather than replacing it.
    if previous.handle != incoming.handle {
        out_events.push(Event::OccupantDisplaced {
            cell,
            occupant: previous,
        });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{OccupancyPlane, World};
    use hexpop_core::{BubbleColor, CellCoord, HexLayout, Occupant, Plane};

    /// Provides read-only access to the grid geometry.
    #[must_use]
    pub fn layout(world: &World) -> &HexLayout {
        &world.layout
    }

    /// Exposes a read-only view of both occupancy planes.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            layout: &world.layout,
            settled: &world.settled,
            pending: &world.pending,
        }
    }

    /// Returns the occupant stored on the given plane of a cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord, plane: Plane) -> Option<Occupant> {
        world.plane(plane).get(cell)
    }

    /// Read-only view into the occupancy planes.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        layout: &'a HexLayout,
        settled: &'a OccupancyPlane,
        pending: &'a OccupancyPlane,
    }

    impl<'a> OccupancyView<'a> {
        /// Geometry of the grid the view was captured from.
        #[must_use]
        pub fn layout(&self) -> &'a HexLayout {
            self.layout
        }

        /// Settled bubble in the cell, if any.
        #[must_use]
        pub fn settled(&self, cell: CellCoord) -> Option<Occupant> {
            self.settled.get(cell)
        }

        /// Pending placement in the cell, if any.
        #[must_use]
        pub fn pending(&self, cell: CellCoord) -> Option<Occupant> {
            self.pending.get(cell)
        }

        /// Color of the settled bubble in the cell, if any.
        #[must_use]
        pub fn settled_color(&self, cell: CellCoord) -> Option<BubbleColor> {
            self.settled(cell).map(|occupant| occupant.color)
        }

        /// Reports whether either plane holds an occupant.
        ///
        /// Cells outside the grid report `true` so that nothing is ever placed there.
        #[must_use]
        pub fn is_occupied(&self, cell: CellCoord) -> bool {
            if !self.layout.contains(cell) {
                return true;
            }
            self.settled.get(cell).is_some() || self.pending.get(cell).is_some()
        }

        /// Iterates settled bubbles in row-major order.
        pub fn settled_cells(&self) -> impl Iterator<Item = (CellCoord, Occupant)> + 'a {
            let layout = self.layout;
            self.settled
                .cells()
                .iter()
                .enumerate()
                .filter_map(move |(index, slot)| {
                    let occupant = (*slot)?;
                    Some((layout.cell_at(index)?, occupant))
                })
        }

        /// Number of settled bubbles.
        #[must_use]
        pub fn settled_count(&self) -> usize {
            self.settled.cells().iter().flatten().count()
        }

        /// Provides the dimensions of the underlying grid.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            (self.layout.columns(), self.layout.rows())
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyPlane {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Occupant>>,
}

impl OccupancyPlane {
    fn new(layout: &HexLayout) -> Self {
        Self {
            columns: layout.columns(),
            rows: layout.rows(),
            cells: vec![None; layout.cell_count()],
        }
    }

    fn get(&self, cell: CellCoord) -> Option<Occupant> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn replace(&mut self, cell: CellCoord, occupant: Occupant) -> Option<Occupant> {
        let index = self.index(cell)?;
        self.cells
            .get_mut(index)
            .and_then(|slot| slot.replace(occupant))
    }

    fn take(&mut self, cell: CellCoord) -> Option<Occupant> {
        let index = self.index(cell)?;
        self.cells.get_mut(index).and_then(Option::take)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn cells(&self) -> &[Option<Occupant>] {
        &self.cells
    }
}
