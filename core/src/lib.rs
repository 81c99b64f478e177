#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the bubble grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The orchestrator submits
//! [`Command`] values describing desired grid mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what changed. Systems query immutable snapshots of the
//! grid and never mutate it directly.

mod collaborators;
mod hex;
mod level;

pub use collaborators::{
    Aim, AimController, CollisionMask, CollisionQuery, EntityFactory, FireSignal, HitTag, RayHit,
};
pub use hex::{HexLayout, DEFAULT_COLUMNS, DEFAULT_ORIGIN_LIFT, DEFAULT_RADIUS, DEFAULT_ROWS};
pub use level::{BubbleCell, LevelLayout};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Colors a bubble can carry.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BubbleColor {
    /// Red bubble.
    #[default]
    Red,
    /// Blue bubble.
    Blue,
    /// Green bubble.
    Green,
}

impl BubbleColor {
    /// Every color in declaration order.
    pub const ALL: [BubbleColor; 3] = [Self::Red, Self::Blue, Self::Green];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell; row zero is the anchor row.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the cell sits on a row shifted right by one radius.
    #[must_use]
    pub const fn is_odd_row(&self) -> bool {
        self.row % 2 == 1
    }
}

/// Stable handle to an entity owned by the [`EntityFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(u32);

impl EntityHandle {
    /// Creates a new entity handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Occupancy plane a grid entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Committed bubbles that take part in matching and support.
    Settled,
    /// Placements that are not committed yet.
    Pending,
}

/// Reference to an entity held by a grid cell.
///
/// The grid never owns the entity; it only remembers the handle, the color and
/// which plane the entity was placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    /// Handle of the entity occupying the cell.
    pub handle: EntityHandle,
    /// Color of the occupying bubble.
    pub color: BubbleColor,
    /// Plane selected when the occupant was placed.
    pub plane: Plane,
}

impl Occupant {
    /// Committed bubble occupant.
    #[must_use]
    pub const fn settled(handle: EntityHandle, color: BubbleColor) -> Self {
        Self {
            handle,
            color,
            plane: Plane::Settled,
        }
    }

    /// Not yet committed occupant.
    #[must_use]
    pub const fn pending(handle: EntityHandle, color: BubbleColor) -> Self {
        Self {
            handle,
            color,
            plane: Plane::Pending,
        }
    }
}

/// Phases of the shot lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the player to start aiming.
    Idle,
    /// Aim preview is updated every tick; the grid is not mutated.
    Aiming,
    /// A projectile is travelling along its predicted path.
    InFlight,
    /// The projectile arrived and the grid is being updated.
    Resolving,
}

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid geometry, releasing every occupant.
    ConfigureGrid {
        /// Geometry of the new grid.
        layout: HexLayout,
    },
    /// Releases every occupant on both planes.
    ClearGrid,
    /// Places an occupant on the plane it carries.
    Occupy {
        /// Cell receiving the occupant.
        cell: CellCoord,
        /// Occupant to place.
        occupant: Occupant,
    },
    /// Empties a single plane of a cell.
    Vacate {
        /// Cell to empty.
        cell: CellCoord,
        /// Plane to empty.
        plane: Plane,
    },
}

/// Events broadcast after processing commands or advancing a shot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the grid geometry was replaced.
    GridConfigured {
        /// Number of columns in the new grid.
        columns: u32,
        /// Number of rows in the new grid.
        rows: u32,
    },
    /// Confirms that an occupant was placed.
    CellOccupied {
        /// Cell that received the occupant.
        cell: CellCoord,
        /// Occupant that was placed.
        occupant: Occupant,
    },
    /// Confirms that an occupant left the grid.
    CellVacated {
        /// Cell that was emptied.
        cell: CellCoord,
        /// Occupant that was released.
        occupant: Occupant,
    },
    /// Reports an occupant that was overwritten and must be destroyed.
    OccupantDisplaced {
        /// Cell whose previous occupant was replaced.
        cell: CellCoord,
        /// Occupant that lost its cell.
        occupant: Occupant,
    },
    /// Reports that an occupancy mutation was refused.
    OccupancyRejected {
        /// Cell named by the refused command.
        cell: CellCoord,
        /// Plane named by the refused command.
        plane: Plane,
        /// Specific reason the command was refused.
        reason: OccupancyError,
    },
    /// Announces a new shot lifecycle phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// The aim was released without firing.
    AimCancelled,
    /// A projectile left the launcher.
    ShotFired {
        /// Entity representing the projectile.
        projectile: EntityHandle,
        /// Color of the projectile.
        color: BubbleColor,
        /// Cell previewed when firing, if any.
        target: Option<CellCoord>,
    },
    /// A projectile settled into the grid.
    BubbleAttached {
        /// Cell the bubble settled into.
        cell: CellCoord,
        /// Color of the settled bubble.
        color: BubbleColor,
    },
    /// A same-colored group reached the match threshold and was removed.
    ClusterPopped {
        /// Color shared by the group.
        color: BubbleColor,
        /// Cells removed, in traversal order.
        cells: Vec<CellCoord>,
    },
    /// Bubbles that lost support were detached and signalled to drop.
    BubblesDropped {
        /// Cells detached, in row-major order.
        cells: Vec<CellCoord>,
    },
    /// A projectile was removed without changing the grid.
    ShotDiscarded {
        /// Entity representing the projectile.
        projectile: EntityHandle,
        /// Why the projectile could not settle.
        reason: DiscardReason,
    },
}

/// Reasons an occupancy command may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OccupancyError {
    /// The cell lies outside the configured grid.
    OutOfBounds,
    /// A pending occupant cannot be placed over a settled bubble.
    PendingOverSettled,
    /// The plane named by a vacate command was already empty.
    Empty,
}

/// Reasons a fired projectile may be discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// The trajectory ended without touching a bubble or the upper wall.
    NoContact,
    /// The contact resolved to no free cell.
    NoFreeCell,
    /// The projectile outlived its maximum lifetime.
    Expired,
}

/// Faults in grid geometry or level data that abort initialisation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// Either dimension was zero.
    #[error("grid must have at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The bubble radius was zero, negative or not finite.
    #[error("bubble radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    /// The authoring array length disagrees with `rows * columns`.
    #[error("level declares {expected} cells but provides {actual}")]
    CellCountMismatch {
        /// Cell count implied by the declared dimensions.
        expected: u64,
        /// Number of records actually present.
        actual: u64,
    },
}

/// Failures reported by an [`EntityFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// The factory has no template for the requested color.
    #[error("no entity template for {0:?} bubbles")]
    UnsupportedColor(BubbleColor),
}
