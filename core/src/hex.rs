//! Offset hexagonal layout shared by the world, systems and adapters.
//!
//! Rows grow downward and odd rows are shifted right by one bubble radius,
//! which is the classic bubble shooter arrangement. Row parity selects one of
//! two neighbor tables; adjacency is never stored.

use glam::Vec2;

use crate::{CellCoord, LayoutError};

/// Vertical lift applied to the grid origin so row zero sits near the top of the play field.
pub const DEFAULT_ORIGIN_LIFT: f32 = 5.95;

/// Column count used when no layout is configured.
pub const DEFAULT_COLUMNS: u32 = 11;

/// Row count used when no layout is configured.
pub const DEFAULT_ROWS: u32 = 12;

/// Bubble radius used when no layout is configured.
pub const DEFAULT_RADIUS: f32 = 0.5;

const SQRT_3: f32 = 1.732_050_8;

/// Neighbor offsets `(d_column, d_row)` for even rows: E, NE, NW, W, SW, SE.
const EVEN_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];

/// Neighbor offsets `(d_column, d_row)` for odd rows: E, NE, NW, W, SW, SE.
const ODD_ROW_OFFSETS: [(i64, i64); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];

/// Geometry of a fixed `columns x rows` hexagonal bubble grid.
///
/// The affine map between cells and world positions is anchored at an origin
/// derived from the dimensions and radius, so that the grid is horizontally
/// centred on `x = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexLayout {
    columns: u32,
    rows: u32,
    radius: f32,
    origin: Vec2,
}

impl HexLayout {
    /// Creates a layout using the default origin lift.
    pub fn new(columns: u32, rows: u32, radius: f32) -> Result<Self, LayoutError> {
        Self::with_origin_lift(columns, rows, radius, DEFAULT_ORIGIN_LIFT)
    }

    /// Creates a layout whose row zero is raised by `origin_lift` world units.
    pub fn with_origin_lift(
        columns: u32,
        rows: u32,
        radius: f32,
        origin_lift: f32,
    ) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::EmptyGrid { columns, rows });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LayoutError::InvalidRadius(radius));
        }

        Ok(Self::from_valid_parts(columns, rows, radius, origin_lift))
    }

    fn from_valid_parts(columns: u32, rows: u32, radius: f32, origin_lift: f32) -> Self {
        let column_spacing = radius * 2.0;
        let row_spacing = SQRT_3 * radius;
        let origin = Vec2::new(
            -((columns - 1) as f32) * column_spacing / 2.0,
            (rows - 1) as f32 * row_spacing / 2.0 + origin_lift,
        );

        Self {
            columns,
            rows,
            radius,
            origin,
        }
    }

    /// Number of columns in every row.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows; row zero is the anchor row.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Bubble radius in world units.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// World position of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Horizontal distance between neighboring cell centres in a row.
    #[must_use]
    pub fn column_spacing(&self) -> f32 {
        self.radius * 2.0
    }

    /// Vertical distance between neighboring rows.
    #[must_use]
    pub fn row_spacing(&self) -> f32 {
        SQRT_3 * self.radius
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Inverse of [`HexLayout::index`].
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    /// Maps a cell to the world position of its centre.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec2 {
        let shift = if cell.is_odd_row() { self.radius } else { 0.0 };
        let x = cell.column() as f32 * self.column_spacing() + shift;
        let y = -(cell.row() as f32) * self.row_spacing();
        self.origin + Vec2::new(x, y)
    }

    /// Maps a world position to the nearest cell.
    ///
    /// Positions outside the grid clamp to the closest boundary cell, so this
    /// never fails. The row is clamped before its parity selects the column
    /// shift.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec2) -> CellCoord {
        let local = position - self.origin;
        let row = clamp_to_axis((-local.y / self.row_spacing()).round(), self.rows);
        let shift = if row % 2 == 1 { self.radius } else { 0.0 };
        let column = clamp_to_axis(
            ((local.x - shift) / self.column_spacing()).round(),
            self.columns,
        );
        CellCoord::new(column, row)
    }

    /// In-bounds neighbors of the cell, in E, NE, NW, W, SW, SE order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let offsets = if cell.is_odd_row() {
            &ODD_ROW_OFFSETS
        } else {
            &EVEN_ROW_OFFSETS
        };
        let columns = i64::from(self.columns);
        let rows = i64::from(self.rows);
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());

        let mut candidates = [None; 6];
        for (slot, (d_column, d_row)) in candidates.iter_mut().zip(offsets.iter()) {
            let next_column = column + d_column;
            let next_row = row + d_row;
            if (0..columns).contains(&next_column) && (0..rows).contains(&next_row) {
                *slot = Some(CellCoord::new(next_column as u32, next_row as u32));
            }
        }

        candidates.into_iter().flatten()
    }

    /// X coordinate of the left boundary, tangent to column zero.
    #[must_use]
    pub fn left_edge(&self) -> f32 {
        self.origin.x - self.radius
    }

    /// X coordinate of the right boundary, tangent to the last column of an odd row.
    #[must_use]
    pub fn right_edge(&self) -> f32 {
        self.origin.x + (self.columns - 1) as f32 * self.column_spacing() + self.radius * 2.0
    }

    /// Y coordinate of the upper boundary, tangent to row zero.
    #[must_use]
    pub fn top_edge(&self) -> f32 {
        self.origin.y + self.radius
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        Self::from_valid_parts(
            DEFAULT_COLUMNS,
            DEFAULT_ROWS,
            DEFAULT_RADIUS,
            DEFAULT_ORIGIN_LIFT,
        )
    }
}

fn clamp_to_axis(value: f32, count: u32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = count.saturating_sub(1) as f32;
    value.clamp(0.0, max) as u32
}
