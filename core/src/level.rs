//! Static level layouts authored outside the engine.

use serde::{Deserialize, Serialize};

use crate::{BubbleColor, CellCoord, LayoutError};

/// Authoring record for a single cell of a level layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleCell {
    /// Whether the level places a bubble in this cell.
    pub has_bubble: bool,
    /// Color of the bubble; ignored when `has_bubble` is false.
    pub color: BubbleColor,
}

impl BubbleCell {
    /// Cell holding a bubble of the provided color.
    #[must_use]
    pub const fn bubble(color: BubbleColor) -> Self {
        Self {
            has_bubble: true,
            color,
        }
    }
}

/// Row-major array of authoring records, replayed once at level load.
///
/// The record for cell `(x, y)` lives at index `y * columns + x`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Number of columns the layout was authored for.
    pub columns: u32,
    /// Number of rows the layout was authored for.
    pub rows: u32,
    /// Flat cell records; must contain exactly `rows * columns` entries.
    pub cells: Vec<BubbleCell>,
}

impl LevelLayout {
    /// Creates a layout of the given size with no bubbles.
    #[must_use]
    pub fn empty(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![BubbleCell::default(); count],
        }
    }

    /// Verifies that the cell array matches the declared dimensions.
    ///
    /// A mismatch would silently shift every cell after the first missing or
    /// surplus record, so it is reported instead of padded or truncated.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LayoutError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let expected = u64::from(self.columns) * u64::from(self.rows);
        let actual = self.cells.len() as u64;
        if expected != actual {
            return Err(LayoutError::CellCountMismatch { expected, actual });
        }

        Ok(())
    }

    /// Places a bubble in the cell, returning `false` when the cell is outside the layout.
    pub fn place(&mut self, cell: CellCoord, color: BubbleColor) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(record) => {
                *record = BubbleCell::bubble(color);
                true
            }
            None => false,
        }
    }

    /// Authoring record for the cell, if present.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<BubbleCell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    /// Iterates the bubbles placed by the layout in row-major order.
    pub fn bubbles(&self) -> impl Iterator<Item = (CellCoord, BubbleColor)> + '_ {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, record)| record.has_bubble)
            .filter_map(move |(index, record)| {
                let index = u32::try_from(index).ok()?;
                Some((
                    CellCoord::new(index % columns, index / columns),
                    record.color,
                ))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_validates() {
        let layout = LevelLayout::empty(11, 12);
        assert_eq!(layout.cells.len(), 132);
        assert_eq!(layout.validate(), Ok(()));
        assert_eq!(layout.bubbles().count(), 0);
    }

    #[test]
    fn short_cell_array_is_rejected() {
        let mut layout = LevelLayout::empty(4, 3);
        let _ = layout.cells.pop();
        assert_eq!(
            layout.validate(),
            Err(LayoutError::CellCountMismatch {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn zero_sized_layout_is_rejected() {
        let layout = LevelLayout::empty(0, 5);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn bubbles_are_reported_in_row_major_order() {
        let mut layout = LevelLayout::empty(4, 3);
        assert!(layout.place(CellCoord::new(2, 1), BubbleColor::Green));
        assert!(layout.place(CellCoord::new(3, 0), BubbleColor::Blue));
        assert!(!layout.place(CellCoord::new(4, 0), BubbleColor::Red));

        let bubbles: Vec<_> = layout.bubbles().collect();
        assert_eq!(
            bubbles,
            vec![
                (CellCoord::new(3, 0), BubbleColor::Blue),
                (CellCoord::new(2, 1), BubbleColor::Green),
            ]
        );
        assert_eq!(
            layout.cell(CellCoord::new(2, 1)),
            Some(BubbleCell::bubble(BubbleColor::Green))
        );
    }

    #[test]
    fn authoring_records_use_camel_case_fields() {
        let json = r#"{"columns":2,"rows":1,"cells":[{"hasBubble":true,"color":"Blue"},{"hasBubble":false,"color":"Red"}]}"#;
        let layout: LevelLayout = serde_json::from_str(json).expect("layout parses");
        assert_eq!(layout.validate(), Ok(()));
        assert_eq!(
            layout.bubbles().collect::<Vec<_>>(),
            vec![(CellCoord::new(0, 0), BubbleColor::Blue)]
        );
    }
}
