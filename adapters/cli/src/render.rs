//! Text rendering of the settled grid.

use std::fmt::Write as _;

use hexpop_core::{BubbleColor, CellCoord};
use hexpop_world::query::OccupancyView;

/// Draws one line per row; odd rows are indented by one column to show the hex offset.
pub(crate) fn render_grid(view: &OccupancyView<'_>) -> String {
    let (columns, rows) = view.dimensions();
    let mut output = String::new();
    for row in 0..rows {
        if row % 2 == 1 {
            output.push(' ');
        }
        for column in 0..columns {
            if column > 0 {
                output.push(' ');
            }
            let cell = CellCoord::new(column, row);
            output.push(glyph(view.settled_color(cell), view.pending(cell).is_some()));
        }
        output.push('\n');
    }
    let _ = writeln!(output, "{} bubbles", view.settled_count());
    output
}

fn glyph(color: Option<BubbleColor>, pending: bool) -> char {
    match color {
        Some(BubbleColor::Red) => 'R',
        Some(BubbleColor::Blue) => 'B',
        Some(BubbleColor::Green) => 'G',
        None if pending => '*',
        None => '.',
    }
}
