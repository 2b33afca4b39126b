//! Table and grid rendering.
//!
//! Geometry is computed up front as a list of [`TableOp`]s so the layout can
//! be inspected without producing a PDF, then replayed onto a [`Canvas`].
//!
//! # Example
//!
//! ```ignore
//! use fastpdf::items::TableColumn;
//! use fastpdf::writer::{draw_table, TableLayout};
//!
//! let columns = vec![TableColumn::new(50, "A", "a"), TableColumn::new(50, "B", "b")];
//! let ops = TableLayout::new(0.0, 0.0, 20).compute(&columns, &rows);
//! draw_table(&mut canvas, &ops)?;
//! ```

use super::Canvas;
use crate::error::Result;
use crate::items::{Row, TableColumn};

/// Horizontal offset of cell text from the cell's left border.
const CELL_PADDING_X: f32 = 2.0;
/// Vertical offset of cell text from the cell's top border.
const CELL_PADDING_Y: f32 = 2.0;

/// One drawing call produced by the layout.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOp {
    /// Straight border segment
    Line {
        /// Start x
        x1: f32,
        /// Start y
        y1: f32,
        /// End x
        x2: f32,
        /// End y
        y2: f32,
    },
    /// Cell or header text
    Text {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Font size
        size: f32,
        /// Text content
        text: String,
    },
}

impl TableOp {
    fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        TableOp::Line { x1, y1, x2, y2 }
    }
}

/// Fixed-row-height table layout anchored at `(left, top)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableLayout {
    /// Left edge of the table
    pub left: f32,
    /// Top edge of the header band
    pub top: f32,
    /// Height of every band
    pub row_height: i32,
}

impl TableLayout {
    /// Create a layout.
    pub fn new(left: f32, top: f32, row_height: i32) -> Self {
        Self {
            left,
            top,
            row_height,
        }
    }

    /// Font size of header and cell text: 80% of the row height, truncated
    /// toward zero.
    pub fn font_size(&self) -> f32 {
        (self.row_height as i64 * 4 / 5) as f32
    }

    /// Compute the border and text operations for a header band plus one
    /// band per row.
    ///
    /// Each band draws its left border once, then per column its bottom and
    /// right borders and its text. Only the header band draws top borders;
    /// a data band's top is the previous band's bottom. A row without a
    /// column's key renders that cell as empty text.
    pub fn compute(&self, columns: &[TableColumn], data: &[Row]) -> Vec<TableOp> {
        if columns.is_empty() {
            return Vec::new();
        }

        let h = self.row_height as f32;
        let size = self.font_size();
        let mut ops = Vec::with_capacity((data.len() + 1) * (columns.len() * 3 + 2));

        let mut top = self.top;
        let titles = columns.iter().map(|c| c.title.as_str());
        self.band(&mut ops, columns, titles, top, h, size, true);

        for row in data {
            top += h;
            let cells = columns
                .iter()
                .map(|c| row.get(&c.key).map(String::as_str).unwrap_or(""));
            self.band(&mut ops, columns, cells, top, h, size, false);
        }

        ops
    }

    fn band<'a>(
        &self,
        ops: &mut Vec<TableOp>,
        columns: &[TableColumn],
        texts: impl Iterator<Item = &'a str>,
        top: f32,
        h: f32,
        size: f32,
        with_top_border: bool,
    ) {
        let bottom = top + h;
        let mut left = self.left;
        ops.push(TableOp::line(left, top, left, bottom));

        for (column, text) in columns.iter().zip(texts) {
            let next = left + column.width as f32;
            if with_top_border {
                ops.push(TableOp::line(left, top, next, top));
            }
            ops.push(TableOp::line(left, bottom, next, bottom));
            ops.push(TableOp::line(next, top, next, bottom));
            ops.push(TableOp::Text {
                left: left + CELL_PADDING_X,
                top: top + CELL_PADDING_Y,
                size,
                text: text.to_string(),
            });
            left = next;
        }
    }
}

/// Replay table operations onto a canvas.
pub fn draw_table<C: Canvas + ?Sized>(canvas: &mut C, ops: &[TableOp]) -> Result<()> {
    for op in ops {
        match op {
            TableOp::Line { x1, y1, x2, y2 } => canvas.draw_line(*x1, *y1, *x2, *y2)?,
            TableOp::Text {
                left,
                top,
                size,
                text,
            } => canvas.draw_text(*left, *top, *size, text)?,
        }
    }
    Ok(())
}

/// Compute the lines of a uniform grid.
///
/// `row + 1` horizontal lines are spaced `width / row` apart and `column + 1`
/// vertical lines `height / column` apart. A zero count yields the single
/// line at offset 0 of that family.
pub fn grid_ops(left: f32, top: f32, width: f32, height: f32, row: u32, column: u32) -> Vec<TableOp> {
    let row_step = if row == 0 { 0.0 } else { width / row as f32 };
    let column_step = if column == 0 {
        0.0
    } else {
        height / column as f32
    };

    let horizontal = (0..=row).map(|i| {
        let y = top + row_step * i as f32;
        TableOp::line(left, y, left + width, y)
    });
    let vertical = (0..=column).map(|j| {
        let x = left + column_step * j as f32;
        TableOp::line(x, top, x, top + height)
    });

    horizontal.chain(vertical).collect()
}

/// Draw a uniform grid onto a canvas.
pub fn draw_grid<C: Canvas + ?Sized>(
    canvas: &mut C,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    row: u32,
    column: u32,
) -> Result<()> {
    draw_table(canvas, &grid_ops(left, top, width, height, row, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::test_support::{Call, RecordingCanvas};
    use proptest::prelude::*;

    fn columns() -> Vec<TableColumn> {
        vec![TableColumn::new(50, "A", "a"), TableColumn::new(50, "B", "b")]
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn texts(ops: &[TableOp]) -> Vec<(f32, f32, f32, &str)> {
        ops.iter()
            .filter_map(|op| match op {
                TableOp::Text {
                    left,
                    top,
                    size,
                    text,
                } => Some((*left, *top, *size, text.as_str())),
                _ => None,
            })
            .collect()
    }

    fn is_vertical(op: &TableOp) -> bool {
        matches!(op, TableOp::Line { x1, x2, y1, y2 } if x1 == x2 && y1 != y2)
    }

    #[test]
    fn test_two_by_one_table() {
        let ops = TableLayout::new(0.0, 0.0, 20).compute(&columns(), &[row(&[("a", "1"), ("b", "2")])]);

        assert_eq!(
            texts(&ops),
            vec![
                (2.0, 2.0, 16.0, "A"),
                (52.0, 2.0, 16.0, "B"),
                (2.0, 22.0, 16.0, "1"),
                (52.0, 22.0, 16.0, "2"),
            ]
        );

        // Header band: left, then (top, bottom, right) per column
        assert_eq!(ops[0], TableOp::line(0.0, 0.0, 0.0, 20.0));
        assert_eq!(ops[1], TableOp::line(0.0, 0.0, 50.0, 0.0));
        assert_eq!(ops[2], TableOp::line(0.0, 20.0, 50.0, 20.0));
        assert_eq!(ops[3], TableOp::line(50.0, 0.0, 50.0, 20.0));

        // Three vertical borders in each of the two bands
        assert_eq!(ops.iter().filter(|op| is_vertical(op)).count(), 6);
        // The data band reuses the header's bottom border as its top
        let shared = TableOp::line(0.0, 20.0, 50.0, 20.0);
        assert_eq!(ops.iter().filter(|op| **op == shared).count(), 1);
        assert!(ops.contains(&TableOp::line(0.0, 40.0, 50.0, 40.0)));
    }

    #[test]
    fn test_missing_key_renders_empty_text() {
        let ops = TableLayout::new(0.0, 0.0, 20).compute(&columns(), &[row(&[("a", "only")])]);
        let cells: Vec<&str> = texts(&ops).into_iter().map(|t| t.3).collect();
        assert_eq!(cells, vec!["A", "B", "only", ""]);
    }

    #[test]
    fn test_empty_columns_draw_nothing() {
        let ops = TableLayout::new(10.0, 10.0, 20).compute(&[], &[row(&[("a", "1")])]);
        assert!(ops.is_empty());
    }

    #[test]
    fn test_font_size_truncates() {
        assert_eq!(TableLayout::new(0.0, 0.0, 20).font_size(), 16.0);
        assert_eq!(TableLayout::new(0.0, 0.0, 13).font_size(), 10.0);
        assert_eq!(TableLayout::new(0.0, 0.0, 1).font_size(), 0.0);
        assert_eq!(TableLayout::new(0.0, 0.0, -13).font_size(), -10.0);
    }

    #[test]
    fn test_negative_geometry_passes_through() {
        let columns = vec![TableColumn::new(-50, "A", "a")];
        let ops = TableLayout::new(100.0, 100.0, -20).compute(&columns, &[]);
        assert_eq!(
            ops,
            vec![
                TableOp::line(100.0, 100.0, 100.0, 80.0),
                TableOp::line(100.0, 100.0, 50.0, 100.0),
                TableOp::line(100.0, 80.0, 50.0, 80.0),
                TableOp::line(50.0, 100.0, 50.0, 80.0),
                TableOp::Text {
                    left: 102.0,
                    top: 102.0,
                    size: -16.0,
                    text: "A".to_string(),
                },
            ]
        );

        let grid = grid_ops(0.0, 0.0, -60.0, 30.0, 2, 1);
        assert_eq!(grid[1], TableOp::line(0.0, -30.0, -60.0, -30.0));
        assert_eq!(grid[3], TableOp::line(0.0, 0.0, 0.0, 30.0));
    }

    #[test]
    fn test_grid_spacing_pairs_width_with_rows() {
        let ops = grid_ops(0.0, 0.0, 90.0, 60.0, 3, 2);
        assert_eq!(ops.len(), 4 + 3);
        // Horizontal lines step by width / row
        assert_eq!(ops[1], TableOp::line(0.0, 30.0, 90.0, 30.0));
        assert_eq!(ops[3], TableOp::line(0.0, 90.0, 90.0, 90.0));
        // Vertical lines step by height / column
        assert_eq!(ops[5], TableOp::line(30.0, 0.0, 30.0, 60.0));
        assert_eq!(ops[6], TableOp::line(60.0, 0.0, 60.0, 60.0));
    }

    #[test]
    fn test_grid_zero_counts() {
        let ops = grid_ops(5.0, 5.0, 10.0, 10.0, 0, 0);
        assert_eq!(
            ops,
            vec![
                TableOp::line(5.0, 5.0, 15.0, 5.0),
                TableOp::line(5.0, 5.0, 5.0, 15.0),
            ]
        );
    }

    #[test]
    fn test_draw_table_replays_in_order() {
        let mut canvas = RecordingCanvas::default();
        let ops = TableLayout::new(0.0, 0.0, 20).compute(&columns(), &[]);
        draw_table(&mut canvas, &ops).unwrap();
        assert_eq!(canvas.calls.len(), ops.len());
        assert_eq!(canvas.calls[0], Call::Line(0.0, 0.0, 0.0, 20.0));
        assert_eq!(canvas.calls[4], Call::Text(2.0, 2.0, 16.0, "A".to_string()));
    }

    proptest! {
        #[test]
        fn prop_grid_line_counts(row in 0u32..40, column in 0u32..40, w in 1u32..500, h in 1u32..500) {
            let ops = grid_ops(0.0, 0.0, w as f32, h as f32, row, column);
            let horizontal = ops.iter().filter(|op| matches!(op, TableOp::Line { y1, y2, .. } if y1 == y2)).count();
            let vertical = ops.iter().filter(|op| matches!(op, TableOp::Line { x1, x2, .. } if x1 == x2)).count();
            prop_assert_eq!(horizontal, row as usize + 1);
            prop_assert_eq!(vertical, column as usize + 1);
        }

        #[test]
        fn prop_table_band_counts(ncols in 1usize..8, nrows in 0usize..12, height in 1i32..60) {
            let columns: Vec<TableColumn> = (0..ncols)
                .map(|i| TableColumn::new(40, format!("H{}", i), format!("k{}", i)))
                .collect();
            let data: Vec<Row> = (0..nrows).map(|_| Row::new()).collect();
            let ops = TableLayout::new(0.0, 0.0, height).compute(&columns, &data);

            let bands = nrows + 1;
            prop_assert_eq!(ops.iter().filter(|op| is_vertical(op)).count(), bands * (ncols + 1));
            prop_assert_eq!(texts(&ops).len(), bands * ncols);
        }
    }
}
