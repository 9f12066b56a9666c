//! Piece shapes and normalization.
//!
//! A piece is authored as a small boolean grid (the UI paints a 5x5 canvas).
//! The solver never cares about the canvas, only about the occupied cells
//! translated so the minimum row and column are zero.

/// A (row, col) cell position, relative or absolute depending on context.
pub type Offset = (i32, i32);

/// A piece's authoring grid. Rows may be ragged or empty; only `true` cells
/// matter.
pub type ShapeGrid = Vec<Vec<bool>>;

/// Side length of the piece authoring canvas.
pub const PIECE_CANVAS: usize = 5;

/// Collects the occupied cells of a shape grid, translated so the minimum
/// occupied row and column are both zero.
///
/// Cells are emitted in row-major discovery order. An all-false grid yields
/// an empty set. The result is independent of the enclosing canvas size:
/// padding a shape with empty rows or columns does not change it.
pub fn normalize(grid: &[Vec<bool>]) -> Vec<Offset> {
    let mut cells: Vec<Offset> = Vec::new();
    for (row, cols) in grid.iter().enumerate() {
        for (col, &filled) in cols.iter().enumerate() {
            if filled {
                cells.push((row as i32, col as i32));
            }
        }
    }

    if cells.is_empty() {
        return cells;
    }

    let min_row = cells.iter().map(|&(row, _)| row).min().unwrap();
    let min_col = cells.iter().map(|&(_, col)| col).min().unwrap();
    for (row, col) in &mut cells {
        *row -= min_row;
        *col -= min_col;
    }

    cells
}

/// Whether a shape grid has no occupied cell.
pub fn is_blank(grid: &[Vec<bool>]) -> bool {
    grid.iter().all(|row| row.iter().all(|&cell| !cell))
}

/// A non-blank piece admitted to the search.
///
/// `slot` is the piece's stable identity: its index in the caller's piece
/// list, assigned when the piece enters the search and carried through every
/// move that places it. Two shape-identical pieces in different slots stay
/// distinguishable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    /// Index of this piece in the caller's input list.
    pub slot: usize,
    /// The raw authoring grid, kept for redisplay.
    pub grid: ShapeGrid,
    /// Normalized occupied offsets, min row and min col both zero.
    pub cells: Vec<Offset>,
}

impl Piece {
    /// Admits a shape into the search, or `None` if it is blank.
    pub fn from_grid(slot: usize, grid: &[Vec<bool>]) -> Option<Self> {
        let cells = normalize(grid);
        if cells.is_empty() {
            return None;
        }
        Some(Piece {
            slot,
            grid: grid.to_vec(),
            cells,
        })
    }
}
