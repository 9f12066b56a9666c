//! Starter shapes and random puzzle generation.
//!
//! The shapes are the common pieces of 8x8 block puzzles, defined by their
//! occupied cells with the minimum row and column at the origin.

use rand::Rng;

use crate::board::{Board, BOARD_DIM};
use crate::replay::PIECE_SLOTS;
use crate::shape::{Offset, ShapeGrid, PIECE_CANVAS};

/// Probability that a randomly painted board cell is occupied.
const FILL_PROBABILITY: f64 = 0.3;

/// The common block-puzzle shapes.
pub const SHAPES: &[&[Offset]] = &[
    // single block
    &[(0, 0)],
    // 2x1 block
    &[(0, 0), (0, 1)],
    // small L, corner at bottom left
    &[(0, 0), (1, 0), (1, 1)],
    // small L, corner at top left
    &[(0, 0), (0, 1), (1, 0)],
    // 3x1 block
    &[(0, 0), (0, 1), (0, 2)],
    // T-shape
    &[(0, 0), (0, 1), (0, 2), (1, 1)],
    // 2x2 square
    &[(0, 0), (0, 1), (1, 0), (1, 1)],
    // 3x3 square
    &[
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 0),
        (1, 1),
        (1, 2),
        (2, 0),
        (2, 1),
        (2, 2),
    ],
    // plus shape
    &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)],
    // Z-shape
    &[(0, 0), (0, 1), (1, 1), (1, 2)],
    // S-shape
    &[(0, 1), (0, 2), (1, 0), (1, 1)],
];

/// Renders a shape onto a blank authoring canvas, centered the way the
/// piece editor centers its random picks.
pub fn to_grid(cells: &[Offset]) -> ShapeGrid {
    let mut grid = vec![vec![false; PIECE_CANVAS]; PIECE_CANVAS];
    let height = cells.iter().map(|&(row, _)| row).max().unwrap_or(0) + 1;
    let width = cells.iter().map(|&(_, col)| col).max().unwrap_or(0) + 1;
    let start_row = (PIECE_CANVAS as i32 - height) / 2;
    let start_col = (PIECE_CANVAS as i32 - width) / 2;

    for &(row, col) in cells {
        grid[(start_row + row) as usize][(start_col + col) as usize] = true;
    }
    grid
}

/// Draws a random catalog shape for every piece slot.
pub fn random_pieces<R: Rng>(rng: &mut R) -> [ShapeGrid; PIECE_SLOTS] {
    std::array::from_fn(|_| to_grid(SHAPES[rng.gen_range(0..SHAPES.len())]))
}

/// Paints a random board, each cell occupied with probability 0.3.
pub fn random_board<R: Rng>(rng: &mut R) -> Board {
    let mut board = Board::empty();
    for row in 0..BOARD_DIM as i32 {
        for col in 0..BOARD_DIM as i32 {
            board.set(row, col, rng.gen_bool(FILL_PROBABILITY));
        }
    }
    board
}
