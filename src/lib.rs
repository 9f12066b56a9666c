//! Interactive 8x8 Block Puzzle Solver
//!
//! A [`Session`] owns an 8x8 board and up to three painted piece shapes.
//! The solver finds one ordering and position for every piece, applying
//! row/column clearing after each placement, and the session replays the
//! solution step by step for display.

pub mod board;
pub mod catalog;
pub mod persistence;
pub mod replay;
pub mod shape;
pub mod solver;

pub use board::{Board, BOARD_DIM};
pub use replay::{Session, StepView, PIECE_SLOTS};
pub use shape::{normalize, Offset, Piece, ShapeGrid, PIECE_CANVAS};
pub use solver::{solve, Move, SolveError};
