//! Text I/O for puzzle files and solution step reports.
//!
//! Puzzle file format: blocks of `#` (occupied) and `.` (empty) lines,
//! separated by blank lines. The first block is the 8x8 board; each
//! following block (at most 3) is a piece grid bounded by the 5x5 authoring
//! canvas.
//!
//! ```text
//! ##......
//! ##......
//! ........
//! ........
//! ........
//! ........
//! ........
//! ........
//!
//! ##
//! #.
//!
//! ###
//! ```

use std::fs;
use std::path::Path;

use crate::board::{format_board, Board, BOARD_DIM};
use crate::replay::PIECE_SLOTS;
use crate::shape::{ShapeGrid, PIECE_CANVAS};
use crate::solver::Move;

/// Problems reading or writing puzzle files.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleFileError {
    #[error("puzzle file has no board block")]
    MissingBoard,
    #[error("expected 8 board rows, found {0}")]
    BoardRows(usize),
    #[error("board row {row} has {found} cells, expected 8")]
    BoardColumns { row: usize, found: usize },
    #[error("unexpected cell character {0:?}")]
    BadCell(char),
    #[error("a puzzle defines at most 3 pieces, found {0}")]
    TooManyPieces(usize),
    #[error("piece {index} exceeds the 5x5 canvas")]
    PieceTooLarge { index: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parses a puzzle file into a board and its piece grids.
pub fn parse_puzzle(text: &str) -> Result<(Board, Vec<ShapeGrid>), PuzzleFileError> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let mut blocks = blocks.into_iter();
    let board_block = blocks.next().ok_or(PuzzleFileError::MissingBoard)?;
    let board = parse_board(&board_block)?;

    let piece_blocks: Vec<Vec<&str>> = blocks.collect();
    if piece_blocks.len() > PIECE_SLOTS {
        return Err(PuzzleFileError::TooManyPieces(piece_blocks.len()));
    }
    let mut pieces = Vec::with_capacity(piece_blocks.len());
    for (index, block) in piece_blocks.iter().enumerate() {
        pieces.push(parse_piece(index, block)?);
    }

    Ok((board, pieces))
}

fn parse_board(lines: &[&str]) -> Result<Board, PuzzleFileError> {
    if lines.len() != BOARD_DIM {
        return Err(PuzzleFileError::BoardRows(lines.len()));
    }
    let mut board = Board::empty();
    for (row, line) in lines.iter().enumerate() {
        if line.chars().count() != BOARD_DIM {
            return Err(PuzzleFileError::BoardColumns {
                row,
                found: line.chars().count(),
            });
        }
        for (col, ch) in line.chars().enumerate() {
            board.set(row as i32, col as i32, parse_cell(ch)?);
        }
    }
    Ok(board)
}

fn parse_piece(index: usize, lines: &[&str]) -> Result<ShapeGrid, PuzzleFileError> {
    if lines.len() > PIECE_CANVAS || lines.iter().any(|line| line.chars().count() > PIECE_CANVAS) {
        return Err(PuzzleFileError::PieceTooLarge { index });
    }
    let mut grid = Vec::with_capacity(lines.len());
    for line in lines {
        let mut row = Vec::with_capacity(line.len());
        for ch in line.chars() {
            row.push(parse_cell(ch)?);
        }
        grid.push(row);
    }
    Ok(grid)
}

fn parse_cell(ch: char) -> Result<bool, PuzzleFileError> {
    match ch {
        '#' => Ok(true),
        '.' => Ok(false),
        other => Err(PuzzleFileError::BadCell(other)),
    }
}

/// Formats a board and pieces as a puzzle file.
pub fn format_puzzle(board: Board, pieces: &[ShapeGrid]) -> String {
    let mut output = format_board(board);
    for grid in pieces {
        output.push('\n');
        if grid.iter().all(|row| row.is_empty()) {
            // a blank piece still needs a block so slots stay aligned
            output.push_str(&".".repeat(PIECE_CANVAS));
            output.push('\n');
            continue;
        }
        for row in grid {
            for &cell in row {
                output.push(if cell { '#' } else { '.' });
            }
            output.push('\n');
        }
    }
    output
}

/// Loads a puzzle file from disk.
pub fn load_puzzle(path: &Path) -> Result<(Board, Vec<ShapeGrid>), PuzzleFileError> {
    let text = fs::read_to_string(path)?;
    parse_puzzle(&text)
}

/// Saves a puzzle file to disk.
pub fn save_puzzle(path: &Path, board: Board, pieces: &[ShapeGrid]) -> std::io::Result<()> {
    fs::write(path, format_puzzle(board, pieces))
}

/// Formats a solution as a numbered step report.
///
/// Rows and columns are 1-based, matching what the step display shows.
pub fn format_report(moves: &[Move]) -> String {
    let mut output = format!("Solved in {} steps.\n", moves.len());
    for (index, mv) in moves.iter().enumerate() {
        output.push_str(&format!(
            "\nStep {}: place piece {} at row {}, column {}, clearing {} lines\n",
            index + 1,
            mv.piece.slot + 1,
            mv.anchor.0 + 1,
            mv.anchor.1 + 1,
            mv.cleared
        ));
        output.push_str(&format_board(mv.board_after));
    }
    output
}

/// Writes a step report to disk.
pub fn save_report(path: &Path, moves: &[Move]) -> std::io::Result<()> {
    fs::write(path, format_report(moves))
}
