//! Backtracking placement search.
//!
//! The search explores every ordering of the remaining pieces, because a
//! placement-and-clear can open or close positions for the pieces that
//! follow. Within one piece, anchors are enumerated in row-major order and
//! the first complete assignment wins; the result is deterministic for a
//! given board and piece list.
//!
//! Key mechanics, keeping the hot loop allocation-free:
//! - the board is a `u64`, so each branch recurses on a copy for free
//! - placement bitmasks are precomputed per piece and anchor
//! - the remaining pieces live in a `u8` bitmask
//! - exhausted (board, remaining) states are memoized in an `FxHashSet`
//!   so re-entered subtrees are pruned

use log::debug;
use rustc_hash::FxHashSet;

use crate::board::{cell_index, Board, BOARD_DIM};
use crate::shape::{Offset, Piece, ShapeGrid};

/// Maximum number of pieces per solve (bound of the `u8` remaining-mask).
pub const MAX_PIECES: usize = 8;

/// Why a solve produced no move list. Both cases are ordinary outcomes the
/// caller surfaces to the user, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// Every supplied piece was blank; the search was not attempted.
    #[error("no pieces to solve")]
    NoValidPieces,
    /// Every piece ordering and position was exhausted without success.
    #[error("no solution found")]
    NoSolutionFound,
}

/// One piece placement and its outcome, immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    /// The placed piece, carrying its raw shape and slot identity.
    pub piece: Piece,
    /// Board position of the piece's normalized (0, 0) cell.
    pub anchor: Offset,
    /// Bitmask of the board cells this placement covers.
    pub footprint: u64,
    /// Lines cleared by this placement, rows and columns counted separately.
    pub cleared: u32,
    /// Board snapshot after placement and clearing.
    pub board_after: Board,
}

/// A piece placement candidate at a fixed anchor, mask precomputed.
#[derive(Clone, Copy)]
struct Placement {
    row: i32,
    col: i32,
    mask: u64,
}

/// Translates a piece's cells to an anchor and builds the covered-cell mask.
///
/// Returns `None` if any cell falls outside the board.
fn try_placement(cells: &[Offset], row: i32, col: i32) -> Option<u64> {
    let mut mask = 0u64;
    for &(cell_row, cell_col) in cells {
        let board_row = row + cell_row;
        let board_col = col + cell_col;
        if !(0..BOARD_DIM as i32).contains(&board_row)
            || !(0..BOARD_DIM as i32).contains(&board_col)
        {
            return None;
        }
        mask |= 1 << cell_index(board_row, board_col);
    }
    Some(mask)
}

/// Builds the in-bounds placements for each piece, anchors in row-major
/// order. Occupancy is checked against the live board during the search.
fn build_placement_table(pieces: &[Piece]) -> Vec<Vec<Placement>> {
    pieces
        .iter()
        .map(|piece| {
            let mut placements = Vec::new();
            for row in 0..BOARD_DIM as i32 {
                for col in 0..BOARD_DIM as i32 {
                    if let Some(mask) = try_placement(&piece.cells, row, col) {
                        placements.push(Placement { row, col, mask });
                    }
                }
            }
            placements
        })
        .collect()
}

struct Search<'a> {
    pieces: &'a [Piece],
    table: Vec<Vec<Placement>>,
    /// (board bits, remaining mask) states whose whole subtree failed.
    dead_ends: FxHashSet<(u64, u8)>,
    /// Placements applied, for the post-search log line.
    attempts: u64,
}

impl Search<'_> {
    fn run(&mut self, board: Board, remaining: u8, moves: &mut Vec<Move>) -> bool {
        if remaining == 0 {
            return true;
        }
        if self.dead_ends.contains(&(board.bits(), remaining)) {
            return false;
        }

        let pieces = self.pieces;
        for (index, piece) in pieces.iter().enumerate() {
            if remaining & (1 << index) == 0 {
                continue;
            }
            for placement_index in 0..self.table[index].len() {
                let placement = self.table[index][placement_index];
                if board.bits() & placement.mask != 0 {
                    continue;
                }
                self.attempts += 1;

                let placed = Board::from_bits(board.bits() | placement.mask);
                let (board_after, cleared) = placed.clear_lines();
                moves.push(Move {
                    piece: piece.clone(),
                    anchor: (placement.row, placement.col),
                    footprint: placement.mask,
                    cleared,
                    board_after,
                });

                if self.run(board_after, remaining & !(1 << index), moves) {
                    return true;
                }
                moves.pop();
            }
        }

        self.dead_ends.insert((board.bits(), remaining));
        false
    }
}

/// Finds one assignment of every non-blank piece to a board position, with
/// line clearing applied after each placement.
///
/// `shapes` is the caller's piece list; a piece's index in it is its slot
/// identity throughout the result. Blank shapes are skipped. Returns the
/// moves in placement order, or the error naming which expected outcome
/// occurred.
pub fn solve(board: Board, shapes: &[ShapeGrid]) -> Result<Vec<Move>, SolveError> {
    let pieces: Vec<Piece> = shapes
        .iter()
        .enumerate()
        .filter_map(|(slot, grid)| Piece::from_grid(slot, grid))
        .collect();

    if pieces.is_empty() {
        return Err(SolveError::NoValidPieces);
    }
    assert!(
        pieces.len() <= MAX_PIECES,
        "at most {MAX_PIECES} pieces per solve"
    );

    let mut search = Search {
        pieces: &pieces,
        table: build_placement_table(&pieces),
        dead_ends: FxHashSet::default(),
        attempts: 0,
    };
    let all_remaining = ((1u16 << pieces.len()) - 1) as u8;
    let mut moves = Vec::with_capacity(pieces.len());

    let solved = search.run(board, all_remaining, &mut moves);
    debug!(
        "search over {} pieces: {} placements tried, {} dead ends, solved={}",
        pieces.len(),
        search.attempts,
        search.dead_ends.len(),
        solved
    );

    if solved {
        Ok(moves)
    } else {
        Err(SolveError::NoSolutionFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::normalize;

    fn single() -> ShapeGrid {
        vec![vec![true]]
    }

    fn domino() -> ShapeGrid {
        vec![vec![true, true]]
    }

    fn line3() -> ShapeGrid {
        vec![vec![true, true, true]]
    }

    fn square3() -> ShapeGrid {
        vec![vec![true; 3]; 3]
    }

    #[test]
    fn test_placement_rejected_out_of_bounds() {
        let cells = normalize(&line3());
        assert!(try_placement(&cells, 0, 5).is_some());
        assert!(try_placement(&cells, 0, 6).is_none());
        assert!(try_placement(&cells, 7, 0).is_some());
        assert!(try_placement(&cells, 8, 0).is_none());
    }

    #[test]
    fn test_placement_rejected_on_overlap() {
        let mut board = Board::empty();
        board.set(0, 1, true);
        let cells = normalize(&domino());

        let blocked = try_placement(&cells, 0, 0).unwrap();
        assert_ne!(board.bits() & blocked, 0);
        let free = try_placement(&cells, 0, 2).unwrap();
        assert_eq!(board.bits() & free, 0);
    }

    #[test]
    fn test_all_blank_pieces_is_not_searched() {
        let blank = vec![vec![false; 5]; 5];
        let result = solve(Board::empty(), &[blank.clone(), blank.clone(), blank]);
        assert_eq!(result.unwrap_err(), SolveError::NoValidPieces);
    }

    #[test]
    fn test_three_singles_on_empty_board() {
        let result = solve(Board::empty(), &[single(), single(), single()]).unwrap();
        assert_eq!(result.len(), 3);
        for (index, mv) in result.iter().enumerate() {
            assert_eq!(mv.piece.slot, index);
            assert_eq!(mv.anchor, (0, index as i32));
            assert_eq!(mv.cleared, 0);
        }
        assert_eq!(result[2].board_after.occupied(), 3);
    }

    #[test]
    fn test_full_board_fails() {
        let result = solve(Board::full(), &[single()]);
        assert_eq!(result.unwrap_err(), SolveError::NoSolutionFound);
    }

    #[test]
    fn test_solve_is_deterministic() {
        let mut board = Board::empty();
        for col in 0..6 {
            board.set(0, col, true);
            board.set(1, col, true);
        }
        let shapes = [domino(), square3(), single()];

        let first = solve(board, &shapes).unwrap();
        let second = solve(board, &shapes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_slots_are_skipped_but_numbering_is_kept() {
        let blank = vec![vec![false; 5]; 5];
        let result = solve(Board::empty(), &[blank, single()]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].piece.slot, 1);
    }

    #[test]
    fn test_duplicate_shapes_keep_their_own_slots() {
        let result = solve(Board::empty(), &[single(), single()]).unwrap();
        let slots: Vec<usize> = result.iter().map(|mv| mv.piece.slot).collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn test_piece_order_permutation_is_explored() {
        // Only cells (7, 0..3) are free: the 3x3 square has no legal
        // placement until the 1x3 line fills them, completing the whole
        // board and clearing it. The square is listed first, so success
        // requires trying the line first instead.
        let mut board = Board::full();
        for col in 0..3 {
            board.set(7, col, false);
        }

        let result = solve(board, &[square3(), line3()]).unwrap();
        assert_eq!(result.len(), 2);

        assert_eq!(result[0].piece.slot, 1);
        assert_eq!(result[0].anchor, (7, 0));
        assert_eq!(result[0].cleared, 16, "the line completes every row and column");
        assert!(result[0].board_after.is_empty());

        assert_eq!(result[1].piece.slot, 0);
        assert_eq!(result[1].anchor, (0, 0));
        assert_eq!(result[1].cleared, 0);
    }

    #[test]
    fn test_clears_count_rows_and_columns_of_one_move() {
        // Row 0 lacks one cell; placing the single there completes it.
        let mut board = Board::empty();
        for col in 0..7 {
            board.set(0, col, true);
        }

        let result = solve(board, &[single()]).unwrap();
        assert_eq!(result[0].anchor, (0, 7));
        assert_eq!(result[0].cleared, 1);
        assert!(result[0].board_after.is_empty());
    }
}
