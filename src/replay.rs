//! Session state and the step-replay state machine.
//!
//! A [`Session`] is the value the presentation layer owns: the editable
//! board, the three piece slots, and the review state left behind by the
//! last solve. The review is either `Idle` (no solution) or reviewing a
//! solution with a cursor into it; every board or piece edit drops it, since
//! a stale solution refers to inputs that no longer exist.

use rand::Rng;

use crate::board::Board;
use crate::catalog;
use crate::shape::{ShapeGrid, PIECE_CANVAS};
use crate::solver::{self, Move, SolveError};

/// Number of piece slots a session offers.
pub const PIECE_SLOTS: usize = 3;

/// Review state: nothing computed, or a solution under review.
enum Review {
    Idle,
    Reviewing {
        /// The board as it was before any move, for replay reconstruction.
        original: Board,
        moves: Vec<Move>,
        /// Current step, always in `0..moves.len()`.
        cursor: usize,
    },
}

/// One replay step, reconstructed for display.
pub struct StepView<'a> {
    /// Board state after applying moves `0..=step` to the original board.
    pub board: Board,
    /// The cells of this step's piece still occupied after its clear, as an
    /// overlay layer for highlighting.
    pub placed: Board,
    /// The move this step performs.
    pub mv: &'a Move,
    /// Index of this step within the solution.
    pub step: usize,
    /// Whether this is the last step, with every piece placed.
    pub terminal: bool,
}

/// An interactive solving session: board, piece slots, and review state.
pub struct Session {
    board: Board,
    pieces: [ShapeGrid; PIECE_SLOTS],
    review: Review,
}

impl Session {
    /// A session with an empty board and blank piece canvases.
    pub fn new() -> Self {
        Session {
            board: Board::empty(),
            pieces: std::array::from_fn(|_| blank_canvas()),
            review: Review::Idle,
        }
    }

    /// The current editable board.
    pub fn board(&self) -> Board {
        self.board
    }

    /// The authoring grid in a piece slot.
    pub fn piece(&self, slot: usize) -> &ShapeGrid {
        &self.pieces[slot]
    }

    /// Replaces the whole board.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
        self.review = Review::Idle;
    }

    /// Paints one board cell.
    pub fn set_cell(&mut self, row: i32, col: i32, filled: bool) {
        self.board.set(row, col, filled);
        self.review = Review::Idle;
    }

    /// Flips one board cell.
    pub fn toggle_cell(&mut self, row: i32, col: i32) {
        self.board.toggle(row, col);
        self.review = Review::Idle;
    }

    /// Empties the board.
    pub fn clear_board(&mut self) {
        self.board = Board::empty();
        self.review = Review::Idle;
    }

    /// Installs a shape into a piece slot.
    pub fn set_piece(&mut self, slot: usize, grid: ShapeGrid) {
        self.pieces[slot] = grid;
        self.review = Review::Idle;
    }

    /// Flips one cell of a piece slot's canvas.
    pub fn toggle_piece_cell(&mut self, slot: usize, row: usize, col: usize) {
        if row < PIECE_CANVAS && col < PIECE_CANVAS {
            let grid = &mut self.pieces[slot];
            if grid.len() <= row {
                grid.resize(row + 1, Vec::new());
            }
            let cells = &mut grid[row];
            if cells.len() <= col {
                cells.resize(col + 1, false);
            }
            cells[col] = !cells[col];
            self.review = Review::Idle;
        }
    }

    /// Blanks one piece slot.
    pub fn clear_piece(&mut self, slot: usize) {
        self.pieces[slot] = blank_canvas();
        self.review = Review::Idle;
    }

    /// Blanks every piece slot.
    pub fn clear_pieces(&mut self) {
        self.pieces = std::array::from_fn(|_| blank_canvas());
        self.review = Review::Idle;
    }

    /// Repaints the board at random.
    pub fn randomize_board<R: Rng>(&mut self, rng: &mut R) {
        self.board = catalog::random_board(rng);
        self.review = Review::Idle;
    }

    /// Fills every piece slot with a random catalog shape.
    pub fn randomize_pieces<R: Rng>(&mut self, rng: &mut R) {
        self.pieces = catalog::random_pieces(rng);
        self.review = Review::Idle;
    }

    /// Solves the current board and pieces.
    ///
    /// On success the session enters review at step 0, with the pre-solve
    /// board captured for replay, and the number of moves is returned. On
    /// failure the session is (or returns to) `Idle` and the board is left
    /// untouched either way.
    pub fn solve(&mut self) -> Result<usize, SolveError> {
        self.review = Review::Idle;
        let moves = solver::solve(self.board, &self.pieces)?;
        let len = moves.len();
        self.review = Review::Reviewing {
            original: self.board,
            moves,
            cursor: 0,
        };
        Ok(len)
    }

    /// Moves the review cursor one step forward; no-op at the last step or
    /// when idle.
    pub fn advance(&mut self) {
        if let Review::Reviewing { moves, cursor, .. } = &mut self.review {
            if *cursor + 1 < moves.len() {
                *cursor += 1;
            }
        }
    }

    /// Moves the review cursor one step back; no-op at step 0 or when idle.
    pub fn retreat(&mut self) {
        if let Review::Reviewing { cursor, .. } = &mut self.review {
            if *cursor > 0 {
                *cursor -= 1;
            }
        }
    }

    /// Discards the solution, cursor, and original-board capture.
    pub fn reset(&mut self) {
        self.review = Review::Idle;
    }

    /// The review cursor, or `None` when idle.
    pub fn cursor(&self) -> Option<usize> {
        match &self.review {
            Review::Idle => None,
            Review::Reviewing { cursor, .. } => Some(*cursor),
        }
    }

    /// The solution under review, or `None` when idle.
    pub fn moves(&self) -> Option<&[Move]> {
        match &self.review {
            Review::Idle => None,
            Review::Reviewing { moves, .. } => Some(moves),
        }
    }

    /// Reconstructs the board as of a given step.
    ///
    /// Starts from the captured original board and applies placement then
    /// line-clear for each move up to and including `step`; the stored
    /// `board_after` snapshots are not reused, so a rendered state is always
    /// re-derived from first principles. Returns `None` when idle or when
    /// `step` is outside the solution.
    pub fn render_at(&self, step: usize) -> Option<StepView<'_>> {
        let Review::Reviewing {
            original, moves, ..
        } = &self.review
        else {
            return None;
        };
        if step >= moves.len() {
            return None;
        }

        let mut board = *original;
        for mv in &moves[..=step] {
            let placed = Board::from_bits(board.bits() | mv.footprint);
            let (after, _) = placed.clear_lines();
            board = after;
        }

        let mv = &moves[step];
        Some(StepView {
            board,
            placed: Board::from_bits(board.bits() & mv.footprint),
            mv,
            step,
            terminal: step + 1 == moves.len(),
        })
    }

    /// Reconstructs the board at the review cursor.
    pub fn render_current(&self) -> Option<StepView<'_>> {
        self.render_at(self.cursor()?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_canvas() -> ShapeGrid {
    vec![vec![false; PIECE_CANVAS]; PIECE_CANVAS]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single() -> ShapeGrid {
        vec![vec![true]]
    }

    fn session_with_three_singles() -> Session {
        let mut session = Session::new();
        for slot in 0..PIECE_SLOTS {
            session.set_piece(slot, single());
        }
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert!(session.cursor().is_none());
        assert!(session.moves().is_none());
        assert!(session.render_at(0).is_none());
    }

    #[test]
    fn test_solve_enters_review_at_step_zero() {
        let mut session = session_with_three_singles();
        let placed = session.solve().unwrap();
        assert_eq!(placed, 3);
        assert_eq!(session.cursor(), Some(0));
    }

    #[test]
    fn test_failed_solve_stays_idle() {
        let mut session = session_with_three_singles();
        session.set_board(Board::full());
        assert_eq!(session.solve().unwrap_err(), SolveError::NoSolutionFound);
        assert!(session.cursor().is_none());
        assert_eq!(session.board(), Board::full());
    }

    #[test]
    fn test_blank_pieces_report_no_valid_pieces() {
        let mut session = Session::new();
        assert_eq!(session.solve().unwrap_err(), SolveError::NoValidPieces);
    }

    #[test]
    fn test_cursor_is_clamped_to_solution() {
        let mut session = session_with_three_singles();
        session.solve().unwrap();

        session.retreat();
        assert_eq!(session.cursor(), Some(0), "retreat at step 0 is a no-op");

        for _ in 0..10 {
            session.advance();
        }
        assert_eq!(session.cursor(), Some(2), "advance stops at the last step");

        session.retreat();
        assert_eq!(session.cursor(), Some(1));
    }

    #[test]
    fn test_render_at_first_step_applies_exactly_move_zero() {
        let mut session = session_with_three_singles();
        session.toggle_cell(4, 4);
        let original = session.board();
        session.solve().unwrap();

        let view = session.render_at(0).unwrap();
        let mv = &session.moves().unwrap()[0];
        let expected = Board::from_bits(original.bits() | mv.footprint)
            .clear_lines()
            .0;
        assert_eq!(view.board, expected);
        assert!(!view.terminal);
        assert_eq!(view.step, 0);
    }

    #[test]
    fn test_render_at_last_step_matches_folding_all_moves() {
        let mut session = session_with_three_singles();
        for col in 0..7 {
            session.set_cell(0, col, true);
        }
        let original = session.board();
        let placed = session.solve().unwrap();

        let mut folded = original;
        for mv in session.moves().unwrap() {
            folded = Board::from_bits(folded.bits() | mv.footprint).clear_lines().0;
        }

        let view = session.render_at(placed - 1).unwrap();
        assert_eq!(view.board, folded);
        assert!(view.terminal);
    }

    #[test]
    fn test_render_rederivation_agrees_with_stored_snapshots() {
        let mut session = session_with_three_singles();
        for col in 0..7 {
            session.set_cell(0, col, true);
        }
        session.solve().unwrap();

        let moves = session.moves().unwrap().to_vec();
        for (step, mv) in moves.iter().enumerate() {
            let view = session.render_at(step).unwrap();
            assert_eq!(view.board, mv.board_after, "step {step}");
        }
    }

    #[test]
    fn test_render_highlight_covers_surviving_piece_cells() {
        let mut session = session_with_three_singles();
        session.solve().unwrap();

        let view = session.render_at(1).unwrap();
        let mv = &session.moves().unwrap()[1];
        assert_eq!(view.placed.bits(), mv.footprint & view.board.bits());
        assert_eq!(view.placed.occupied(), 1);
    }

    #[test]
    fn test_render_out_of_range_step_is_none() {
        let mut session = session_with_three_singles();
        session.solve().unwrap();
        assert!(session.render_at(3).is_none());
    }

    #[test]
    fn test_reset_discards_review() {
        let mut session = session_with_three_singles();
        session.solve().unwrap();
        session.reset();
        assert!(session.cursor().is_none());
        assert!(session.render_at(0).is_none());
    }

    #[test]
    fn test_edits_invalidate_review() {
        let mut session = session_with_three_singles();

        session.solve().unwrap();
        session.toggle_cell(3, 3);
        assert!(session.moves().is_none(), "board edit drops the solution");

        session.solve().unwrap();
        session.clear_piece(1);
        assert!(session.moves().is_none(), "piece edit drops the solution");
    }

    #[test]
    fn test_randomize_is_reproducible() {
        let mut first = Session::new();
        let mut second = Session::new();
        first.randomize_board(&mut StdRng::seed_from_u64(7));
        second.randomize_board(&mut StdRng::seed_from_u64(7));
        assert_eq!(first.board(), second.board());

        first.randomize_pieces(&mut StdRng::seed_from_u64(9));
        second.randomize_pieces(&mut StdRng::seed_from_u64(9));
        for slot in 0..PIECE_SLOTS {
            assert_eq!(first.piece(slot), second.piece(slot));
        }
    }

    #[test]
    fn test_toggle_piece_cell_paints_the_canvas() {
        let mut session = Session::new();
        session.toggle_piece_cell(0, 2, 2);
        assert!(session.piece(0)[2][2]);
        session.toggle_piece_cell(0, 2, 2);
        assert!(!session.piece(0)[2][2]);
        // outside the canvas: ignored
        session.toggle_piece_cell(0, PIECE_CANVAS, 0);
        assert!(crate::shape::is_blank(session.piece(0)));
    }
}
