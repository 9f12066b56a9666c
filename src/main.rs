//! Block Puzzle Solver
//!
//! Solves 8x8 block-placement puzzles: given a painted board and up to
//! three piece shapes, finds an order and position for every piece (clearing
//! completed rows and columns along the way) and steps through the solution
//! interactively.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use blockstep::board::format_board_overlay;
use blockstep::{catalog, persistence, Session, ShapeGrid};

/// Solves 8x8 block-placement puzzles and steps through the solutions.
#[derive(Parser)]
#[command(name = "blockstep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle file and print the step report.
    Solve {
        file: PathBuf,
        /// Also write the report to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a random puzzle in the puzzle file format.
    Gen {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Solve a puzzle file and step through the solution interactively.
    Walk { file: PathBuf },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Solve { file, out }) => run_solve(&file, out.as_deref()),
        Some(Command::Gen { seed }) => run_gen(seed),
        Some(Command::Walk { file }) => {
            if let Some(session) = load_session(&file) {
                walk(session);
            }
        }
        None => {
            // default: random puzzle, solve, walk
            let mut rng = StdRng::from_entropy();
            let mut session = Session::new();
            session.randomize_board(&mut rng);
            session.randomize_pieces(&mut rng);
            print_session_puzzle(&session);
            walk(session);
        }
    }
}

/// Solves a puzzle file and prints (optionally saves) the report.
fn run_solve(file: &Path, out: Option<&Path>) {
    let (board, pieces) = match persistence::load_puzzle(file) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            eprintln!("Failed to load {}: {}", file.display(), err);
            return;
        }
    };

    match blockstep::solve(board, &pieces) {
        Ok(moves) => {
            let report = persistence::format_report(&moves);
            print!("{report}");
            if let Some(path) = out {
                if let Err(err) = persistence::save_report(path, &moves) {
                    eprintln!("Failed to write {}: {}", path.display(), err);
                } else {
                    println!("Wrote {}", path.display());
                }
            }
        }
        Err(err) => println!("{err}"),
    }
}

/// Prints a random puzzle file to stdout.
fn run_gen(seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let board = catalog::random_board(&mut rng);
    let pieces = catalog::random_pieces(&mut rng);
    print!("{}", persistence::format_puzzle(board, &pieces));
}

/// Builds a session from a puzzle file.
fn load_session(file: &Path) -> Option<Session> {
    match persistence::load_puzzle(file) {
        Ok((board, pieces)) => {
            let mut session = Session::new();
            session.set_board(board);
            for (slot, grid) in pieces.into_iter().enumerate() {
                session.set_piece(slot, grid);
            }
            Some(session)
        }
        Err(err) => {
            eprintln!("Failed to load {}: {}", file.display(), err);
            None
        }
    }
}

fn print_session_puzzle(session: &Session) {
    let pieces: Vec<ShapeGrid> = (0..blockstep::PIECE_SLOTS)
        .map(|slot| session.piece(slot).clone())
        .collect();
    print!("{}", persistence::format_puzzle(session.board(), &pieces));
}

/// Solves the session and steps through the solution on stdin commands.
fn walk(mut session: Session) {
    match session.solve() {
        Ok(placed) => println!("Solution found: {placed} pieces to place"),
        Err(err) => {
            println!("{err}");
            return;
        }
    }
    println!("Controls: [n]ext, [p]revious, [r]eset, [q]uit");

    let stdin = io::stdin();
    loop {
        {
            let Some(view) = session.render_current() else {
                break;
            };
            let total = session.moves().map_or(0, |moves| moves.len());
            println!();
            print!("{}", format_board_overlay(view.board, view.placed));
            println!(
                "Step {} of {}: place piece {} at row {}, column {}, clearing {} lines",
                view.step + 1,
                total,
                view.mv.piece.slot + 1,
                view.mv.anchor.0 + 1,
                view.mv.anchor.1 + 1,
                view.mv.cleared
            );
            if view.terminal {
                println!("All {total} pieces placed. The board is ready for the next round.");
            }
        }

        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        match line.trim() {
            "" | "n" | "next" => session.advance(),
            "p" | "prev" | "previous" => session.retreat(),
            "r" | "reset" => session.reset(),
            "q" | "quit" => break,
            other => println!("Unknown command {other:?}"),
        }
    }
}
