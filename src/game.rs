//! Zerg Chess - Game Module
//!
//! This module ties the engine together for a front end: it owns the board,
//! the search engine, the move history and the side to move, and it loads
//! and saves the persisted Zobrist keys and transposition table.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::prelude::*;

use crate::board::{Board, Move};
use crate::error::{EngineError, Result};
use crate::move_generator::{MoveGenerator, MoveList};
use crate::search::{SearchEngine, TranspositionTable, DEFAULT_TT_CAPACITY};
use crate::types::*;
use crate::zobrist::ZobristKeys;

/// Default search depth; odd so the side to move sees the reply to its reply
pub const DEFAULT_DEPTH: u8 = 5;
pub const DEFAULT_MAX_PLIES: usize = 200;

/// Settings gathered by the front end
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Back-rank layout, random when `None`
    pub layout: Option<String>,
    pub depth: u8,
    /// Transposition table slots; 0 disables the table
    pub tt_capacity: usize,
    pub zobrist_path: Option<PathBuf>,
    pub tt_path: Option<PathBuf>,
    /// Self-play stops after this many plies
    pub max_plies: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            layout: None,
            depth: DEFAULT_DEPTH,
            tt_capacity: DEFAULT_TT_CAPACITY,
            zobrist_path: None,
            tt_path: None,
            max_plies: DEFAULT_MAX_PLIES,
        }
    }
}

/// A game in progress. White moves first.
pub struct Game {
    board: Board,
    engine: SearchEngine,
    move_generator: MoveGenerator,
    history: Vec<Move>,
    white_to_move: bool,
    depth: u8,
}

impl Game {
    /// Set up a new game. Persisted blobs are optional: a missing or
    /// rejected file is logged and replaced by defaults.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let keys = match &config.zobrist_path {
            Some(path) => load_zobrist(path).unwrap_or_else(|err| {
                warn!("ignoring Zobrist keys {}: {err}", path.display());
                ZobristKeys::default()
            }),
            None => ZobristKeys::default(),
        };
        let board = Board::setup_with_keys(config.layout.as_deref(), keys)?;

        let table = match &config.tt_path {
            Some(path) if config.tt_capacity > 0 => match load_table(path) {
                Ok(table) => {
                    info!("loaded transposition table from {} ({} slots)", path.display(), table.capacity());
                    Some(table)
                }
                Err(err) => {
                    warn!("ignoring transposition table {}: {err}", path.display());
                    Some(TranspositionTable::new(config.tt_capacity))
                }
            },
            _ => (config.tt_capacity > 0).then(|| TranspositionTable::new(config.tt_capacity)),
        };

        Ok(Game::from_board(board, true, SearchEngine::with_table(table), config.depth))
    }

    /// Game continuing from an arbitrary position
    pub fn from_board(board: Board, white_to_move: bool, engine: SearchEngine, depth: u8) -> Self {
        Game {
            board,
            engine,
            move_generator: MoveGenerator::new(),
            history: Vec::new(),
            white_to_move,
            depth,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u8) {
        self.depth = depth;
    }

    /// The move just played, which decides en passant rights
    pub fn previous_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Moves of one piece for highlighting. Pieces of the side not on move have none.
    pub fn legal_moves_for(&self, id: PieceId) -> Result<MoveList> {
        if id >= PIECE_COUNT {
            return Err(EngineError::NoSuchPiece { id });
        }
        if self.board.piece(id).white != self.white_to_move {
            return Ok(MoveList::new());
        }
        Ok(self.move_generator.piece_moves(&self.board, id, self.previous_move()))
    }

    /// Every move of the side to move, captures first
    pub fn legal_moves(&self) -> MoveList {
        self.move_generator
            .generate_moves(&self.board, self.white_to_move, self.previous_move())
    }

    /// Resolve coordinate notation such as "b2b4" against the legal moves
    pub fn parse_move(&self, notation: &str) -> Option<Move> {
        let notation = notation.trim();
        let from = parse_square(notation.get(0..2)?)?;
        let to = parse_square(notation.get(2..4)?)?;
        self.legal_moves()
            .iter()
            .find(|mv| mv.from_square() == from && mv.to_square() == to)
            .copied()
    }

    /// Apply a generated move, record it and pass the turn
    pub fn play(&mut self, mv: Move) -> u32 {
        debug_assert_eq!(self.board.piece(mv.piece).white, self.white_to_move);
        let hash = self.board.make_move(&mv);
        self.history.push(mv);
        self.white_to_move = !self.white_to_move;
        hash
    }

    /// Take back the last move
    pub fn undo(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;
        self.board.unmake_move(&mv);
        self.white_to_move = !self.white_to_move;
        Some(mv)
    }

    /// Search the current position without playing anything
    pub fn best_move(&mut self) -> Option<Move> {
        let prev = self.history.last().copied();
        self.engine
            .best_move(&mut self.board, prev.as_ref(), self.depth, self.white_to_move)
    }

    /// Search and play the engine's choice; `None` if the game is decided or stuck
    pub fn ai_move(&mut self) -> Option<Move> {
        let mv = self.best_move()?;
        self.play(mv);
        Some(mv)
    }

    /// 0 while open, `WIN_SCORE` if white has won, `-WIN_SCORE` if black has
    pub fn win_status(&self) -> i32 {
        self.board.check_win()
    }

    /// Decided, or the side to move has nothing to play
    pub fn is_over(&self) -> bool {
        self.win_status() != 0 || self.legal_moves().is_empty()
    }

    /// Write the board's keys and the search table to disk
    pub fn save(&self, zobrist_path: &Path, tt_path: Option<&Path>) -> Result<()> {
        fs::write(zobrist_path, self.board.zobrist().to_bytes())?;
        if let (Some(path), Some(table)) = (tt_path, self.engine.table()) {
            fs::write(path, table.to_bytes())?;
        }
        Ok(())
    }
}

pub fn load_zobrist(path: &Path) -> Result<ZobristKeys> {
    ZobristKeys::from_bytes(&fs::read(path)?)
}

pub fn load_table(path: &Path) -> Result<TranspositionTable> {
    TranspositionTable::from_bytes(&fs::read(path)?)
}

/// Write freshly drawn Zobrist keys and an empty table of `tt_capacity` slots
pub fn write_fresh_blobs<R: Rng + ?Sized>(
    rng: &mut R,
    zobrist_path: &Path,
    tt_path: &Path,
    tt_capacity: usize,
) -> Result<()> {
    fs::write(zobrist_path, ZobristKeys::from_rng(rng).to_bytes())?;
    fs::write(tt_path, TranspositionTable::new(tt_capacity).to_bytes())?;
    info!(
        "wrote Zobrist keys to {} and a {tt_capacity}-slot table to {}",
        zobrist_path.display(),
        tt_path.display()
    );
    Ok(())
}
