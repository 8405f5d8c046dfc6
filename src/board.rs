//! Zerg Chess - Board Representation Module
//!
//! This module provides the core data structures for representing the 8x5
//! board, the piece registry and moves. It includes back-rank setup, the
//! reversible move applier with incremental fingerprint maintenance, and
//! the win check.

use std::fmt;

use log::debug;
use rand::prelude::*;

use crate::error::{EngineError, Result};
use crate::piece::{Piece, PieceKind};
use crate::types::*;
use crate::zobrist::ZobristKeys;

/// Pieces that make up the white back rank, in layout-code order
pub const BACK_RANK_KINDS: [PieceKind; 4] = [
    PieceKind::King,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
];

/// One ply: produced by the move generator, applied once and unmade once
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: PieceId,
    pub from_row: u8,
    pub from_col: u8,
    pub to_row: u8,
    pub to_col: u8,
    pub captured: Option<PieceId>,
    pub promotion: bool,
    /// Pawn double-step that the opponent may answer en passant
    pub creates_en_passant: bool,
    /// Capture of a pawn that is not standing on the destination cell
    pub en_passant_capture: bool,
}

impl Move {
    /// Create a move that captures nothing
    pub fn new(piece: PieceId, from: (usize, usize), to: (usize, usize)) -> Self {
        Move {
            piece,
            from_row: from.0 as u8,
            from_col: from.1 as u8,
            to_row: to.0 as u8,
            to_col: to.1 as u8,
            captured: None,
            promotion: false,
            creates_en_passant: false,
            en_passant_capture: false,
        }
    }

    /// Create a capture of the piece standing on the destination cell
    pub fn capture(piece: PieceId, from: (usize, usize), to: (usize, usize), captured: PieceId) -> Self {
        Move {
            captured: Some(captured),
            ..Move::new(piece, from, to)
        }
    }

    /// Create a pawn double-step
    pub fn double_step(piece: PieceId, from: (usize, usize), to: (usize, usize)) -> Self {
        Move {
            creates_en_passant: true,
            ..Move::new(piece, from, to)
        }
    }

    /// Create an en passant capture of `captured`, which sits beside the mover
    pub fn en_passant(piece: PieceId, from: (usize, usize), to: (usize, usize), captured: PieceId) -> Self {
        Move {
            captured: Some(captured),
            en_passant_capture: true,
            ..Move::new(piece, from, to)
        }
    }

    /// Mark the move as promoting
    pub fn with_promotion(self, promotion: bool) -> Self {
        Move { promotion, ..self }
    }

    #[inline]
    pub fn from_square(&self) -> (usize, usize) {
        (self.from_row as usize, self.from_col as usize)
    }

    #[inline]
    pub fn to_square(&self) -> (usize, usize) {
        (self.to_row as usize, self.to_col as usize)
    }

    /// Convert move to coordinate notation (e.g., "b2b4", "a7a8r")
    pub fn to_notation(&self) -> String {
        let (fr, fc) = self.from_square();
        let (tr, tc) = self.to_square();
        let mut s = format!("{}{}", square_name(fr, fc), square_name(tr, tc));
        if self.promotion {
            s.push('r');
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

/// Parse a back-rank layout such as `" knbr"` or `"r.bnk"`.
///
/// Strings shorter than five columns are right-aligned, so `"knbr"` leaves
/// column 0 empty.
pub fn parse_back_rank(layout: &str) -> Result<[Option<PieceKind>; COLS]> {
    let invalid = |reason: String| EngineError::InvalidLayout {
        layout: layout.to_string(),
        reason,
    };

    let chars: Vec<char> = layout.chars().collect();
    if chars.len() > COLS {
        return Err(invalid(format!("{} columns, the board has {COLS}", chars.len())));
    }

    let offset = COLS - chars.len();
    let mut rank = [None; COLS];
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' || c == '.' {
            continue;
        }
        let kind = PieceKind::from_code(c).ok_or_else(|| invalid(format!("unknown piece code {c:?}")))?;
        if rank.contains(&Some(kind)) {
            return Err(invalid(format!("piece code {c:?} appears twice")));
        }
        rank[offset + i] = Some(kind);
    }

    if let Some(missing) = BACK_RANK_KINDS.iter().find(|k| !rank.contains(&Some(**k))) {
        return Err(invalid(format!("missing {}", missing.symbol())));
    }

    Ok(rank)
}

/// Shuffle the four back-rank pieces and one blank over the five columns
pub fn random_back_rank<R: Rng + ?Sized>(rng: &mut R) -> [Option<PieceKind>; COLS] {
    let mut rank = [
        Some(PieceKind::King),
        Some(PieceKind::Knight),
        Some(PieceKind::Bishop),
        Some(PieceKind::Rook),
        None,
    ];
    rank.shuffle(rng);
    rank
}

fn back_rank_id(kind: PieceKind) -> PieceId {
    match kind {
        PieceKind::King => KING_ID,
        PieceKind::Knight => KNIGHT_ID,
        PieceKind::Bishop => BISHOP_ID,
        _ => ROOK_ID,
    }
}

/// Board, piece registry, capture counters and fingerprint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// Non-owning references into `pieces`
    pub grid: [[Option<PieceId>; COLS]; ROWS],
    pub pieces: [Piece; PIECE_COUNT],
    /// Number of white pieces captured so far
    pub white_lost: u8,
    /// Number of black pieces captured so far
    pub black_lost: u8,
    /// Incrementally maintained Zobrist fingerprint
    pub hash: u32,
    zobrist: ZobristKeys,
}

impl Board {
    /// Starting position with default Zobrist keys; random back rank if `layout` is `None`
    pub fn setup(layout: Option<&str>) -> Result<Self> {
        Board::setup_with_keys(layout, ZobristKeys::default())
    }

    /// Starting position hashed with the given key set
    pub fn setup_with_keys(layout: Option<&str>, zobrist: ZobristKeys) -> Result<Self> {
        let back_rank = match layout {
            Some(layout) => parse_back_rank(layout)?,
            None => random_back_rank(&mut thread_rng()),
        };
        Ok(Board::from_back_rank(back_rank, zobrist))
    }

    /// Starting position for an already-parsed back rank
    pub fn from_back_rank(back_rank: [Option<PieceKind>; COLS], zobrist: ZobristKeys) -> Self {
        let mut board = Board::empty(zobrist);

        // black pawns fill rows 0-2
        for id in 0..BLACK_PIECES {
            board.restore(id, id / COLS, id % COLS);
        }

        for col in 0..COLS {
            board.restore(FIRST_WHITE_PAWN + col, WHITE_PAWN_START_ROW, col);
        }

        for (col, kind) in back_rank.iter().enumerate() {
            if let Some(kind) = kind {
                board.restore(back_rank_id(*kind), WHITE_BACK_ROW, col);
            }
        }

        board.hash = board.compute_hash();
        debug!("board set up, fingerprint {:08x}\n{}", board.hash, board);
        board
    }

    /// Arbitrary position: the listed pieces are placed, every other slot is captured
    pub fn from_placements(placements: &[(PieceId, usize, usize)], zobrist: ZobristKeys) -> Self {
        let mut board = Board::empty(zobrist);
        for &(id, row, col) in placements {
            board.restore(id, row, col);
        }
        board.hash = board.compute_hash();
        board
    }

    /// Every slot captured, counters full
    fn empty(zobrist: ZobristKeys) -> Self {
        Board {
            grid: [[None; COLS]; ROWS],
            pieces: std::array::from_fn(Piece::captured),
            white_lost: WHITE_PIECES as u8,
            black_lost: BLACK_PIECES as u8,
            hash: 0,
            zobrist,
        }
    }

    /// Put a captured slot back on the board during setup
    fn restore(&mut self, id: PieceId, row: usize, col: usize) {
        assert!(self.pieces[id].is_captured(), "piece {id} placed twice");
        assert!(self.grid[row][col].is_none(), "cell {} occupied twice", square_name(row, col));
        self.place(id, row, col);
        if self.pieces[id].white {
            self.white_lost -= 1;
        } else {
            self.black_lost -= 1;
        }
    }

    // ------------------------------------------------------------------
    // Primitive accessors and mutators
    // ------------------------------------------------------------------

    /// Piece standing on (row, col)
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Option<&Piece> {
        self.grid[row][col].map(|id| &self.pieces[id])
    }

    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id]
    }

    /// Write `id` into the grid and its coordinates into the registry
    #[inline]
    pub fn place(&mut self, id: PieceId, row: usize, col: usize) {
        self.grid[row][col] = Some(id);
        self.pieces[id].row = row as i8;
        self.pieces[id].col = col as i8;
    }

    /// Clear a grid cell, returning the reference it held
    #[inline]
    pub fn remove(&mut self, row: usize, col: usize) -> Option<PieceId> {
        self.grid[row][col].take()
    }

    /// Live pieces of one side
    pub fn live_pieces(&self, white: bool) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.white == white && !p.is_captured())
    }

    pub fn zobrist(&self) -> &ZobristKeys {
        &self.zobrist
    }

    /// Swap in another key set and rehash from scratch
    pub fn set_zobrist(&mut self, zobrist: ZobristKeys) {
        self.zobrist = zobrist;
        self.hash = self.compute_hash();
    }

    /// Fingerprint recomputed from scratch
    pub fn compute_hash(&self) -> u32 {
        self.zobrist.hash_pieces(&self.pieces)
    }

    // ------------------------------------------------------------------
    // Move application
    // ------------------------------------------------------------------

    /// Apply a move generated for this position. Returns the new fingerprint.
    pub fn make_move(&mut self, mv: &Move) -> u32 {
        let (fr, fc) = mv.from_square();
        let (tr, tc) = mv.to_square();
        assert_eq!(
            self.grid[fr][fc],
            Some(mv.piece),
            "make_move {mv}: mover is not on its origin cell"
        );

        if let Some(victim) = mv.captured {
            let captured = self.pieces[victim];
            let (vr, vc) = captured
                .square()
                .unwrap_or_else(|| panic!("make_move {mv}: piece {victim} is already captured"));
            debug_assert!(mv.en_passant_capture || (vr, vc) == (tr, tc));

            self.hash ^= self.zobrist.key(captured.kind, vr, vc);
            if mv.en_passant_capture {
                self.remove(vr, vc);
            }
            self.pieces[victim].row = CAPTURED;
            self.pieces[victim].col = CAPTURED;
            if captured.white {
                self.white_lost += 1;
            } else {
                self.black_lost += 1;
            }
        }

        let old_kind = self.pieces[mv.piece].kind;
        let new_kind = if mv.promotion {
            old_kind.promotion_target().unwrap_or(old_kind)
        } else {
            old_kind
        };

        self.remove(fr, fc);
        self.place(mv.piece, tr, tc);
        self.pieces[mv.piece].kind = new_kind;
        self.hash ^= self.zobrist.key(old_kind, fr, fc) ^ self.zobrist.key(new_kind, tr, tc);

        self.hash
    }

    /// Reverse the most recently applied move. Returns the restored fingerprint.
    pub fn unmake_move(&mut self, mv: &Move) -> u32 {
        let (fr, fc) = mv.from_square();
        let (tr, tc) = mv.to_square();
        assert_eq!(
            self.grid[tr][tc],
            Some(mv.piece),
            "unmake_move {mv}: moves must be unmade in reverse order"
        );

        let new_kind = self.pieces[mv.piece].kind;
        let old_kind = if mv.promotion {
            PieceKind::initial(mv.piece)
        } else {
            new_kind
        };

        self.remove(tr, tc);
        self.place(mv.piece, fr, fc);
        self.pieces[mv.piece].kind = old_kind;
        self.hash ^= self.zobrist.key(new_kind, tr, tc) ^ self.zobrist.key(old_kind, fr, fc);

        if let Some(victim) = mv.captured {
            assert!(
                self.pieces[victim].is_captured(),
                "unmake_move {mv}: piece {victim} is still on the board"
            );
            // en passant victims stood beside the mover's origin
            let (vr, vc) = if mv.en_passant_capture { (fr, tc) } else { (tr, tc) };
            self.place(victim, vr, vc);

            let captured = self.pieces[victim];
            if captured.white {
                self.white_lost -= 1;
            } else {
                self.black_lost -= 1;
            }
            self.hash ^= self.zobrist.key(captured.kind, vr, vc);
        }

        self.hash
    }

    /// 0 while the game is open, `WIN_SCORE` if white has won, `-WIN_SCORE` if black has
    pub fn check_win(&self) -> i32 {
        if self.black_lost as usize >= BLACK_PIECES {
            return WIN_SCORE;
        }
        if self.white_lost as usize >= WHITE_PIECES {
            return -WIN_SCORE;
        }

        let broke_through = self.grid[BREAKTHROUGH_ROW]
            .iter()
            .flatten()
            .any(|&id| self.pieces[id].kind == PieceKind::BlackPawn);
        if broke_through {
            return -WIN_SCORE;
        }

        0
    }

    /// Grid, registry coordinates and capture counters agree
    pub fn is_consistent(&self) -> bool {
        for (row, cells) in self.grid.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(id) = *cell {
                    if self.pieces[id].square() != Some((row, col)) {
                        return false;
                    }
                }
            }
        }

        let mut lost = [0u8; 2];
        for piece in &self.pieces {
            match piece.square() {
                Some((row, col)) if self.grid[row][col] != Some(piece.id) => return false,
                Some(_) => {}
                None => lost[piece.white as usize] += 1,
            }
        }

        lost == [self.black_lost, self.white_lost]
    }

    /// Display the board as a string
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        lines.push("  +---+---+---+---+---+".to_string());

        for row in 0..ROWS {
            let mut line = format!("{} |", ROWS - row);
            for col in 0..COLS {
                match self.at(row, col) {
                    Some(piece) => line.push_str(&format!(" {} |", piece.kind.symbol())),
                    None => line.push_str("   |"),
                }
            }
            lines.push(line);
            lines.push("  +---+---+---+---+---+".to_string());
        }
        lines.push("    a   b   c   d   e".to_string());

        lines.join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
