//! Zerg Chess - Move Generator Module
//!
//! This module generates moves for each piece category. The variant has no
//! check, so every pseudo-legal move is playable. Output is split into
//! captures and quiet moves because the search always tries captures first.

use crate::board::{Board, Move};
use crate::piece::{Piece, PieceKind};
use crate::types::*;

/// Direction offsets (row, col) for sliding and stepping pieces
pub const ROOK_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];
pub const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const KING_DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-2, 1),
    (-1, 2),
    (2, -1),
    (1, -2),
    (-2, -1),
    (-1, -2),
];
const BLACK_PAWN_ATTACKS: [(i32, i32); 2] = [(1, -1), (1, 1)];
const WHITE_PAWN_ATTACKS: [(i32, i32); 2] = [(-1, -1), (-1, 1)];

/// Moves of one piece or one side, captures kept apart from quiet moves
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveList {
    pub captures: Vec<Move>,
    pub quiets: Vec<Move>,
}

impl MoveList {
    pub fn new() -> Self {
        MoveList::default()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty() && self.quiets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.captures.len() + self.quiets.len()
    }

    /// Captures first, then quiet moves
    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.captures.iter().chain(self.quiets.iter())
    }

    /// Move landing on (row, col), for turning a clicked cell into a move
    pub fn find_to(&self, row: usize, col: usize) -> Option<&Move> {
        self.iter().find(|mv| mv.to_square() == (row, col))
    }
}

/// Move generator for positions on the 8x5 board
pub struct MoveGenerator;

impl MoveGenerator {
    /// Create a new move generator
    pub fn new() -> Self {
        MoveGenerator
    }

    /// Generate every move of one side; `prev` is the move just played
    pub fn generate_moves(&self, board: &Board, white: bool, prev: Option<&Move>) -> MoveList {
        let mut moves = MoveList {
            captures: Vec::with_capacity(16),
            quiets: Vec::with_capacity(32),
        };
        for piece in board.live_pieces(white) {
            piece.generate_moves(board, prev, &mut moves);
        }
        moves
    }

    /// Generate the moves of a single piece; empty once it is captured
    pub fn piece_moves(&self, board: &Board, id: PieceId, prev: Option<&Move>) -> MoveList {
        let mut moves = MoveList::new();
        let piece = board.piece(id);
        if !piece.is_captured() {
            piece.generate_moves(board, prev, &mut moves);
        }
        moves
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator::new()
    }
}

/// Record a move onto (row, col). Returns true if a ray may continue past it.
#[inline]
fn push_target(board: &Board, piece: &Piece, from: (usize, usize), to: (usize, usize), out: &mut MoveList) -> bool {
    match board.at(to.0, to.1) {
        None => {
            out.quiets.push(Move::new(piece.id, from, to));
            true
        }
        Some(target) => {
            if target.white != piece.white {
                out.captures.push(Move::capture(piece.id, from, to, target.id));
            }
            false
        }
    }
}

/// King and knight: one hop per offset
pub fn generate_step_moves(board: &Board, piece: &Piece, offsets: &[(i32, i32)], out: &mut MoveList) {
    let Some(from) = piece.square() else { return };

    for &(dr, dc) in offsets {
        let (r, c) = (from.0 as i32 + dr, from.1 as i32 + dc);
        if !on_board(r, c) {
            continue;
        }
        push_target(board, piece, from, (r as usize, c as usize), out);
    }
}

/// Bishop and rook: cast rays until the edge, a friendly piece or a capture
pub fn generate_sliding_moves(board: &Board, piece: &Piece, directions: &[(i32, i32)], out: &mut MoveList) {
    let Some(from) = piece.square() else { return };

    for &(dr, dc) in directions {
        let (mut r, mut c) = (from.0 as i32, from.1 as i32);
        loop {
            r += dr;
            c += dc;
            if !on_board(r, c) || !push_target(board, piece, from, (r as usize, c as usize), out) {
                break;
            }
        }
    }
}

/// White pawns advance toward row 0, may double-step from row 6 and promote on row 0
pub fn generate_white_pawn_moves(board: &Board, piece: &Piece, out: &mut MoveList) {
    let Some((row, col)) = piece.square() else { return };
    if row == PROMOTION_ROW {
        return;
    }

    let next = row - 1;
    let promotion = next == PROMOTION_ROW;

    if board.at(next, col).is_none() {
        out.quiets.push(Move::new(piece.id, (row, col), (next, col)).with_promotion(promotion));

        if row == WHITE_PAWN_START_ROW && board.at(row - 2, col).is_none() {
            out.quiets.push(Move::double_step(piece.id, (row, col), (row - 2, col)));
        }
    }

    for dc in [-1, 1] {
        let c = col as i32 + dc;
        if !on_board(next as i32, c) {
            continue;
        }
        let c = c as usize;
        if let Some(target) = board.at(next, c) {
            if !target.white {
                out.captures
                    .push(Move::capture(piece.id, (row, col), (next, c), target.id).with_promotion(promotion));
            }
        }
    }
}

/// Black pawns advance toward row 7. Reaching row 7 wins, so that step is
/// listed with the captures. On row 4 a pawn may take a white pawn that
/// double-stepped beside it on the previous move.
pub fn generate_black_pawn_moves(board: &Board, piece: &Piece, prev: Option<&Move>, out: &mut MoveList) {
    let Some((row, col)) = piece.square() else { return };
    if row >= BREAKTHROUGH_ROW {
        return;
    }

    let next = row + 1;

    if board.at(next, col).is_none() {
        let mv = Move::new(piece.id, (row, col), (next, col));
        if next == BREAKTHROUGH_ROW {
            out.captures.push(mv);
        } else {
            out.quiets.push(mv);
        }
    }

    for dc in [-1, 1] {
        let c = col as i32 + dc;
        if !on_board(next as i32, c) {
            continue;
        }
        let c = c as usize;
        if let Some(target) = board.at(next, c) {
            if target.white {
                out.captures.push(Move::capture(piece.id, (row, col), (next, c), target.id));
            }
        }
    }

    if row != EN_PASSANT_ROW {
        return;
    }
    if let Some(prev) = prev.filter(|m| m.creates_en_passant) {
        let (vr, vc) = prev.to_square();
        let beside = vr == row && (vc as i32 - col as i32).abs() == 1;
        if beside && board.grid[vr][vc] == Some(prev.piece) && board.at(next, vc).is_none() {
            out.captures
                .push(Move::en_passant(piece.id, (row, col), (next, vc), prev.piece));
        }
    }
}

/// Visit every cell `piece` attacks, whether empty, friendly or enemy
pub fn for_each_attack<F: FnMut(usize, usize)>(board: &Board, piece: &Piece, mut visit: F) {
    let Some((row, col)) = piece.square() else { return };
    let (row, col) = (row as i32, col as i32);

    let (offsets, sliding) = match piece.kind {
        PieceKind::BlackPawn => (&BLACK_PAWN_ATTACKS[..], false),
        PieceKind::WhitePawn => (&WHITE_PAWN_ATTACKS[..], false),
        PieceKind::King => (&KING_DIRECTIONS[..], false),
        PieceKind::Knight => (&KNIGHT_OFFSETS[..], false),
        PieceKind::Bishop => (&BISHOP_DIRECTIONS[..], true),
        PieceKind::Rook => (&ROOK_DIRECTIONS[..], true),
    };

    for &(dr, dc) in offsets {
        let (mut r, mut c) = (row + dr, col + dc);
        while on_board(r, c) {
            visit(r as usize, c as usize);
            if !sliding || board.grid[r as usize][c as usize].is_some() {
                break;
            }
            r += dr;
            c += dc;
        }
    }
}
