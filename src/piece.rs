//! Zerg Chess - Piece Registry Module
//!
//! Every piece is a record in a fixed 24-slot arena owned by the board.
//! Behaviour is selected by a closed `PieceKind` tag: move generation and
//! evaluation are both dispatched through it, and promotion is nothing more
//! than rewriting the tag.

use crate::board::{Board, Move};
use crate::evaluation::{self, AttackMap};
use crate::move_generator::{
    self, MoveList, BISHOP_DIRECTIONS, KING_DIRECTIONS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
};
use crate::types::*;

/// Number of piece categories, one Zobrist row each
pub const KIND_COUNT: usize = 6;

/// Piece category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Pawn of the fifteen-pawn side, moves toward row 7
    BlackPawn,
    /// Pawn of the nine-piece side, moves toward row 0 and promotes
    WhitePawn,
    King,
    Knight,
    Bishop,
    Rook,
}

impl PieceKind {
    /// Row of this category in the Zobrist table
    #[inline]
    pub const fn hash_index(self) -> usize {
        match self {
            PieceKind::BlackPawn => 0,
            PieceKind::WhitePawn => 1,
            PieceKind::King => 2,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 4,
            PieceKind::Rook => 5,
        }
    }

    /// Fixed promotion target, `None` for categories that never promote
    #[inline]
    pub const fn promotion_target(self) -> Option<PieceKind> {
        match self {
            PieceKind::WhitePawn => Some(PieceKind::Rook),
            _ => None,
        }
    }

    /// Category a registry slot holds at game start
    pub const fn initial(id: PieceId) -> PieceKind {
        match id {
            0..=14 => PieceKind::BlackPawn,
            15..=19 => PieceKind::WhitePawn,
            KING_ID => PieceKind::King,
            KNIGHT_ID => PieceKind::Knight,
            BISHOP_ID => PieceKind::Bishop,
            _ => PieceKind::Rook,
        }
    }

    /// Back-rank layout code
    pub fn from_code(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            _ => None,
        }
    }

    /// Character used when printing the board
    pub const fn symbol(self) -> char {
        match self {
            PieceKind::BlackPawn => 'p',
            PieceKind::WhitePawn => 'P',
            PieceKind::King => 'K',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
        }
    }

    /// Generate captures and quiet moves for `piece`, which must be live
    pub fn generate_moves(self, board: &Board, piece: &Piece, prev: Option<&Move>, out: &mut MoveList) {
        match self {
            PieceKind::BlackPawn => move_generator::generate_black_pawn_moves(board, piece, prev, out),
            PieceKind::WhitePawn => move_generator::generate_white_pawn_moves(board, piece, out),
            PieceKind::King => move_generator::generate_step_moves(board, piece, &KING_DIRECTIONS, out),
            PieceKind::Knight => move_generator::generate_step_moves(board, piece, &KNIGHT_OFFSETS, out),
            PieceKind::Bishop => move_generator::generate_sliding_moves(board, piece, &BISHOP_DIRECTIONS, out),
            PieceKind::Rook => move_generator::generate_sliding_moves(board, piece, &ROOK_DIRECTIONS, out),
        }
    }

    /// White-positive score of `piece` given the position's attack census
    pub fn evaluate(self, piece: &Piece, census: &AttackMap) -> i32 {
        let score = match self {
            PieceKind::BlackPawn => evaluation::black_pawn_score(piece, census),
            PieceKind::WhitePawn => evaluation::white_pawn_score(piece, census),
            PieceKind::King | PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook => {
                evaluation::major_piece_score(piece, census)
            }
        };
        score * perspective(piece.white)
    }
}

/// One entry of the piece registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub row: i8,
    pub col: i8,
    pub white: bool,
    pub kind: PieceKind,
}

impl Piece {
    /// Create a live piece at the given cell
    pub fn new(id: PieceId, row: usize, col: usize, kind: PieceKind) -> Self {
        Piece {
            id,
            row: row as i8,
            col: col as i8,
            white: id >= FIRST_WHITE_PAWN,
            kind,
        }
    }

    /// Create the record for a slot in its captured state
    pub fn captured(id: PieceId) -> Self {
        Piece {
            id,
            row: CAPTURED,
            col: CAPTURED,
            white: id >= FIRST_WHITE_PAWN,
            kind: PieceKind::initial(id),
        }
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.col == CAPTURED
    }

    /// Current cell, `None` once captured
    #[inline]
    pub fn square(&self) -> Option<(usize, usize)> {
        if self.is_captured() {
            None
        } else {
            Some((self.row as usize, self.col as usize))
        }
    }

    pub fn generate_moves(&self, board: &Board, prev: Option<&Move>, out: &mut MoveList) {
        self.kind.generate_moves(board, self, prev, out);
    }

    pub fn evaluate(&self, census: &AttackMap) -> i32 {
        self.kind.evaluate(self, census)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_slots_map_to_categories() {
        assert_eq!(PieceKind::initial(0), PieceKind::BlackPawn);
        assert_eq!(PieceKind::initial(14), PieceKind::BlackPawn);
        assert_eq!(PieceKind::initial(15), PieceKind::WhitePawn);
        assert_eq!(PieceKind::initial(19), PieceKind::WhitePawn);
        assert_eq!(PieceKind::initial(KING_ID), PieceKind::King);
        assert_eq!(PieceKind::initial(KNIGHT_ID), PieceKind::Knight);
        assert_eq!(PieceKind::initial(BISHOP_ID), PieceKind::Bishop);
        assert_eq!(PieceKind::initial(ROOK_ID), PieceKind::Rook);
    }

    #[test]
    fn hash_indices_are_distinct() {
        let kinds = [
            PieceKind::BlackPawn,
            PieceKind::WhitePawn,
            PieceKind::King,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
        ];
        let mut seen = [false; KIND_COUNT];
        for kind in kinds {
            assert!(!seen[kind.hash_index()]);
            seen[kind.hash_index()] = true;
        }
    }

    #[test]
    fn only_white_pawns_promote() {
        assert_eq!(PieceKind::WhitePawn.promotion_target(), Some(PieceKind::Rook));
        assert_eq!(PieceKind::BlackPawn.promotion_target(), None);
        assert_eq!(PieceKind::Knight.promotion_target(), None);
    }

    #[test]
    fn captured_slot_uses_sentinel() {
        let piece = Piece::captured(3);
        assert!(piece.is_captured());
        assert_eq!(piece.square(), None);
        assert!(!piece.white);
        assert!(Piece::captured(KING_ID).white);
    }
}
