//! Zerg Chess - Position Evaluation Module
//!
//! This module provides static evaluation of positions considering:
//! - Material balance
//! - Pawn advancement (the pawn side wins by reaching the last row)
//! - Capture exposure of every piece
//!
//! Scores are white-positive; the search turns them into the mover's view.

use crate::board::Board;
use crate::move_generator::for_each_attack;
use crate::piece::{Piece, PieceKind, KIND_COUNT};
use crate::types::*;

// ============================================================================
// PIECE VALUES
// ============================================================================

/// Base value per category, indexed by `PieceKind::hash_index`
pub const PIECE_VALUES: [i32; KIND_COUNT] = [
    10, // BLACK PAWN
    10, // WHITE PAWN
    20, // KING
    40, // KNIGHT
    30, // BISHOP
    50, // ROOK
];

const WHITE_PAWN_ADVANCE: i32 = 1;
const BLACK_PAWN_ADVANCE: i32 = 2;

#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    PIECE_VALUES[kind.hash_index()]
}

// ============================================================================
// CAPTURE-EXPOSURE CENSUS
// ============================================================================

/// How many pieces of each side attack every cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackMap {
    white: [u8; CELLS],
    black: [u8; CELLS],
}

impl AttackMap {
    /// Census over every live piece of `board`
    pub fn build(board: &Board) -> Self {
        let mut map = AttackMap {
            white: [0; CELLS],
            black: [0; CELLS],
        };

        for piece in board.pieces.iter().filter(|p| !p.is_captured()) {
            let counts = if piece.white { &mut map.white } else { &mut map.black };
            for_each_attack(board, piece, |row, col| counts[cell_index(row, col)] += 1);
        }

        map
    }

    #[inline]
    pub fn attackers(&self, row: usize, col: usize, by_white: bool) -> u8 {
        if by_white {
            self.white[cell_index(row, col)]
        } else {
            self.black[cell_index(row, col)]
        }
    }

    /// Value lost to the threat on `piece`: half if hanging, a quarter if defended
    pub fn exposure(&self, piece: &Piece, value: i32) -> i32 {
        let Some((row, col)) = piece.square() else { return 0 };
        if self.attackers(row, col, !piece.white) == 0 {
            return 0;
        }
        if self.attackers(row, col, piece.white) == 0 {
            value / 2
        } else {
            value / 4
        }
    }
}

// ============================================================================
// PER-CATEGORY SCORES
// ============================================================================
// Each returns the piece's own-side score; `PieceKind::evaluate` applies the sign.

pub fn black_pawn_score(piece: &Piece, census: &AttackMap) -> i32 {
    let value = piece_value(PieceKind::BlackPawn);
    let advance = BLACK_PAWN_ADVANCE * piece.row as i32;
    value + advance - census.exposure(piece, value)
}

pub fn white_pawn_score(piece: &Piece, census: &AttackMap) -> i32 {
    let value = piece_value(PieceKind::WhitePawn);
    let advance = WHITE_PAWN_ADVANCE * (WHITE_PAWN_START_ROW as i32 - piece.row as i32);
    value + advance - census.exposure(piece, value)
}

/// King, knight, bishop and rook (including promoted pawns)
pub fn major_piece_score(piece: &Piece, census: &AttackMap) -> i32 {
    let value = piece_value(piece.kind);
    value - census.exposure(piece, value)
}

// ============================================================================
// MAIN EVALUATION FUNCTION
// ============================================================================

/// Evaluate the position from white's perspective (positive = white is better)
pub fn evaluate(board: &Board) -> i32 {
    let census = AttackMap::build(board);
    board
        .pieces
        .iter()
        .filter(|p| !p.is_captured())
        .map(|p| p.evaluate(&census))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist::ZobristKeys;

    fn position(placements: &[(PieceId, usize, usize)]) -> Board {
        Board::from_placements(placements, ZobristKeys::new())
    }

    #[test]
    fn lone_pieces_score_material_and_advance() {
        let board = position(&[(0, 3, 0)]);
        assert_eq!(evaluate(&board), -(10 + 6));

        let board = position(&[(FIRST_WHITE_PAWN, 4, 4)]);
        assert_eq!(evaluate(&board), 10 + 2);

        let board = position(&[(ROOK_ID, 7, 0)]);
        assert_eq!(evaluate(&board), 50);
    }

    #[test]
    fn census_counts_each_side() {
        // black pawns on b6 and d6 both hit c5
        let board = position(&[(0, 2, 1), (1, 2, 3), (KNIGHT_ID, 5, 1)]);
        let census = AttackMap::build(&board);
        assert_eq!(census.attackers(3, 2, false), 2);
        assert_eq!(census.attackers(3, 2, true), 1);
        assert_eq!(census.attackers(4, 4, false), 0);
    }

    #[test]
    fn hanging_piece_loses_half_its_value() {
        // knight on c5 attacked by the pawn on b6, nothing defends it
        let board = position(&[(0, 2, 1), (KNIGHT_ID, 3, 2)]);
        let census = AttackMap::build(&board);
        assert_eq!(major_piece_score(board.piece(KNIGHT_ID), &census), 20);
    }

    #[test]
    fn defended_piece_loses_a_quarter() {
        // same knight, now covered by the rook along row 3
        let board = position(&[(0, 2, 1), (KNIGHT_ID, 3, 2), (ROOK_ID, 3, 4)]);
        let census = AttackMap::build(&board);
        assert_eq!(major_piece_score(board.piece(KNIGHT_ID), &census), 30);
    }

    #[test]
    fn promoted_pawn_scores_as_rook() {
        let mut board = position(&[(FIRST_WHITE_PAWN, 1, 0)]);
        board.make_move(&crate::board::Move::new(FIRST_WHITE_PAWN, (1, 0), (0, 0)).with_promotion(true));
        assert_eq!(board.piece(FIRST_WHITE_PAWN).kind, PieceKind::Rook);
        assert_eq!(evaluate(&board), 50);
    }

    #[test]
    fn starting_position_is_mirrored_in_sign() {
        let board = Board::setup(Some(" knbr")).expect("layout should parse");
        let census = AttackMap::build(&board);
        let white: i32 = board.live_pieces(true).map(|p| p.evaluate(&census)).sum();
        let black: i32 = board.live_pieces(false).map(|p| p.evaluate(&census)).sum();
        assert!(white > 0);
        assert!(black < 0);
        assert_eq!(evaluate(&board), white + black);
    }
}
