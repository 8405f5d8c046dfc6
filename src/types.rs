//! Zerg Chess - Type definitions and constants
//!
//! This module provides the board geometry, the fixed layout of the piece
//! registry and the small conversions shared by the rest of the engine.

/// Board dimensions
pub const ROWS: usize = 8;
pub const COLS: usize = 5;
pub const CELLS: usize = ROWS * COLS;

/// Piece registry layout: black pawns are 0-14, white pieces are 15-23
pub const PIECE_COUNT: usize = 24;
pub const BLACK_PIECES: usize = 15;
pub const WHITE_PIECES: usize = 9;

pub const FIRST_WHITE_PAWN: PieceId = 15;
pub const KING_ID: PieceId = 20;
pub const KNIGHT_ID: PieceId = 21;
pub const BISHOP_ID: PieceId = 22;
pub const ROOK_ID: PieceId = 23;

/// Rows with a rule attached to them
pub const WHITE_BACK_ROW: usize = 7;
pub const WHITE_PAWN_START_ROW: usize = 6;
pub const EN_PASSANT_ROW: usize = 4;
pub const PROMOTION_ROW: usize = 0;
pub const BREAKTHROUGH_ROW: usize = 7;

/// Row/column value stored in a piece once it has been captured
pub const CAPTURED: i8 = -1;

/// Magnitude of a decided game, white-positive
pub const WIN_SCORE: i32 = 1000;

/// Index into the piece registry
pub type PieceId = usize;

/// File names for move notation, column 0 is `a`
pub const FILE_NAMES: &[u8; COLS] = b"abcde";

/// Cell index (0-39) of a row/column pair
#[inline]
pub fn cell_index(row: usize, col: usize) -> usize {
    row * COLS + col
}

/// Check signed coordinates against the 8x5 extents
#[inline]
pub fn on_board(row: i32, col: i32) -> bool {
    row >= 0 && row < ROWS as i32 && col >= 0 && col < COLS as i32
}

/// Score multiplier turning a white-positive score into the mover's view
#[inline]
pub fn perspective(white: bool) -> i32 {
    if white {
        1
    } else {
        -1
    }
}

/// Convert a row/column pair to notation; row 7 is rank 1 (e.g. (7, 0) -> "a1")
pub fn square_name(row: usize, col: usize) -> String {
    format!("{}{}", FILE_NAMES[col] as char, ROWS - row)
}

/// Convert notation back to a row/column pair
pub fn parse_square(name: &str) -> Option<(usize, usize)> {
    let mut chars = name.chars();
    let file = chars.next()?;
    let rank = chars.next()?.to_digit(10)? as usize;
    if chars.next().is_some() {
        return None;
    }

    let col = match file {
        'a'..='e' => (file as usize) - ('a' as usize),
        _ => return None,
    };
    if !(1..=ROWS).contains(&rank) {
        return None;
    }

    Some((ROWS - rank, col))
}
