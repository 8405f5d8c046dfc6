//! Zerg Chess - Perft Module
//!
//! Move-path enumeration for validating the move generator and the move
//! applier. Decided positions are leaves: nothing is generated past a win.

use crate::board::{Board, Move};
use crate::move_generator::MoveGenerator;
use crate::piece::PieceKind;
use crate::types::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub promotions: u64,
    pub breakthroughs: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.promotions += rhs.promotions;
        self.breakthroughs += rhs.breakthroughs;
    }

    fn tally(&mut self, board: &Board, mv: &Move) {
        self.nodes += 1;
        self.captures += mv.captured.is_some() as u64;
        self.en_passant += mv.en_passant_capture as u64;
        self.promotions += mv.promotion as u64;
        self.breakthroughs +=
            (board.piece(mv.piece).kind == PieceKind::BlackPawn && mv.to_row as usize == BREAKTHROUGH_ROW) as u64;
    }
}

/// Count leaf positions `depth` plies below `board` with `white` to move
pub fn perft(board: &mut Board, depth: u8, white: bool, prev: Option<&Move>) -> PerftCounts {
    perft_with(&MoveGenerator::new(), board, depth, white, prev)
}

pub fn perft_with(
    generator: &MoveGenerator,
    board: &mut Board,
    depth: u8,
    white: bool,
    prev: Option<&Move>,
) -> PerftCounts {
    if depth == 0 || board.check_win() != 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let moves = generator.generate_moves(board, white, prev);
    let mut total = PerftCounts::default();

    for mv in moves.iter() {
        if depth == 1 {
            total.tally(board, mv);
            continue;
        }
        board.make_move(mv);
        total.merge(perft_with(generator, board, depth - 1, !white, Some(mv)));
        board.unmake_move(mv);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist::ZobristKeys;

    fn opening() -> Board {
        Board::setup(Some(" knbr")).expect("layout should parse")
    }

    #[test]
    fn opening_counts() {
        let mut board = opening();
        assert_eq!(perft(&mut board, 0, true, None).nodes, 1);
        assert_eq!(perft(&mut board, 1, true, None).nodes, 13);
        assert_eq!(perft(&mut board, 2, true, None).nodes, 65);
        assert_eq!(perft(&mut board, 1, false, None).nodes, 5);
    }

    #[test]
    fn perft_restores_the_board() {
        let mut board = opening();
        let before = board.clone();
        perft(&mut board, 4, true, None);
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_is_counted_after_double_step() {
        let mut board = Board::from_placements(
            &[(0, 4, 1), (FIRST_WHITE_PAWN, 6, 2), (KING_ID, 7, 4)],
            ZobristKeys::new(),
        );
        let counts = perft(&mut board, 2, true, None);
        assert_eq!(counts.nodes, 7);
        assert_eq!(counts.captures, 2);
        assert_eq!(counts.en_passant, 1);
    }

    #[test]
    fn decided_positions_are_leaves() {
        let mut board = Board::from_placements(&[(0, 6, 0), (KING_ID, 0, 4)], ZobristKeys::new());
        let counts = perft(&mut board, 1, false, None);
        assert_eq!(counts.nodes, 1);
        assert_eq!(counts.breakthroughs, 1);

        // after the breakthrough nothing is expanded further
        assert_eq!(perft(&mut board, 3, false, None).nodes, 1);
    }
}
