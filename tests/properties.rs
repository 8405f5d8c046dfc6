use rand::prelude::*;

use zerg_chess::board::{random_back_rank, Board, Move};
use zerg_chess::move_generator::MoveGenerator;
use zerg_chess::piece::PieceKind;
use zerg_chess::types::*;
use zerg_chess::zobrist::ZobristKeys;

const PLAYOUTS: u64 = 40;
const MAX_PLIES: usize = 120;

fn check_bounds(board: &Board, mv: &Move) {
    let (fr, fc) = mv.from_square();
    let (tr, tc) = mv.to_square();
    assert!(tr < ROWS && tc < COLS, "{mv} leaves the board");
    assert_eq!(board.piece(mv.piece).square(), Some((fr, fc)), "{mv} starts off its piece");

    let kind = board.piece(mv.piece).kind;
    if matches!(kind, PieceKind::BlackPawn | PieceKind::WhitePawn) {
        assert!(fc.abs_diff(tc) <= 1, "{mv} wraps across the board edge");
        let forward = if kind == PieceKind::BlackPawn { tr as i32 - fr as i32 } else { fr as i32 - tr as i32 };
        assert!(forward == 1 || (forward == 2 && fc == tc), "{mv} is not a pawn move");
    }
}

fn check_round_trip(board: &mut Board, mv: &Move) {
    let before = board.clone();
    let hash = board.make_move(mv);
    assert_eq!(hash, board.compute_hash(), "incremental hash drifted after {mv}");
    assert!(board.is_consistent(), "grid and registry disagree after {mv}");

    let restored = board.unmake_move(mv);
    assert_eq!(restored, before.hash);
    assert_eq!(*board, before, "unmake of {mv} did not restore the position");
}

/// Random game from a random layout, checking every generated move on the way
fn playout(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::from_back_rank(random_back_rank(&mut rng), ZobristKeys::from_rng(&mut rng));
    let start = board.clone();
    let generator = MoveGenerator::new();
    let mut history: Vec<Move> = Vec::new();
    let mut white = true;

    while history.len() < MAX_PLIES && board.check_win() == 0 {
        let moves = generator.generate_moves(&board, white, history.last());
        if moves.is_empty() {
            break;
        }
        for mv in moves.iter() {
            check_bounds(&board, mv);
            check_round_trip(&mut board, mv);
        }

        // lean toward captures so games reach the endgame
        let pick = if !moves.captures.is_empty() && rng.gen_bool(0.6) {
            moves.captures[rng.gen_range(0..moves.captures.len())]
        } else {
            *moves.iter().choose(&mut rng).expect("move list is not empty")
        };
        board.make_move(&pick);
        history.push(pick);
        white = !white;
    }

    assert_eq!(board.hash, board.compute_hash());
    while let Some(mv) = history.pop() {
        board.unmake_move(&mv);
    }
    assert_eq!(board, start, "seed {seed}: unwinding the game did not reach the start");
}

#[test]
fn apply_unmake_round_trips_over_random_games() {
    for seed in 0..PLAYOUTS {
        playout(seed);
    }
}

#[test]
fn fingerprint_is_independent_of_move_order() {
    let mut a = Board::setup(Some(" knbr")).expect("layout should parse");
    let mut b = a.clone();

    // same two moves per side, played in a different order
    let knight = Move::new(KNIGHT_ID, (7, 2), (5, 1));
    let pawn = Move::new(FIRST_WHITE_PAWN + 4, (6, 4), (5, 4));
    let black_1 = Move::new(10, (2, 0), (3, 0));
    let black_2 = Move::new(14, (2, 4), (3, 4));

    for mv in [knight, black_1, pawn, black_2] {
        a.make_move(&mv);
    }
    for mv in [pawn, black_2, knight, black_1] {
        b.make_move(&mv);
    }

    assert_eq!(a.hash, b.hash);
    assert_eq!(a.hash, a.compute_hash());
    assert_eq!(a, b);
}
