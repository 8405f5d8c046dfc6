//! Zerg Chess - Search Engine Module
//!
//! This module implements the search algorithm using:
//! - Negamax with alpha-beta pruning
//! - Capture-first move ordering
//! - Transposition table keyed by the Zobrist fingerprint
//!
//! The board is mutated in place: every move is applied, searched and
//! unmade before its sibling is tried.

use log::debug;

use crate::board::{Board, Move};
use crate::error::{EngineError, Result};
use crate::evaluation::evaluate;
use crate::move_generator::MoveGenerator;
use crate::types::*;

// Constants for search
pub const INFINITY: i32 = WIN_SCORE + 1;

/// Default number of table slots
pub const DEFAULT_TT_CAPACITY: usize = 1 << 18;

// ============================================================================
// TRANSPOSITION TABLE
// ============================================================================

/// How a stored value relates to the true score of the position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// The search failed high: true score >= value
    Lower,
    /// The search failed low: true score <= value
    Upper,
}

impl Bound {
    fn to_byte(self) -> u8 {
        match self {
            Bound::Exact => 0,
            Bound::Lower => 1,
            Bound::Upper => 2,
        }
    }

    fn from_byte(b: u8) -> Option<Bound> {
        match b {
            0 => Some(Bound::Exact),
            1 => Some(Bound::Lower),
            2 => Some(Bound::Upper),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u32,
    pub white_to_move: bool,
    pub depth: u8,
    pub value: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

const TT_MAGIC: &[u8; 4] = b"ZTT1";
const TT_HEADER_LEN: usize = 8;
const TT_RECORD_LEN: usize = 20;
const NO_PIECE: u8 = 0xFF;

/// Fixed-capacity, replace-always table indexed by `key % capacity`
#[derive(Clone, Debug)]
pub struct TranspositionTable {
    slots: Vec<Option<TTEntry>>,
    pub hits: u64,
    pub writes: u64,
}

impl TranspositionTable {
    /// Table with `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            slots: vec![None; capacity.max(1)],
            hits: 0,
            writes: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    #[inline]
    fn index(&self, key: u32) -> usize {
        key as usize % self.slots.len()
    }

    /// Entry for this fingerprint and side to move, if the slot still holds it
    pub fn probe(&mut self, key: u32, white_to_move: bool) -> Option<TTEntry> {
        let entry = self.slots[self.index(key)]?;
        if entry.key == key && entry.white_to_move == white_to_move {
            self.hits += 1;
            Some(entry)
        } else {
            None
        }
    }

    /// Overwrite whatever the slot holds
    pub fn store(&mut self, entry: TTEntry) {
        let index = self.index(entry.key);
        self.slots[index] = Some(entry);
        self.writes += 1;
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.hits = 0;
        self.writes = 0;
    }

    /// Occupancy in permille
    pub fn hashfull(&self) -> usize {
        self.len() * 1000 / self.slots.len()
    }

    /// Serialize as a header (magic, capacity) followed by fixed-width records
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TT_HEADER_LEN + self.slots.len() * TT_RECORD_LEN);
        out.extend_from_slice(TT_MAGIC);
        out.extend_from_slice(&(self.slots.len() as u32).to_le_bytes());

        for slot in &self.slots {
            let mut record = [0u8; TT_RECORD_LEN];
            if let Some(entry) = slot {
                record[0] = 1;
                record[1..5].copy_from_slice(&entry.key.to_le_bytes());
                record[5..9].copy_from_slice(&entry.value.to_le_bytes());
                record[9] = entry.depth;
                record[10] = entry.bound.to_byte();
                record[11] = entry.white_to_move as u8;
                if let Some(mv) = entry.best_move {
                    record[12] = 1;
                    record[13] = mv.piece as u8;
                    record[14..18].copy_from_slice(&[mv.from_row, mv.from_col, mv.to_row, mv.to_col]);
                    record[18] = mv.captured.map_or(NO_PIECE, |id| id as u8);
                    record[19] = mv.promotion as u8
                        | (mv.creates_en_passant as u8) << 1
                        | (mv.en_passant_capture as u8) << 2;
                }
            }
            out.extend_from_slice(&record);
        }
        out
    }

    /// Load a blob written by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = |reason: String| EngineError::InvalidTableBlob { reason };

        if bytes.len() < TT_HEADER_LEN || &bytes[..4] != TT_MAGIC {
            return Err(invalid("missing header".to_string()));
        }
        let capacity = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        if capacity == 0 {
            return Err(invalid("zero capacity".to_string()));
        }
        let expected = TT_HEADER_LEN + capacity * TT_RECORD_LEN;
        if bytes.len() != expected {
            return Err(invalid(format!("expected {expected} bytes, got {}", bytes.len())));
        }

        let mut table = TranspositionTable::new(capacity);
        for (i, record) in bytes[TT_HEADER_LEN..].chunks_exact(TT_RECORD_LEN).enumerate() {
            if record[0] == 0 {
                continue;
            }
            let bound = Bound::from_byte(record[10]).ok_or_else(|| invalid(format!("record {i}: bad bound")))?;
            let best_move = if record[12] == 1 {
                Some(decode_move(record).ok_or_else(|| invalid(format!("record {i}: bad move")))?)
            } else {
                None
            };
            table.slots[i] = Some(TTEntry {
                key: u32::from_le_bytes([record[1], record[2], record[3], record[4]]),
                value: i32::from_le_bytes([record[5], record[6], record[7], record[8]]),
                depth: record[9],
                bound,
                white_to_move: record[11] != 0,
                best_move,
            });
        }
        Ok(table)
    }
}

fn decode_move(record: &[u8]) -> Option<Move> {
    let piece = record[13] as usize;
    let (fr, fc, tr, tc) = (record[14], record[15], record[16], record[17]);
    if piece >= PIECE_COUNT || !on_board(fr as i32, fc as i32) || !on_board(tr as i32, tc as i32) {
        return None;
    }
    let captured = match record[18] {
        NO_PIECE => None,
        id if (id as usize) < PIECE_COUNT => Some(id as usize),
        _ => return None,
    };
    let flags = record[19];
    Some(Move {
        piece,
        from_row: fr,
        from_col: fc,
        to_row: tr,
        to_col: tc,
        captured,
        promotion: flags & 1 != 0,
        creates_en_passant: flags & 2 != 0,
        en_passant_capture: flags & 4 != 0,
    })
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

pub struct SearchEngine {
    move_generator: MoveGenerator,
    tt: Option<TranspositionTable>,

    // Configurable options
    pub use_tt: bool,

    // Statistics
    pub nodes_searched: u64,
    pub cutoffs: u64,
    pub tt_cutoffs: u64,
}

impl SearchEngine {
    /// Engine with a table of `tt_capacity` slots; 0 searches without one
    pub fn new(tt_capacity: usize) -> Self {
        let tt = (tt_capacity > 0).then(|| TranspositionTable::new(tt_capacity));
        SearchEngine::with_table(tt)
    }

    /// Engine around an already loaded table
    pub fn with_table(tt: Option<TranspositionTable>) -> Self {
        SearchEngine {
            move_generator: MoveGenerator::new(),
            use_tt: tt.is_some(),
            tt,
            nodes_searched: 0,
            cutoffs: 0,
            tt_cutoffs: 0,
        }
    }

    pub fn table(&self) -> Option<&TranspositionTable> {
        self.tt.as_ref()
    }

    pub fn clear_tt(&mut self) {
        if let Some(tt) = self.tt.as_mut() {
            tt.clear();
        }
    }

    /// Root search. Returns the best move for `white` and its score from
    /// that side's point of view; no move for depth 0, a decided game or
    /// a side without moves.
    pub fn search(&mut self, board: &mut Board, prev: Option<&Move>, depth: u8, white: bool) -> (Option<Move>, i32) {
        self.nodes_searched = 0;
        self.cutoffs = 0;
        self.tt_cutoffs = 0;

        let sign = perspective(white);
        let win = board.check_win();
        if win != 0 {
            return (None, win * sign);
        }
        if depth == 0 {
            return (None, evaluate(board) * sign);
        }

        let moves = self.move_generator.generate_moves(board, white, prev);
        if moves.is_empty() {
            return (None, 0);
        }

        let mut alpha = -INFINITY;
        let mut best_move = None;
        let mut best_score = -INFINITY;

        for mv in moves.iter() {
            board.make_move(mv);
            let score = -self.negamax(board, Some(mv), depth - 1, -INFINITY, -alpha, !white);
            board.unmake_move(mv);

            if score > best_score {
                best_score = score;
                best_move = Some(*mv);
            }
            alpha = alpha.max(score);
        }

        debug!(
            "depth {} score {} move {} nodes {} cutoffs {} tt cutoffs {} hashfull {}",
            depth,
            best_score,
            best_move.map_or_else(|| "none".to_string(), |m| m.to_notation()),
            self.nodes_searched,
            self.cutoffs,
            self.tt_cutoffs,
            self.tt.as_ref().map_or(0, |tt| tt.hashfull()),
        );

        (best_move, best_score)
    }

    /// Root search returning only the move
    pub fn best_move(&mut self, board: &mut Board, prev: Option<&Move>, depth: u8, white: bool) -> Option<Move> {
        self.search(board, prev, depth, white).0
    }

    /// Score of the position for `white` (the side to move), searched `depth` plies
    pub fn negamax(
        &mut self,
        board: &mut Board,
        prev: Option<&Move>,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        white: bool,
    ) -> i32 {
        self.nodes_searched += 1;
        let sign = perspective(white);

        let win = board.check_win();
        if win != 0 {
            return win * sign;
        }
        if depth == 0 {
            return evaluate(board) * sign;
        }

        let moves = self.move_generator.generate_moves(board, white, prev);
        if moves.is_empty() {
            return 0;
        }

        // the en passant right is not part of the fingerprint
        let cacheable = self.use_tt && self.tt.is_some() && !prev.is_some_and(|m| m.creates_en_passant);
        let key = board.hash;
        let original_alpha = alpha;

        if cacheable {
            if let Some(entry) = self.tt.as_mut().and_then(|tt| tt.probe(key, white)) {
                if entry.depth >= depth {
                    let usable = match entry.bound {
                        Bound::Exact => true,
                        Bound::Lower => entry.value >= beta,
                        Bound::Upper => entry.value <= alpha,
                    };
                    if usable {
                        self.tt_cutoffs += 1;
                        return entry.value;
                    }
                }
            }
        }

        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves.iter() {
            board.make_move(mv);
            let score = -self.negamax(board, Some(mv), depth - 1, -beta, -alpha, !white);
            board.unmake_move(mv);

            if score > best_score {
                best_score = score;
                best_move = Some(*mv);
            }
            alpha = alpha.max(score);
            if best_score >= beta {
                self.cutoffs += 1;
                break;
            }
        }

        if cacheable {
            let bound = if best_score <= original_alpha {
                Bound::Upper
            } else if best_score >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            if let Some(tt) = self.tt.as_mut() {
                tt.store(TTEntry {
                    key,
                    white_to_move: white,
                    depth,
                    value: best_score,
                    bound,
                    best_move,
                });
            }
        }

        best_score
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(DEFAULT_TT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist::ZobristKeys;

    fn position(placements: &[(PieceId, usize, usize)]) -> Board {
        Board::from_placements(placements, ZobristKeys::new())
    }

    fn opening() -> Board {
        Board::setup(Some(" knbr")).expect("layout should parse")
    }

    #[test]
    fn depth_zero_returns_no_move() {
        let mut board = opening();
        let mut engine = SearchEngine::new(0);
        assert_eq!(engine.best_move(&mut board, None, 0, true), None);
        assert_eq!(engine.best_move(&mut board, None, 0, false), None);
    }

    #[test]
    fn decided_position_wins_regardless_of_depth() {
        // every black piece is gone
        let mut board = position(&[(KING_ID, 7, 0), (FIRST_WHITE_PAWN, 6, 1)]);
        let mut engine = SearchEngine::new(0);
        for depth in 0..4 {
            assert_eq!(engine.negamax(&mut board, None, depth, -INFINITY, INFINITY, true), WIN_SCORE);
            assert_eq!(engine.negamax(&mut board, None, depth, -INFINITY, INFINITY, false), -WIN_SCORE);
        }
        assert_eq!(engine.search(&mut board, None, 3, true), (None, WIN_SCORE));
    }

    #[test]
    fn side_without_moves_scores_zero() {
        // black pawn blocked by the king, nothing to capture
        let mut board = position(&[(0, 3, 2), (KING_ID, 4, 2)]);
        let mut engine = SearchEngine::new(0);
        assert_eq!(engine.negamax(&mut board, None, 2, -INFINITY, INFINITY, false), 0);
        assert_eq!(engine.search(&mut board, None, 2, false), (None, 0));
    }

    #[test]
    fn static_scores_are_antisymmetric() {
        let mut board = opening();
        let mut engine = SearchEngine::new(0);
        let white = engine.negamax(&mut board, None, 0, -INFINITY, INFINITY, true);
        let black = engine.negamax(&mut board, None, 0, -INFINITY, INFINITY, false);
        assert_eq!(white, -black);
    }

    #[test]
    fn root_value_follows_negamax_recurrence() {
        let mut board = opening();
        let mut engine = SearchEngine::new(0);
        let (_, root) = engine.search(&mut board, None, 2, true);

        let moves = MoveGenerator::new().generate_moves(&board, true, None);
        let mut best = -INFINITY;
        for mv in moves.iter() {
            board.make_move(mv);
            best = best.max(-engine.negamax(&mut board, Some(mv), 1, -INFINITY, INFINITY, false));
            board.unmake_move(mv);
        }
        assert_eq!(root, best);
    }

    #[test]
    fn windowed_search_respects_bounds() {
        let mut board = opening();
        let mut engine = SearchEngine::new(0);
        let exact = engine.negamax(&mut board, None, 3, -INFINITY, INFINITY, false);

        let inside = engine.negamax(&mut board, None, 3, exact - 5, exact + 5, false);
        assert_eq!(inside, exact);

        let low = engine.negamax(&mut board, None, 3, exact + 1, exact + 10, false);
        assert!(low <= exact + 1);

        let high = engine.negamax(&mut board, None, 3, exact - 10, exact - 1, false);
        assert!(high >= exact - 1);
    }

    #[test]
    fn alpha_beta_cuts_off_siblings() {
        let mut board = opening();
        let mut engine = SearchEngine::new(0);
        engine.search(&mut board, None, 3, true);
        assert!(engine.cutoffs > 0);
    }

    #[test]
    fn white_takes_the_last_pawn() {
        let mut board = position(&[(0, 2, 0), (ROOK_ID, 5, 0), (KING_ID, 7, 4)]);
        let mut engine = SearchEngine::new(0);
        let (mv, score) = engine.search(&mut board, None, 2, true);
        let mv = mv.expect("a move should be found");
        assert_eq!(mv.captured, Some(0));
        assert_eq!(score, WIN_SCORE);
    }

    #[test]
    fn black_breaks_through() {
        let mut board = position(&[(0, 6, 2), (1, 2, 0), (KING_ID, 0, 4)]);
        let mut engine = SearchEngine::new(0);
        let (mv, score) = engine.search(&mut board, None, 3, false);
        assert_eq!(mv.map(|m| m.to_square()), Some((7, 2)));
        assert_eq!(score, WIN_SCORE);
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut board = opening();
        let before = board.clone();
        SearchEngine::default().search(&mut board, None, 3, true);
        assert_eq!(board, before);
    }

    #[test]
    fn table_does_not_change_scores() {
        let mut board = opening();
        let mut plain = SearchEngine::new(0);
        let mut cached = SearchEngine::new(1 << 12);

        for depth in 1..=4 {
            let (_, expected) = plain.search(&mut board, None, depth, true);
            let (_, actual) = cached.search(&mut board, None, depth, true);
            assert_eq!(actual, expected, "depth {depth}");
        }
        let tt = cached.table().expect("table is configured");
        assert!(tt.writes > 0);
        assert!(!tt.is_empty());
    }

    #[test]
    fn disabled_table_is_left_alone() {
        let mut board = opening();
        let mut engine = SearchEngine::new(64);
        engine.use_tt = false;
        engine.search(&mut board, None, 3, true);
        assert!(engine.table().expect("table is configured").is_empty());
    }

    #[test]
    fn table_replaces_always_and_checks_side() {
        let mut tt = TranspositionTable::new(8);
        let entry = TTEntry {
            key: 3,
            white_to_move: true,
            depth: 2,
            value: 15,
            bound: Bound::Exact,
            best_move: None,
        };
        tt.store(entry);
        assert_eq!(tt.probe(3, true), Some(entry));
        assert_eq!(tt.probe(3, false), None);

        // same slot, different fingerprint
        tt.store(TTEntry { key: 11, depth: 0, ..entry });
        assert_eq!(tt.probe(3, true), None);
        assert_eq!(tt.probe(11, true).map(|e| e.depth), Some(0));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn table_blob_round_trip() {
        let mut tt = TranspositionTable::new(4);
        let mv = Move::en_passant(3, (4, 1), (5, 2), FIRST_WHITE_PAWN + 2);
        tt.store(TTEntry {
            key: 0xDEAD_BEEF,
            white_to_move: false,
            depth: 5,
            value: -37,
            bound: Bound::Upper,
            best_move: Some(mv),
        });
        tt.store(TTEntry {
            key: 2,
            white_to_move: true,
            depth: 1,
            value: 1000,
            bound: Bound::Lower,
            best_move: Some(Move::new(FIRST_WHITE_PAWN, (1, 0), (0, 0)).with_promotion(true)),
        });

        let loaded = TranspositionTable::from_bytes(&tt.to_bytes()).expect("blob should load");
        assert_eq!(loaded.capacity(), 4);
        assert_eq!(loaded.slots, tt.slots);
    }

    #[test]
    fn corrupt_table_blob_is_rejected() {
        let tt = TranspositionTable::new(2);
        let mut blob = tt.to_bytes();
        blob.pop();
        assert!(TranspositionTable::from_bytes(&blob).is_err());
        assert!(TranspositionTable::from_bytes(b"nope").is_err());

        let mut blob = tt.to_bytes();
        blob[TT_HEADER_LEN] = 1;
        blob[TT_HEADER_LEN + 10] = 9;
        let err = TranspositionTable::from_bytes(&blob).expect_err("bound byte is invalid");
        assert!(matches!(err, EngineError::InvalidTableBlob { .. }));
    }
}
