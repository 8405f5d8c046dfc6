//! Zerg Chess - Asymmetric Chess Variant Engine
//!
//! An engine for a variant played on an 8x5 board: fifteen pawns against a
//! king, knight, bishop, rook and five pawns. It provides:
//! - Mailbox board with a fixed 24-piece registry
//! - Reversible move application with incremental Zobrist hashing
//! - Per-category move generation, en passant and rook promotion included
//! - Negamax search with alpha-beta pruning and a transposition table
//! - Persistence of the Zobrist keys and the transposition table

pub mod types;
pub mod error;
pub mod piece;
pub mod zobrist;
pub mod board;
pub mod move_generator;
pub mod evaluation;
pub mod search;
pub mod perft;
pub mod game;
