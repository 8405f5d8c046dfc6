//! Error types for the engine
//!
//! Only configuration and persistence problems are recoverable errors.
//! Broken board invariants are bugs and panic inside the move applier.

use thiserror::Error;

/// Errors reported to the collaborators that drive the engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Back-rank layout string could not be parsed
    #[error("Invalid back-rank layout {layout:?}: {reason}")]
    InvalidLayout { layout: String, reason: String },

    /// Zobrist key blob has the wrong size
    #[error("Invalid Zobrist blob: expected {expected} bytes, got {actual}")]
    InvalidZobristBlob { expected: usize, actual: usize },

    /// Transposition table blob is truncated or holds an invalid record
    #[error("Invalid transposition table blob: {reason}")]
    InvalidTableBlob { reason: String },

    /// Piece id outside the registry
    #[error("No piece with id {id} (must be 0-23)")]
    NoSuchPiece { id: usize },

    /// Reading or writing a persisted blob failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
