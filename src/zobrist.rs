//! Zerg Chess - Zobrist Hashing Module
//!
//! One random 32-bit key per (piece category, cell). The position
//! fingerprint is the XOR of the keys of every live piece, so it can be
//! recomputed from scratch once and then kept up to date by XOR-ing keys
//! in and out on every make/unmake.

use rand::prelude::*;

use crate::error::{EngineError, Result};
use crate::piece::{Piece, PieceKind, KIND_COUNT};
use crate::types::*;

/// Seed of the default key set, so fingerprints are stable across runs
pub const ZOBRIST_SEED: u64 = 12345;

/// Size of the persisted key blob: 6 x 40 little-endian `u32`s
pub const ZOBRIST_BLOB_LEN: usize = KIND_COUNT * CELLS * 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZobristKeys {
    keys: [[u32; CELLS]; KIND_COUNT],
}

impl ZobristKeys {
    /// Deterministic key set from the default seed
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        ZobristKeys::from_rng(&mut rng)
    }

    /// Fresh key set drawn from `rng`
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut keys = [[0u32; CELLS]; KIND_COUNT];
        for row in keys.iter_mut() {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }
        ZobristKeys { keys }
    }

    /// Key of `kind` standing on (row, col)
    #[inline]
    pub fn key(&self, kind: PieceKind, row: usize, col: usize) -> u32 {
        self.keys[kind.hash_index()][cell_index(row, col)]
    }

    /// Fingerprint computed from scratch over every live piece
    pub fn hash_pieces(&self, pieces: &[Piece]) -> u32 {
        pieces
            .iter()
            .filter_map(|p| p.square().map(|(row, col)| self.key(p.kind, row, col)))
            .fold(0, |h, k| h ^ k)
    }

    /// Serialize as category-major little-endian `u32`s
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ZOBRIST_BLOB_LEN);
        for row in &self.keys {
            for key in row {
                out.extend_from_slice(&key.to_le_bytes());
            }
        }
        out
    }

    /// Load a blob written by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ZOBRIST_BLOB_LEN {
            return Err(EngineError::InvalidZobristBlob {
                expected: ZOBRIST_BLOB_LEN,
                actual: bytes.len(),
            });
        }

        let mut keys = [[0u32; CELLS]; KIND_COUNT];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            let word = [chunk[0], chunk[1], chunk[2], chunk[3]];
            keys[i / CELLS][i % CELLS] = u32::from_le_bytes(word);
        }
        Ok(ZobristKeys { keys })
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        ZobristKeys::new()
    }
}
