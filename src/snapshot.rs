//! Snapshot codec.
//!
//! A snapshot is a self-contained JSON document wrapping the whole board in a
//! versioned envelope:
//!
//! ```json
//! { "version": 1, "board": { "id": "board-...", "stages": [...], "tasks": [...] } }
//! ```
//!
//! Timestamps are RFC 3339 strings, so snapshots sort and round-trip exactly.
//! Decoding validates structure as well as syntax; a blob that parses but
//! breaks board invariants is rejected as corrupt.

use crate::domain::board::Board;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};

/// Envelope version written by [`encode`]
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    board: &'a Board,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    board: Board,
}

/// Serializes the full board
pub fn encode(board: &Board, pretty: bool) -> Result<String> {
    let envelope = SnapshotOut {
        version: SNAPSHOT_VERSION,
        board,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    Ok(json)
}

/// Parses and validates a snapshot. Never returns a partially valid board.
pub fn decode(blob: &str) -> Result<Board> {
    let envelope: SnapshotIn =
        serde_json::from_str(blob).map_err(|e| BoardError::CorruptSnapshot(e.to_string()))?;

    if envelope.version != SNAPSHOT_VERSION {
        return Err(BoardError::CorruptSnapshot(format!(
            "unsupported snapshot version {} (expected {})",
            envelope.version, SNAPSHOT_VERSION
        )));
    }

    let problems = envelope.board.integrity_violations();
    if !problems.is_empty() {
        return Err(BoardError::CorruptSnapshot(problems.join("; ")));
    }

    Ok(envelope.board)
}
