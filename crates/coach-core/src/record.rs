//! Move records and the load-time sanitation pipeline.
//!
//! Stored analyses may predate the current sanitation rules or carry
//! malformed values from earlier backends, so every record is re-run
//! through the pipeline when a session loads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classification::{classify, Classification};
use crate::commentary::sanitize_commentary;
use crate::evaluation::{sanitize, Player, RawEvaluation};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("move record {0} has no played move")]
    MissingPlayedMove(usize),
}

/// One analyzed ply. Field names match the stored JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: Player,
    pub played_move: String,
    pub predicted_best_move: String,
    pub evaluation: f64,
    pub predicted_evaluation: f64,
    pub board_fen: String,
    pub classification: Classification,
    pub coach_commentary: String,
}

/// Tolerant twin of [`MoveRecord`] for decoding analysis-service payloads
/// and legacy stored rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMoveRecord {
    pub player: Player,
    #[serde(default)]
    pub played_move: Option<String>,
    #[serde(default)]
    pub predicted_best_move: Option<String>,
    #[serde(default)]
    pub evaluation: Option<RawEvaluation>,
    #[serde(default)]
    pub predicted_evaluation: Option<RawEvaluation>,
    #[serde(default)]
    pub board_fen: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub coach_commentary: Option<String>,
}

/// Run one raw record through the full sanitation pipeline.
///
/// Evaluations are bounded, the classification is computed once if the
/// record does not already carry a recognizable label, and commentary is
/// normalized. A record without a played move cannot be repaired.
pub fn sanitize_record(index: usize, raw: &RawMoveRecord) -> Result<MoveRecord, RecordError> {
    let played_move = raw
        .played_move
        .clone()
        .filter(|m| !m.is_empty())
        .ok_or(RecordError::MissingPlayedMove(index))?;

    let evaluation = sanitize(raw.evaluation.as_ref(), raw.player);
    let predicted_evaluation = sanitize(raw.predicted_evaluation.as_ref(), raw.player);

    let classification = raw
        .classification
        .as_deref()
        .and_then(Classification::from_label)
        .unwrap_or_else(|| classify(evaluation, predicted_evaluation));

    Ok(MoveRecord {
        player: raw.player,
        played_move,
        predicted_best_move: raw.predicted_best_move.clone().unwrap_or_default(),
        evaluation,
        predicted_evaluation,
        board_fen: raw.board_fen.clone().unwrap_or_default(),
        classification,
        coach_commentary: sanitize_commentary(raw.coach_commentary.as_deref()),
    })
}

/// Sanitize a full sequence of raw records, preserving ply order.
pub fn sanitize_records(raw: &[RawMoveRecord]) -> Result<Vec<MoveRecord>, RecordError> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| sanitize_record(i, r))
        .collect()
}
