//! Move quality classification from evaluation deltas.
//!
//! Rules run in a fixed order and the first match wins. The two reward
//! branches near the bottom use the signed diff while the penalty bands
//! above them use the absolute diff, so a diff of -3.5 is a Blunder, not
//! a Brilliant. Because every diff < -1 already exceeds the 0.75 band,
//! the Brilliant branch never fires; Brilliant only enters records as a
//! stored label. That precedence is load-bearing for stored records and
//! is kept exactly as the reviewing frontend always applied it.

use serde::{Deserialize, Serialize};

use crate::evaluation::EVAL_LIMIT;

/// Eval-diff thresholds, in pawn units.
const BLUNDER_DIFF: f64 = 3.0;
const MISTAKE_DIFF: f64 = 1.5;
const INACCURACY_DIFF: f64 = 0.75;
const BRILLIANT_DIFF: f64 = -1.0;
const EXCELLENT_DIFF: f64 = -0.5;

/// Quality label assigned to one ply. Labels serialize capitalized, matching
/// the stored record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Checkmate,
    Blunder,
    Mistake,
    Inaccuracy,
    Brilliant,
    Excellent,
    Standard,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Checkmate => "Checkmate",
            Classification::Blunder => "Blunder",
            Classification::Mistake => "Mistake",
            Classification::Inaccuracy => "Inaccuracy",
            Classification::Brilliant => "Brilliant",
            Classification::Excellent => "Excellent",
            Classification::Standard => "Standard",
        }
    }

    /// Parse a stored label. Unknown strings yield `None` so callers can
    /// decide between recomputing and falling back to `Standard`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Checkmate" => Some(Classification::Checkmate),
            "Blunder" => Some(Classification::Blunder),
            "Mistake" => Some(Classification::Mistake),
            "Inaccuracy" => Some(Classification::Inaccuracy),
            "Brilliant" => Some(Classification::Brilliant),
            "Excellent" => Some(Classification::Excellent),
            "Standard" => Some(Classification::Standard),
            _ => None,
        }
    }
}

/// Classify a move from its sanitized evaluation and the evaluation the
/// engine predicted for its own best move. Pure function.
pub fn classify(evaluation: f64, predicted_evaluation: f64) -> Classification {
    if evaluation >= EVAL_LIMIT || evaluation <= -EVAL_LIMIT {
        return Classification::Checkmate;
    }

    let diff = evaluation - predicted_evaluation;
    if diff.abs() > BLUNDER_DIFF {
        return Classification::Blunder;
    }
    if diff.abs() > MISTAKE_DIFF {
        return Classification::Mistake;
    }
    if diff.abs() > INACCURACY_DIFF {
        return Classification::Inaccuracy;
    }
    if diff < BRILLIANT_DIFF {
        return Classification::Brilliant;
    }
    if diff < EXCELLENT_DIFF {
        return Classification::Excellent;
    }
    Classification::Standard
}
