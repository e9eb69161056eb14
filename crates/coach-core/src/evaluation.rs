//! Evaluation sanitation — turns raw, possibly malformed engine scores
//! into bounded finite numbers.

use serde::{Deserialize, Serialize};

/// Closed bound for sanitized evaluations. `±EVAL_LIMIT` doubles as the
/// sentinel for decisive/mate-like positions.
pub const EVAL_LIMIT: f64 = 1000.0;

/// Side that played a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Sentinel returned when an evaluation is broken or missing: the side
    /// to move is treated as already decisively winning (white) or losing
    /// (black) rather than letting an invalid number propagate.
    pub fn sentinel(self) -> f64 {
        match self {
            Player::White => EVAL_LIMIT,
            Player::Black => -EVAL_LIMIT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::White => "white",
            Player::Black => "black",
        }
    }
}

/// Raw evaluation as it may arrive from the analysis service or from legacy
/// stored records. Mongo-style extended JSON wraps doubles in a
/// `$numberDouble` object whose payload can be "NaN" or "Infinity".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEvaluation {
    Number(f64),
    Tagged {
        #[serde(rename = "$numberDouble")]
        number_double: String,
    },
}

/// Sanitize a raw evaluation into a finite number in `[-1000, 1000]`.
///
/// Missing or non-finite values map to the player's sentinel; everything
/// else is clamped. Idempotent on already-sanitized values.
pub fn sanitize(raw: Option<&RawEvaluation>, player: Player) -> f64 {
    match raw {
        Some(RawEvaluation::Number(value)) => sanitize_value(*value, player),
        Some(RawEvaluation::Tagged { number_double }) => {
            if number_double == "NaN" || number_double == "Infinity" {
                return player.sentinel();
            }
            sanitize_value(number_double.parse().unwrap_or(0.0), player)
        }
        None => player.sentinel(),
    }
}

/// Sanitize a plain numeric evaluation.
pub fn sanitize_value(value: f64, player: Player) -> f64 {
    if !value.is_finite() {
        return player.sentinel();
    }
    value.clamp(-EVAL_LIMIT, EVAL_LIMIT)
}
