//! Annotation and coaching-feedback derivation.
//!
//! The classification-to-annotation mapping is a closed table; unknown
//! stored labels fall back to the Standard entry instead of failing.

use crate::classification::Classification;
use crate::record::MoveRecord;

/// Visual/severity profile for one classification. Severity runs 0 (best)
/// to 4 (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub symbol: &'static str,
    pub color: &'static str,
    pub message: &'static str,
    pub severity: u8,
}

/// Severity at which coaching follow-up suggestions kick in.
pub const FOLLOW_UP_SEVERITY: u8 = 2;

const CHECKMATE: Annotation = Annotation {
    symbol: "#",
    color: "#00C851",
    message: "Checkmate",
    severity: 0,
};
const BLUNDER: Annotation = Annotation {
    symbol: "??",
    color: "#ff4444",
    message: "Blunder",
    severity: 4,
};
const MISTAKE: Annotation = Annotation {
    symbol: "?",
    color: "#ff8800",
    message: "Mistake",
    severity: 3,
};
const INACCURACY: Annotation = Annotation {
    symbol: "?!",
    color: "#ffbb33",
    message: "Inaccuracy",
    severity: 2,
};
const BRILLIANT: Annotation = Annotation {
    symbol: "!!",
    color: "#00C851",
    message: "Brilliant",
    severity: 0,
};
const EXCELLENT: Annotation = Annotation {
    symbol: "!",
    color: "#5cb85c",
    message: "Excellent",
    severity: 1,
};
const STANDARD: Annotation = Annotation {
    symbol: "",
    color: "#33b5e5",
    message: "Standard",
    severity: 1,
};

/// Annotation for a classification. Exhaustive, so every label has an entry.
pub fn annotate(classification: Classification) -> &'static Annotation {
    match classification {
        Classification::Checkmate => &CHECKMATE,
        Classification::Blunder => &BLUNDER,
        Classification::Mistake => &MISTAKE,
        Classification::Inaccuracy => &INACCURACY,
        Classification::Brilliant => &BRILLIANT,
        Classification::Excellent => &EXCELLENT,
        Classification::Standard => &STANDARD,
    }
}

/// Annotation for a stored label string, falling back to Standard for
/// anything unrecognized. Never fails.
pub fn annotate_label(label: &str) -> &'static Annotation {
    Classification::from_label(label)
        .map(annotate)
        .unwrap_or(&STANDARD)
}

/// Coaching feedback for one reviewed move.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub message: String,
    pub show_follow_up: bool,
    pub suggestions: Vec<String>,
}

/// Derive feedback from a sanitized record: the commentary line, plus a
/// fixed suggestion list once the move is bad enough to coach on.
pub fn feedback(record: &MoveRecord) -> Feedback {
    let annotation = annotate(record.classification);
    let show_follow_up = annotation.severity >= FOLLOW_UP_SEVERITY;

    let suggestions = if show_follow_up {
        vec![
            format!("Consider {} instead", record.predicted_best_move),
            "Control the center more effectively".to_string(),
            "Develop your pieces toward the king".to_string(),
            "Look for tactical opportunities".to_string(),
        ]
    } else {
        Vec::new()
    };

    Feedback {
        message: record.coach_commentary.clone(),
        show_follow_up,
        suggestions,
    }
}
