//! Board overlay derivation — square tints and directional arrows for the
//! played move and the engine's recommendation.

use std::collections::HashMap;

use crate::annotation::Annotation;
use crate::notation::split_squares;

/// Fixed tint for the played move's origin square.
pub const PLAYED_ORIGIN_TINT: &str = "rgba(0, 255, 0, 0.4)";
/// Fixed tint for the recommended move's squares.
pub const SUGGESTION_TINT: &str = "rgba(255, 255, 0, 0.4)";
/// Arrow color for the recommended move.
pub const SUGGESTION_ARROW_COLOR: &str = "#ffff00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub color: String,
}

/// Computed overlay: square-to-color tints plus zero, one or two arrows.
#[derive(Debug, Clone, Default)]
pub struct BoardOverlay {
    pub square_tints: HashMap<String, String>,
    pub arrows: Vec<Arrow>,
}

/// Derive the overlay for one reviewed move.
///
/// The played origin gets the fixed green tint and the played destination
/// the annotation's severity color (with an alpha suffix). When
/// `show_best_move` is set and the recommendation differs from the played
/// move, its squares get the suggestion tint — except the played
/// destination, whose severity tint always wins when the squares coincide.
pub fn compute_overlay(
    played_move: &str,
    predicted_best_move: &str,
    annotation: &Annotation,
    show_best_move: bool,
    show_arrows: bool,
) -> BoardOverlay {
    let mut overlay = BoardOverlay::default();

    let played = split_squares(played_move);
    if let Some((from, to)) = played {
        overlay
            .square_tints
            .insert(from.to_string(), PLAYED_ORIGIN_TINT.to_string());
        overlay
            .square_tints
            .insert(to.to_string(), format!("{}80", annotation.color));
        if show_arrows {
            overlay.arrows.push(Arrow {
                from: from.to_string(),
                to: to.to_string(),
                color: annotation.color.to_string(),
            });
        }
    }

    let suggest = show_best_move && !predicted_best_move.is_empty() && predicted_best_move != played_move;
    if suggest {
        if let Some((best_from, best_to)) = split_squares(predicted_best_move) {
            let played_to = played.map(|(_, to)| to);
            for square in [best_from, best_to] {
                if played_to != Some(square) {
                    overlay
                        .square_tints
                        .insert(square.to_string(), SUGGESTION_TINT.to_string());
                }
            }
            if show_arrows {
                overlay.arrows.push(Arrow {
                    from: best_from.to_string(),
                    to: best_to.to_string(),
                    color: SUGGESTION_ARROW_COLOR.to_string(),
                });
            }
        }
    }

    overlay
}
