//! Rules-engine seam and its shakmaty adapter.
//!
//! Positions cross the seam as FEN strings; the board representation is
//! owned entirely by the engine behind the trait.

use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Position,
};

use coach_core::evaluation::Player;
use coach_core::movetext::build_movetext;

use crate::error::SessionError;

/// Result of applying a legal move.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    /// Position after the move.
    pub board_fen: String,
    /// The move in standard algebraic notation.
    pub san: String,
}

/// Legality checking and position bookkeeping, consumed as a capability.
pub trait RulesEngine: Send + Sync {
    fn starting_fen(&self) -> String;

    /// Validate and apply a move. Rejects illegal moves with
    /// [`SessionError::IllegalOperation`] and leaves the caller's state
    /// untouched.
    fn apply_move(
        &self,
        board_fen: &str,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<AppliedMove, SessionError>;

    fn is_checkmate(&self, board_fen: &str) -> Result<bool, SessionError>;
    fn is_stalemate(&self, board_fen: &str) -> Result<bool, SessionError>;
    /// Stalemate or any other drawing condition the engine tracks.
    fn is_draw(&self, board_fen: &str) -> Result<bool, SessionError>;
    fn side_to_move(&self, board_fen: &str) -> Result<Player, SessionError>;

    /// Numbered movetext for a finished or in-progress game.
    fn full_movetext(&self, history: &[String], result: Option<&str>) -> String {
        build_movetext(history, result)
    }
}

/// Default rules engine backed by shakmaty.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    fn position(board_fen: &str) -> Result<Chess, SessionError> {
        let fen: Fen = board_fen
            .parse()
            .map_err(|e| SessionError::Data(format!("Invalid FEN '{board_fen}': {e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| SessionError::Data(format!("Unplayable position '{board_fen}': {e}")))
    }
}

impl RulesEngine for ShakmatyRules {
    fn starting_fen(&self) -> String {
        Fen::from_position(&Chess::default(), EnPassantMode::Legal).to_string()
    }

    fn apply_move(
        &self,
        board_fen: &str,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<AppliedMove, SessionError> {
        let mut pos = Self::position(board_fen)?;

        let mut uci_str = format!("{from}{to}");
        if let Some(piece) = promotion {
            uci_str.push(piece.to_ascii_lowercase());
        }
        let uci: UciMove = uci_str
            .parse()
            .map_err(|_| SessionError::IllegalOperation(format!("Malformed move '{uci_str}'")))?;
        let legal_move = uci
            .to_move(&pos)
            .map_err(|_| SessionError::IllegalOperation(format!("Illegal move '{uci_str}'")))?;

        // SanPlus keeps the +/# suffix, which the saved movetext needs.
        let san = SanPlus::from_move_and_play_unchecked(&mut pos, legal_move).to_string();

        Ok(AppliedMove {
            board_fen: Fen::from_position(&pos, EnPassantMode::Legal).to_string(),
            san,
        })
    }

    fn is_checkmate(&self, board_fen: &str) -> Result<bool, SessionError> {
        Ok(Self::position(board_fen)?.is_checkmate())
    }

    fn is_stalemate(&self, board_fen: &str) -> Result<bool, SessionError> {
        Ok(Self::position(board_fen)?.is_stalemate())
    }

    fn is_draw(&self, board_fen: &str) -> Result<bool, SessionError> {
        let pos = Self::position(board_fen)?;
        // Repetition needs game history, which lives above this seam.
        Ok(pos.is_stalemate() || pos.is_insufficient_material() || pos.halfmoves() >= 100)
    }

    fn side_to_move(&self, board_fen: &str) -> Result<Player, SessionError> {
        let pos = Self::position(board_fen)?;
        Ok(match pos.turn() {
            Color::White => Player::White,
            Color::Black => Player::Black,
        })
    }
}
