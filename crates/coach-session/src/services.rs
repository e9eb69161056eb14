//! Collaborator contracts consumed by the session controllers.
//!
//! The analysis service, move generator, commentary provider and session
//! store are all remote from the session's point of view; the traits are
//! async and object-safe so controllers can hold them as `Arc<dyn _>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use coach_core::record::{MoveRecord, RawMoveRecord};

use crate::error::SessionError;

/// Identity/style card for a simulated opponent, fetched once per strength
/// selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub name: String,
    pub style: String,
    pub description: String,
}

impl Default for OpponentProfile {
    fn default() -> Self {
        Self {
            name: "Bot".to_string(),
            style: "Unknown".to_string(),
            description: String::new(),
        }
    }
}

/// Inputs for one best-effort commentary request.
#[derive(Debug, Clone)]
pub struct CommentaryRequest {
    pub board_fen: String,
    pub move_san: String,
    pub strength: i32,
    pub opponent_name: String,
    pub opponent_style: String,
}

/// A completed interactive game, persisted exactly once on termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedGame {
    pub movetext: String,
    /// Result code: "1-0", "0-1" or "1/2-1/2".
    pub result: String,
    pub strength: i32,
    pub opponent_name: String,
}

/// A stored analysis row. Moves come back raw so the sanitation pipeline
/// can repair legacy records at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: String,
    pub pgn: String,
    #[serde(default)]
    pub moves: Vec<RawMoveRecord>,
    #[serde(default)]
    pub last_viewed_move: Option<usize>,
}

/// Full-game analysis provider.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze the given movetext, returning one raw record per ply.
    async fn analyze_game(&self, movetext: &str) -> Result<Vec<RawMoveRecord>, SessionError>;
}

/// Remote move generator for the simulated opponent.
#[async_trait]
pub trait MoveGenerator: Send + Sync {
    /// Best move for the position at the given strength, in coordinate
    /// notation. `None` when the generator has nothing to offer.
    async fn best_move(
        &self,
        board_fen: &str,
        strength: i32,
    ) -> Result<Option<String>, SessionError>;

    /// Identity card for the opponent at the given strength.
    async fn opponent_profile(&self, strength: i32) -> Result<OpponentProfile, SessionError>;
}

/// Live commentary provider. Strictly best-effort.
#[async_trait]
pub trait CommentaryService: Send + Sync {
    async fn comment(&self, request: &CommentaryRequest) -> Result<String, SessionError>;
}

/// Persistence collaborator for analyses and finished games.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new analysis and return its assigned id.
    async fn create_analysis(
        &self,
        pgn: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<String, SessionError>;

    async fn get_analysis(&self, id: &str) -> Result<Option<StoredAnalysis>, SessionError>;

    /// Replace the move list of an existing analysis (used when a resumed
    /// session had no prior analysis stored).
    async fn update_analysis(
        &self,
        id: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<(), SessionError>;

    async fn update_last_viewed(&self, id: &str, last_viewed: usize) -> Result<(), SessionError>;

    async fn save_finished_game(&self, game: &FinishedGame) -> Result<String, SessionError>;
}
