use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use coach_core::evaluation::{Player, RawEvaluation};
use coach_core::record::RawMoveRecord;
use coach_session::error::SessionError;
use coach_session::services::{
    AnalysisService, CommentaryRequest, CommentaryService, MoveGenerator, OpponentProfile,
};

/// Build a raw record the way the analysis backend would emit one.
pub fn raw_record(player: Player, evaluation: f64, predicted: f64) -> RawMoveRecord {
    RawMoveRecord {
        player,
        played_move: Some("e2e4".to_string()),
        predicted_best_move: Some("d2d4".to_string()),
        evaluation: Some(RawEvaluation::Number(evaluation)),
        predicted_evaluation: Some(RawEvaluation::Number(predicted)),
        board_fen: Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()),
        classification: None,
        coach_commentary: Some("A solid choice.".to_string()),
    }
}

/// Analysis service that returns a fixed set of records.
pub struct FixedAnalysis(pub Vec<RawMoveRecord>);

#[async_trait]
impl AnalysisService for FixedAnalysis {
    async fn analyze_game(&self, _movetext: &str) -> Result<Vec<RawMoveRecord>, SessionError> {
        Ok(self.0.clone())
    }
}

/// Move generator that replays a scripted sequence of coordinate moves.
pub struct ScriptedGenerator {
    moves: Mutex<VecDeque<String>>,
    pub profile: OpponentProfile,
}

impl ScriptedGenerator {
    pub fn new(moves: &[&str]) -> Self {
        Self {
            moves: Mutex::new(moves.iter().map(|m| m.to_string()).collect()),
            profile: OpponentProfile {
                name: "Maximus".to_string(),
                style: "Aggressive".to_string(),
                description: "Attacks at all costs".to_string(),
            },
        }
    }
}

#[async_trait]
impl MoveGenerator for ScriptedGenerator {
    async fn best_move(
        &self,
        _board_fen: &str,
        _strength: i32,
    ) -> Result<Option<String>, SessionError> {
        Ok(self.moves.lock().unwrap().pop_front())
    }

    async fn opponent_profile(&self, _strength: i32) -> Result<OpponentProfile, SessionError> {
        Ok(self.profile.clone())
    }
}

/// Commentary service that always answers with the same line.
pub struct CannedCommentary(pub String);

#[async_trait]
impl CommentaryService for CannedCommentary {
    async fn comment(&self, _request: &CommentaryRequest) -> Result<String, SessionError> {
        Ok(self.0.clone())
    }
}
