//! Interactive play session state machine.
//!
//! The session owns a phase, a board FEN and a SAN history; moves only
//! ever enter through the rules engine. The caller drives the opponent's
//! turn by calling [`PlaySession::request_opponent_move`] whenever the
//! phase is [`Phase::AwaitingOpponentMove`]; a failed opponent turn leaves
//! the phase unchanged so the turn can be retried.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use coach_core::commentary::sanitize_commentary;
use coach_core::evaluation::Player;
use coach_core::notation::parse_coordinate;

use crate::error::SessionError;
use crate::rules::RulesEngine;
use crate::services::{
    CommentaryRequest, CommentaryService, FinishedGame, MoveGenerator, OpponentProfile,
    SessionStore,
};

/// Preset opponent strength ladder.
pub const OPPONENT_STRENGTHS: [i32; 6] = [100, 400, 600, 800, 1000, 1200];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Configuring,
    AwaitingHumanMove,
    AwaitingOpponentMove,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameOutcome {
    pub fn result_code(self) -> &'static str {
        match self {
            GameOutcome::WhiteWins => "1-0",
            GameOutcome::BlackWins => "0-1",
            GameOutcome::Draw => "1/2-1/2",
        }
    }
}

pub struct PlaySession {
    rules: Arc<dyn RulesEngine>,
    generator: Arc<dyn MoveGenerator>,
    commentary: Arc<dyn CommentaryService>,
    store: Arc<dyn SessionStore>,
    phase: Phase,
    board_fen: String,
    human_color: Player,
    opponent_strength: i32,
    move_history: Vec<String>,
    profile: Option<OpponentProfile>,
    latest_commentary: Arc<Mutex<String>>,
    outcome: Option<GameOutcome>,
}

impl PlaySession {
    pub fn new(
        rules: Arc<dyn RulesEngine>,
        generator: Arc<dyn MoveGenerator>,
        commentary: Arc<dyn CommentaryService>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            rules,
            generator,
            commentary,
            store,
            phase: Phase::Idle,
            board_fen: String::new(),
            human_color: Player::White,
            opponent_strength: OPPONENT_STRENGTHS[0],
            move_history: Vec::new(),
            profile: None,
            latest_commentary: Arc::new(Mutex::new(String::new())),
            outcome: None,
        }
    }

    fn check_configurable(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle | Phase::Configuring | Phase::Finished => Ok(()),
            _ => Err(SessionError::IllegalOperation(
                "Settings cannot change during an active game".to_string(),
            )),
        }
    }

    /// Choose which side the human plays. Only valid before a game starts
    /// or after one finishes.
    pub fn set_human_color(&mut self, color: Player) -> Result<(), SessionError> {
        self.check_configurable()?;
        self.human_color = color;
        if self.phase == Phase::Idle {
            self.phase = Phase::Configuring;
        }
        Ok(())
    }

    /// Choose the opponent strength and fetch its identity card. A failed
    /// profile fetch is logged and replaced with the default profile.
    pub async fn set_opponent_strength(&mut self, strength: i32) -> Result<(), SessionError> {
        self.check_configurable()?;
        self.opponent_strength = strength;
        self.profile = Some(self.fetch_profile(strength).await);
        if self.phase == Phase::Idle {
            self.phase = Phase::Configuring;
        }
        Ok(())
    }

    async fn fetch_profile(&self, strength: i32) -> OpponentProfile {
        match self.generator.opponent_profile(strength).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(strength, error = %e, "Failed to fetch opponent profile");
                OpponentProfile::default()
            }
        }
    }

    /// Start a fresh game from the standard position. If the opponent has
    /// the first move the session enters [`Phase::AwaitingOpponentMove`]
    /// and human moves are rejected until the opponent has replied.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle | Phase::Configuring | Phase::Finished => {}
            _ => {
                return Err(SessionError::IllegalOperation(
                    "A game is already in progress".to_string(),
                ))
            }
        }

        if self.profile.is_none() {
            self.profile = Some(self.fetch_profile(self.opponent_strength).await);
        }

        self.board_fen = self.rules.starting_fen();
        self.move_history.clear();
        self.outcome = None;
        self.clear_commentary();

        self.phase = if self.rules.side_to_move(&self.board_fen)? == self.human_color {
            Phase::AwaitingHumanMove
        } else {
            Phase::AwaitingOpponentMove
        };
        info!(
            human_color = self.human_color.as_str(),
            strength = self.opponent_strength,
            "Game started"
        );
        Ok(())
    }

    /// Apply a human move. Rejected out of turn; an illegal move leaves
    /// the board and history untouched. A pawn reaching the final rank
    /// with no explicit promotion choice becomes a queen. Returns the SAN
    /// of the applied move.
    pub fn attempt_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<String, SessionError> {
        if self.phase != Phase::AwaitingHumanMove {
            return Err(SessionError::IllegalOperation(
                "It is not your turn".to_string(),
            ));
        }
        if self.rules.side_to_move(&self.board_fen)? != self.human_color {
            return Err(SessionError::IllegalOperation(
                "It is not your turn".to_string(),
            ));
        }

        let applied = match self.rules.apply_move(&self.board_fen, from, to, promotion) {
            Ok(applied) => applied,
            Err(SessionError::IllegalOperation(_))
                if promotion.is_none() && (to.ends_with('1') || to.ends_with('8')) =>
            {
                // Default queen promotion when the mover didn't pick a piece.
                self.rules.apply_move(&self.board_fen, from, to, Some('q'))?
            }
            Err(e) => return Err(e),
        };

        self.board_fen = applied.board_fen;
        self.move_history.push(applied.san.clone());

        if !self.evaluate_termination()? {
            self.request_commentary(applied.san.clone());
            self.phase = Phase::AwaitingOpponentMove;
        }
        Ok(applied.san)
    }

    /// Run the opponent's turn. Any failure — the generator erroring,
    /// returning nothing, or producing a malformed or illegal move —
    /// leaves the session in [`Phase::AwaitingOpponentMove`]. Returns the
    /// SAN of the opponent's move.
    pub async fn request_opponent_move(&mut self) -> Result<String, SessionError> {
        if self.phase != Phase::AwaitingOpponentMove {
            return Err(SessionError::IllegalOperation(
                "No opponent move is pending".to_string(),
            ));
        }

        let reply = self
            .generator
            .best_move(&self.board_fen, self.opponent_strength)
            .await?
            .ok_or_else(|| SessionError::Upstream("Engine failed to respond".to_string()))?;

        let mv = parse_coordinate(&reply).ok_or_else(|| {
            SessionError::Upstream(format!("Engine returned malformed move '{reply}'"))
        })?;

        let applied = self
            .rules
            .apply_move(&self.board_fen, mv.from, mv.to, mv.promotion)
            .map_err(|e| SessionError::Upstream(format!("Engine move '{reply}' rejected: {e}")))?;

        self.board_fen = applied.board_fen;
        self.move_history.push(applied.san.clone());

        if !self.evaluate_termination()? {
            self.phase = Phase::AwaitingHumanMove;
        }
        Ok(applied.san)
    }

    /// Abandon the current game and return to [`Phase::Idle`]. Settings
    /// and the cached opponent profile survive.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.board_fen.clear();
        self.move_history.clear();
        self.outcome = None;
        self.clear_commentary();
    }

    fn evaluate_termination(&mut self) -> Result<bool, SessionError> {
        if self.rules.is_checkmate(&self.board_fen)? {
            // The side to move got mated; the winner is the other side.
            let winner = self.rules.side_to_move(&self.board_fen)?.other();
            self.outcome = Some(match winner {
                Player::White => GameOutcome::WhiteWins,
                Player::Black => GameOutcome::BlackWins,
            });
        } else if self.rules.is_draw(&self.board_fen)? {
            self.outcome = Some(GameOutcome::Draw);
        } else {
            return Ok(false);
        }

        self.phase = Phase::Finished;
        self.persist_finished_game();
        Ok(true)
    }

    /// Save the finished game without blocking the terminal transition.
    /// Called exactly once, at the moment the game ends.
    fn persist_finished_game(&self) {
        let Some(outcome) = self.outcome else {
            return;
        };
        let result = outcome.result_code();
        let game = FinishedGame {
            movetext: self.rules.full_movetext(&self.move_history, Some(result)),
            result: result.to_string(),
            strength: self.opponent_strength,
            opponent_name: self
                .profile
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| OpponentProfile::default().name),
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.save_finished_game(&game).await {
                Ok(id) => info!(game_id = %id, result = %game.result, "Finished game saved"),
                Err(e) => warn!(error = %e, "Failed to save finished game"),
            }
        });
    }

    fn request_commentary(&self, move_san: String) {
        let commentary = Arc::clone(&self.commentary);
        let slot = Arc::clone(&self.latest_commentary);
        let profile = self.profile.clone().unwrap_or_default();
        let request = CommentaryRequest {
            board_fen: self.board_fen.clone(),
            move_san: move_san.clone(),
            strength: self.opponent_strength,
            opponent_name: profile.name.clone(),
            opponent_style: profile.style,
        };
        tokio::spawn(async move {
            let line = match commentary.comment(&request).await {
                Ok(line) => sanitize_commentary(Some(&line)),
                Err(e) => {
                    warn!(error = %e, "Commentary request failed");
                    format!("{}: Nice try with {}!", profile.name, move_san)
                }
            };
            if let Ok(mut latest) = slot.lock() {
                *latest = line;
            }
        });
    }

    fn clear_commentary(&self) {
        if let Ok(mut latest) = self.latest_commentary.lock() {
            latest.clear();
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board_fen(&self) -> &str {
        &self.board_fen
    }

    pub fn human_color(&self) -> Player {
        self.human_color
    }

    pub fn opponent_strength(&self) -> i32 {
        self.opponent_strength
    }

    pub fn move_history(&self) -> &[String] {
        &self.move_history
    }

    pub fn opponent_profile(&self) -> Option<&OpponentProfile> {
        self.profile.as_ref()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Most recent coach line, empty until the first commentary lands.
    pub fn latest_commentary(&self) -> String {
        self.latest_commentary
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    use crate::rules::ShakmatyRules;
    use crate::store::MemoryStore;

    struct ScriptedGenerator {
        moves: Mutex<VecDeque<Option<String>>>,
        profile: Result<OpponentProfile, ()>,
    }

    impl ScriptedGenerator {
        fn new(moves: &[&str]) -> Self {
            Self {
                moves: Mutex::new(moves.iter().map(|m| Some(m.to_string())).collect()),
                profile: Ok(OpponentProfile {
                    name: "Maximus".to_string(),
                    style: "Aggressive".to_string(),
                    description: "Attacks at all costs".to_string(),
                }),
            }
        }

        fn without_profile(moves: &[&str]) -> Self {
            Self {
                profile: Err(()),
                ..Self::new(moves)
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
            let next = self.moves.lock().unwrap().pop_front();
            match next {
                Some(mv) => Ok(mv),
                None => Err(SessionError::Upstream("No scripted move left".to_string())),
            }
        }

        async fn opponent_profile(&self, _strength: i32) -> Result<OpponentProfile, SessionError> {
            self.profile
                .clone()
                .map_err(|_| SessionError::Upstream("Profile fetch failed".to_string()))
        }
    }

    struct CannedCommentary(Result<String, ()>);

    #[async_trait]
    impl CommentaryService for CannedCommentary {
        async fn comment(&self, _request: &CommentaryRequest) -> Result<String, SessionError> {
            self.0
                .clone()
                .map_err(|_| SessionError::Upstream("Commentary offline".to_string()))
        }
    }

    fn session(generator: ScriptedGenerator, commentary: CannedCommentary) -> (PlaySession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = PlaySession::new(
            Arc::new(ShakmatyRules),
            Arc::new(generator),
            Arc::new(commentary),
            Arc::clone(&store) as Arc<dyn SessionStore>,
        );
        (session, store)
    }

    #[tokio::test]
    async fn test_white_start_awaits_human() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        assert_eq!(s.phase(), Phase::AwaitingHumanMove);
        assert!(s.board_fen().starts_with("rnbqkbnr/pppppppp"));
    }

    #[tokio::test]
    async fn test_black_start_awaits_opponent_and_rejects_human_move() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&["e2e4"]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.set_human_color(Player::Black).unwrap();
        s.start().await.unwrap();
        assert_eq!(s.phase(), Phase::AwaitingOpponentMove);

        let err = s.attempt_move("e7", "e5", None).unwrap_err();
        assert!(matches!(err, SessionError::IllegalOperation(_)));

        let san = s.request_opponent_move().await.unwrap();
        assert_eq!(san, "e4");
        assert_eq!(s.phase(), Phase::AwaitingHumanMove);
    }

    #[tokio::test]
    async fn test_human_move_transitions_to_opponent() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&["e7e5"]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        let san = s.attempt_move("e2", "e4", None).unwrap();
        assert_eq!(san, "e4");
        assert_eq!(s.phase(), Phase::AwaitingOpponentMove);
        assert_eq!(s.move_history(), &["e4".to_string()]);
    }

    #[tokio::test]
    async fn test_illegal_human_move_keeps_state() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        let before = s.board_fen().to_string();
        let err = s.attempt_move("e2", "e5", None).unwrap_err();
        assert!(matches!(err, SessionError::IllegalOperation(_)));
        assert_eq!(s.board_fen(), before);
        assert_eq!(s.phase(), Phase::AwaitingHumanMove);
        assert!(s.move_history().is_empty());
    }

    #[tokio::test]
    async fn test_opponent_failure_leaves_turn_pending() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        s.attempt_move("e2", "e4", None).unwrap();

        let err = s.request_opponent_move().await.unwrap_err();
        assert!(matches!(err, SessionError::Upstream(_)));
        assert_eq!(s.phase(), Phase::AwaitingOpponentMove);
        assert_eq!(s.move_history().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_engine_move_is_upstream_error() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&["castle-long"]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        s.attempt_move("e2", "e4", None).unwrap();

        let err = s.request_opponent_move().await.unwrap_err();
        assert!(matches!(err, SessionError::Upstream(_)));
        assert_eq!(s.phase(), Phase::AwaitingOpponentMove);
    }

    #[tokio::test]
    async fn test_default_queen_promotion() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        // Walk a contrived position: place the session mid-game by hand.
        s.board_fen = "8/4P1k1/8/8/8/8/8/4K3 w - - 0 1".to_string();
        let san = s.attempt_move("e7", "e8", None).unwrap();
        assert_eq!(san, "e8=Q");
    }

    #[tokio::test]
    async fn test_checkmate_finishes_and_saves_once() {
        let (mut s, store) = session(
            ScriptedGenerator::new(&["e7e5", "b8c6"]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        // Scholar's mate setup, abbreviated: start from a mate-in-one.
        s.board_fen =
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4".to_string();
        let san = s.attempt_move("f3", "f7", None).unwrap();
        assert_eq!(san, "Qxf7#");
        assert_eq!(s.phase(), Phase::Finished);
        assert_eq!(s.outcome(), Some(GameOutcome::WhiteWins));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let saved = store.saved_games();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].game.result, "1-0");
        assert_eq!(saved[0].game.opponent_name, "Maximus");
        assert!(saved[0].game.movetext.ends_with("1-0"));
    }

    #[tokio::test]
    async fn test_opponent_checkmate_is_a_black_win() {
        // Fool's mate: the scripted opponent mates the human.
        let (mut s, store) = session(
            ScriptedGenerator::new(&["e7e5", "d8h4"]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        s.attempt_move("f2", "f3", None).unwrap();
        s.request_opponent_move().await.unwrap();
        s.attempt_move("g2", "g4", None).unwrap();
        let san = s.request_opponent_move().await.unwrap();
        assert_eq!(san, "Qh4#");
        assert_eq!(s.phase(), Phase::Finished);
        assert_eq!(s.outcome(), Some(GameOutcome::BlackWins));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let saved = store.saved_games();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].game.result, "0-1");
        assert_eq!(saved[0].game.movetext, "1. f3 e5 2. g4 Qh4# 0-1");
    }

    #[tokio::test]
    async fn test_commentary_fallback_names_bot_and_move() {
        let (mut s, _) = session(
            ScriptedGenerator::without_profile(&[]),
            CannedCommentary(Err(())),
        );
        s.start().await.unwrap();
        s.attempt_move("g1", "f3", None).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(s.latest_commentary(), "Bot: Nice try with Nf3!");
    }

    #[tokio::test]
    async fn test_settings_locked_during_game() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.set_opponent_strength(800).await.unwrap();
        assert_eq!(s.opponent_profile().unwrap().name, "Maximus");
        s.start().await.unwrap();

        assert!(matches!(
            s.set_human_color(Player::Black).unwrap_err(),
            SessionError::IllegalOperation(_)
        ));
        assert!(matches!(
            s.set_opponent_strength(1200).await.unwrap_err(),
            SessionError::IllegalOperation(_)
        ));
    }

    #[tokio::test]
    async fn test_profile_fetch_failure_falls_back_to_default() {
        let (mut s, _) = session(
            ScriptedGenerator::without_profile(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.set_opponent_strength(400).await.unwrap();
        assert_eq!(s.opponent_profile().unwrap().name, "Bot");
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let (mut s, _) = session(
            ScriptedGenerator::new(&[]),
            CannedCommentary(Ok("Good".to_string())),
        );
        s.start().await.unwrap();
        s.attempt_move("e2", "e4", None).unwrap();
        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.board_fen().is_empty());
        assert!(s.move_history().is_empty());
        assert!(s.outcome().is_none());
    }
}
