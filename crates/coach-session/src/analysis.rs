//! Analysis session controller — loads or lazily creates a reviewed game,
//! tracks the currently viewed move, and mirrors viewing progress to the
//! store.
//!
//! In-memory state is the source of truth; persistence of the viewed index
//! is fire-and-forget and only ever logged on failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use coach_core::movetext::extract_san_moves;
use coach_core::record::{sanitize_records, MoveRecord};

use crate::error::SessionError;
use crate::services::{AnalysisService, SessionStore};

/// Session id meaning "not yet persisted".
pub const NEW_SESSION_ID: &str = "new";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

pub struct AnalysisController {
    analysis_service: Arc<dyn AnalysisService>,
    store: Arc<dyn SessionStore>,
    id: Option<String>,
    pgn: String,
    moves: Vec<MoveRecord>,
    current_move: usize,
    /// Monotonic token so a stale last-viewed write never overwrites a
    /// newer navigation.
    nav_seq: Arc<AtomicU64>,
}

impl AnalysisController {
    fn new(analysis_service: Arc<dyn AnalysisService>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            analysis_service,
            store,
            id: None,
            pgn: String::new(),
            moves: Vec::new(),
            current_move: 0,
            nav_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Open a session. `"new"` starts empty (the analysis is created by
    /// [`Self::analyze`]); anything else is fetched from the store. A
    /// stored session without moves triggers analysis of its stored
    /// movetext; otherwise every stored record is re-run through the
    /// sanitation pipeline and viewing resumes at the stored index.
    pub async fn open(
        analysis_service: Arc<dyn AnalysisService>,
        store: Arc<dyn SessionStore>,
        id: &str,
    ) -> Result<Self, SessionError> {
        let mut controller = Self::new(analysis_service, store);
        if id == NEW_SESSION_ID {
            return Ok(controller);
        }

        let stored = controller
            .store
            .get_analysis(id)
            .await?
            .ok_or_else(|| SessionError::AnalysisNotFound(id.to_string()))?;

        controller.id = Some(stored.id.clone());
        controller.pgn = stored.pgn.clone();

        if stored.moves.is_empty() {
            let pgn = stored.pgn.clone();
            controller.analyze(&pgn).await?;
            return Ok(controller);
        }

        controller.moves = sanitize_records(&stored.moves)?;
        controller.current_move = stored
            .last_viewed_move
            .filter(|&i| i < controller.moves.len())
            .unwrap_or(0);

        info!(
            analysis_id = %stored.id,
            move_count = controller.moves.len(),
            resume_at = controller.current_move,
            "Analysis loaded"
        );
        Ok(controller)
    }

    /// Request a full analysis of the given movetext, sanitize every
    /// record, reset viewing to the first move and persist. Failures are
    /// recoverable: the session keeps whatever state it had.
    pub async fn analyze(&mut self, movetext: &str) -> Result<(), SessionError> {
        if movetext.trim().is_empty() {
            return Err(SessionError::Input("Please enter a PGN".to_string()));
        }
        if extract_san_moves(movetext).is_empty() {
            return Err(SessionError::Input(
                "No moves found in the provided PGN".to_string(),
            ));
        }

        let raw = self.analysis_service.analyze_game(movetext).await?;
        let moves = sanitize_records(&raw)?;

        self.pgn = movetext.to_string();
        self.moves = moves;
        self.current_move = 0;

        match &self.id {
            None => {
                let id = self
                    .store
                    .create_analysis(&self.pgn, &self.moves, 0)
                    .await?;
                info!(analysis_id = %id, move_count = self.moves.len(), "Analysis created");
                self.id = Some(id);
            }
            Some(id) => {
                self.store.update_analysis(id, &self.moves, 0).await?;
                info!(analysis_id = %id, move_count = self.moves.len(), "Analysis updated");
            }
        }
        Ok(())
    }

    /// Jump to a move index. Out-of-range requests are silently ignored —
    /// no error, no mutation. In-range navigation persists the new index
    /// in the background.
    pub fn go_to(&mut self, index: i64) {
        if index < 0 || index as usize >= self.moves.len() {
            return;
        }
        self.current_move = index as usize;
        self.persist_last_viewed();
    }

    /// Step one move forward or back, with the same bounds behavior as
    /// [`Self::go_to`].
    pub fn step(&mut self, direction: Direction) {
        let target = match direction {
            Direction::Next => self.current_move as i64 + 1,
            Direction::Prev => self.current_move as i64 - 1,
        };
        self.go_to(target);
    }

    /// Persist the viewed index without blocking navigation. A write that
    /// has been superseded by a newer navigation is skipped.
    fn persist_last_viewed(&self) {
        let Some(id) = self.id.clone() else {
            return;
        };
        let store = Arc::clone(&self.store);
        let latest = Arc::clone(&self.nav_seq);
        let seq = self.nav_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let index = self.current_move;

        tokio::spawn(async move {
            if latest.load(Ordering::SeqCst) != seq {
                return;
            }
            if let Err(e) = store.update_last_viewed(&id, index).await {
                warn!(analysis_id = %id, index, error = %e, "Failed to persist last viewed move");
            }
        });
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn pgn(&self) -> &str {
        &self.pgn
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn current_move(&self) -> usize {
        self.current_move
    }

    /// The record currently being viewed, if any analysis is loaded.
    pub fn current_record(&self) -> Option<&MoveRecord> {
        self.moves.get(self.current_move)
    }
}
