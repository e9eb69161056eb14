//! In-memory store for tests and single-process use.
//!
//! Moves are held as JSON so that reads go back through the same raw
//! decoding path the Postgres store uses.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coach_core::record::MoveRecord;

use crate::error::SessionError;
use crate::services::{FinishedGame, SessionStore, StoredAnalysis};

#[derive(Debug, Clone)]
struct AnalysisRow {
    pgn: String,
    moves: serde_json::Value,
    last_viewed_move: usize,
}

/// A finished game as the memory store recorded it.
#[derive(Debug, Clone)]
pub struct SavedGame {
    pub game: FinishedGame,
    pub saved_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    analyses: HashMap<String, AnalysisRow>,
    games: Vec<SavedGame>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, SessionError> {
        self.inner
            .lock()
            .map_err(|_| SessionError::Data("Store mutex poisoned".to_string()))
    }

    /// All finished games saved so far, in save order.
    pub fn saved_games(&self) -> Vec<SavedGame> {
        self.inner
            .lock()
            .map(|inner| inner.games.clone())
            .unwrap_or_default()
    }

    /// Last viewed index currently stored for an analysis.
    pub fn last_viewed(&self, id: &str) -> Option<usize> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.analyses.get(id).map(|row| row.last_viewed_move))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_analysis(
        &self,
        pgn: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<String, SessionError> {
        let moves = serde_json::to_value(moves)?;
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = format!("analysis-{}", inner.next_id);
        inner.analyses.insert(
            id.clone(),
            AnalysisRow {
                pgn: pgn.to_string(),
                moves,
                last_viewed_move: last_viewed,
            },
        );
        Ok(id)
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<StoredAnalysis>, SessionError> {
        let row = self.lock()?.analyses.get(id).cloned();
        match row {
            None => Ok(None),
            Some(row) => Ok(Some(StoredAnalysis {
                id: id.to_string(),
                pgn: row.pgn,
                moves: serde_json::from_value(row.moves)?,
                last_viewed_move: Some(row.last_viewed_move),
            })),
        }
    }

    async fn update_analysis(
        &self,
        id: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<(), SessionError> {
        let moves = serde_json::to_value(moves)?;
        let mut inner = self.lock()?;
        let row = inner
            .analyses
            .get_mut(id)
            .ok_or_else(|| SessionError::AnalysisNotFound(id.to_string()))?;
        row.moves = moves;
        row.last_viewed_move = last_viewed;
        Ok(())
    }

    async fn update_last_viewed(&self, id: &str, last_viewed: usize) -> Result<(), SessionError> {
        let mut inner = self.lock()?;
        let row = inner
            .analyses
            .get_mut(id)
            .ok_or_else(|| SessionError::AnalysisNotFound(id.to_string()))?;
        row.last_viewed_move = last_viewed;
        Ok(())
    }

    async fn save_finished_game(&self, game: &FinishedGame) -> Result<String, SessionError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = format!("game-{}", inner.next_id);
        inner.games.push(SavedGame {
            game: game.clone(),
            saved_at: Utc::now(),
        });
        Ok(id)
    }
}
