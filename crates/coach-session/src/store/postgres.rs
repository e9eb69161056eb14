//! Postgres-backed session store. Move lists live in a JSONB column and
//! are decoded through the raw-record path on the way back out.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use coach_core::record::MoveRecord;

use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::services::{FinishedGame, SessionStore, StoredAnalysis};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self, SessionError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_analysis(
        &self,
        pgn: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<String, SessionError> {
        let moves = serde_json::to_value(moves)?;
        let row = sqlx::query(
            "INSERT INTO game_analyses (pgn, moves, last_viewed_move, created_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING id",
        )
        .bind(pgn)
        .bind(&moves)
        .bind(last_viewed as i32)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        Ok(id.to_string())
    }

    async fn get_analysis(&self, id: &str) -> Result<Option<StoredAnalysis>, SessionError> {
        let Ok(numeric_id) = id.parse::<i64>() else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT pgn, moves, last_viewed_move FROM game_analyses WHERE id = $1",
        )
        .bind(numeric_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let moves: serde_json::Value = row
            .try_get("moves")
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        let last_viewed: Option<i32> = row.try_get("last_viewed_move").unwrap_or(None);

        Ok(Some(StoredAnalysis {
            id: id.to_string(),
            pgn: row.try_get("pgn").unwrap_or_default(),
            moves: serde_json::from_value(moves)?,
            last_viewed_move: last_viewed.and_then(|v| usize::try_from(v).ok()),
        }))
    }

    async fn update_analysis(
        &self,
        id: &str,
        moves: &[MoveRecord],
        last_viewed: usize,
    ) -> Result<(), SessionError> {
        let numeric_id: i64 = id
            .parse()
            .map_err(|_| SessionError::AnalysisNotFound(id.to_string()))?;
        let moves = serde_json::to_value(moves)?;

        let result = sqlx::query(
            "UPDATE game_analyses SET moves = $2, last_viewed_move = $3 WHERE id = $1",
        )
        .bind(numeric_id)
        .bind(&moves)
        .bind(last_viewed as i32)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SessionError::AnalysisNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_last_viewed(&self, id: &str, last_viewed: usize) -> Result<(), SessionError> {
        let numeric_id: i64 = id
            .parse()
            .map_err(|_| SessionError::AnalysisNotFound(id.to_string()))?;

        let result = sqlx::query("UPDATE game_analyses SET last_viewed_move = $2 WHERE id = $1")
            .bind(numeric_id)
            .bind(last_viewed as i32)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SessionError::AnalysisNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_finished_game(&self, game: &FinishedGame) -> Result<String, SessionError> {
        let row = sqlx::query(
            "INSERT INTO finished_games (movetext, result, strength, opponent_name, finished_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING id",
        )
        .bind(&game.movetext)
        .bind(&game.result)
        .bind(game.strength)
        .bind(&game.opponent_name)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        Ok(id.to_string())
    }
}
