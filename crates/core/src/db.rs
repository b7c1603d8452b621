//! sqlite-backed `GenerationStore` (spec §1, §6: "any relational engine").
//!
//! Grounded on the teacher's `handlers/db.rs`: a hand-written
//! `CREATE TABLE IF NOT EXISTS`, no migration framework, `sqlx::query!`-free
//! runtime-checked queries so the crate doesn't need a live database at
//! compile time, and a bounded per-query timeout.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use evo_shared::{EvoError, GenerationRecord, GenerationStatus, GenerationStore};

const DB_TIMEOUT_SECS: u64 = 5;

pub struct SqliteGenerationStore {
    pool: SqlitePool,
}

impl SqliteGenerationStore {
    /// Open (creating if absent) the sqlite database at `database_url` and
    /// run the schema bootstrap.
    pub async fn connect(database_url: &str) -> Result<Self, EvoError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| EvoError::Persistence(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), EvoError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS generations (
                generation_number INTEGER PRIMARY KEY,
                target_name       TEXT NOT NULL,
                status            TEXT NOT NULL,
                fitness_score     REAL NOT NULL,
                model_tag         TEXT NOT NULL,
                tokens_in         INTEGER NOT NULL,
                tokens_out        INTEGER NOT NULL,
                reasoning         TEXT NOT NULL,
                old_source        TEXT NOT NULL,
                new_source        TEXT NOT NULL,
                created_at        TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| EvoError::Persistence(e.to_string()))?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_generations_number ON generations(generation_number)")
            .execute(&self.pool)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_generations_status ON generations(status)")
            .execute(&self.pool)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;

        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<GenerationRecord, EvoError> {
        let status_str: String = row.try_get("status").map_err(|e| EvoError::Persistence(e.to_string()))?;
        let status = GenerationStatus::from_str(&status_str).map_err(EvoError::Persistence)?;
        let created_at_str: String = row.try_get("created_at").map_err(|e| EvoError::Persistence(e.to_string()))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| EvoError::Persistence(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(GenerationRecord {
            generation_number: row
                .try_get::<i64, _>("generation_number")
                .map_err(|e| EvoError::Persistence(e.to_string()))? as u64,
            target_name: row.try_get("target_name").map_err(|e| EvoError::Persistence(e.to_string()))?,
            status,
            fitness_score: row.try_get("fitness_score").map_err(|e| EvoError::Persistence(e.to_string()))?,
            model_tag: row.try_get("model_tag").map_err(|e| EvoError::Persistence(e.to_string()))?,
            tokens_in: row
                .try_get::<i64, _>("tokens_in")
                .map_err(|e| EvoError::Persistence(e.to_string()))? as u64,
            tokens_out: row
                .try_get::<i64, _>("tokens_out")
                .map_err(|e| EvoError::Persistence(e.to_string()))? as u64,
            reasoning: row.try_get("reasoning").map_err(|e| EvoError::Persistence(e.to_string()))?,
            old_source: row.try_get("old_source").map_err(|e| EvoError::Persistence(e.to_string()))?,
            new_source: row.try_get("new_source").map_err(|e| EvoError::Persistence(e.to_string()))?,
            created_at,
        })
    }
}

#[async_trait]
impl GenerationStore for SqliteGenerationStore {
    async fn insert(&self, record: GenerationRecord) -> Result<(), EvoError> {
        let fut = sqlx::query(
            r"
            INSERT INTO generations
                (generation_number, target_name, status, fitness_score, model_tag,
                 tokens_in, tokens_out, reasoning, old_source, new_source, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(record.generation_number as i64)
        .bind(&record.target_name)
        .bind(record.status.as_str())
        .bind(record.fitness_score)
        .bind(&record.model_tag)
        .bind(record.tokens_in as i64)
        .bind(record.tokens_out as i64)
        .bind(&record.reasoning)
        .bind(&record.old_source)
        .bind(&record.new_source)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool);

        tokio::time::timeout(Duration::from_secs(DB_TIMEOUT_SECS), fut)
            .await
            .map_err(|_| EvoError::Persistence("insert timed out".to_string()))?
            .map_err(|e| EvoError::Persistence(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, generation_number: u64) -> Result<Option<GenerationRecord>, EvoError> {
        let row = sqlx::query("SELECT * FROM generations WHERE generation_number = ?")
            .bind(generation_number as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn latest_generation_number(&self) -> Result<Option<u64>, EvoError> {
        let row = sqlx::query("SELECT MAX(generation_number) AS n FROM generations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;
        let n: Option<i64> = row.try_get("n").map_err(|e| EvoError::Persistence(e.to_string()))?;
        Ok(n.map(|n| n as u64))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, EvoError> {
        let rows = sqlx::query("SELECT * FROM generations ORDER BY generation_number DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EvoError::Persistence(e.to_string()))?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn by_status(&self, status: &str, limit: usize) -> Result<Vec<GenerationRecord>, EvoError> {
        let rows = sqlx::query(
            "SELECT * FROM generations WHERE status = ? ORDER BY generation_number DESC LIMIT ?",
        )
        .bind(status)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EvoError::Persistence(e.to_string()))?;
        rows.iter().map(Self::row_to_record).collect()
    }
}
