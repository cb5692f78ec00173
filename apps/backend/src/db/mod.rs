//! PostgreSQL database operations

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{ApiError, Result};
use crate::models::{DbWordState, PersistedWordState};

pub mod memory;

pub use memory::MemoryStateStore;

/// Durable store for per-user word state documents
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load every persisted word state for a user
    async fn load_word_states(&self, user_id: &str) -> Result<Vec<PersistedWordState>>;

    /// Write a batch of word states for a user. The batch lands as a unit:
    /// either every entry is applied or the call fails and no entry is.
    async fn upsert_word_states(
        &self,
        user_id: &str,
        states: &[PersistedWordState],
    ) -> Result<()>;
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.into()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// === Word State Repository ===

#[async_trait]
impl StateStore for Database {
    async fn load_word_states(&self, user_id: &str) -> Result<Vec<PersistedWordState>> {
        let rows = sqlx::query_as::<_, DbWordState>(
            r#"
            SELECT id, user_id, word, ease_factor, interval_days, repetition_count,
                   last_reviewed_ms, next_review_ms, times_reviewed, times_correct,
                   bookmarked, created_at, updated_at
            FROM word_states
            WHERE user_id = $1
            ORDER BY word
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbWordState::to_persisted).collect())
    }

    async fn upsert_word_states(
        &self,
        user_id: &str,
        states: &[PersistedWordState],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for state in states {
            let row = DbWordState::from_persisted(user_id, state);
            sqlx::query(
                r#"
                INSERT INTO word_states (id, user_id, word, ease_factor, interval_days,
                                        repetition_count, last_reviewed_ms, next_review_ms,
                                        times_reviewed, times_correct, bookmarked, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (user_id, word) DO UPDATE SET
                    ease_factor = EXCLUDED.ease_factor,
                    interval_days = EXCLUDED.interval_days,
                    repetition_count = EXCLUDED.repetition_count,
                    last_reviewed_ms = EXCLUDED.last_reviewed_ms,
                    next_review_ms = EXCLUDED.next_review_ms,
                    times_reviewed = EXCLUDED.times_reviewed,
                    times_correct = EXCLUDED.times_correct,
                    bookmarked = EXCLUDED.bookmarked,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(row.id)
            .bind(&row.user_id)
            .bind(&row.word)
            .bind(row.ease_factor)
            .bind(row.interval_days)
            .bind(row.repetition_count)
            .bind(row.last_reviewed_ms)
            .bind(row.next_review_ms)
            .bind(row.times_reviewed)
            .bind(row.times_correct)
            .bind(row.bookmarked)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
