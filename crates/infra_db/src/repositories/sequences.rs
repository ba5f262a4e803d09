//! Numbering sequences

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the `numero_sequences` table
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: PgPool,
}

impl SequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Increments the counter of `scope` and returns the new value
    ///
    /// The first call for a scope returns 1. The upsert holds the row lock,
    /// so concurrent callers never see the same value.
    pub async fn next_value(&self, scope: &str) -> Result<i64, DatabaseError> {
        let value = sqlx::query_scalar::<_, i64>(
            "INSERT INTO numero_sequences (scope, last_value) VALUES ($1, 1) \
             ON CONFLICT (scope) DO UPDATE SET last_value = numero_sequences.last_value + 1 \
             RETURNING last_value",
        )
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }
}
