//! Repository for the `user_stats` aggregate.

use personafy_core::types::DbId;
use sqlx::PgPool;

/// Per-user transformation counter.
pub struct UserStatsRepo;

impl UserStatsRepo {
    /// Atomically increment the user's completed-transformation count via
    /// the `increment_user_transformations` SQL function. Returns the new total.
    pub async fn increment_transformations(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as("SELECT increment_user_transformations($1)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(total)
    }

    /// Current total for a user, `0` if the user has no row yet.
    pub async fn total_transformations(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT total_transformations FROM user_stats WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map_or(0, |(total,)| total))
    }
}
