//! PostgreSQL-backed `UserStatsQuery` over the `user_stats` aggregate view.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{StatsPersistenceError, UserStatsQuery, UserStatsRecord};
use crate::domain::UserId;

use super::models::UserStatsRow;
use super::pool::{DbPool, PoolError};
use super::schema::user_stats;

/// Diesel-backed implementation of the `UserStatsQuery` port.
#[derive(Clone)]
pub struct DieselUserStatsQuery {
    pool: DbPool,
}

impl DieselUserStatsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StatsPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StatsPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> StatsPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StatsPersistenceError::connection("database connection error")
        }
        _ => StatsPersistenceError::query("database error"),
    }
}

#[async_trait]
impl UserStatsQuery for DieselUserStatsQuery {
    async fn user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStatsRecord>, StatsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserStatsRow> = user_stats::table
            .find(user_id.as_uuid())
            .select(UserStatsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| UserStatsRecord {
            posts_count: row.posts_count,
            followers_count: row.followers_count,
            following_count: row.following_count,
        }))
    }
}
