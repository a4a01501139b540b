//! PostgreSQL-backed `CheerRepository` implementation using Diesel ORM.
//!
//! Inserts use `ON CONFLICT DO NOTHING` so a racing duplicate insert reports
//! [`InsertOutcome::AlreadyPresent`] instead of failing.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{CheerPersistenceError, CheerRepository, InsertOutcome};
use crate::domain::{PostId, UserId};

use super::models::NewLikeRow;
use super::pool::{DbPool, PoolError};
use super::schema::likes;

/// Diesel-backed implementation of the `CheerRepository` port.
#[derive(Clone)]
pub struct DieselCheerRepository {
    pool: DbPool,
}

impl DieselCheerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CheerPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CheerPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CheerPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CheerPersistenceError::connection("database connection error")
        }
        _ => CheerPersistenceError::query("database error"),
    }
}

#[async_trait]
impl CheerRepository for DieselCheerRepository {
    async fn exists(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<bool, CheerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            likes::table
                .filter(likes::post_id.eq(post_id.as_uuid()))
                .filter(likes::user_id.eq(user_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<InsertOutcome, CheerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewLikeRow {
            post_id: *post_id.as_uuid(),
            user_id: *user_id.as_uuid(),
        };

        let inserted = diesel::insert_into(likes::table)
            .values(&new_row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if inserted == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        })
    }

    async fn remove(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), CheerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            likes::table
                .filter(likes::post_id.eq(post_id.as_uuid()))
                .filter(likes::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn count(&self, post_id: &PostId) -> Result<i64, CheerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        likes::table
            .filter(likes::post_id.eq(post_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn cheered_subset(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<Vec<PostId>, CheerPersistenceError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let uuids: Vec<Uuid> = post_ids.iter().map(|id| *id.as_uuid()).collect();
        let cheered: Vec<Uuid> = likes::table
            .filter(likes::user_id.eq(user_id.as_uuid()))
            .filter(likes::post_id.eq_any(uuids))
            .select(likes::post_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(cheered.into_iter().map(PostId::from_uuid).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, CheerPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ClosedConnection,
            Box::new("closed".to_owned()),
        ));
        assert!(matches!(err, CheerPersistenceError::Connection { .. }));
    }
}
