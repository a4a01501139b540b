//! PostgreSQL-backed `FollowRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FollowPersistenceError, FollowRepository, InsertOutcome};
use crate::domain::UserId;

use super::models::NewFollowRow;
use super::pool::{DbPool, PoolError};
use super::schema::follows;

/// Diesel-backed implementation of the `FollowRepository` port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FollowPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FollowPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FollowPersistenceError::connection("database connection error")
        }
        _ => FollowPersistenceError::query("database error"),
    }
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn exists(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            follows::table
                .filter(follows::follower_id.eq(follower.as_uuid()))
                .filter(follows::following_id.eq(following.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<InsertOutcome, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFollowRow {
            follower_id: *follower.as_uuid(),
            following_id: *following.as_uuid(),
        };

        let inserted = diesel::insert_into(follows::table)
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
        follower: &UserId,
        following: &UserId,
    ) -> Result<(), FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower.as_uuid()))
                .filter(follows::following_id.eq(following.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(err, FollowPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn generic_errors_map_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, FollowPersistenceError::Query { .. }));
    }
}
