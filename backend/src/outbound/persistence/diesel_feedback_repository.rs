//! PostgreSQL-backed `FeedbackRepository` implementation using Diesel ORM.
//!
//! Author-carrying reads join `comments` with `users`. Deletes rely on the
//! `ON DELETE CASCADE` constraint on `parent_id` to remove replies.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{FeedbackPersistenceError, FeedbackRepository, NewFeedback};
use crate::domain::{Feedback, FeedbackContent, FeedbackId, FeedbackWithAuthor, PostId};

use super::models::{CommentRow, NewCommentRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, users};

/// Diesel-backed implementation of the `FeedbackRepository` port.
#[derive(Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FeedbackPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FeedbackPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FeedbackPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => FeedbackPersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FeedbackPersistenceError::connection("database connection error")
        }
        _ => FeedbackPersistenceError::query("database error"),
    }
}

fn row_to_entry(
    (comment, author): (CommentRow, UserRow),
) -> Result<FeedbackWithAuthor, FeedbackPersistenceError> {
    Ok(FeedbackWithAuthor {
        feedback: comment
            .into_domain()
            .map_err(FeedbackPersistenceError::query)?,
        author: author
            .into_domain()
            .map_err(FeedbackPersistenceError::query)?,
    })
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn insert(
        &self,
        new_feedback: NewFeedback,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCommentRow {
            id: Uuid::new_v4(),
            post_id: *new_feedback.post_id.as_uuid(),
            user_id: *new_feedback.user_id.as_uuid(),
            content: new_feedback.content.as_ref(),
            parent_id: new_feedback.parent_id.map(|id| *id.as_uuid()),
        };

        let row: CommentRow = diesel::insert_into(comments::table)
            .values(&new_row)
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let author: UserRow = users::table
            .find(row.user_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_entry((row, author))
    }

    async fn find_by_id(
        &self,
        id: &FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CommentRow> = comments::table
            .find(id.as_uuid())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row.into_domain().map_err(FeedbackPersistenceError::query))
            .transpose()
    }

    async fn top_level_for_post(
        &self,
        post_id: &PostId,
        limit: i64,
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(CommentRow, UserRow)> = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post_id.as_uuid()))
            .filter(comments::parent_id.is_null())
            .order((comments::created_at.desc(), comments::id.desc()))
            .limit(limit)
            .select((CommentRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn replies_for(
        &self,
        parent_ids: &[FeedbackId],
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let uuids: Vec<Uuid> = parent_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(CommentRow, UserRow)> = comments::table
            .inner_join(users::table)
            .filter(comments::parent_id.eq_any(uuids))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((CommentRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn update_content(
        &self,
        id: &FeedbackId,
        content: &FeedbackContent,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: CommentRow = diesel::update(comments::table.find(id.as_uuid()))
            .set((
                comments::content.eq(content.as_ref()),
                comments::updated_at.eq(diesel::dsl::now),
            ))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let author: UserRow = users::table
            .find(row.user_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_entry((row, author))
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(comments::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
