//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.
//!
//! Windowed reads use keyset pagination over `(created_at, id)` descending.
//! The cursor filter admits rows strictly older than the cursor position:
//! `created_at < ts OR (created_at = ts AND id < cid)`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Cursor;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{NewPost, PostPersistenceError, PostRepository};
use crate::domain::{FeedEntry, Post, PostId, UserId};

use super::models::{NewPostRow, PostRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{post_stats, posts, users};

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PostPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PostPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => PostPersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PostPersistenceError::connection("database connection error")
        }
        _ => PostPersistenceError::query("database error"),
    }
}

type StatsRow = (PostRow, UserRow, i64, i64);

fn row_to_entry((post, author, likes_count, comments_count): StatsRow) -> Result<FeedEntry, String> {
    Ok(FeedEntry {
        post: post.into_domain()?,
        author: author.into_domain()?,
        likes_count,
        comments_count,
        is_cheered: false,
    })
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPostRow {
            id: Uuid::new_v4(),
            user_id: *new_post.user_id.as_uuid(),
            image_url: new_post.image_url.as_ref(),
            caption: new_post.caption.as_ref().map(AsRef::as_ref),
        };

        let row: PostRow = diesel::insert_into(posts::table)
            .values(&new_row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row.into_domain().map_err(PostPersistenceError::query)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PostRow> = posts::table
            .find(id.as_uuid())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row.into_domain().map_err(PostPersistenceError::query))
            .transpose()
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(posts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn feed_window(
        &self,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<FeedEntry>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = posts::table
            .inner_join(users::table)
            .inner_join(post_stats::table)
            .select((
                PostRow::as_select(),
                UserRow::as_select(),
                post_stats::likes_count,
                post_stats::comments_count,
            ))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(fetch)
            .into_boxed();

        if let Some(cursor) = cursor {
            query = query.filter(
                posts::created_at.lt(cursor.ts()).or(posts::created_at
                    .eq(cursor.ts())
                    .and(posts::id.lt(cursor.id()))),
            );
        }

        let rows: Vec<StatsRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_entry(row).map_err(PostPersistenceError::query))
            .collect()
    }

    async fn find_with_stats(
        &self,
        id: &PostId,
    ) -> Result<Option<FeedEntry>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<StatsRow> = posts::table
            .inner_join(users::table)
            .inner_join(post_stats::table)
            .filter(posts::id.eq(id.as_uuid()))
            .select((
                PostRow::as_select(),
                UserRow::as_select(),
                post_stats::likes_count,
                post_stats::comments_count,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_entry(row).map_err(PostPersistenceError::query))
            .transpose()
    }

    async fn user_posts_window(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = posts::table
            .filter(posts::user_id.eq(user_id.as_uuid()))
            .select(PostRow::as_select())
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(fetch)
            .into_boxed();

        if let Some(cursor) = cursor {
            query = query.filter(
                posts::created_at.lt(cursor.ts()).or(posts::created_at
                    .eq(cursor.ts())
                    .and(posts::id.lt(cursor.id()))),
            );
        }

        let rows: Vec<PostRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(PostPersistenceError::query))
            .collect()
    }
}
