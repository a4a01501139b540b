//! Diesel row structs and their conversions to domain types.
//!
//! Rows are internal to the persistence layer. Conversions are fallible
//! because the domain newtypes validate on construction; a row that fails
//! validation indicates data written outside the application and surfaces
//! as a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Caption, DisplayName, Feedback, FeedbackContent, FeedbackId, ImageUrl, Post, PostId, Subject,
    User, UserId,
};

use super::schema::{comments, follows, likes, posts, user_stats, users};

/// Queryable row for the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub subject: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            subject: Subject::try_from(self.subject).map_err(|err| err.to_string())?,
            display_name: DisplayName::try_from(self.display_name)
                .map_err(|err| err.to_string())?,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
        })
    }
}

/// Insertable row for the `users` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub subject: &'a str,
    pub display_name: &'a str,
}

/// Queryable row for the `posts` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    pub(crate) fn into_domain(self) -> Result<Post, String> {
        Ok(Post {
            id: PostId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            image_url: ImageUrl::try_from(self.image_url).map_err(|err| err.to_string())?,
            caption: self
                .caption
                .map(Caption::try_from)
                .transpose()
                .map_err(|err| err.to_string())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable row for the `posts` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: &'a str,
    pub caption: Option<&'a str>,
}

/// Insertable row for the `likes` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub(crate) struct NewLikeRow {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// Queryable row for the `comments` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) fn into_domain(self) -> Result<Feedback, String> {
        Ok(Feedback {
            id: FeedbackId::from_uuid(self.id),
            post_id: PostId::from_uuid(self.post_id),
            user_id: UserId::from_uuid(self.user_id),
            content: FeedbackContent::try_from(self.content).map_err(|err| err.to_string())?,
            parent_id: self.parent_id.map(FeedbackId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable row for the `comments` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: &'a str,
    pub parent_id: Option<Uuid>,
}

/// Insertable row for the `follows` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
}

/// Queryable row for the `user_stats` aggregate view.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = user_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserStatsRow {
    pub user_id: Uuid,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            subject: "auth0|abc".into(),
            display_name: "Ada".into(),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn valid_user_row_converts() {
        let row = user_row();
        let id = row.id;
        let user = row.into_domain().expect("valid row");
        assert_eq!(*user.id.as_uuid(), id);
        assert_eq!(user.display_name.as_ref(), "Ada");
    }

    #[rstest]
    fn blank_subject_row_is_rejected() {
        let mut row = user_row();
        row.subject = "   ".into();
        assert!(row.into_domain().is_err());
    }

    #[rstest]
    fn post_row_preserves_optional_caption() {
        let row = PostRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_url: "https://cdn.example/a.webp".into(),
            caption: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let post = row.into_domain().expect("valid row");
        assert!(post.caption.is_none());
    }

    #[rstest]
    fn comment_row_preserves_parent() {
        let parent = Uuid::new_v4();
        let row = CommentRow {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "nice".into(),
            parent_id: Some(parent),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let feedback = row.into_domain().expect("valid row");
        assert_eq!(feedback.parent_id, Some(FeedbackId::from_uuid(parent)));
    }
}
