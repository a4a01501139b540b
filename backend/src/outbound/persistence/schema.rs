//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! `post_stats` and `user_stats` are read-only aggregate views declared as
//! tables so Diesel can select from them.

diesel::table! {
    /// User accounts keyed by external auth subject.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// External auth subject, unique per user.
        subject -> Varchar,
        /// Human-readable display name (max 50 characters).
        display_name -> Varchar,
        /// Public URL of the current avatar, if any.
        avatar_url -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Image posts.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Public URL of the post image.
        image_url -> Varchar,
        /// Optional caption (max 2200 characters).
        caption -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cheer membership rows, one per (post, user).
    likes (post_id, user_id) {
        /// Cheered post.
        post_id -> Uuid,
        /// Cheering user.
        user_id -> Uuid,
        /// When the cheer was placed.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Feedback entries, threaded one level deep via `parent_id`.
    comments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Post the entry belongs to.
        post_id -> Uuid,
        /// Authoring user.
        user_id -> Uuid,
        /// Body text (max 1000 characters).
        content -> Text,
        /// Parent entry when this is a reply; replies cascade on delete.
        parent_id -> Nullable<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follow membership rows, one per (follower, following).
    follows (follower_id, following_id) {
        /// The user doing the following.
        follower_id -> Uuid,
        /// The user being followed.
        following_id -> Uuid,
        /// When the follow was placed.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Aggregate view: per-post cheer and feedback counts.
    post_stats (post_id) {
        /// The counted post.
        post_id -> Uuid,
        /// Cheers on the post.
        likes_count -> Int8,
        /// Feedback entries on the post, replies included.
        comments_count -> Int8,
    }
}

diesel::table! {
    /// Aggregate view: per-user post and follow counts.
    user_stats (user_id) {
        /// The counted user.
        user_id -> Uuid,
        /// Posts the user owns.
        posts_count -> Int8,
        /// Users following this user.
        followers_count -> Int8,
        /// Users this user follows.
        following_count -> Int8,
    }
}

diesel::joinable!(posts -> users (user_id));
diesel::joinable!(likes -> posts (post_id));
diesel::joinable!(likes -> users (user_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (user_id));
diesel::joinable!(post_stats -> posts (post_id));
diesel::joinable!(user_stats -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    posts,
    likes,
    comments,
    follows,
    post_stats,
    user_stats,
);
