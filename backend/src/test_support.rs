//! In-memory port implementations shared by the service test modules.
//!
//! One [`TestWorld`] owns a single shared state so that cross-port reads
//! (author joins, aggregate counts) observe the same rows the other
//! repositories wrote. Generated timestamps are strictly increasing to keep
//! newest-first ordering assertions deterministic. Each repository carries
//! fail switches to drive the degradation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pagination::Cursor;

use crate::domain::ports::{
    BlobStore, BlobStoreError, CheerPersistenceError, CheerRepository, FeedbackPersistenceError,
    FeedbackRepository, FollowPersistenceError, FollowRepository, InsertOutcome, NewFeedback,
    NewPost, PostPersistenceError, PostRepository, StatsPersistenceError, StoredBlob,
    UserPersistenceError, UserRepository, UserStatsQuery, UserStatsRecord,
};
use crate::domain::{
    DisplayName, Feedback, FeedbackContent, FeedbackId, FeedbackWithAuthor, FeedEntry, Post,
    PostId, Subject, User, UserId,
};

/// Rows shared by every in-memory repository of one world.
#[derive(Default)]
struct WorldState {
    users: Vec<User>,
    posts: Vec<Post>,
    cheers: Vec<(PostId, UserId)>,
    follows: Vec<(UserId, UserId)>,
    feedback: Vec<Feedback>,
    seq: i64,
}

impl WorldState {
    /// Strictly increasing timestamp for the next created row.
    fn next_ts(&mut self) -> DateTime<Utc> {
        self.seq += 1;
        DateTime::UNIX_EPOCH + Duration::seconds(1_700_000_000 + self.seq)
    }

    fn user(&self, id: &UserId) -> User {
        self.users
            .iter()
            .find(|user| user.id == *id)
            .cloned()
            .expect("referenced user exists in the world")
    }

    fn feed_entry(&self, post: &Post) -> FeedEntry {
        let likes_count = self
            .cheers
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .count() as i64;
        let comments_count = self
            .feedback
            .iter()
            .filter(|entry| entry.post_id == post.id)
            .count() as i64;
        FeedEntry {
            post: post.clone(),
            author: self.user(&post.user_id),
            likes_count,
            comments_count,
            is_cheered: false,
        }
    }
}

type SharedState = Arc<Mutex<WorldState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, WorldState> {
    state.lock().expect("world state lock")
}

/// Posts newest-first by `(created_at, id)`, optionally past a cursor.
fn window<'a, I>(rows: I, cursor: Option<Cursor>, fetch: i64) -> Vec<Post>
where
    I: Iterator<Item = &'a Post>,
{
    let mut rows: Vec<Post> = rows
        .filter(|post| {
            cursor.is_none_or(|cursor| cursor.admits(post.created_at, *post.id.as_uuid()))
        })
        .cloned()
        .collect();
    rows.sort_by(|a, b| (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid())));
    rows.truncate(usize::try_from(fetch).unwrap_or_default());
    rows
}

/// In-memory [`UserRepository`] with a connection-failure switch.
pub struct MemoryUserRepository {
    state: SharedState,
    fail_connection: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WorldState::default())),
            fail_connection: AtomicBool::new(false),
        }
    }

    fn with_state(state: SharedState) -> Self {
        Self {
            state,
            fail_connection: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a connection error.
    pub fn fail_with_connection(&self) {
        self.fail_connection.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), UserPersistenceError> {
        if self.fail_connection.load(Ordering::SeqCst) {
            return Err(UserPersistenceError::Connection {
                message: "simulated connection failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.state)
            .users
            .iter()
            .find(|user| user.id == *id)
            .cloned())
    }

    async fn find_by_subject(
        &self,
        subject: &Subject,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.state)
            .users
            .iter()
            .find(|user| user.subject == *subject)
            .cloned())
    }

    async fn upsert_by_subject(
        &self,
        subject: &Subject,
        display_name: &DisplayName,
    ) -> Result<User, UserPersistenceError> {
        self.check()?;
        let mut state = lock(&self.state);
        if let Some(user) = state
            .users
            .iter_mut()
            .find(|user| user.subject == *subject)
        {
            user.display_name = display_name.clone();
            return Ok(user.clone());
        }
        let created_at = state.next_ts();
        let user = User {
            id: UserId::random(),
            subject: subject.clone(),
            display_name: display_name.clone(),
            avatar_url: None,
            created_at,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: &DisplayName,
    ) -> Result<User, UserPersistenceError> {
        self.check()?;
        let mut state = lock(&self.state);
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| UserPersistenceError::Query {
                message: "no such user".into(),
            })?;
        user.display_name = display_name.clone();
        Ok(user.clone())
    }

    async fn set_avatar_url(
        &self,
        id: &UserId,
        avatar_url: Option<&str>,
    ) -> Result<User, UserPersistenceError> {
        self.check()?;
        let mut state = lock(&self.state);
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| UserPersistenceError::Query {
                message: "no such user".into(),
            })?;
        user.avatar_url = avatar_url.map(str::to_owned);
        Ok(user.clone())
    }
}

/// In-memory [`PostRepository`] over the shared world state.
pub struct MemoryPostRepository {
    state: SharedState,
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, PostPersistenceError> {
        let mut state = lock(&self.state);
        let ts = state.next_ts();
        let post = Post {
            id: PostId::random(),
            user_id: new_post.user_id,
            image_url: new_post.image_url,
            caption: new_post.caption,
            created_at: ts,
            updated_at: ts,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        Ok(lock(&self.state)
            .posts
            .iter()
            .find(|post| post.id == *id)
            .cloned())
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostPersistenceError> {
        let mut state = lock(&self.state);
        state.posts.retain(|post| post.id != *id);
        state.cheers.retain(|(post_id, _)| post_id != id);
        state.feedback.retain(|entry| entry.post_id != *id);
        Ok(())
    }

    async fn feed_window(
        &self,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<FeedEntry>, PostPersistenceError> {
        let state = lock(&self.state);
        let posts = window(state.posts.iter(), cursor, fetch);
        Ok(posts.iter().map(|post| state.feed_entry(post)).collect())
    }

    async fn find_with_stats(
        &self,
        id: &PostId,
    ) -> Result<Option<FeedEntry>, PostPersistenceError> {
        let state = lock(&self.state);
        Ok(state
            .posts
            .iter()
            .find(|post| post.id == *id)
            .map(|post| state.feed_entry(post)))
    }

    async fn user_posts_window(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Post>, PostPersistenceError> {
        let state = lock(&self.state);
        Ok(window(
            state.posts.iter().filter(|post| post.user_id == *user_id),
            cursor,
            fetch,
        ))
    }
}

/// In-memory [`CheerRepository`] with toggle-race and failure switches.
pub struct MemoryCheerRepository {
    state: SharedState,
    fail_query: AtomicBool,
    absent_on_next_exists: AtomicBool,
}

impl MemoryCheerRepository {
    /// Insert a membership row behind the service's back, as a concurrent
    /// toggle would.
    pub fn sneak_insert(&self, post_id: &PostId, user_id: &UserId) {
        lock(&self.state).cheers.push((*post_id, *user_id));
    }

    /// Make the next `exists` call report absent regardless of state.
    pub fn force_absent_on_next_exists(&self) {
        self.absent_on_next_exists.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a query error.
    pub fn fail_with_query(&self) {
        self.fail_query.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CheerPersistenceError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(CheerPersistenceError::Query {
                message: "simulated query failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CheerRepository for MemoryCheerRepository {
    async fn exists(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<bool, CheerPersistenceError> {
        self.check()?;
        if self.absent_on_next_exists.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(lock(&self.state)
            .cheers
            .iter()
            .any(|row| *row == (*post_id, *user_id)))
    }

    async fn insert(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<InsertOutcome, CheerPersistenceError> {
        self.check()?;
        let mut state = lock(&self.state);
        if state.cheers.iter().any(|row| *row == (*post_id, *user_id)) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        state.cheers.push((*post_id, *user_id));
        Ok(InsertOutcome::Inserted)
    }

    async fn remove(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), CheerPersistenceError> {
        self.check()?;
        lock(&self.state)
            .cheers
            .retain(|row| *row != (*post_id, *user_id));
        Ok(())
    }

    async fn count(&self, post_id: &PostId) -> Result<i64, CheerPersistenceError> {
        self.check()?;
        Ok(lock(&self.state)
            .cheers
            .iter()
            .filter(|(candidate, _)| candidate == post_id)
            .count() as i64)
    }

    async fn cheered_subset(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<Vec<PostId>, CheerPersistenceError> {
        self.check()?;
        let state = lock(&self.state);
        Ok(post_ids
            .iter()
            .filter(|post_id| {
                state
                    .cheers
                    .iter()
                    .any(|row| *row == (**post_id, *user_id))
            })
            .copied()
            .collect())
    }
}

/// In-memory [`FollowRepository`] with a failure switch.
pub struct MemoryFollowRepository {
    state: SharedState,
    fail_query: AtomicBool,
}

impl MemoryFollowRepository {
    /// Insert a relationship row behind the service's back.
    pub fn sneak_insert(&self, follower: &UserId, following: &UserId) {
        lock(&self.state).follows.push((*follower, *following));
    }

    /// Make every subsequent call fail with a query error.
    pub fn fail_with_query(&self) {
        self.fail_query.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), FollowPersistenceError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(FollowPersistenceError::Query {
                message: "simulated query failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for MemoryFollowRepository {
    async fn exists(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        self.check()?;
        Ok(lock(&self.state)
            .follows
            .iter()
            .any(|row| *row == (*follower, *following)))
    }

    async fn insert(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<InsertOutcome, FollowPersistenceError> {
        self.check()?;
        let mut state = lock(&self.state);
        if state
            .follows
            .iter()
            .any(|row| *row == (*follower, *following))
        {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        state.follows.push((*follower, *following));
        Ok(InsertOutcome::Inserted)
    }

    async fn remove(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<(), FollowPersistenceError> {
        self.check()?;
        lock(&self.state)
            .follows
            .retain(|row| *row != (*follower, *following));
        Ok(())
    }
}

/// In-memory [`FeedbackRepository`] with a replies-only failure switch.
pub struct MemoryFeedbackRepository {
    state: SharedState,
    fail_replies: AtomicBool,
}

impl MemoryFeedbackRepository {
    /// Make every subsequent `replies_for` call fail with a query error.
    pub fn fail_replies(&self) {
        self.fail_replies.store(true, Ordering::SeqCst);
    }

    fn joined(state: &WorldState, entry: &Feedback) -> FeedbackWithAuthor {
        FeedbackWithAuthor {
            feedback: entry.clone(),
            author: state.user(&entry.user_id),
        }
    }
}

#[async_trait]
impl FeedbackRepository for MemoryFeedbackRepository {
    async fn insert(
        &self,
        new_feedback: NewFeedback,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError> {
        let mut state = lock(&self.state);
        let ts = state.next_ts();
        let entry = Feedback {
            id: FeedbackId::random(),
            post_id: new_feedback.post_id,
            user_id: new_feedback.user_id,
            content: new_feedback.content,
            parent_id: new_feedback.parent_id,
            created_at: ts,
            updated_at: ts,
        };
        state.feedback.push(entry.clone());
        Ok(Self::joined(&state, &entry))
    }

    async fn find_by_id(
        &self,
        id: &FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackPersistenceError> {
        Ok(lock(&self.state)
            .feedback
            .iter()
            .find(|entry| entry.id == *id)
            .cloned())
    }

    async fn top_level_for_post(
        &self,
        post_id: &PostId,
        limit: i64,
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError> {
        let state = lock(&self.state);
        let mut rows: Vec<&Feedback> = state
            .feedback
            .iter()
            .filter(|entry| entry.post_id == *post_id && entry.parent_id.is_none())
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid())));
        rows.truncate(usize::try_from(limit).unwrap_or_default());
        Ok(rows
            .into_iter()
            .map(|entry| Self::joined(&state, entry))
            .collect())
    }

    async fn replies_for(
        &self,
        parent_ids: &[FeedbackId],
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError> {
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(FeedbackPersistenceError::Query {
                message: "simulated query failure".into(),
            });
        }
        let state = lock(&self.state);
        let mut rows: Vec<&Feedback> = state
            .feedback
            .iter()
            .filter(|entry| {
                entry
                    .parent_id
                    .is_some_and(|parent| parent_ids.contains(&parent))
            })
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        Ok(rows
            .into_iter()
            .map(|entry| Self::joined(&state, entry))
            .collect())
    }

    async fn update_content(
        &self,
        id: &FeedbackId,
        content: &FeedbackContent,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError> {
        let mut state = lock(&self.state);
        let ts = state.next_ts();
        let entry = state
            .feedback
            .iter_mut()
            .find(|entry| entry.id == *id)
            .ok_or_else(|| FeedbackPersistenceError::Query {
                message: "no such feedback".into(),
            })?;
        entry.content = content.clone();
        entry.updated_at = ts;
        let entry = entry.clone();
        Ok(Self::joined(&state, &entry))
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackPersistenceError> {
        let mut state = lock(&self.state);
        state
            .feedback
            .retain(|entry| entry.id != *id && entry.parent_id != Some(*id));
        Ok(())
    }
}

/// In-memory [`UserStatsQuery`] computing counts from the shared rows.
pub struct MemoryStatsQuery {
    state: SharedState,
    fail_query: AtomicBool,
}

impl MemoryStatsQuery {
    /// Make every subsequent call fail with a query error.
    pub fn fail_with_query(&self) {
        self.fail_query.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStatsQuery for MemoryStatsQuery {
    async fn user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStatsRecord>, StatsPersistenceError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(StatsPersistenceError::Query {
                message: "simulated query failure".into(),
            });
        }
        let state = lock(&self.state);
        Ok(Some(UserStatsRecord {
            posts_count: state
                .posts
                .iter()
                .filter(|post| post.user_id == *user_id)
                .count() as i64,
            followers_count: state
                .follows
                .iter()
                .filter(|(_, following)| following == user_id)
                .count() as i64,
            following_count: state
                .follows
                .iter()
                .filter(|(follower, _)| follower == user_id)
                .count() as i64,
        }))
    }
}

/// In-memory [`BlobStore`] keyed by public URL.
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Whether a blob is stored under `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.blobs.lock().expect("blob lock").contains_key(url)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        owner: &UserId,
        extension: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let file = format!("{owner}/{name}.{extension}", owner = owner.as_uuid(), name = uuid::Uuid::new_v4());
        let url = format!("https://blobs.test/uploads/{file}");
        self.blobs
            .lock()
            .expect("blob lock")
            .insert(url.clone(), bytes);
        Ok(StoredBlob { path: file, url })
    }

    async fn delete_by_url(&self, url: &str) -> Result<(), BlobStoreError> {
        self.blobs.lock().expect("blob lock").remove(url);
        Ok(())
    }
}

/// One shared world of in-memory repositories plus seeding helpers.
pub struct TestWorld {
    pub users: Arc<MemoryUserRepository>,
    pub posts: Arc<MemoryPostRepository>,
    pub cheers: Arc<MemoryCheerRepository>,
    pub follows: Arc<MemoryFollowRepository>,
    pub feedback: Arc<MemoryFeedbackRepository>,
    pub stats: Arc<MemoryStatsQuery>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestWorld {
    pub fn new() -> Self {
        let state: SharedState = Arc::new(Mutex::new(WorldState::default()));
        Self {
            users: Arc::new(MemoryUserRepository::with_state(state.clone())),
            posts: Arc::new(MemoryPostRepository {
                state: state.clone(),
            }),
            cheers: Arc::new(MemoryCheerRepository {
                state: state.clone(),
                fail_query: AtomicBool::new(false),
                absent_on_next_exists: AtomicBool::new(false),
            }),
            follows: Arc::new(MemoryFollowRepository {
                state: state.clone(),
                fail_query: AtomicBool::new(false),
            }),
            feedback: Arc::new(MemoryFeedbackRepository {
                state: state.clone(),
                fail_replies: AtomicBool::new(false),
            }),
            stats: Arc::new(MemoryStatsQuery {
                state: state.clone(),
                fail_query: AtomicBool::new(false),
            }),
            blobs: Arc::new(MemoryBlobStore {
                blobs: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Seed a user row.
    pub async fn add_user(&self, subject: &str, name: &str) -> User {
        let subject = Subject::new(subject).expect("subject");
        let name = DisplayName::new(name).expect("display name");
        self.users
            .upsert_by_subject(&subject, &name)
            .await
            .expect("seed user")
    }

    /// Seed a post row owned by `author`.
    pub async fn add_post(&self, author: &User, image_url: &str) -> Post {
        self.posts
            .insert(NewPost {
                user_id: author.id,
                image_url: crate::domain::ImageUrl::new(image_url).expect("image url"),
                caption: None,
            })
            .await
            .expect("seed post")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
