//! Builders wiring persistence and storage adapters into the HTTP state.

use std::sync::Arc;

use crate::domain::{
    CheerService, FeedService, FeedbackService, FollowService, IdentityService, ProfileService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselCheerRepository, DieselFeedbackRepository, DieselFollowRepository,
    DieselPostRepository, DieselUserRepository, DieselUserStatsQuery,
};
use crate::outbound::storage::FsBlobStore;

use super::ServerConfig;

/// Build the HTTP state from database-backed adapters.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let posts = Arc::new(DieselPostRepository::new(config.db_pool.clone()));
    let cheers = Arc::new(DieselCheerRepository::new(config.db_pool.clone()));
    let follows = Arc::new(DieselFollowRepository::new(config.db_pool.clone()));
    let feedback = Arc::new(DieselFeedbackRepository::new(config.db_pool.clone()));
    let stats = Arc::new(DieselUserStatsQuery::new(config.db_pool.clone()));
    let blobs = Arc::new(FsBlobStore::new(
        config.blob_root.clone(),
        config.public_base_url.clone(),
    ));

    HttpState {
        identity: IdentityService::new(users.clone()),
        feed: FeedService::new(posts.clone(), cheers.clone(), blobs.clone()),
        cheers: CheerService::new(posts.clone(), cheers),
        feedback: FeedbackService::new(posts, feedback),
        follows: FollowService::new(users.clone(), follows.clone()),
        profiles: ProfileService::new(users, follows, stats, blobs),
    }
}
