//! Profile read model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::User;

/// A user profile merged with aggregate counts and viewer context.
///
/// Counts come from the `user_stats` aggregate view; a missing stats row
/// zeroes all three rather than failing the profile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The profiled user.
    #[serde(flatten)]
    pub user: User,
    /// Number of posts the user owns.
    pub posts_count: i64,
    /// Number of users following this user.
    pub followers_count: i64,
    /// Number of users this user follows.
    pub following_count: i64,
    /// Whether the requesting viewer follows this user. Always `false` for
    /// anonymous viewers and for a user's own profile.
    pub is_following: bool,
    /// Whether the requesting viewer is this user.
    pub is_own_profile: bool,
}
