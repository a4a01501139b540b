//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use crate::domain::{
    CheerService, Error, FeedService, FeedbackService, FollowService, IdentityService,
    ProfileService, User,
};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
///
/// Services are cheap handles over `Arc`ed ports; cloning the bundle per
/// worker is fine.
#[derive(Clone)]
pub struct HttpState {
    pub identity: IdentityService,
    pub feed: FeedService,
    pub cheers: CheerService,
    pub feedback: FeedbackService,
    pub follows: FollowService,
    pub profiles: ProfileService,
}

impl HttpState {
    /// Resolve the session to its user row, requiring authentication.
    ///
    /// # Errors
    /// `unauthorized` without a session; `not_found` when the session's
    /// subject no longer maps to a user row.
    pub async fn require_actor(&self, session: &SessionContext) -> Result<User, Error> {
        let subject = session.require_subject()?;
        self.identity.resolve_required(&subject).await
    }

    /// Resolve the session to its user row if one is present.
    ///
    /// Anonymous sessions and subjects without a row both read as `None`;
    /// public endpoints treat them the same way.
    ///
    /// # Errors
    /// Propagates repository failures from the identity lookup.
    pub async fn viewer(&self, session: &SessionContext) -> Result<Option<User>, Error> {
        match session.subject()? {
            Some(subject) => self.identity.resolve(&subject).await,
            None => Ok(None),
        }
    }
}
