//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie stores the external auth subject the user signed in with;
//! handlers resolve it to an internal user row through the identity service
//! and pass the resolved actor into the domain explicitly.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Subject};

pub(crate) const SUBJECT_KEY: &str = "subject";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated subject in the session cookie.
    pub fn persist_subject(&self, subject: &Subject) -> Result<(), Error> {
        self.0
            .insert(SUBJECT_KEY, subject.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current subject from the session, if present.
    ///
    /// A cookie value that fails subject validation is treated as absent;
    /// the tampered cookie is logged rather than surfaced as a 500.
    pub fn subject(&self) -> Result<Option<Subject>, Error> {
        let raw = self
            .0
            .get::<String>(SUBJECT_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(raw) => match Subject::new(raw) {
                Ok(subject) => Ok(Some(subject)),
                Err(error) => {
                    tracing::warn!("invalid subject in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated subject or return `401 Unauthorized`.
    pub fn require_subject(&self) -> Result<Subject, Error> {
        self.subject()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop all session state.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
