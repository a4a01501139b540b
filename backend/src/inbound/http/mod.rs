//! HTTP inbound adapter exposing REST endpoints.

use serde::Serialize;

pub mod auth;
pub mod cheer;
pub mod error;
pub mod feedback;
pub mod follow;
pub mod health;
pub mod posts;
pub mod profile;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use crate::domain::ApiResult;

/// Uniform success envelope: every 2xx body is `{"data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    /// Wrap a response payload in the envelope.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
