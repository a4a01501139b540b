//! Opaque cursor and page envelope primitives for keyset pagination.
//!
//! Endpoints paginate newest-first over `(created_at, id)`. The cursor is a
//! base64url-encoded JSON document carrying both components so that rows
//! created within the same timestamp resolution are neither skipped nor
//! repeated across pages: the identifier acts as a deterministic tie-break.
//!
//! The fetch protocol is the usual limit-plus-one probe: callers request one
//! row more than the page size and hand the surplus to [`Page::from_rows`],
//! which truncates, sets `has_more`, and derives `next_cursor` from the last
//! visible row.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failures raised while decoding an opaque cursor supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor is not valid base64url.
    #[error("cursor is not valid base64: {message}")]
    Encoding { message: String },
    /// The decoded payload is not the expected JSON document.
    #[error("cursor payload is malformed: {message}")]
    Payload { message: String },
}

/// Keyset cursor over `(created_at, id)`, ordered newest-first.
///
/// Clients treat the encoded form as opaque; the server round-trips it via
/// [`Cursor::encode`] and [`Cursor::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Creation timestamp of the last row on the previous page.
    ts: DateTime<Utc>,
    /// Identifier of the last row on the previous page.
    id: Uuid,
}

impl Cursor {
    /// Build a cursor from the key of the last returned row.
    #[must_use]
    pub fn new(ts: DateTime<Utc>, id: Uuid) -> Self {
        Self { ts, id }
    }

    /// Creation-timestamp component.
    #[must_use]
    pub fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    /// Identifier component.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Encode the cursor into its opaque wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serialising a two-field struct of well-formed types cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode an opaque wire cursor.
    ///
    /// # Errors
    /// Returns [`CursorError`] when the input is not base64url or does not
    /// decode to the expected payload.
    pub fn decode(raw: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.as_bytes())
            .map_err(|error| CursorError::Encoding {
                message: error.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|error| CursorError::Payload {
            message: error.to_string(),
        })
    }

    /// Whether a row keyed by `(ts, id)` lies strictly after this cursor in
    /// newest-first order, i.e. the row belongs on a later page.
    #[must_use]
    pub fn admits(&self, ts: DateTime<Utc>, id: Uuid) -> bool {
        (ts, id) < (self.ts, self.id)
    }
}

/// One page of results plus continuation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page, newest-first.
    pub items: Vec<T>,
    /// Cursor for the following page, absent when the result set is
    /// exhausted.
    pub next_cursor: Option<String>,
    /// Whether at least one more row exists beyond this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Assemble a page from a limit-plus-one fetch.
    ///
    /// `rows` must have been fetched with `limit + 1` requested rows in
    /// newest-first order. `key` extracts the `(created_at, id)` pair used to
    /// mint the continuation cursor from the final visible row.
    #[must_use]
    pub fn from_rows<F>(mut rows: Vec<T>, limit: usize, key: F) -> Self
    where
        F: Fn(&T) -> (DateTime<Utc>, Uuid),
    {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|row| {
                let (ts, id) = key(row);
                Cursor::new(ts, id).encode()
            })
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
            has_more,
        }
    }

    /// An empty page with no continuation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}
