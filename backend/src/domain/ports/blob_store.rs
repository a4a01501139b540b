//! Port abstraction for image blob storage.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures raised by blob-store adapters.
    pub enum BlobStoreError {
        /// Reading or writing the underlying store failed.
        Io { message: String } => "blob store i/o failed: {message}",
        /// A retrieval URL did not point into this store.
        ForeignUrl { url: String } => "url does not belong to this blob store: {url}",
    }
}

/// Maximum size of a generic upload in bytes (10 MiB).
pub const UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for image uploads, with their file extensions.
pub const ALLOWED_IMAGE_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for an accepted image content type, `None` otherwise.
#[must_use]
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// A stored blob and where to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Store-internal path, `{owner}/{file}`.
    pub path: String,
    /// Public retrieval URL.
    pub url: String,
}

/// Storage port for uploaded images.
///
/// Blobs are stored under a path keyed by the uploading user. Deletion takes
/// the public URL because that is all the database rows retain.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under the owner's prefix with the given extension and
    /// return the stored path and public URL.
    async fn put(
        &self,
        owner: &UserId,
        extension: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, BlobStoreError>;

    /// Delete the blob a previously returned URL points at. Deleting an
    /// already-absent blob is not an error.
    async fn delete_by_url(&self, url: &str) -> Result<(), BlobStoreError>;
}
