//! Filesystem-backed `BlobStore` implementation.
//!
//! Blobs live under `{root}/{owner_uuid}/{random_uuid}.{ext}` and are served
//! at `{base_url}/uploads/{owner_uuid}/{file}`. Deletion accepts the public
//! URL, reverses that mapping, and refuses anything that does not point into
//! this store.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BlobStore, BlobStoreError, StoredBlob};
use crate::domain::UserId;

/// Blob store writing to a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, serving blobs under `base_url`.
    ///
    /// A trailing slash on `base_url` is stripped so URL assembly is uniform.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    fn upload_prefix(&self) -> String {
        format!("{}/uploads/", self.base_url)
    }

    /// Parse a public URL back into the `{owner}/{file}` relative path.
    fn relative_path(&self, url: &str) -> Result<(Uuid, String), BlobStoreError> {
        let rel = url
            .strip_prefix(&self.upload_prefix())
            .ok_or_else(|| BlobStoreError::foreign_url(url))?;
        let (owner, file) = rel
            .split_once('/')
            .ok_or_else(|| BlobStoreError::foreign_url(url))?;
        let owner: Uuid = owner
            .parse()
            .map_err(|_| BlobStoreError::foreign_url(url))?;
        if file.is_empty() || file.contains('/') || file.contains("..") {
            return Err(BlobStoreError::foreign_url(url));
        }
        Ok((owner, file.to_owned()))
    }
}

fn map_io_error(error: std::io::Error) -> BlobStoreError {
    BlobStoreError::io(error.to_string())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        owner: &UserId,
        extension: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let owner_dir = self.root.join(owner.as_uuid().to_string());
        tokio::fs::create_dir_all(&owner_dir)
            .await
            .map_err(map_io_error)?;

        let file = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(owner_dir.join(&file), bytes)
            .await
            .map_err(map_io_error)?;

        let path = format!("{owner}/{file}", owner = owner.as_uuid());
        let url = format!("{prefix}{path}", prefix = self.upload_prefix());
        Ok(StoredBlob { path, url })
    }

    async fn delete_by_url(&self, url: &str) -> Result<(), BlobStoreError> {
        let (owner, file) = self.relative_path(url)?;
        let full = self.root.join(owner.to_string()).join(file);

        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(%url, "blob already absent on delete");
                Ok(())
            }
            Err(error) => Err(map_io_error(error)),
        }
    }
}
