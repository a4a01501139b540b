//! Blob storage adapters.

mod fs_blob_store;

pub use fs_blob_store::FsBlobStore;
