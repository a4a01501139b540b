//! Outbound adapters: PostgreSQL persistence and blob storage.

pub mod persistence;
pub mod storage;
