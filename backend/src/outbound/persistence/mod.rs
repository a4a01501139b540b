//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! - Adapters only translate between Diesel rows and domain types; no
//!   business logic lives here.
//! - Row structs (`models`) and table definitions (`schema`) are internal
//!   to this module.
//! - Database errors are mapped to the port error types, splitting
//!   connection failures from query failures.

mod diesel_cheer_repository;
mod diesel_feedback_repository;
mod diesel_follow_repository;
mod diesel_post_repository;
mod diesel_stats_query;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_cheer_repository::DieselCheerRepository;
pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_stats_query::DieselUserStatsQuery;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
