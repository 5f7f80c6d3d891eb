//! # reviewhub-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! transactional review store used by the service layer. An in-memory
//! store with the same transactional contract backs tests and local runs.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, IsolationLevel};
pub use memory::MemoryStore;
pub use postgres::PgReviewStore;
pub use migration::SchemaStatus;
pub use store::{ReviewStore, ReviewTransaction};
