//! Storage traits and backends for federated user records.
//!
//! This module defines the [`UserStorage`] interface used by the login flow
//! to look up and create users, plus the bundled in-memory backend.
//!
//! # Implementations
//!
//! - [`MemoryUserStorage`] - process-local map, suitable for tests and
//!   single-instance deployments
//!
//! Database-backed implementations live in separate crates and only need to
//! implement [`UserStorage`].

pub mod memory;
pub mod user;

pub use memory::MemoryUserStorage;
pub use user::{User, UserBuilder, UserStorage};
