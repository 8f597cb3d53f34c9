//! Persistence interfaces for profiles and tweets.
//!
//! Handlers only see the [`ProfileStore`] and [`TweetStore`] traits. Two
//! backends implement them: PostgreSQL (see [`crate::db`]) and an in-memory
//! store used when no database is configured and in tests.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Profile, Tweet};

pub use memory::MemoryStore;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint (email or username) rejected the write.
    #[error("{0} is already taken")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed profile records: primary key email, unique secondary key username.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, StoreError>;

    /// Inserts a new profile.
    ///
    /// Fails with [`StoreError::Duplicate`] when the email or username is
    /// already claimed, including by a concurrent writer that won the race.
    async fn create(&self, profile: &Profile) -> Result<(), StoreError>;
}

/// Append-only tweet records keyed by the author's email.
#[async_trait]
pub trait TweetStore: Send + Sync {
    /// The `limit` most recent tweets across all authors, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Tweet>, StoreError>;

    /// Every tweet by the given author, newest first.
    async fn by_author(&self, email: &str) -> Result<Vec<Tweet>, StoreError>;

    async fn append(&self, email: &str, tweet: &Tweet) -> Result<(), StoreError>;
}
