//! Database module for storing and retrieving profiles and tweets.
//!
//! This module provides the PostgreSQL backend for the [`ProfileStore`] and
//! [`TweetStore`] traits. It manages the `profiles` and `tweets` tables; the
//! username uniqueness constraint on `profiles` is what serializes concurrent
//! registrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::models::{Profile, Tweet};
use crate::store::{ProfileStore, StoreError, TweetStore};
use crate::text::mask_secret;

/// Connects to the PostgreSQL database at `database_url`.
///
/// # Returns
///
/// - `Ok(PgPool)`: A connection pool to the database
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the connection fails
pub async fn connect(database_url: &str) -> Result<PgPool, Box<dyn std::error::Error + Send + Sync>> {
    info!("Connecting to PostgreSQL database");
    debug!("Database URL (masked): {}", mask_secret(database_url));

    let pool = PgPool::connect(database_url).await?;
    info!("Successfully connected to PostgreSQL database");

    Ok(pool)
}

/// Creates the `profiles` and `tweets` tables if they do not exist yet.
///
/// # Parameters
///
/// - `pool`: A reference to the PostgreSQL connection pool
///
/// # Returns
///
/// - `Ok(())`: If the schema is in place
/// - `Err(sqlx::Error)`: If any statement fails
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Ensuring profiles and tweets tables exist");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            email TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tweets (
            id BIGSERIAL PRIMARY KEY,
            author_email TEXT NOT NULL REFERENCES profiles (email),
            username TEXT NOT NULL,
            message TEXT NOT NULL,
            posted_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS tweets_author_posted_at
        ON tweets (author_email, posted_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS tweets_posted_at
        ON tweets (posted_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema is ready");
    Ok(())
}

/// PostgreSQL-backed profile and tweet store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresStore { pool }
    }
}

fn profile_from_row(row: &PgRow) -> Profile {
    Profile {
        email: row.get("email"),
        username: row.get("username"),
    }
}

fn tweet_from_row(row: &PgRow) -> Tweet {
    let time: DateTime<Utc> = row.get("posted_at");
    Tweet {
        username: row.get("username"),
        message: row.get("message"),
        time,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT email, username
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT email, username
            FROM profiles
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn create(&self, profile: &Profile) -> Result<(), StoreError> {
        info!("Storing profile @{} in database", profile.username);

        let result = sqlx::query(
            r#"
            INSERT INTO profiles (email, username, created_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.username)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Successfully stored profile @{}", profile.username);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    "Profile insert for @{} hit a uniqueness constraint",
                    profile.username
                );
                Err(StoreError::Duplicate(profile.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TweetStore for PostgresStore {
    async fn recent(&self, limit: usize) -> Result<Vec<Tweet>, StoreError> {
        debug!("Querying database for {} most recent tweets", limit);

        let rows = sqlx::query(
            r#"
            SELECT username, message, posted_at
            FROM tweets
            ORDER BY posted_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tweet_from_row).collect())
    }

    async fn by_author(&self, email: &str) -> Result<Vec<Tweet>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT username, message, posted_at
            FROM tweets
            WHERE author_email = $1
            ORDER BY posted_at DESC, id DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tweet_from_row).collect())
    }

    async fn append(&self, email: &str, tweet: &Tweet) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tweets (author_email, username, message, posted_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(email)
        .bind(&tweet.username)
        .bind(&tweet.message)
        .bind(tweet.time)
        .execute(&self.pool)
        .await?;

        info!("Stored tweet by @{} in database", tweet.username);
        Ok(())
    }
}
