//! # Chirper Library
//!
//! A small social-feed web service. Users sign in through an authenticating
//! proxy, claim a unique handle, post short messages, browse the global feed
//! and per-user timelines, and get an email when someone mentions them.
//!
//! ## Configuration
//!
//! - `PORT`: Server port (defaults to 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (in-memory stores when unset)
//! - `IDENTITY_HEADER`, `LOGIN_URL`, `LOGOUT_URL`: Authenticating proxy integration
//! - `MAIL_RELAY_URL`, `MAIL_RELAY_TOKEN`: Mail relay for mention notifications
//! - `FEED_LIMIT`, `STATIC_DIR`: Home feed size and static file directory
//!
//! ## API Endpoints
//!
//! - `GET /`: Recent tweets from everyone
//! - `GET|POST /login`: Claim a username
//! - `POST /tweet`: Post a tweet (JSON `{"message": "..."}`)
//! - `GET /logout`: Sign out
//! - `GET /<username>`, `GET /profile/<username>`: A user's timeline
//! - `GET /public/*`: Static files
//! - `GET /health`: Returns service health status

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod humanize;
pub mod identity;
pub mod mail;
pub mod mentions;
pub mod models;
pub mod routes;
pub mod session;
pub mod store;
pub mod text;
pub mod views;

// Re-export commonly used types and functions
pub use config::{get_server_port, AppConfig};
pub use error::{AppError, AppResult};
pub use identity::{IdentityProvider, ProxyIdentity};
pub use mail::{MailMessage, Mailer};
pub use models::{Profile, Tweet};
pub use routes::{build_router, AppState};
pub use store::{MemoryStore, ProfileStore, StoreError, TweetStore};
