//! Router construction.
//!
//! The router is built once at startup from an [`AppState`] holding the
//! service's collaborators, and handed to `axum::serve`.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::db::{self, PostgresStore};
use crate::handlers::{
    handle_favicon, handle_health, handle_home, handle_login, handle_logout, handle_profile,
    handle_tweet,
};
use crate::identity::{IdentityProvider, ProxyIdentity};
use crate::mail::{HttpMailer, LogMailer, Mailer};
use crate::store::{MemoryStore, ProfileStore, TweetStore};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub tweets: Arc<dyn TweetStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
    /// How many tweets the home feed shows.
    pub feed_limit: usize,
}

impl AppState {
    /// Wires up the collaborators described by `config`.
    ///
    /// Connects to PostgreSQL and prepares its schema when `DATABASE_URL` is
    /// set, otherwise falls back to in-memory stores. Mail goes to the relay
    /// when one is configured and is logged otherwise.
    pub async fn from_config(
        config: &AppConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let (profiles, tweets): (Arc<dyn ProfileStore>, Arc<dyn TweetStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = db::connect(url).await?;
                    db::ensure_schema(&pool).await?;
                    let store = Arc::new(PostgresStore::new(pool));
                    (
                        store.clone() as Arc<dyn ProfileStore>,
                        store as Arc<dyn TweetStore>,
                    )
                }
                None => {
                    let store = Arc::new(MemoryStore::new());
                    (
                        store.clone() as Arc<dyn ProfileStore>,
                        store as Arc<dyn TweetStore>,
                    )
                }
            };

        let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
            Some(url) => Arc::new(HttpMailer::new(url.as_str(), config.mail_relay_token.clone())),
            None => {
                info!("Using log-only mailer");
                Arc::new(LogMailer)
            }
        };

        let identity = Arc::new(ProxyIdentity::new(
            config.identity_header.as_str(),
            config.login_url.as_str(),
            config.logout_url.as_str(),
        ));

        Ok(AppState {
            profiles,
            tweets,
            identity,
            mailer,
            feed_limit: config.feed_limit,
        })
    }
}

/// Builds the application router.
///
/// # Routes
///
/// - `GET /`: Home feed
/// - `GET|POST /login`: Registration
/// - `POST /tweet`: Post a tweet
/// - `GET /logout`: Clear the session marker and sign out
/// - `GET /profile`, `/profile/:username`, and any other path: A user's timeline
/// - `GET /public/*`: Static files from `static_dir`
/// - `GET /health`: Health check
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/login", get(handle_login).post(handle_login))
        .route("/tweet", post(handle_tweet))
        .route("/logout", get(handle_logout))
        .route("/profile", get(handle_profile))
        .route("/profile/*username", get(handle_profile))
        .route("/health", get(handle_health))
        .route("/favicon.ico", get(handle_favicon))
        .nest_service("/public", ServeDir::new(static_dir))
        .fallback(handle_profile)
        .with_state(state)
}
