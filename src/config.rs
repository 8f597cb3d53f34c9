//! Configuration module for the chirper service.
//!
//! This module reads the service configuration from environment variables and
//! logs what it found, masking anything secret.

use log::{debug, info, warn};
use std::env;

use crate::text::mask_secret;

/// Default header carrying the authenticated email, as set by oauth2-proxy style proxies.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-authenticated-email";
pub const DEFAULT_LOGIN_URL: &str = "/oauth2/start";
pub const DEFAULT_LOGOUT_URL: &str = "/oauth2/sign_out";
pub const DEFAULT_FEED_LIMIT: usize = 10;
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,
    /// Request header holding the caller's authenticated email
    pub identity_header: String,
    /// Sign-in URL on the authenticating proxy
    pub login_url: String,
    /// Sign-out URL on the authenticating proxy
    pub logout_url: String,
    /// Mail relay endpoint; mail is only logged when absent
    pub mail_relay_url: Option<String>,
    /// Bearer token for the mail relay
    pub mail_relay_token: Option<String>,
    /// Number of tweets on the home feed
    pub feed_limit: usize,
    /// Directory served under `/public`
    pub static_dir: String,
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) => {
            warn!("{} is set but empty, ignoring it", name);
            None
        }
        Err(_) => None,
    }
}

fn var_or(name: &str, default: &str) -> String {
    optional_var(name).unwrap_or_else(|| {
        debug!("{} not set, using default {}", name, default);
        default.to_string()
    })
}

impl AppConfig {
    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string (optional)
    /// - `IDENTITY_HEADER`: Header with the authenticated email (default `x-authenticated-email`)
    /// - `LOGIN_URL`: Sign-in URL (default `/oauth2/start`)
    /// - `LOGOUT_URL`: Sign-out URL (default `/oauth2/sign_out`)
    /// - `MAIL_RELAY_URL`: Mail relay endpoint (optional)
    /// - `MAIL_RELAY_TOKEN`: Mail relay bearer token (optional)
    /// - `FEED_LIMIT`: Tweets shown on the home feed (default 10)
    /// - `STATIC_DIR`: Directory served under `/public` (default `public`)
    ///
    /// # Returns
    ///
    /// - `Ok(AppConfig)`: The loaded configuration
    /// - `Err(...)`: If `FEED_LIMIT` is not a positive number
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading configuration from environment variables");

        let database_url = optional_var("DATABASE_URL");
        match &database_url {
            Some(url) => debug!("DATABASE_URL (masked): {}", mask_secret(url)),
            None => warn!("DATABASE_URL not set - profiles and tweets will be kept in memory only"),
        }

        let mail_relay_url = optional_var("MAIL_RELAY_URL");
        let mail_relay_token = optional_var("MAIL_RELAY_TOKEN");
        match (&mail_relay_url, &mail_relay_token) {
            (Some(url), Some(token)) => {
                info!("Mail relay configured at {}", url);
                debug!("Mail relay token (masked): {}", mask_secret(token));
            }
            (Some(url), None) => {
                info!("Mail relay configured at {} without a token", url);
            }
            (None, _) => {
                info!("No MAIL_RELAY_URL found - mention emails will only be logged");
            }
        }

        let feed_limit = match optional_var("FEED_LIMIT") {
            Some(raw) => {
                let limit: usize = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("FEED_LIMIT must be a positive number: {}", e))?;
                if limit == 0 {
                    return Err("FEED_LIMIT must be a positive number".into());
                }
                limit
            }
            None => DEFAULT_FEED_LIMIT,
        };

        let config = AppConfig {
            database_url,
            identity_header: var_or("IDENTITY_HEADER", DEFAULT_IDENTITY_HEADER),
            login_url: var_or("LOGIN_URL", DEFAULT_LOGIN_URL),
            logout_url: var_or("LOGOUT_URL", DEFAULT_LOGOUT_URL),
            mail_relay_url,
            mail_relay_token,
            feed_limit,
            static_dir: var_or("STATIC_DIR", DEFAULT_STATIC_DIR),
        };

        info!(
            "Configuration loaded: identity header {}, feed limit {}, static dir {}",
            config.identity_header, config.feed_limit, config.static_dir
        );
        Ok(config)
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set or cannot be parsed, it defaults to 3000.
///
/// # Returns
///
/// The port number as a u16.
///
/// # Example
///
/// ```rust
/// use chirper::get_server_port;
///
/// // With no PORT set
/// let port = get_server_port(); // Returns 3000
/// ```
pub fn get_server_port() -> u16 {
    match env::var("PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("PORT={} is not a valid port number, using 3000", raw);
            3000
        }),
        Err(_) => 3000,
    }
}
