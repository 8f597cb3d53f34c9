//! HTTP route handlers for the chirper service.
//!
//! This module contains all the HTTP route handler functions that process
//! incoming requests and return appropriate responses. Handlers hold no state
//! of their own; everything they touch comes in through [`AppState`].

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::mentions::notify_mentions;
use crate::models::{NewTweet, Profile};
use crate::routes::AppState;
use crate::session;
use crate::store::StoreError;
use crate::text::sanitize_for_logging;
use crate::views::{HomeView, LoginView, ProfileView};

/// Shown when a requested username belongs to someone else.
pub const USERNAME_TAKEN: &str = "username is not available";

/// Path words that would shadow a route if used as a username.
const RESERVED_USERNAMES: &[&str] = &["health", "login", "logout", "profile", "public", "tweet"];

/// Form accepted by `/login`, from the query string or an urlencoded body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
}

/// A `302 Found` redirect.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Checks a requested username, returning the inline error to show if it is unusable.
///
/// Usernames are 1-15 ASCII letters, digits or underscores, and may not shadow a route.
pub fn validate_username(username: &str) -> Option<&'static str> {
    let well_formed = regex::Regex::new(r"^[A-Za-z0-9_]{1,15}$")
        .map(|re| re.is_match(username))
        .unwrap_or(false);
    if !well_formed {
        return Some("usernames are 1 to 15 letters, digits or underscores");
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Some(USERNAME_TAKEN);
    }
    None
}

/// Reads the `username` field from an urlencoded POST body, falling back to the query string.
fn requested_username(method: &Method, uri: &Uri, body: &[u8]) -> String {
    let from_body = if method == Method::POST && !body.is_empty() {
        serde_urlencoded::from_bytes::<LoginForm>(body)
            .map(|form| form.username)
            .unwrap_or_default()
    } else {
        String::new()
    };
    if !from_body.trim().is_empty() {
        return from_body.trim().to_string();
    }
    uri.query()
        .and_then(|q| serde_urlencoded::from_str::<LoginForm>(q).ok())
        .map(|form| form.username.trim().to_string())
        .unwrap_or_default()
}

/// Username named by a profile path: `/alice`, `/profile/alice`, or empty for `/profile`.
fn username_from_path(path: &str) -> String {
    let rest = path.trim_start_matches('/');
    let rest = if rest == "profile" {
        ""
    } else {
        rest.strip_prefix("profile/").unwrap_or(rest)
    };
    urlencoding::decode(rest)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| rest.to_string())
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "chirper"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "chirper"}))
}

/// Handles `/favicon.ico`, which the service does not provide.
pub async fn handle_favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Handles GET requests to the root `/` endpoint.
///
/// Anonymous callers get the global recent feed. Authenticated callers without
/// a profile are sent to `/login` to finish registration.
///
/// # Returns
///
/// - The home page with the most recent tweets across all users
/// - `302` to `/login` for an authenticated but unregistered caller
/// - `500` with the store error if the feed cannot be loaded
pub async fn handle_home(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let mut view = HomeView {
        logged_in: session::is_logged_in(&headers),
        ..HomeView::default()
    };

    if let Some(email) = state.identity.current_user(&headers) {
        match state.profiles.get_by_email(&email).await? {
            Some(profile) => view.profile = profile,
            None => {
                info!("{} has no profile yet, redirecting to /login", email);
                return Ok(found("/login"));
            }
        }
    }

    view.tweets = state.tweets.recent(state.feed_limit).await?;
    Ok(Html(view.render()).into_response())
}

/// Handles GET and POST requests to `/login`.
///
/// A caller who already has a profile is sent to their timeline. Otherwise the
/// registration form is shown, and a non-empty `username` field claims that
/// handle. Claim failures are reported inline on the form with status 200.
///
/// # Returns
///
/// - `302` to the identity provider's sign-in page for anonymous callers
/// - `302` to `/<username>` with the session marker set after registration
/// - The registration form otherwise
pub async fn handle_login(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let email = match state.identity.current_user(&headers) {
        Some(email) => email,
        None => {
            let url = state.identity.login_url("/login")?;
            return Ok(found(&url));
        }
    };

    if let Some(profile) = state.profiles.get_by_email(&email).await? {
        if !profile.username.is_empty() {
            return Ok(found(&format!("/{}", profile.username)));
        }
    }

    let mut view = LoginView {
        profile: Profile::new(email.as_str(), ""),
        error: String::new(),
        logged_in: session::is_logged_in(&headers),
    };

    let username = requested_username(&method, &uri, &body);
    if username.is_empty() {
        return Ok(Html(view.render()).into_response());
    }
    view.profile.username = username.clone();

    if let Some(problem) = validate_username(&username) {
        view.error = problem.to_string();
        return Ok(Html(view.render()).into_response());
    }

    match state.profiles.get_by_username(&username).await {
        Ok(Some(_)) => {
            view.error = USERNAME_TAKEN.to_string();
            return Ok(Html(view.render()).into_response());
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Username lookup for @{} failed: {}", username, e);
            view.error = e.to_string();
            return Ok(Html(view.render()).into_response());
        }
    }

    match state.profiles.create(&view.profile).await {
        Ok(()) => {
            info!("Registered @{} for {}", username, email);
            Ok((
                [(header::SET_COOKIE, session::logged_in_cookie())],
                found(&format!("/{}", username)),
            )
                .into_response())
        }
        Err(StoreError::Duplicate(_)) => {
            info!("@{} was claimed concurrently", username);
            view.error = USERNAME_TAKEN.to_string();
            Ok(Html(view.render()).into_response())
        }
        Err(e) => {
            error!("Failed to create profile @{}: {}", username, e);
            view.error = e.to_string();
            Ok(Html(view.render()).into_response())
        }
    }
}

/// Handles `/profile`, `/profile/<username>` and every otherwise unmatched path.
///
/// # Returns
///
/// - The user's timeline page
/// - `404` if no profile has that username
/// - `500` if their tweets cannot be loaded
pub async fn handle_profile(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    let username = username_from_path(uri.path());
    let profile = match state.profiles.get_by_username(&username).await? {
        Some(profile) => profile,
        None => return Err(AppError::NotFound(username)),
    };

    let tweets = state.tweets.by_author(&profile.email).await?;

    let view = ProfileView {
        profile,
        tweets,
        logged_in: session::is_logged_in(&headers),
    };
    Ok(Html(view.render()))
}

/// Handles POST requests to the `/tweet` endpoint.
///
/// The body is a JSON object with a `message` field. The tweet is stamped with
/// the server time and the caller's username, mentioned users are emailed,
/// and the tweet is stored under the caller's email.
///
/// # Returns
///
/// - `200` with the JSON body `true` once stored
/// - `500` with the decode error for a malformed body, nothing stored
/// - `401` without an identity, `403` without a profile
/// - `500` with the store error if the tweet cannot be saved
pub async fn handle_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<bool>> {
    let new_tweet: NewTweet = serde_json::from_slice(&body).map_err(|e| {
        error!(
            "Error decoding tweet {}: {}",
            sanitize_for_logging(&String::from_utf8_lossy(&body), 200),
            e
        );
        AppError::Decode(e)
    })?;

    let email = state
        .identity
        .current_user(&headers)
        .ok_or(AppError::Unauthenticated)?;
    let profile = state
        .profiles
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unregistered(email.clone()))?;

    let tweet = new_tweet.into_tweet(&profile.username, Utc::now());

    let notified = notify_mentions(
        state.profiles.as_ref(),
        state.mailer.as_ref(),
        &email,
        &tweet,
    )
    .await;

    state.tweets.append(&email, &tweet).await?;
    info!(
        "@{} posted a tweet ({} mention emails sent): {}",
        tweet.username,
        notified,
        sanitize_for_logging(&tweet.message, 100)
    );

    Ok(Json(true))
}

/// Handles GET requests to `/logout`.
///
/// Clears the session marker and sends the browser to the identity
/// provider's sign-out page, returning to `/`.
///
/// # Returns
///
/// - `302` to the sign-out URL
/// - `500` if no sign-out URL can be produced (the marker is still cleared)
pub async fn handle_logout(State(state): State<AppState>) -> Response {
    let cleared = [(header::SET_COOKIE, session::cleared_cookie())];
    match state.identity.logout_url("/") {
        Ok(url) => (cleared, found(&url)).into_response(),
        Err(e) => (cleared, AppError::from(e)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_paths_name_a_username() {
        assert_eq!(username_from_path("/alice"), "alice");
        assert_eq!(username_from_path("/profile/alice"), "alice");
        assert_eq!(username_from_path("/profile"), "");
        assert_eq!(username_from_path("/a%20b"), "a b");
    }

    #[test]
    fn usernames_are_validated() {
        assert_eq!(validate_username("alice_99"), None);
        assert!(validate_username("").is_some());
        assert!(validate_username("has space").is_some());
        assert!(validate_username("waytoolongusername").is_some());
        assert_eq!(validate_username("Login"), Some(USERNAME_TAKEN));
    }
}
