//! Caller identity.
//!
//! Authentication happens outside this service. The [`IdentityProvider`]
//! trait answers "who is calling" and where to send a browser to sign in or
//! out. [`ProxyIdentity`] is the shipped adapter: it trusts an email header set
//! by an authenticating reverse proxy and builds sign-in/sign-out URLs on that
//! proxy.

use axum::http::HeaderMap;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no {0} URL is configured")]
    NotConfigured(&'static str),
}

pub trait IdentityProvider: Send + Sync {
    /// The authenticated caller's email, if any.
    fn current_user(&self, headers: &HeaderMap) -> Option<String>;

    /// Where to send the browser to sign in, returning to `return_path` after.
    fn login_url(&self, return_path: &str) -> Result<String, IdentityError>;

    /// Where to send the browser to sign out, returning to `return_path` after.
    fn logout_url(&self, return_path: &str) -> Result<String, IdentityError>;
}

/// Identity asserted by an authenticating reverse proxy.
#[derive(Debug, Clone)]
pub struct ProxyIdentity {
    header: String,
    login_base: String,
    logout_base: String,
}

impl ProxyIdentity {
    pub fn new(
        header: impl Into<String>,
        login_base: impl Into<String>,
        logout_base: impl Into<String>,
    ) -> Self {
        ProxyIdentity {
            header: header.into().to_ascii_lowercase(),
            login_base: login_base.into(),
            logout_base: logout_base.into(),
        }
    }
}

/// Appends `rd=<return_path>` to `base`, keeping any existing query.
fn with_return_path(
    base: &str,
    return_path: &str,
    what: &'static str,
) -> Result<String, IdentityError> {
    if base.trim().is_empty() {
        return Err(IdentityError::NotConfigured(what));
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!(
        "{}{}rd={}",
        base,
        separator,
        urlencoding::encode(return_path)
    ))
}

impl IdentityProvider for ProxyIdentity {
    fn current_user(&self, headers: &HeaderMap) -> Option<String> {
        let email = headers
            .get(self.header.as_str())?
            .to_str()
            .ok()?
            .trim()
            .to_string();
        if email.is_empty() {
            return None;
        }
        debug!("Request authenticated as {}", email);
        Some(email)
    }

    fn login_url(&self, return_path: &str) -> Result<String, IdentityError> {
        with_return_path(&self.login_base, return_path, "login")
    }

    fn logout_url(&self, return_path: &str) -> Result<String, IdentityError> {
        with_return_path(&self.logout_base, return_path, "logout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn provider() -> ProxyIdentity {
        ProxyIdentity::new("X-Authenticated-Email", "/oauth2/start", "/oauth2/sign_out")
    }

    #[test]
    fn reads_email_from_configured_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(provider().current_user(&headers), None);

        headers.insert(
            "x-authenticated-email",
            HeaderValue::from_static(" alice@example.com "),
        );
        assert_eq!(
            provider().current_user(&headers),
            Some("alice@example.com".to_string())
        );
    }

    #[test]
    fn blank_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("x-authenticated-email", HeaderValue::from_static(""));
        assert_eq!(provider().current_user(&headers), None);
    }

    #[test]
    fn urls_carry_encoded_return_path() {
        assert_eq!(
            provider().logout_url("/").unwrap(),
            "/oauth2/sign_out?rd=%2F"
        );
        let with_query = ProxyIdentity::new("x", "https://auth.example.com/start?x=1", "");
        assert_eq!(
            with_query.login_url("/login").unwrap(),
            "https://auth.example.com/start?x=1&rd=%2Flogin"
        );
        assert!(with_query.logout_url("/").is_err());
    }
}
