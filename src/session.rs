//! The `logged_in` session marker cookie.
//!
//! This cookie only drives page chrome. It is set by the client-visible
//! registration flow and cleared on logout, can be forged by any client, and
//! may disagree with the identity provider. Authorization never reads it.

use axum::http::{header, HeaderMap};
use cookie::{time::Duration, time::OffsetDateTime, Cookie};

pub const COOKIE_NAME: &str = "logged_in";

/// Whether the request carries `logged_in=true`.
pub fn is_logged_in(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .any(|c| c.name() == COOKIE_NAME && c.value() == "true")
}

/// `Set-Cookie` value marking the browser as logged in.
pub fn logged_in_cookie() -> String {
    Cookie::build((COOKIE_NAME, "true"))
        .path("/")
        .http_only(true)
        .build()
        .to_string()
}

/// `Set-Cookie` value that empties and expires the marker immediately.
pub fn cleared_cookie() -> String {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn marker_is_read_among_other_cookies() {
        assert!(is_logged_in(&headers_with("theme=dark; logged_in=true")));
        assert!(!is_logged_in(&headers_with("logged_in=")));
        assert!(!is_logged_in(&headers_with("logged_in=false")));
        assert!(!is_logged_in(&HeaderMap::new()));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cleared = cleared_cookie();
        assert!(cleared.starts_with("logged_in=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(logged_in_cookie().starts_with("logged_in=true"));
    }
}
