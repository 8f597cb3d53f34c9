//! Records persisted by the service.
//!
//! A [`Profile`] ties an authenticated email address to a public handle, and a
//! [`Tweet`] is a short message posted by a profile. Both are immutable once
//! written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's persistent identity record.
///
/// `email` is the primary key and always equals the authenticated identity's
/// email. `username` is unique across all profiles and set exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub username: String,
}

impl Profile {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Profile {
            email: email.into(),
            username: username.into(),
        }
    }
}

/// A timestamped short message.
///
/// `username` is a copy of the poster's handle at post time. The author's
/// email is not part of the record; stores key tweets by it separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub username: String,
    pub message: String,
    pub time: DateTime<Utc>,
}

/// The JSON body accepted by `POST /tweet`.
///
/// Only the message is taken from the client; any username or time it sends
/// is ignored and replaced server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTweet {
    #[serde(alias = "Message")]
    pub message: String,
}

impl NewTweet {
    /// Stamps the message with the poster's handle and the server time.
    pub fn into_tweet(self, username: &str, time: DateTime<Utc>) -> Tweet {
        Tweet {
            username: username.to_string(),
            message: self.message,
            time,
        }
    }
}
