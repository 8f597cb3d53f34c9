//! Mention notifications.
//!
//! When a tweet is posted, every whitespace-delimited token starting with `@`
//! names a candidate profile. Each one that resolves gets a single email.
//! Unknown names and failed sends are skipped; posting never fails because of
//! this step.

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use crate::humanize::relative_time;
use crate::mail::{MailMessage, Mailer};
use crate::models::Tweet;
use crate::store::ProfileStore;

pub const MENTION_SUBJECT: &str = "You were mentioned in a tweet";

/// Candidate usernames mentioned in `message`, in order of appearance.
///
/// A token is everything between whitespace; the candidate is the token with
/// its leading `@` removed. A bare `@` yields nothing.
pub fn extract_mentions(message: &str) -> Vec<&str> {
    message
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Builds the notification sent to `recipient` about `tweet`.
pub fn mention_message(
    sender_email: &str,
    recipient_username: &str,
    recipient_email: &str,
    tweet: &Tweet,
    now: DateTime<Utc>,
) -> MailMessage {
    MailMessage {
        sender: sender_email.to_string(),
        to: vec![format!("{} <{}>", recipient_username, recipient_email)],
        subject: MENTION_SUBJECT.to_string(),
        body: format!(
            "{} from {} - {}",
            tweet.message,
            tweet.username,
            relative_time(tweet.time, now)
        ),
    }
}

/// Emails every profile mentioned in `tweet`. Returns how many sends succeeded.
pub async fn notify_mentions(
    profiles: &dyn ProfileStore,
    mailer: &dyn Mailer,
    sender_email: &str,
    tweet: &Tweet,
) -> usize {
    let mut sent = 0;
    for username in extract_mentions(&tweet.message) {
        let profile = match profiles.get_by_username(username).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!("Mention @{} has no profile, skipping", username);
                continue;
            }
            Err(e) => {
                debug!("Lookup for mention @{} failed, skipping: {}", username, e);
                continue;
            }
        };

        let message = mention_message(
            sender_email,
            &profile.username,
            &profile.email,
            tweet,
            Utc::now(),
        );
        match mailer.send(&message).await {
            Ok(()) => {
                info!("Sent mention notification to @{}", profile.username);
                sent += 1;
            }
            Err(e) => {
                error!(
                    "Failed to send mention notification to @{}: {}",
                    profile.username, e
                );
            }
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_are_at_prefixed_tokens() {
        assert_eq!(
            extract_mentions("hello @alice and @bob!"),
            vec!["alice", "bob!"]
        );
        assert_eq!(extract_mentions("mail me at a@b.com"), Vec::<&str>::new());
        assert_eq!(extract_mentions("@ lonely\t@carol\n"), vec!["carol"]);
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn message_names_poster_and_recipient() {
        let now = Utc::now();
        let tweet = Tweet {
            username: "bob".to_string(),
            message: "hi @alice".to_string(),
            time: now,
        };
        let mail = mention_message("bob@example.com", "alice", "alice@example.com", &tweet, now);

        assert_eq!(mail.sender, "bob@example.com");
        assert_eq!(mail.to, vec!["alice <alice@example.com>".to_string()]);
        assert_eq!(mail.subject, MENTION_SUBJECT);
        assert_eq!(mail.body, "hi @alice from bob - now");
    }
}
