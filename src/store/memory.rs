//! In-memory store backend.
//!
//! Both indexes live behind one lock so a username check and the insert that
//! follows it are a single atomic step.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::{ProfileStore, StoreError, TweetStore};
use crate::models::{Profile, Tweet};

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, Profile>,
    usernames: HashMap<String, String>,
    // (author email, tweet) in insertion order
    tweets: Vec<(String, Tweet)>,
}

/// Process-local store for profiles and tweets. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tweets stored across all authors.
    #[cfg(test)]
    pub(crate) async fn tweet_count(&self) -> usize {
        self.inner.read().await.tweets.len()
    }
}

fn newest_first(mut tweets: Vec<Tweet>) -> Vec<Tweet> {
    // stable sort keeps later inserts ahead of earlier ones with equal timestamps
    tweets.reverse();
    tweets.sort_by(|a, b| b.time.cmp(&a.time));
    tweets
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.inner.read().await.profiles.get(email).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .usernames
            .get(username)
            .and_then(|email| inner.profiles.get(email))
            .cloned())
    }

    async fn create(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.usernames.contains_key(&profile.username) {
            return Err(StoreError::Duplicate(profile.username.clone()));
        }
        if inner.profiles.contains_key(&profile.email) {
            return Err(StoreError::Duplicate(profile.email.clone()));
        }
        inner
            .usernames
            .insert(profile.username.clone(), profile.email.clone());
        inner
            .profiles
            .insert(profile.email.clone(), profile.clone());
        debug!("Stored profile @{} in memory", profile.username);
        Ok(())
    }
}

#[async_trait]
impl TweetStore for MemoryStore {
    async fn recent(&self, limit: usize) -> Result<Vec<Tweet>, StoreError> {
        let inner = self.inner.read().await;
        let all = inner.tweets.iter().map(|(_, t)| t.clone()).collect();
        let mut tweets = newest_first(all);
        tweets.truncate(limit);
        Ok(tweets)
    }

    async fn by_author(&self, email: &str) -> Result<Vec<Tweet>, StoreError> {
        let inner = self.inner.read().await;
        let mine = inner
            .tweets
            .iter()
            .filter(|(author, _)| author == email)
            .map(|(_, t)| t.clone())
            .collect();
        Ok(newest_first(mine))
    }

    async fn append(&self, email: &str, tweet: &Tweet) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .tweets
            .push((email.to_string(), tweet.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn profile_resolves_by_email_and_username() {
        let store = MemoryStore::new();
        let profile = Profile::new("alice@example.com", "alice");
        store.create(&profile).await.unwrap();

        assert_eq!(
            store.get_by_username("alice").await.unwrap(),
            Some(profile.clone())
        );
        assert_eq!(
            store.get_by_email("alice@example.com").await.unwrap(),
            Some(profile)
        );
        assert_eq!(store.get_by_username("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_overwrite() {
        let store = MemoryStore::new();
        store
            .create(&Profile::new("alice@example.com", "alice"))
            .await
            .unwrap();

        let err = store
            .create(&Profile::new("mallory@example.com", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let owner = store.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(owner.email, "alice@example.com");
        assert_eq!(store.get_by_email("mallory@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_bounded() {
        let store = MemoryStore::new();
        let start = Utc::now();
        for i in 0..5 {
            let tweet = Tweet {
                username: "alice".to_string(),
                message: format!("tweet {}", i),
                time: start + Duration::seconds(i),
            };
            store.append("alice@example.com", &tweet).await.unwrap();
        }

        let recent = store.recent(3).await.unwrap();
        let messages: Vec<_> = recent.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["tweet 4", "tweet 3", "tweet 2"]);
    }

    #[tokio::test]
    async fn by_author_filters_on_email() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let tweet = |username: &str| Tweet {
            username: username.to_string(),
            message: "hi".to_string(),
            time: now,
        };
        store.append("alice@example.com", &tweet("alice")).await.unwrap();
        store.append("bob@example.com", &tweet("bob")).await.unwrap();

        let alice = store.by_author("alice@example.com").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].username, "alice");
    }
}
