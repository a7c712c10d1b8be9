use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::{Tweet, User};

///
/// In-memory holder of the user and tweet collections.
///
/// Users are fixed for the life of the process. Tweets are mutated by the
/// mutation resolvers, so they sit behind a mutex; hyper drives resolvers
/// from a multi-threaded runtime.
///
pub struct Store {
    users: Vec<User>,
    tweets: Mutex<Vec<Tweet>>,
    next_tweet_id: AtomicUsize,
}

impl Store {
    /// Build a store over explicit collections. Each test gets its own
    /// instance this way.
    pub fn new(users: Vec<User>, tweets: Vec<Tweet>) -> Self {
        let next_tweet_id = AtomicUsize::new(tweets.len() + 1);
        Self {
            users,
            tweets: Mutex::new(tweets),
            next_tweet_id,
        }
    }

    /// The fixed demo seed: two users, two tweets cross-referencing them.
    pub fn seeded() -> Self {
        let users = vec![
            User {
                id: "1".into(),
                first_name: "six".into(),
                last_name: "water".into(),
            },
            User {
                id: "2".into(),
                first_name: "seven".into(),
                last_name: "stone".into(),
            },
        ];
        let tweets = vec![
            Tweet {
                id: "1".into(),
                text: "hello1".into(),
                user_id: "2".into(),
            },
            Tweet {
                id: "2".into(),
                text: "hello2".into(),
                user_id: "1".into(),
            },
        ];
        Self::new(users, tweets)
    }

    /// Full user collection in insertion order.
    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Full tweet collection in insertion order.
    pub fn list_tweets(&self) -> Vec<Tweet> {
        self.tweets.lock().unwrap().clone()
    }

    pub fn find_user_by_id(&self, id: &str) -> Option<User> {
        self.users.iter().find(|user| user.id == id).cloned()
    }

    pub fn find_tweet_by_id(&self, id: &str) -> Option<Tweet> {
        self.tweets
            .lock()
            .unwrap()
            .iter()
            .find(|tweet| tweet.id == id)
            .cloned()
    }

    /// Allocate the next tweet id. Monotonic; ids are not reused after a
    /// deletion, unlike the length-derived ids this replaces.
    pub fn next_tweet_id(&self) -> String {
        self.next_tweet_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Append at the end of the collection. No uniqueness check.
    pub fn append_tweet(&self, tweet: Tweet) {
        self.tweets.lock().unwrap().push(tweet);
    }

    /// Remove every tweet with the given id under one lock acquisition.
    /// Returns whether any match existed.
    pub fn remove_tweets_by_id(&self, id: &str) -> bool {
        let mut tweets = self.tweets.lock().unwrap();
        let before = tweets.len();
        tweets.retain(|tweet| tweet.id != id);
        tweets.len() != before
    }
}
