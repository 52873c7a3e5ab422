// Result cache port.
//
// Spam and credibility results are cached per post revision. The core only
// depends on this trait; the concrete TTL cache lives in infra/cache.
// A cache fault is never fatal: callers treat an error as a miss and recompute.

use super::moderation_models::Post;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned: {0}")]
    Poisoned(String),
}

/// Identifies one revision of one post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub post_id: String,
    /// `updated_at` in epoch milliseconds.
    pub revision: i64,
}

impl CacheKey {
    pub fn new(post_id: impl Into<String>, revision: i64) -> Self {
        Self {
            post_id: post_id.into(),
            revision,
        }
    }

    pub fn for_post(post: &Post) -> Self {
        Self::new(post.id.clone(), post.updated_at.timestamp_millis())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.post_id, self.revision)
    }
}

/// Trait for caching computed results.
///
/// Implementations must be safe to share between concurrent callers. When two
/// callers insert the same key, the last writer wins.
pub trait ResultCache<T>: Send + Sync {
    /// Fetch a live entry. Expired entries are reported as a miss.
    fn get(&self, key: &CacheKey) -> Result<Option<T>, CacheError>;

    /// Store a result, evicting older entries if the cache is full.
    fn insert(&self, key: CacheKey, value: T) -> Result<(), CacheError>;

    /// Drop every revision cached for `post_id`. Returns how many were removed.
    fn invalidate_post(&self, post_id: &str) -> Result<usize, CacheError>;

    /// Drop everything.
    fn clear(&self) -> Result<(), CacheError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
