use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::feed::{extract_flair, Category, FlairSet, Timeframe, Video};

// ============================================================================
// Cache Key
// ============================================================================

/// Identity of one cached listing.
///
/// `top-<timeframe>` for `Category::Top`, the bare category otherwise. The
/// timeframe of a non-top selection never reaches the key, so every `hot`
/// selection shares one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(category: Category, timeframe: Option<Timeframe>) -> Self {
        match category {
            Category::Top => Self(format!(
                "{}-{}",
                category.as_str(),
                timeframe.unwrap_or_default().as_str()
            )),
            other => Self(other.as_str().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Cache Entry
// ============================================================================

/// One fetched listing with its flair set.
///
/// Never mutated after construction; a refetch produces a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub videos: Vec<Video>,
    pub flair: FlairSet,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry from freshly fetched videos, deriving the flair set.
    pub fn from_videos(videos: Vec<Video>) -> Self {
        let flair = extract_flair(&videos);
        Self {
            videos,
            flair,
            fetched_at: Utc::now(),
        }
    }

    /// Look up a video by its local index.
    pub fn video(&self, id: usize) -> Option<&Video> {
        // Ids are dense positions, but don't rely on it for entries
        // restored from disk.
        self.videos
            .get(id)
            .filter(|v| v.id == id)
            .or_else(|| self.videos.iter().find(|v| v.id == id))
    }
}

// ============================================================================
// Cache Store
// ============================================================================

/// In-memory listing cache for the lifetime of the session.
///
/// Unbounded, no expiry; `set` replaces whatever was stored under the key.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<CacheKey, Arc<CacheEntry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(Arc::clone)
    }

    pub fn set(&mut self, key: CacheKey, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        self.entries.insert(key, Arc::clone(&entry));
        entry
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached keys in sorted order.
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}
