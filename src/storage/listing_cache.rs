use anyhow::{Context, Result};

use super::cache::{CacheEntry, CacheKey};
use super::schema::Database;
use crate::feed::FeedQuery;

/// Default TTL for persisted listings (24 hours)
pub const DEFAULT_TTL_HOURS: i64 = 24;

impl Database {
    // ========================================================================
    // Persisted Listing Operations
    // ========================================================================

    /// Persist a listing under its cache key, replacing any previous value.
    ///
    /// `ttl_hours` of `None` uses the 24 hour default; values below one hour
    /// are clamped to one.
    pub async fn store_listing(
        &self,
        key: &CacheKey,
        entry: &CacheEntry,
        ttl_hours: Option<i64>,
    ) -> Result<()> {
        let ttl = ttl_hours.unwrap_or(DEFAULT_TTL_HOURS).max(1);
        let payload = serde_json::to_string(entry).context("Failed to serialize listing")?;
        let size_bytes = payload.len() as i64;
        let ttl_modifier = format!("+{ttl} hours");

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO listing_cache
                (key, payload, fetched_at, expires_at, size_bytes)
            VALUES (?, ?, datetime('now'), datetime('now', ?), ?)
        "#,
        )
        .bind(key.as_str())
        .bind(&payload)
        .bind(&ttl_modifier)
        .bind(size_bytes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load one persisted listing if present and not expired.
    pub async fn load_listing(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT payload FROM listing_cache WHERE key = ? AND expires_at > datetime('now')",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((payload,)) => Ok(Some(
                serde_json::from_str(&payload).context("Corrupt persisted listing")?,
            )),
            None => Ok(None),
        }
    }

    /// Load every unexpired listing, for hydrating the in-memory cache.
    ///
    /// Rows whose key or payload no longer parses are skipped with a warning.
    pub async fn load_all_listings(&self) -> Result<Vec<(CacheKey, CacheEntry)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, payload FROM listing_cache WHERE expires_at > datetime('now') ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut listings = Vec::with_capacity(rows.len());
        for (key, payload) in rows {
            let query = match key.parse::<FeedQuery>() {
                Ok(q) => q,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping persisted listing with unknown key");
                    continue;
                }
            };
            match serde_json::from_str::<CacheEntry>(&payload) {
                Ok(entry) => listings.push((query.cache_key(), entry)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping corrupt persisted listing");
                }
            }
        }
        Ok(listings)
    }

    /// Delete expired listings. Returns the number removed.
    pub async fn evict_expired_listings(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM listing_cache WHERE expires_at <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every persisted listing. Returns the number removed.
    pub async fn clear_listings(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM listing_cache")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::feed::{Category, Timeframe, Video};
    use crate::storage::{CacheEntry, CacheKey, Database};
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn entry(titles: &[&str]) -> CacheEntry {
        CacheEntry::from_videos(
            titles
                .iter()
                .enumerate()
                .map(|(id, t)| Video {
                    id,
                    title: t.to_string(),
                    flair: "7-10 Minutes".to_string(),
                    thumbnail_url: Some(format!("https://img.example.com/{id}.jpg")),
                    embed_html: None,
                    direct_url: None,
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let db = test_db().await;
        let key = CacheKey::new(Category::Top, Some(Timeframe::Week));
        let stored = entry(&["a", "b"]);

        db.store_listing(&key, &stored, None).await.unwrap();
        let loaded = db.load_listing(&key).await.unwrap().unwrap();
        assert_eq!(loaded, stored);
    }

    #[tokio::test]
    async fn test_store_replaces() {
        let db = test_db().await;
        let key = CacheKey::new(Category::Hot, None);

        db.store_listing(&key, &entry(&["a"]), None).await.unwrap();
        db.store_listing(&key, &entry(&["b", "c"]), None).await.unwrap();

        let loaded = db.load_listing(&key).await.unwrap().unwrap();
        assert_eq!(loaded.videos.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let db = test_db().await;
        let key = CacheKey::new(Category::New, None);
        assert!(db.load_listing(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_rows_are_invisible_and_evicted() {
        let db = test_db().await;
        let key = CacheKey::new(Category::Rising, None);
        db.store_listing(&key, &entry(&["a"]), None).await.unwrap();

        sqlx::query("UPDATE listing_cache SET expires_at = datetime('now', '-1 hours')")
            .execute(&db.pool)
            .await
            .unwrap();

        assert!(db.load_listing(&key).await.unwrap().is_none());
        assert!(db.load_all_listings().await.unwrap().is_empty());
        assert_eq!(db.evict_expired_listings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_all_skips_bad_rows() {
        let db = test_db().await;
        let good = CacheKey::new(Category::Top, Some(Timeframe::Day));
        db.store_listing(&good, &entry(&["a"]), None).await.unwrap();

        sqlx::query(
            "INSERT INTO listing_cache (key, payload, fetched_at, expires_at, size_bytes)
             VALUES ('hot', '{broken', datetime('now'), datetime('now', '+1 hours'), 7),
                    ('best', '{}', datetime('now'), datetime('now', '+1 hours'), 2)",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let all = db.load_all_listings().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, good);
    }

    #[tokio::test]
    async fn test_clear_listings() {
        let db = test_db().await;
        db.store_listing(&CacheKey::new(Category::Hot, None), &entry(&["a"]), None)
            .await
            .unwrap();
        db.store_listing(&CacheKey::new(Category::New, None), &entry(&["b"]), None)
            .await
            .unwrap();
        assert_eq!(db.clear_listings().await.unwrap(), 2);
        assert!(db.load_all_listings().await.unwrap().is_empty());
    }
}
