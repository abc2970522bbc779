mod cache;
mod listing_cache;
mod schema;
mod types;

pub use cache::{CacheEntry, CacheKey, CacheStore};
pub use listing_cache::DEFAULT_TTL_HOURS;
pub use schema::Database;
pub use types::DatabaseError;
