//! Listing retrieval for the subreddit video feed.
//!
//! - [`types`] - Categories, timeframes, queries and the normalised [`Video`]
//! - [`listing`] - JSON envelope parsing and normalisation
//! - [`fetcher`] - HTTP retrieval of one listing page
//! - [`flair`] - Flair extraction, ordering and filtering
//!
//! # Example
//!
//! ```ignore
//! use snack_tv::feed::{extract_flair, FeedFetcher, FeedQuery, Timeframe};
//!
//! let videos = fetcher.fetch(&FeedQuery::top(Timeframe::Week)).await?;
//! let flair = extract_flair(&videos);
//! ```

mod fetcher;
mod flair;
mod listing;
mod types;

pub use fetcher::{build_client, FeedFetcher, FetchError, PAGE_SIZE};
pub use flair::{extract_flair, filter_by_flair, sort_flair, FlairSet};
pub use listing::{parse_listing, ParseResult};
pub use types::{Category, FeedQuery, QueryParseError, Timeframe, Video};
