use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::storage::CacheKey;

// ============================================================================
// Listing Partitions
// ============================================================================

/// Top-level listing partition of the subreddit.
///
/// `None` is the subreddit front page, which has no category path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Top,
    Hot,
    New,
    Rising,
    Controversial,
    None,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Top,
        Category::Hot,
        Category::New,
        Category::Rising,
        Category::Controversial,
        Category::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Hot => "hot",
            Category::New => "new",
            Category::Rising => "rising",
            Category::Controversial => "controversial",
            Category::None => "none",
        }
    }

    /// URL path segment for the listing endpoint, or `None` for the front page.
    pub fn path_segment(&self) -> Option<&'static str> {
        match self {
            Category::None => None,
            other => Some(other.as_str()),
        }
    }

    /// Human-readable label for navigation.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Hot => "Hot",
            Category::New => "New",
            Category::Rising => "Rising",
            Category::Controversial => "Controversial",
            Category::None => "Front",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window for `Category::Top` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::Hour,
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Year,
        Timeframe::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hour => "hour",
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
            Timeframe::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Hour => "Hour",
            Timeframe::Day => "Day",
            Timeframe::Week => "Week",
            Timeframe::Month => "Month",
            Timeframe::Year => "Year",
            Timeframe::All => "All",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),
}

impl FromStr for Category {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| QueryParseError::UnknownCategory(s.to_string()))
    }
}

impl FromStr for Timeframe {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| QueryParseError::UnknownTimeframe(s.to_string()))
    }
}

// ============================================================================
// Feed Query
// ============================================================================

/// One (category, timeframe) pair to fetch.
///
/// The timeframe is kept as given; only [`FeedQuery::cache_key`] and the
/// request builder normalise it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedQuery {
    pub category: Category,
    pub timeframe: Option<Timeframe>,
}

impl FeedQuery {
    pub fn new(category: Category, timeframe: Option<Timeframe>) -> Self {
        Self {
            category,
            timeframe,
        }
    }

    pub fn top(timeframe: Timeframe) -> Self {
        Self::new(Category::Top, Some(timeframe))
    }

    pub fn category(category: Category) -> Self {
        Self::new(category, None)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.category, self.timeframe)
    }

    /// Value of the `t` query parameter.
    pub fn timeframe_param(&self) -> Timeframe {
        self.timeframe.unwrap_or_default()
    }
}

/// Parses `"hot"`, `"top-week"`, `"top"` (same as `"top-all"`).
///
/// This is the same text as the cache key, so persisted keys parse back to
/// the query that produced them.
impl FromStr for FeedQuery {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, timeframe) = match s.split_once('-') {
            Some((c, t)) => (c.parse::<Category>()?, Some(t.parse::<Timeframe>()?)),
            None => (s.parse::<Category>()?, None),
        };
        Ok(Self::new(category, timeframe))
    }
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key().as_str())
    }
}

// ============================================================================
// Video
// ============================================================================

/// A renderable listing entry.
///
/// `id` is the 0-based position among the entries of one fetch that carried
/// media. It is the interaction handle for the grid and is only meaningful
/// within the entry that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: usize,
    pub title: String,
    /// Flair text, empty when the post has none.
    pub flair: String,
    pub thumbnail_url: Option<String>,
    /// Entity-encoded embed snippet as delivered by the API.
    pub embed_html: Option<String>,
    pub direct_url: Option<String>,
}
