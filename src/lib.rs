//! Terminal viewer for subreddit video listings.
//!
//! - [`feed`] fetches and parses listings
//! - [`storage`] holds the in-memory listing cache and its on-disk mirror
//! - [`app`] is the view-state controller that ties them together
//! - [`ui`] draws it

pub mod app;
pub mod config;
pub mod feed;
pub mod storage;
pub mod ui;
pub mod util;
