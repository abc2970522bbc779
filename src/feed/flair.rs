use std::collections::BTreeSet;

use super::types::Video;

/// Distinct non-empty flair values of a listing.
pub type FlairSet = BTreeSet<String>;

/// Collect the distinct non-empty flair values of `videos`.
pub fn extract_flair(videos: &[Video]) -> FlairSet {
    videos
        .iter()
        .filter(|v| !v.flair.is_empty())
        .map(|v| v.flair.clone())
        .collect()
}

/// Order flair values for display.
///
/// Values listed in `order` come first, in that order. Everything else
/// follows lexicographically.
pub fn sort_flair(flair: &FlairSet, order: &[String]) -> Vec<String> {
    let mut sorted: Vec<String> = flair.iter().cloned().collect();
    sorted.sort_by(|a, b| {
        let rank = |s: &String| order.iter().position(|o| o == s).unwrap_or(usize::MAX);
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });
    sorted
}

/// Keep the videos whose flair equals `selected`; an empty filter keeps all.
pub fn filter_by_flair<'a>(videos: &'a [Video], selected: &str) -> Vec<&'a Video> {
    videos
        .iter()
        .filter(|v| selected.is_empty() || v.flair == selected)
        .collect()
}
