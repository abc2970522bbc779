//! Application event handling.
//!
//! Feeds fetch completions to the controller and turns the outcome into
//! status-line feedback.

use crate::app::{App, AppEvent, FetchOrigin, LoadOutcome};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    let origin = match &event {
        AppEvent::ListingLoaded { origin, .. } => *origin,
    };

    match app.handle_event(event) {
        Ok(LoadOutcome::Displayed) => app.needs_redraw = true,
        // Pre-warm results land silently; nothing on screen changes
        Ok(LoadOutcome::Stale) => {}
        Err(e) => {
            // The controller already reported failures for the visible
            // selection; background failures only go to the log.
            if origin == FetchOrigin::PreWarm {
                tracing::debug!(error = %e, "Pre-warm fetch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::{Category, FeedFetcher, FetchError};
    use crate::storage::{CacheEntry, CacheKey};
    use tokio::sync::mpsc;
    use url::Url;

    fn app() -> App {
        let (tx, _rx) = mpsc::channel(4);
        let fetcher = FeedFetcher::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9").unwrap(),
            "mealtimevideos",
        );
        App::new(&Config::default(), fetcher, None, tx)
    }

    #[test]
    fn test_prewarm_failure_is_silent() {
        let mut app = app();
        app.needs_redraw = false;
        handle_app_event(
            &mut app,
            AppEvent::ListingLoaded {
                key: CacheKey::new(Category::Rising, None),
                origin: FetchOrigin::PreWarm,
                result: Err(FetchError::HttpStatus(500)),
            },
        );
        assert!(app.status_message.is_none());
        assert!(!app.needs_redraw);
    }

    #[test]
    fn test_stale_result_is_cached_without_redraw() {
        let mut app = app();
        app.needs_redraw = false;
        let key = CacheKey::new(Category::Hot, None);
        handle_app_event(
            &mut app,
            AppEvent::ListingLoaded {
                key: key.clone(),
                origin: FetchOrigin::PreWarm,
                result: Ok(CacheEntry::from_videos(Vec::new())),
            },
        );
        assert!(app.cache().contains(&key));
        assert!(!app.needs_redraw);
    }
}
