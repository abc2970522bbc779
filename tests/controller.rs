//! Integration tests for the view-state controller against a mock listing API.
//!
//! Each test starts its own wiremock server and drives `App` the way the UI
//! loop does: issue actions, then feed channel events back into
//! `handle_event`.

use pretty_assertions::assert_eq;
use snack_tv::app::{App, AppEvent, Cell, LoadOutcome, SelectOutcome, UiAction};
use snack_tv::config::Config;
use snack_tv::feed::{Category, FeedFetcher, FetchError, Timeframe};
use snack_tv::storage::CacheKey;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUB: &str = "mealtimevideos";

fn listing(titles: &[(&str, &str)]) -> String {
    let children: Vec<serde_json::Value> = titles
        .iter()
        .map(|(title, flair)| {
            serde_json::json!({
                "kind": "t3",
                "data": {
                    "title": title,
                    "link_flair_text": flair,
                    "url": "https://youtu.be/x",
                    "media": {"oembed": {"thumbnail_url": "https://i.ytimg.com/x.jpg"}},
                    "media_embed": {"content": "&lt;iframe&gt;&lt;/iframe&gt;"}
                }
            })
        })
        .collect();
    serde_json::json!({"kind": "Listing", "data": {"children": children}}).to_string()
}

fn ok(titles: &[(&str, &str)]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(listing(titles))
}

fn app_for(server: &MockServer) -> (App, mpsc::Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let fetcher = FeedFetcher::new(reqwest::Client::new(), Url::parse(&server.uri()).unwrap(), SUB);
    (App::new(&Config::default(), fetcher, None, tx), rx)
}

fn shown_titles(app: &App) -> Vec<String> {
    app.render_state()
        .video_rows
        .into_iter()
        .flatten()
        .filter_map(|c| match c {
            Cell::Video(v) => Some(v.title),
            Cell::Placeholder => None,
        })
        .collect()
}

async fn next(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>) -> Result<LoadOutcome, FetchError> {
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for fetch")
        .expect("channel closed");
    app.handle_event(event)
}

// ============================================================================
// Stale results
// ============================================================================

#[tokio::test]
async fn test_slow_earlier_fetch_never_overwrites_newer_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/hot/.json")))
        .respond_with(ok(&[("Hot one", "")]).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/new/.json")))
        .respond_with(ok(&[("New one", "")]))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.dispatch(UiAction::CategorySelected(Category::Hot));
    app.dispatch(UiAction::CategorySelected(Category::New));

    assert_eq!(next(&mut app, &mut rx).await.unwrap(), LoadOutcome::Displayed);
    assert_eq!(shown_titles(&app), vec!["New one"]);

    // The slow response still lands in the cache, but not on screen
    assert_eq!(next(&mut app, &mut rx).await.unwrap(), LoadOutcome::Stale);
    assert_eq!(shown_titles(&app), vec!["New one"]);
    assert_eq!(app.selection().category, Category::New);

    let hot = CacheKey::new(Category::Hot, None);
    assert!(app.cache().contains(&hot));
    assert_eq!(
        app.dispatch(UiAction::CategorySelected(Category::Hot)),
        Some(SelectOutcome::Cached)
    );
    assert_eq!(shown_titles(&app), vec!["Hot one"]);
}

#[tokio::test]
async fn test_view_stays_loading_until_current_key_arrives() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/hot/.json")))
        .respond_with(ok(&[("Hot one", "")]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/new/.json")))
        .respond_with(ok(&[("New one", "")]).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.select(Some(Category::Hot), None, None);
    app.select(Some(Category::New), None, None);

    assert_eq!(next(&mut app, &mut rx).await.unwrap(), LoadOutcome::Stale);
    let state = app.render_state();
    assert!(state.loading);
    assert!(state.video_rows.is_empty());

    assert_eq!(next(&mut app, &mut rx).await.unwrap(), LoadOutcome::Displayed);
    assert!(!app.render_state().loading);
    assert_eq!(shown_titles(&app), vec!["New one"]);
}

#[tokio::test]
async fn test_late_failure_for_abandoned_selection_leaves_view_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/hot/.json")))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/new/.json")))
        .respond_with(ok(&[("New one", "")]))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.dispatch(UiAction::CategorySelected(Category::Hot));
    app.dispatch(UiAction::CategorySelected(Category::New));

    assert_eq!(next(&mut app, &mut rx).await.unwrap(), LoadOutcome::Displayed);
    assert_eq!(shown_titles(&app), vec!["New one"]);

    let err = next(&mut app, &mut rx).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus(500)));
    assert_eq!(shown_titles(&app), vec!["New one"]);
    assert!(app.status_message.is_none());
    assert!(!app.render_state().loading);

    let hot = CacheKey::new(Category::Hot, None);
    assert!(!app.cache().contains(&hot));
    assert!(!app.is_in_flight(&hot));
}

// ============================================================================
// Pre-warm
// ============================================================================

#[tokio::test]
async fn test_prewarm_failure_is_isolated() {
    let server = MockServer::start().await;
    for tf in ["hour", "day", "week", "year"] {
        Mock::given(method("GET"))
            .and(path(format!("/r/{SUB}/top/.json")))
            .and(query_param("t", tf))
            .respond_with(ok(&[(tf, "")]))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/top/.json")))
        .and(query_param("t", "month"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    for cat in ["new", "rising", "controversial"] {
        Mock::given(method("GET"))
            .and(path(format!("/r/{SUB}/{cat}/.json")))
            .respond_with(ok(&[(cat, "")]))
            .mount(&server)
            .await;
    }

    let (mut app, mut rx) = app_for(&server);
    assert_eq!(app.pre_warm(), 8);

    let mut failures = Vec::new();
    for _ in 0..8 {
        match next(&mut app, &mut rx).await {
            Ok(outcome) => assert_eq!(outcome, LoadOutcome::Stale),
            Err(e) => failures.push(e),
        }
    }
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], FetchError::HttpStatus(500)));

    let month = CacheKey::new(Category::Top, Some(Timeframe::Month));
    assert_eq!(app.cache().len(), 7);
    assert!(!app.cache().contains(&month));
    assert!(!app.is_in_flight(&month));
    // Background failures never surface on the status line
    assert!(app.status_message.is_none());

    for key in ["top-hour", "top-day", "top-week", "top-year", "new", "rising", "controversial"] {
        assert!(
            app.cache().keys().iter().any(|k| k.as_str() == key),
            "missing {key}"
        );
    }
}

#[tokio::test]
async fn test_prewarmed_listing_serves_later_selection_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(&[("Any", "5-7 Minutes")]))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.pre_warm();
    for _ in 0..8 {
        next(&mut app, &mut rx).await.unwrap();
    }
    let requests = server.received_requests().await.unwrap().len();
    assert_eq!(requests, 8);

    assert_eq!(
        app.dispatch(UiAction::TimeframeSelected(Timeframe::Week)),
        Some(SelectOutcome::Cached)
    );
    assert_eq!(
        app.dispatch(UiAction::CategorySelected(Category::Rising)),
        Some(SelectOutcome::Cached)
    );
    assert_eq!(server.received_requests().await.unwrap().len(), requests);
}

#[tokio::test]
async fn test_selection_joins_in_flight_prewarm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(&[("Shared", "")]).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.pre_warm();
    let key = CacheKey::new(Category::New, None);
    assert_eq!(
        app.select(Some(Category::New), None, None),
        SelectOutcome::Fetching(key)
    );

    let mut displayed = 0;
    for _ in 0..8 {
        if next(&mut app, &mut rx).await.unwrap() == LoadOutcome::Displayed {
            displayed += 1;
        }
    }
    assert_eq!(displayed, 1);
    assert_eq!(shown_titles(&app), vec!["Shared"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 8);
}

// ============================================================================
// Flair
// ============================================================================

#[tokio::test]
async fn test_flair_filter_survives_category_switch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/hot/.json")))
        .respond_with(ok(&[("A1", "5-7 Minutes"), ("B1", "30 Minutes Plus")]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/r/{SUB}/new/.json")))
        .respond_with(ok(&[
            ("A2", "5-7 Minutes"),
            ("C2", "Other"),
            ("A3", "5-7 Minutes"),
        ]))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server);
    app.select(Some(Category::Hot), None, Some("5-7 Minutes".into()));
    next(&mut app, &mut rx).await.unwrap();
    assert_eq!(shown_titles(&app), vec!["A1"]);
    assert_eq!(
        app.render_state().flair_options,
        vec!["5-7 Minutes", "30 Minutes Plus"]
    );

    app.dispatch(UiAction::CategorySelected(Category::New));
    next(&mut app, &mut rx).await.unwrap();
    assert_eq!(shown_titles(&app), vec!["A2", "A3"]);
    // Configured order first, unknown flair after
    assert_eq!(
        app.render_state().flair_options,
        vec!["5-7 Minutes", "Other"]
    );
}
