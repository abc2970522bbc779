//! Integration tests for write-through persistence and startup hydration.
//!
//! Each test uses its own in-memory SQLite database and mock listing API.

use pretty_assertions::assert_eq;
use snack_tv::app::{App, AppEvent, LoadOutcome, SelectOutcome};
use snack_tv::config::Config;
use snack_tv::feed::{Category, FeedFetcher, Timeframe};
use snack_tv::storage::{CacheKey, Database};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing(titles: &[&str]) -> String {
    let children: Vec<serde_json::Value> = titles
        .iter()
        .map(|t| {
            serde_json::json!({
                "kind": "t3",
                "data": {"title": t, "link_flair_text": "7-10 Minutes", "media": {"oembed": {}}}
            })
        })
        .collect();
    serde_json::json!({"kind": "Listing", "data": {"children": children}}).to_string()
}

fn app_with_db(server_uri: &str, db: Option<Database>) -> (App, mpsc::Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        Url::parse(server_uri).unwrap(),
        "mealtimevideos",
    );
    (App::new(&Config::default(), fetcher, db, tx), rx)
}

async fn recv(rx: &mut mpsc::Receiver<AppEvent>) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for fetch")
        .expect("channel closed")
}

#[tokio::test]
async fn test_successful_fetch_is_written_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["Stew", "Pie"])))
        .mount(&server)
        .await;

    let db = Database::open(":memory:").await.unwrap();
    let (mut app, mut rx) = app_with_db(&server.uri(), Some(db.clone()));

    app.select(Some(Category::Top), Some(Timeframe::Week), None);
    let event = recv(&mut rx).await;
    assert_eq!(app.handle_event(event).unwrap(), LoadOutcome::Displayed);

    // The task persists before reporting back
    let key = CacheKey::new(Category::Top, Some(Timeframe::Week));
    let stored = db.load_listing(&key).await.unwrap().unwrap();
    assert_eq!(stored.videos.len(), 2);
    assert_eq!(stored.videos[0].title, "Stew");
    assert!(stored.flair.contains("7-10 Minutes"));
}

#[tokio::test]
async fn test_failed_fetch_is_not_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let db = Database::open(":memory:").await.unwrap();
    let (mut app, mut rx) = app_with_db(&server.uri(), Some(db.clone()));

    app.select(Some(Category::Hot), None, None);
    let event = recv(&mut rx).await;
    assert!(app.handle_event(event).is_err());
    assert!(db.load_all_listings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hydrated_listing_needs_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["Curry"])))
        .expect(1)
        .mount(&server)
        .await;

    let db = Database::open(":memory:").await.unwrap();

    // First session fetches and persists
    {
        let (mut app, mut rx) = app_with_db(&server.uri(), Some(db.clone()));
        app.select(Some(Category::Rising), None, None);
        let event = recv(&mut rx).await;
        app.handle_event(event).unwrap();
    }

    // Second session starts from the persisted copy
    let (mut app, _rx) = app_with_db(&server.uri(), Some(db.clone()));
    let hydrated = app.hydrate(db.load_all_listings().await.unwrap());
    assert_eq!(hydrated, 1);
    assert_eq!(
        app.select(Some(Category::Rising), None, None),
        SelectOutcome::Cached
    );
    assert_eq!(app.visible_videos()[0].title, "Curry");
}

#[tokio::test]
async fn test_without_database_nothing_is_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["Soup"])))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_with_db(&server.uri(), None);
    app.select(Some(Category::New), None, None);
    let event = recv(&mut rx).await;
    assert_eq!(app.handle_event(event).unwrap(), LoadOutcome::Displayed);
    assert_eq!(app.cache().len(), 1);
}
