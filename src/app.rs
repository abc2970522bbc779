use crate::config::Config;
use crate::feed::{
    filter_by_flair, sort_flair, Category, FeedFetcher, FeedQuery, FetchError, Timeframe, Video,
};
use crate::storage::{CacheEntry, CacheKey, CacheStore, Database};
use crate::util::{chunk, decode_html};
use futures::FutureExt;
use std::borrow::Cow;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Videos per grid row.
pub const ROW_WIDTH: usize = 4;

/// Seconds a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Selection
// ============================================================================

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: Category,
    /// Only ever `Some` while `category` is `Top`.
    pub timeframe: Option<Timeframe>,
    /// Flair filter; empty shows everything.
    pub selected_flair: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(Category::Top, None)
    }
}

impl Selection {
    pub fn new(category: Category, timeframe: Option<Timeframe>) -> Self {
        let mut selection = Self {
            category,
            timeframe: None,
            selected_flair: String::new(),
        };
        selection.apply(Some(category), timeframe, None);
        selection
    }

    pub fn query(&self) -> FeedQuery {
        FeedQuery::new(self.category, self.timeframe)
    }

    pub fn cache_key(&self) -> CacheKey {
        self.query().cache_key()
    }

    /// Apply a partial update.
    ///
    /// A category other than `Top` drops the timeframe. A timeframe without a
    /// category implies `Top`. `Top` without a timeframe keeps the current
    /// one, falling back to `All`. `Some("")` clears the flair filter.
    fn apply(
        &mut self,
        category: Option<Category>,
        timeframe: Option<Timeframe>,
        flair: Option<String>,
    ) {
        if let Some(category) = category {
            self.category = category;
        } else if timeframe.is_some() {
            self.category = Category::Top;
        }

        self.timeframe = match self.category {
            Category::Top => Some(timeframe.or(self.timeframe).unwrap_or_default()),
            _ => None,
        };

        if let Some(flair) = flair {
            self.selected_flair = flair;
        }
    }
}

// ============================================================================
// UI Actions and Events
// ============================================================================

/// User intent, independent of how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    CategorySelected(Category),
    TimeframeSelected(Timeframe),
    /// Empty string clears the filter.
    FlairSelected(String),
    /// Local index of a video in the active listing.
    VideoClicked(usize),
}

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Selection,
    PreWarm,
}

/// Results of background work, delivered to the controller's task.
#[derive(Debug)]
pub enum AppEvent {
    /// A listing fetch finished.
    ///
    /// `key` is the key that was active when the fetch started, not the
    /// current one.
    ListingLoaded {
        key: CacheKey,
        origin: FetchOrigin,
        result: Result<CacheEntry, FetchError>,
    },
}

/// Outcome of [`App::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Served from the cache; the view is already up to date.
    Cached,
    /// A fetch for this key is running; the view updates when it lands.
    Fetching(CacheKey),
}

/// Outcome of a successful [`App::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The listing belongs to the current selection and is now displayed.
    Displayed,
    /// The selection moved on; the listing was cached but not displayed.
    Stale,
}

// ============================================================================
// Render Model
// ============================================================================

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Video(Video),
    /// Fills a short last row; not interactive.
    Placeholder,
}

/// Everything a renderer needs to draw the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    /// Rows of exactly [`ROW_WIDTH`] cells.
    pub video_rows: Vec<Vec<Cell>>,
    /// Flair of the whole listing (not just the filtered rows), display-sorted.
    pub flair_options: Vec<String>,
    pub selection: Selection,
    /// Local index of the cell showing playable media.
    pub expanded_index: Option<usize>,
    /// A fetch for the current selection is outstanding.
    pub loading: bool,
}

/// Playable media for an expanded cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Decoded embed markup (usually an iframe).
    Embed(String),
    /// Direct media URL.
    Direct(String),
}

impl Playback {
    pub fn for_video(video: &Video) -> Option<Self> {
        video
            .embed_html
            .as_deref()
            .map(|html| Playback::Embed(decode_html(html)))
            .or_else(|| video.direct_url.clone().map(Playback::Direct))
    }
}

// ============================================================================
// View-State Controller
// ============================================================================

/// Owns the selection and the listing cache, and decides what is displayed.
///
/// All methods run on one task. Fetches run on spawned tasks and report back
/// through the `AppEvent` channel, which the owner feeds to
/// [`App::handle_event`].
pub struct App {
    fetcher: FeedFetcher,
    db: Option<Database>,
    event_tx: mpsc::Sender<AppEvent>,
    flair_order: Vec<String>,
    prewarm: Vec<FeedQuery>,
    cache_ttl_hours: i64,

    cache: CacheStore,
    in_flight: HashSet<CacheKey>,
    selection: Selection,
    /// Entry adopted for the current selection, if it has arrived.
    current: Option<Arc<CacheEntry>>,
    expanded_index: Option<usize>,

    /// Grid cursor, as a position in the filtered video list.
    pub cursor: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub show_help: bool,
}

impl App {
    /// Create a controller. `db` enables write-through persistence.
    ///
    /// Nothing is fetched until [`App::select`] or [`App::pre_warm`].
    pub fn new(
        config: &Config,
        fetcher: FeedFetcher,
        db: Option<Database>,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            fetcher,
            db,
            event_tx,
            flair_order: config.flair_order.clone(),
            prewarm: config.prewarm_queries(),
            cache_ttl_hours: config.cache_ttl_hours,
            cache: CacheStore::new(),
            in_flight: HashSet::new(),
            selection: Selection::default(),
            current: None,
            expanded_index: None,
            cursor: 0,
            status_message: None,
            needs_redraw: true,
            show_help: false,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn subreddit(&self) -> &str {
        self.fetcher.subreddit()
    }

    /// Seed the cache with previously persisted listings. Returns the count.
    pub fn hydrate(&mut self, listings: Vec<(CacheKey, CacheEntry)>) -> usize {
        let count = listings.len();
        for (key, entry) in listings {
            self.cache.set(key, entry);
        }
        if count > 0 {
            tracing::debug!(count, "Hydrated listing cache");
        }
        count
    }

    /// Change the selection and show the matching listing.
    ///
    /// `None` arguments leave that part of the selection alone (subject to
    /// the rules in [`Selection`]). A cache hit is adopted immediately; a
    /// miss starts a fetch keyed by the new selection.
    pub fn select(
        &mut self,
        category: Option<Category>,
        timeframe: Option<Timeframe>,
        flair: Option<String>,
    ) -> SelectOutcome {
        let previous = self.selection.clone();
        self.selection.apply(category, timeframe, flair);
        let key = self.selection.cache_key();

        if previous.cache_key() != key || previous.selected_flair != self.selection.selected_flair
        {
            self.expanded_index = None;
            self.cursor = 0;
        }
        self.needs_redraw = true;

        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Serving listing from cache");
            self.current = Some(entry);
            return SelectOutcome::Cached;
        }

        self.current = None;
        self.spawn_fetch(self.selection.query(), FetchOrigin::Selection);
        SelectOutcome::Fetching(key)
    }

    /// Single entry point for user actions.
    ///
    /// Returns the select outcome for selection changes, `None` for clicks.
    pub fn dispatch(&mut self, action: UiAction) -> Option<SelectOutcome> {
        match action {
            UiAction::CategorySelected(category) => Some(self.select(Some(category), None, None)),
            UiAction::TimeframeSelected(timeframe) => {
                Some(self.select(Some(Category::Top), Some(timeframe), None))
            }
            UiAction::FlairSelected(flair) => Some(self.select(None, None, Some(flair))),
            UiAction::VideoClicked(index) => {
                self.click_video(index);
                None
            }
        }
    }

    /// Apply a finished fetch.
    ///
    /// Success is always cached under the key the fetch started with; it is
    /// displayed only if that key is still the current one. Failure writes
    /// nothing and returns the error for that key.
    pub fn handle_event(&mut self, event: AppEvent) -> Result<LoadOutcome, FetchError> {
        match event {
            AppEvent::ListingLoaded {
                key,
                origin,
                result,
            } => {
                self.in_flight.remove(&key);
                let is_current = key == self.selection.cache_key();

                match result {
                    Ok(entry) => {
                        let videos = entry.videos.len();
                        let entry = self.cache.set(key.clone(), entry);
                        if is_current {
                            tracing::info!(key = %key, videos, ?origin, "Listing loaded");
                            self.current = Some(entry);
                            self.needs_redraw = true;
                            Ok(LoadOutcome::Displayed)
                        } else {
                            tracing::debug!(
                                key = %key,
                                current = %self.selection.cache_key(),
                                videos,
                                ?origin,
                                "Cached listing for inactive selection"
                            );
                            Ok(LoadOutcome::Stale)
                        }
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, ?origin, error = %e, "Listing fetch failed");
                        if is_current {
                            self.set_status(format!("Failed to load {}: {}", key, e));
                            self.needs_redraw = true;
                        }
                        Err(e)
                    }
                }
            }
        }
    }

    /// Fetch the configured pre-warm battery in the background.
    ///
    /// Keys already cached or in flight are skipped. Each fetch reports back
    /// on its own, so one failure never affects the others. Returns the number
    /// of fetches started.
    pub fn pre_warm(&mut self) -> usize {
        let mut started = 0;
        for query in self.prewarm.clone() {
            if self.cache.contains(&query.cache_key()) {
                continue;
            }
            if self.spawn_fetch(query, FetchOrigin::PreWarm) {
                started += 1;
            }
        }
        tracing::debug!(started, "Pre-warm fetches started");
        started
    }

    /// Start a fetch for `query` unless one is already running for its key.
    fn spawn_fetch(&mut self, query: FeedQuery, origin: FetchOrigin) -> bool {
        let key = query.cache_key();
        if !self.in_flight.insert(key.clone()) {
            tracing::debug!(key = %key, ?origin, "Fetch already in flight");
            return false;
        }

        let fetcher = self.fetcher.clone();
        let db = self.db.clone();
        let tx = self.event_tx.clone();
        let ttl = self.cache_ttl_hours;

        tracing::debug!(key = %key, ?origin, "Spawning listing fetch");
        tokio::spawn(async move {
            let result =
                match catch_task_panic(async { fetcher.fetch(&query).await.map(CacheEntry::from_videos) })
                    .await
                {
                    Ok(result) => result,
                    Err(panic_msg) => {
                        tracing::error!(key = %key, error = %panic_msg, "Listing fetch task panicked");
                        Err(FetchError::Panicked(panic_msg))
                    }
                };

            if let (Ok(entry), Some(db)) = (&result, &db) {
                if let Err(e) = db.store_listing(&key, entry, Some(ttl)).await {
                    tracing::warn!(key = %key, error = %e, "Failed to persist listing");
                }
            }

            if let Err(e) = tx
                .send(AppEvent::ListingLoaded {
                    key,
                    origin,
                    result,
                })
                .await
            {
                tracing::warn!(error = %e, "Listing channel send failed (receiver dropped)");
            }
        });
        true
    }

    // ========================================================================
    // View Derivation
    // ========================================================================

    /// Videos of the current listing that pass the flair filter.
    pub fn visible_videos(&self) -> Vec<&Video> {
        self.current
            .as_deref()
            .map(|entry| filter_by_flair(&entry.videos, &self.selection.selected_flair))
            .unwrap_or_default()
    }

    /// Display-sorted flair of the whole current listing.
    pub fn flair_options(&self) -> Vec<String> {
        self.current
            .as_deref()
            .map(|entry| sort_flair(&entry.flair, &self.flair_order))
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.current.is_none() && self.in_flight.contains(&self.selection.cache_key())
    }

    pub fn render_state(&self) -> RenderState {
        let visible = self.visible_videos();
        // ROW_WIDTH is non-zero, so chunking cannot fail
        let rows = chunk(&visible, ROW_WIDTH).unwrap_or_default();
        let video_rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Cell> = row.into_iter().cloned().map(Cell::Video).collect();
                cells.resize(ROW_WIDTH, Cell::Placeholder);
                cells
            })
            .collect();

        RenderState {
            video_rows,
            flair_options: self.flair_options(),
            selection: self.selection.clone(),
            expanded_index: self.expanded_index,
            loading: self.is_loading(),
        }
    }

    // ========================================================================
    // Expanded Cell
    // ========================================================================

    pub fn expanded_index(&self) -> Option<usize> {
        self.expanded_index
    }

    /// Toggle playable media for the video with local index `index`.
    ///
    /// At most one cell is expanded: expanding a cell collapses the previous
    /// one, and clicking the expanded cell collapses it. Indices not in the
    /// visible list are ignored. Returns the expanded index afterwards.
    pub fn click_video(&mut self, index: usize) -> Option<usize> {
        if !self.visible_videos().iter().any(|v| v.id == index) {
            tracing::debug!(index, "Ignoring click on video not in view");
            return self.expanded_index;
        }

        self.expanded_index = match self.expanded_index {
            Some(current) if current == index => None,
            _ => Some(index),
        };
        self.needs_redraw = true;
        self.expanded_index
    }

    /// Playable media for the video with local index `index`.
    pub fn playback(&self, index: usize) -> Option<Playback> {
        self.current
            .as_deref()
            .and_then(|entry| entry.video(index))
            .and_then(Playback::for_video)
    }

    // ========================================================================
    // Grid Cursor
    // ========================================================================

    /// Move the cursor by whole cells and rows, clamped to the visible list.
    pub fn move_cursor(&mut self, cols: isize, rows: isize) {
        let len = self.visible_videos().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as isize + cols + rows * ROW_WIDTH as isize;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
        self.needs_redraw = true;
    }

    /// Video under the cursor.
    pub fn cursor_video(&self) -> Option<&Video> {
        let visible = self.visible_videos();
        let index = self.cursor.min(visible.len().saturating_sub(1));
        visible.get(index).copied()
    }

    /// Step the flair filter through "all" and each option in display order.
    pub fn cycle_flair(&mut self, forward: bool) -> SelectOutcome {
        let mut options = vec![String::new()];
        options.extend(self.flair_options());

        let pos = options
            .iter()
            .position(|f| *f == self.selection.selected_flair)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % options.len()
        } else {
            (pos + options.len() - 1) % options.len()
        };
        let flair = options.swap_remove(next);
        self.select(None, None, Some(flair))
    }

    // ========================================================================
    // Status Line
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it has been shown long enough.
    /// Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Run `future`, turning a panic into an error message.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        }
    })
}
