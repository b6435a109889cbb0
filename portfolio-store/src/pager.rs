//! Incremental, fixed-size paging over the feed's filtered view.
//!
//! The displayed window is always a prefix of [`FeedStore::filtered_posts`],
//! so the pager only tracks how many posts are shown. A page load sleeps for
//! the simulated latency and then extends the prefix by one page, or marks
//! the feed exhausted when nothing is left. Only one load can be in flight.

use crate::feed::FeedStore;
use portfolio_common::model::post::Post;
use serde::Serialize;
use std::{
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const DEFAULT_PAGE_LATENCY: Duration = Duration::from_millis(300);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PagerPhase {
    #[default]
    IdleEmpty,
    Loading,
    IdleMore,
    Exhausted,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A page with this many posts was appended.
    Loaded(usize),
    /// Nothing was left; no further loads happen until the next reset.
    Exhausted,
    /// A load was already in flight, or the feed is exhausted.
    Suppressed,
    /// The proximity signal arrived while the pager was not idle.
    Ignored,
    /// The pager was reset or disposed while the load was in flight.
    Discarded,
    /// The feed changed under the pager, which started over at page one.
    Reset,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct PagerSnapshot {
    pub phase: PagerPhase,
    pub page: usize,
    pub page_size: usize,
    pub shown: usize,
    pub has_more: bool,
    pub shows_sentinel: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
struct PagerState {
    epoch: u64,
    generation: u64,
    page: usize,
    shown: usize,
    phase: PagerPhase,
}

impl PagerState {
    fn advance(&mut self, filtered: &[Post], page_size: usize) -> LoadOutcome {
        let start = self.page * page_size;
        let end = (start + page_size).min(filtered.len());

        if start >= end {
            self.phase = PagerPhase::Exhausted;
            return LoadOutcome::Exhausted;
        }

        self.page += 1;
        self.shown = end;
        self.phase = PagerPhase::IdleMore;
        LoadOutcome::Loaded(end - start)
    }
}

#[derive(Debug)]
pub struct FeedPager {
    page_size: usize,
    latency: Duration,
    state: Mutex<PagerState>,
    in_flight: AtomicBool,
    disposed: AtomicBool,
}

impl Default for FeedPager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_PAGE_LATENCY)
    }
}

impl FeedPager {
    /// A zero `page_size` is treated as one.
    #[must_use]
    pub fn new(page_size: usize, latency: Duration) -> Self {
        Self {
            page_size: page_size.max(1),
            latency,
            state: Mutex::new(PagerState::default()),
            in_flight: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Starts over on the feed's current view and shows its first page
    /// immediately.
    pub fn reset(&self, feed: &FeedStore) -> LoadOutcome {
        let mut state = self.lock_state();
        self.reseed(&mut state, feed)
    }

    /// Handles the scroll proximity signal.
    pub async fn on_proximity(&self, feed: &RwLock<FeedStore>) -> LoadOutcome {
        let idle = matches!(
            self.lock_state().phase,
            PagerPhase::IdleEmpty | PagerPhase::IdleMore
        );
        if !idle || self.in_flight.load(Ordering::Acquire) {
            return LoadOutcome::Ignored;
        }

        self.load_more(feed).await
    }

    pub async fn load_more(&self, feed: &RwLock<FeedStore>) -> LoadOutcome {
        if self.is_disposed() {
            return LoadOutcome::Suppressed;
        }

        let latch = {
            let mut state = self.lock_state();
            if state.phase == PagerPhase::Exhausted || self.in_flight.swap(true, Ordering::AcqRel) {
                return LoadOutcome::Suppressed;
            }
            let resume = state.phase;
            state.phase = PagerPhase::Loading;
            InFlight {
                pager: self,
                epoch: state.epoch,
                resume,
            }
        };

        tokio::time::sleep(self.latency).await;

        let feed = feed.read().await;
        let outcome = {
            let mut state = self.lock_state();
            if self.is_disposed() || state.epoch != latch.epoch {
                LoadOutcome::Discarded
            } else if state.generation != feed.view_generation() {
                self.reseed(&mut state, &feed);
                LoadOutcome::Reset
            } else {
                state.advance(feed.filtered_posts(), self.page_size)
            }
        };
        drop(latch);

        debug!(?outcome, "Page load finished");
        outcome
    }

    /// Marks the pager as torn down. Loads still in flight complete without
    /// writing anything.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The currently displayed posts.
    #[must_use]
    pub fn window<'a>(&self, feed: &'a FeedStore) -> &'a [Post] {
        let filtered = feed.filtered_posts();
        &filtered[..self.lock_state().shown.min(filtered.len())]
    }

    #[must_use]
    pub fn snapshot(&self) -> PagerSnapshot {
        let state = *self.lock_state();
        let has_more = state.phase != PagerPhase::Exhausted;

        PagerSnapshot {
            phase: state.phase,
            page: state.page,
            page_size: self.page_size,
            shown: state.shown,
            has_more,
            shows_sentinel: state.shown > 0 && has_more,
        }
    }

    /// Also releases the latch: a load still in flight belongs to the old
    /// epoch and can no longer write.
    fn reseed(&self, state: &mut PagerState, feed: &FeedStore) -> LoadOutcome {
        self.in_flight.store(false, Ordering::Release);
        *state = PagerState {
            epoch: state.epoch + 1,
            generation: feed.view_generation(),
            ..PagerState::default()
        };
        let outcome = state.advance(feed.filtered_posts(), self.page_size);

        debug!(generation = state.generation, ?outcome, "Pager reset");
        outcome
    }

    fn lock_state(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of one page load. Dropping it, also when the load
/// future is dropped mid-sleep, releases the latch unless a reseed already
/// started a new epoch.
struct InFlight<'a> {
    pager: &'a FeedPager,
    epoch: u64,
    resume: PagerPhase,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.pager.lock_state();
        if state.epoch != self.epoch {
            return;
        }

        if state.phase == PagerPhase::Loading {
            state.phase = self.resume;
        }
        self.pager.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        feed::{FeedStore, tests::posts},
        pager::{FeedPager, LoadOutcome, PagerPhase},
    };
    use portfolio_common::model::{Id, filter::FilterState};
    use std::{sync::Arc, time::Duration};
    use tokio::{sync::RwLock, time::timeout};

    const LATENCY: Duration = Duration::from_millis(300);

    fn setup(count: i64) -> (RwLock<FeedStore>, FeedPager) {
        let feed = FeedStore::new(posts(count));
        let pager = FeedPager::new(15, LATENCY);
        pager.reset(&feed);
        (RwLock::new(feed), pager)
    }

    #[tokio::test(start_paused = true)]
    async fn first_page_is_seeded_synchronously() {
        let (feed, pager) = setup(40);
        let feed = feed.read().await;

        let snapshot = pager.snapshot();
        assert_eq!(snapshot.phase, PagerPhase::IdleMore);
        assert_eq!(snapshot.page, 1);
        assert_eq!(pager.window(&feed), &feed.filtered_posts()[..15]);
        assert!(snapshot.shows_sentinel);
    }

    #[tokio::test(start_paused = true)]
    async fn ninety_five_posts_take_seven_pages() {
        let (feed, pager) = setup(95);

        for expected_pages in 2..=6 {
            assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Loaded(15));
            assert_eq!(pager.snapshot().page, expected_pages);
        }
        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Loaded(5));
        assert_eq!(pager.snapshot().page, 7);
        assert_eq!(pager.snapshot().phase, PagerPhase::IdleMore);

        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Exhausted);
        let snapshot = pager.snapshot();
        assert_eq!(snapshot.phase, PagerPhase::Exhausted);
        assert!(!snapshot.has_more);
        assert!(!snapshot.shows_sentinel);

        let feed = feed.read().await;
        assert_eq!(pager.window(&feed), feed.filtered_posts());
    }

    #[tokio::test(start_paused = true)]
    async fn window_is_always_a_prefix() {
        let (feed, pager) = setup(50);

        let mut previous = 15;
        for _ in 0..5 {
            pager.load_more(&feed).await;
            let feed = feed.read().await;
            let window = pager.window(&feed);

            assert!(window.len() >= previous);
            assert_eq!(window, &feed.filtered_posts()[..window.len()]);
            assert!(window.len() == feed.filtered_posts().len() || window.len() % 15 == 0);
            previous = window.len();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exact_multiple_needs_one_empty_load() {
        let (feed, pager) = setup(30);

        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Loaded(15));
        assert_eq!(pager.snapshot().phase, PagerPhase::IdleMore);

        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Exhausted);
        assert_eq!(pager.snapshot().shown, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_pager_ignores_signals() {
        let (feed, pager) = setup(10);
        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Exhausted);

        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Ignored);
        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Suppressed);
        assert_eq!(pager.snapshot().shown, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_view_shows_no_window_and_no_sentinel() {
        let (feed, pager) = setup(0);

        let snapshot = pager.snapshot();
        assert_eq!(snapshot.phase, PagerPhase::Exhausted);
        assert_eq!(snapshot.shown, 0);
        assert!(!snapshot.shows_sentinel);
        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_loads_are_suppressed() {
        let (feed, pager) = setup(95);
        let feed = Arc::new(feed);
        let pager = Arc::new(pager);

        let first = tokio::spawn({
            let (feed, pager) = (Arc::clone(&feed), Arc::clone(&pager));
            async move { pager.load_more(&feed).await }
        });
        tokio::task::yield_now().await;

        assert!(pager.is_loading());
        assert_eq!(pager.snapshot().phase, PagerPhase::Loading);
        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Suppressed);
        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Ignored);

        assert_eq!(first.await.unwrap(), LoadOutcome::Loaded(15));
        assert!(!pager.is_loading());
        assert_eq!(pager.snapshot().shown, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_during_load_discards_it() {
        let (feed, pager) = setup(95);
        let feed = Arc::new(feed);
        let pager = Arc::new(pager);

        let pending = tokio::spawn({
            let (feed, pager) = (Arc::clone(&feed), Arc::clone(&pager));
            async move { pager.load_more(&feed).await }
        });
        tokio::task::yield_now().await;

        {
            let mut feed = feed.write().await;
            feed.set_filters(FilterState {
                selected_students: vec![Id::new("student-1")],
                ..FilterState::default()
            });
            feed.apply_filters();
            pager.reset(&feed);
        }

        assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
        let feed = feed.read().await;
        assert_eq!(pager.window(&feed), &feed.filtered_posts()[..15]);
        assert_eq!(pager.snapshot().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_frees_the_latch_for_the_next_load() {
        let (feed, pager) = setup(95);
        let feed = Arc::new(feed);
        let pager = Arc::new(pager);

        let stale = tokio::spawn({
            let (feed, pager) = (Arc::clone(&feed), Arc::clone(&pager));
            async move { pager.load_more(&feed).await }
        });
        tokio::task::yield_now().await;

        pager.reset(&*feed.read().await);
        assert!(!pager.is_loading());

        let fresh = tokio::spawn({
            let (feed, pager) = (Arc::clone(&feed), Arc::clone(&pager));
            async move { pager.load_more(&feed).await }
        });

        assert_eq!(stale.await.unwrap(), LoadOutcome::Discarded);
        assert_eq!(fresh.await.unwrap(), LoadOutcome::Loaded(15));
        assert!(!pager.is_loading());
        assert_eq!(pager.snapshot().shown, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_load_releases_the_latch() {
        let (feed, pager) = setup(95);

        let dropped = timeout(Duration::from_millis(10), pager.load_more(&feed)).await;

        assert!(dropped.is_err());
        assert!(!pager.is_loading());
        assert_eq!(pager.snapshot().phase, PagerPhase::IdleMore);
        assert_eq!(pager.snapshot().shown, 15);
        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Loaded(15));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_load_then_reset_pages_again() {
        let (feed, pager) = setup(95);

        assert!(
            timeout(Duration::from_millis(10), pager.load_more(&feed))
                .await
                .is_err()
        );
        {
            let mut feed = feed.write().await;
            feed.set_filters(FilterState {
                selected_students: vec![Id::new("student-1")],
                ..FilterState::default()
            });
            feed.apply_filters();
            pager.reset(&feed);
        }

        assert_eq!(pager.on_proximity(&feed).await, LoadOutcome::Loaded(15));
    }

    #[tokio::test(start_paused = true)]
    async fn unnoticed_feed_change_restarts_paging() {
        let (feed, pager) = setup(40);
        pager.load_more(&feed).await;

        feed.write()
            .await
            .delete_post(&Id::new("post-1"))
            .unwrap();

        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Reset);
        assert_eq!(pager.snapshot().shown, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn disposed_pager_writes_nothing() {
        let (feed, pager) = setup(95);
        let feed = Arc::new(feed);
        let pager = Arc::new(pager);

        let pending = tokio::spawn({
            let (feed, pager) = (Arc::clone(&feed), Arc::clone(&pager));
            async move { pager.load_more(&feed).await }
        });
        tokio::task::yield_now().await;
        pager.dispose();

        assert_eq!(pending.await.unwrap(), LoadOutcome::Discarded);
        assert_eq!(pager.snapshot().shown, 15);
        assert_eq!(pager.load_more(&feed).await, LoadOutcome::Suppressed);
    }
}
