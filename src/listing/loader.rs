//! Incremental list loading
//!
//! A [`ListState`] holds the summaries loaded so far plus the cursor of the
//! next page. It only ever grows by appending whole pages; a failed fetch
//! leaves it untouched so the same cursor can be retried.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::SummaryRecord;

/// Boxed cause of a failed page fetch
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while growing a list
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch the next page: {0}")]
    Fetch(#[source] BoxError),

    #[error("no more pages to load")]
    NoMorePages,

    #[error("another page load is already in flight")]
    ConcurrentLoad,

    #[error("page load was cancelled")]
    Cancelled,
}

/// One page of summaries as returned by a content source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    /// Opaque token of the following page; `None` or empty on the last page
    pub next_cursor: Option<String>,
    pub items: Vec<SummaryRecord>,
}

impl ListPage {
    pub fn new(items: Vec<SummaryRecord>, next_cursor: Option<String>) -> Self {
        Self { next_cursor, items }
    }
}

/// Summaries loaded so far and the cursor of the next page.
///
/// `has_more()` is true exactly when a non-empty cursor is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    items: Vec<SummaryRecord>,
    cursor: Option<String>,
}

impl ListState {
    /// Build the state from the first page
    pub fn initialize(first_page: ListPage) -> Self {
        let mut state = Self::default();
        state.append(first_page);
        state
    }

    pub fn items(&self) -> &[SummaryRecord] {
        &self.items
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fetch the page at the current cursor and return the grown state.
    ///
    /// `self` is never modified: on any error the caller still holds the
    /// previous state and may retry with the same cursor.
    pub async fn load_next<F, Fut, E>(&self, fetch_page: F) -> Result<ListState, LoadError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<ListPage, E>>,
        E: Into<BoxError>,
    {
        let cursor = self.cursor.clone().ok_or(LoadError::NoMorePages)?;

        let page = fetch_page(cursor)
            .await
            .map_err(|e| LoadError::Fetch(e.into()))?;

        let mut next = self.clone();
        let appended = next.append(page);
        tracing::debug!(
            "Loaded {} more items ({} total, more pages: {})",
            appended,
            next.len(),
            next.has_more()
        );
        Ok(next)
    }

    /// Append a page, skipping ids that are already loaded
    fn append(&mut self, page: ListPage) -> usize {
        let mut seen: HashSet<String> = self.items.iter().map(|i| i.id.clone()).collect();
        let before = self.items.len();

        for item in page.items {
            if seen.insert(item.id.clone()) {
                self.items.push(item);
            } else {
                tracing::debug!("Skipping duplicate item {:?}", item.id);
            }
        }

        self.cursor = page.next_cursor.filter(|c| !c.trim().is_empty());
        self.items.len() - before
    }
}

/// A list state shared by reference that admits one load at a time.
///
/// Overlapping calls to [`load_next`](Self::load_next) fail with
/// [`LoadError::ConcurrentLoad`] instead of racing on the cursor.
#[derive(Debug)]
pub struct PaginatedListLoader {
    state: Mutex<ListState>,
    loading: AtomicBool,
}

impl PaginatedListLoader {
    /// Create a loader from the first page
    pub fn new(first_page: ListPage) -> Self {
        Self::from_state(ListState::initialize(first_page))
    }

    pub fn from_state(state: ListState) -> Self {
        Self {
            state: Mutex::new(state),
            loading: AtomicBool::new(false),
        }
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> ListState {
        self.lock().clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a load is currently in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load the next page and return the new state
    pub async fn load_next<F, Fut, E>(&self, fetch_page: F) -> Result<ListState, LoadError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<ListPage, E>>,
        E: Into<BoxError>,
    {
        let _in_flight = InFlight::acquire(&self.loading)?;

        let current = self.snapshot();
        let next = current.load_next(fetch_page).await?;
        *self.lock() = next.clone();
        Ok(next)
    }

    /// Like [`load_next`](Self::load_next), but gives up with
    /// [`LoadError::Cancelled`] as soon as `cancel` completes. A cancelled
    /// load leaves the state unchanged.
    pub async fn load_next_until<F, Fut, E, C>(
        &self,
        fetch_page: F,
        cancel: C,
    ) -> Result<ListState, LoadError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<ListPage, E>>,
        E: Into<BoxError>,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => Err(LoadError::Cancelled),
            result = self.load_next(fetch_page) => result,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a load as in flight until dropped, including when the owning
/// future is dropped mid-fetch.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, LoadError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoadError::ConcurrentLoad)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
