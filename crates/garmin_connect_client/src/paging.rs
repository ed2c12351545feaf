//! Pull-based enumeration of activity history across search pages.

use crate::{ActivityRecord, ActivitySource, GarminError, Ordering};
use std::collections::VecDeque;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Lazily walks the activity history of a source, one page at a time.
///
/// Nothing is fetched until [`next`](Self::next) is called, and a new page is
/// only requested once the previous one has been consumed.
pub struct ActivityPager<'a, S: ?Sized> {
    source: &'a S,
    ordering: Ordering,
    limit: Option<u32>,
    page_size: u32,
    buffer: VecDeque<serde_json::Value>,
    /// Newest-first: index of the next page start. Oldest-first: exclusive end
    /// of the next window, counted from the newest activity.
    cursor: u32,
    total: Option<u32>,
    yielded: u32,
    exhausted: bool,
}

impl<'a, S: ActivitySource + ?Sized> ActivityPager<'a, S> {
    pub fn new(source: &'a S, ordering: Ordering, limit: Option<u32>) -> Self {
        Self {
            source,
            ordering,
            limit,
            page_size: DEFAULT_PAGE_SIZE,
            buffer: VecDeque::new(),
            cursor: 0,
            total: None,
            yielded: 0,
            exhausted: false,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of records handed out so far.
    pub fn yielded(&self) -> u32 {
        self.yielded
    }

    /// Next activity, or `Ok(None)` once the limit or the end of history is reached.
    pub async fn next(&mut self) -> Result<Option<ActivityRecord>, GarminError> {
        if self.limit.is_some_and(|l| self.yielded >= l) {
            return Ok(None);
        }
        if self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        let Some(raw) = self.buffer.pop_front() else {
            return Ok(None);
        };
        let record = ActivityRecord::new(raw)?;
        self.yielded += 1;
        Ok(Some(record))
    }

    fn wanted(&self) -> u32 {
        match self.limit {
            Some(l) => (l - self.yielded).min(self.page_size),
            None => self.page_size,
        }
    }

    async fn fill(&mut self) -> Result<(), GarminError> {
        match self.ordering {
            Ordering::NewestFirst => self.fill_newest_first().await,
            Ordering::OldestFirst => self.fill_oldest_first().await,
        }
    }

    async fn fill_newest_first(&mut self) -> Result<(), GarminError> {
        let wanted = self.wanted();
        tracing::debug!(start = self.cursor, limit = wanted, "fetching activity page");
        let page = self.source.fetch_activity_page(self.cursor, wanted).await?;
        let got = page.activities.len() as u32;
        self.cursor += got;
        if got < wanted || self.cursor >= page.total_found {
            self.exhausted = true;
        }
        self.buffer.extend(page.activities);
        Ok(())
    }

    async fn fill_oldest_first(&mut self) -> Result<(), GarminError> {
        let total = match self.total {
            Some(t) => t,
            None => {
                let probe = self.source.fetch_activity_page(0, 1).await?;
                tracing::debug!(total = probe.total_found, "activity history size");
                self.total = Some(probe.total_found);
                self.cursor = probe.total_found;
                probe.total_found
            }
        };
        if self.cursor == 0 || total == 0 {
            self.exhausted = true;
            return Ok(());
        }
        let end = self.cursor;
        let start = end.saturating_sub(self.wanted());
        tracing::debug!(start, limit = end - start, "fetching activity page");
        let page = self.source.fetch_activity_page(start, end - start).await?;
        if page.activities.is_empty() {
            self.exhausted = true;
            return Ok(());
        }
        self.cursor = start;
        if start == 0 {
            self.exhausted = true;
        }
        self.buffer.extend(page.activities.into_iter().rev());
        Ok(())
    }
}
