use tracing::{debug, trace};

use crate::domain::{DEFAULT_PAGE_SIZE, ListKind};
use crate::items::ListItem;
use crate::pager::{Pager, build_pager};

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Source indices of the items matching `query` (case-insensitive) and the
/// optional extra predicate. Source order is kept.
pub fn filter_rows<T: ListItem>(
    items: &[T],
    query: &str,
    extra: Option<&dyn Fn(&T) -> bool>,
) -> Vec<usize> {
    let needle = query.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| needle.is_empty() || item.matches(&needle))
        .filter(|(_, item)| extra.is_none_or(|pred| pred(*item)))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn filter<'a, T: ListItem>(
    items: &'a [T],
    query: &str,
    extra: Option<&dyn Fn(&T) -> bool>,
) -> Vec<&'a T> {
    filter_rows(items, query, extra)
        .into_iter()
        .map(|idx| &items[idx])
        .collect()
}

/// The `page`-th window (1-based) of `items`. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = std::cmp::min(start.saturating_add(page_size), items.len());
    &items[start..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// View state of one list kind: the source collection plus everything
/// needed to derive the visible page from it.
pub struct ListView<T: ListItem> {
    kind: ListKind,
    source: Vec<T>,
    load_state: LoadState,
    query: String,
    status_filter: Option<T::Status>,
    rows: Vec<usize>, // Filtered position -> source index
    page: usize,
    page_size: usize,
}

impl<T: ListItem> ListView<T> {
    pub fn new(kind: ListKind, page_size: usize) -> Self {
        ListView {
            kind,
            source: Vec::new(),
            load_state: LoadState::Loading,
            query: String::new(),
            status_filter: None,
            rows: Vec::new(),
            page: 1,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn load(&mut self, items: Vec<T>) {
        debug!("Loaded {} {}", items.len(), self.kind.as_str());
        self.source = items;
        self.load_state = LoadState::Loaded;
        self.refilter();
    }

    pub fn set_loading(&mut self) {
        self.load_state = LoadState::Loading;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.load_state = LoadState::Failed(reason.into());
        self.source.clear();
        self.rows.clear();
        self.page = 1;
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status_filter(&self) -> Option<T::Status> {
        self.status_filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.rows.len(), self.page_size)
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.page = 1;
        self.refilter();
    }

    pub fn set_status_filter(&mut self, status: Option<T::Status>) {
        self.status_filter = status;
        self.page = 1;
        self.refilter();
    }

    /// Moves to `page`, clamped into the valid range.
    pub fn goto_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
        trace!("{} page {}/{}", self.kind.as_str(), self.page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.goto_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.goto_page(self.page.saturating_sub(1));
    }

    pub fn last_page(&mut self) {
        self.goto_page(self.total_pages());
    }

    /// Items of the current page, each with its 0-based position in the
    /// filtered collection.
    pub fn page_items(&self) -> Vec<(usize, &T)> {
        let offset = (self.page - 1) * self.page_size;
        paginate(&self.rows, self.page, self.page_size)
            .iter()
            .enumerate()
            .map(|(i, &src)| (offset + i, &self.source[src]))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.source.iter().find(|item| item.id() == id)
    }

    /// Mutates the item with `id` in place and re-derives the view.
    /// Unknown ids are ignored.
    pub fn update<F: FnOnce(&mut T)>(&mut self, id: &str, change: F) -> bool {
        match self.source.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                change(item);
                self.refilter();
                true
            }
            None => {
                trace!("{} {id} is gone, nothing to update", self.kind.as_str());
                false
            }
        }
    }

    /// Splices the item with `id` out of the source. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.source.iter().position(|item| item.id() == id)?;
        let removed = self.source.remove(pos);
        self.refilter();
        Some(removed)
    }

    pub fn pager(&self) -> Pager {
        build_pager(self.rows.len(), self.page, self.page_size)
    }

    fn refilter(&mut self) {
        let status = self.status_filter;
        let by_status: &dyn Fn(&T) -> bool =
            &move |item: &T| status.is_none_or(|s| item.status() == s);
        self.rows = filter_rows(&self.source, &self.query, Some(by_status));
        // Keep the page inside the new range after a mutation or reload.
        self.page = self.page.clamp(1, self.total_pages().max(1));
        trace!(
            "{}: {} of {} match '{}' / {:?}",
            self.kind.as_str(),
            self.rows.len(),
            self.source.len(),
            self.query,
            self.status_filter
        );
    }
}
