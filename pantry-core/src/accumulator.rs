//! Merges successive result pages into one de-duplicated list for
//! "show more" style browsing.

use std::collections::HashSet;

use crate::types::HasId;

#[derive(Debug, Clone)]
pub struct PageAccumulator<T> {
    items: Vec<T>,
    seen: HashSet<i32>,
    page: u32,
    total: Option<i64>,
}

impl<T> Default for PageAccumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            page: 0,
            total: None,
        }
    }
}

impl<T: HasId> PageAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one page of results and return how many items were added.
    ///
    /// Page 1 replaces everything accumulated so far; later pages append
    /// only ids not already present, in arrival order. Repeated ids within
    /// any page, page 1 included, keep their first occurrence.
    pub fn apply(&mut self, page: u32, results: Vec<T>, total: Option<i64>) -> usize {
        if page <= 1 {
            self.items.clear();
            self.seen.clear();
            self.total = None;
        }

        let before = self.items.len();
        for item in results {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }

        self.page = page.max(1);
        if total.is_some() {
            self.total = total;
        }

        let added = self.items.len() - before;
        tracing::trace!(page, added, len = self.items.len(), "accumulated page");
        added
    }

    /// Whether another page is worth requesting.
    ///
    /// Without a known total, assume more exists once anything has loaded.
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => (self.items.len() as i64) < total,
            None => self.page > 1 || !self.items.is_empty(),
        }
    }

    /// Forget everything, e.g. after a filter change.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.page = 0;
        self.total = None;
    }

    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Option<i64> {
        self.total
    }
}
