use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::i18n::Locale;
use crate::storage::{Storage, StorageExt, FILTERS_KEY};
use crate::types::{RecipeQuery, SortOrder, TimeBucket};

/// Search and filter state for recipe browsing.
///
/// Every setter except [`FilterStore::set_page`] resets the page to 1, so a
/// filter change always restarts accumulation from the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStore {
    #[serde(default)]
    meal_type: Option<String>,
    #[serde(default)]
    kitchen: Option<String>,
    #[serde(default)]
    diets: Vec<String>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    sort: SortOrder,
    #[serde(default)]
    by_time: Option<TimeBucket>,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

impl Default for FilterStore {
    fn default() -> Self {
        Self {
            meal_type: None,
            kitchen: None,
            diets: Vec::new(),
            search: None,
            sort: SortOrder::default(),
            by_time: None,
            page: 1,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FilterStore {
    pub fn load(storage: &dyn Storage) -> Self {
        storage.load(FILTERS_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        storage.save(FILTERS_KEY, self)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn meal_type(&self) -> Option<&str> {
        self.meal_type.as_deref()
    }

    pub fn kitchen(&self) -> Option<&str> {
        self.kitchen.as_deref()
    }

    pub fn diets(&self) -> &[String] {
        &self.diets
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn by_time(&self) -> Option<TimeBucket> {
        self.by_time
    }

    pub fn set_meal_type(&mut self, meal_type: Option<String>) {
        self.meal_type = non_empty(meal_type);
        self.page = 1;
    }

    pub fn set_kitchen(&mut self, kitchen: Option<String>) {
        self.kitchen = non_empty(kitchen);
        self.page = 1;
    }

    pub fn set_diets(&mut self, diets: Vec<String>) {
        let mut diets: Vec<String> = diets
            .into_iter()
            .filter_map(|d| non_empty(Some(d)))
            .collect();
        diets.sort();
        diets.dedup();
        self.diets = diets;
        self.page = 1;
    }

    pub fn toggle_diet(&mut self, diet: &str) {
        if let Some(pos) = self.diets.iter().position(|d| d == diet) {
            self.diets.remove(pos);
        } else {
            let mut diets = self.diets.clone();
            diets.push(diet.to_string());
            self.set_diets(diets);
            return;
        }
        self.page = 1;
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.search = non_empty(search);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_by_time(&mut self, by_time: Option<TimeBucket>) {
        self.by_time = by_time;
        self.page = 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_filters(&self) -> bool {
        self.meal_type.is_some()
            || self.kitchen.is_some()
            || !self.diets.is_empty()
            || self.search.is_some()
            || self.by_time.is_some()
    }

    /// Build the listing request for the current page.
    pub fn to_query(&self, locale: Locale, limit: i64) -> RecipeQuery {
        let limit = limit.max(1);
        RecipeQuery {
            locale,
            limit,
            offset: (self.page.max(1) as i64 - 1) * limit,
            meal_type: self.meal_type.clone(),
            kitchen: self.kitchen.clone(),
            diets: self.diets.clone(),
            search: self.search.clone(),
            sort: self.sort,
            by_time: self.by_time,
        }
    }
}
