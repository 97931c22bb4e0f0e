use serde::{Deserialize, Serialize};

use crate::cache::{now_epoch_ms, CacheEnvelope, CachedResource, StalenessPolicy};
use crate::client::RecipeApi;
use crate::error::{ApiError, StorageError};
use crate::i18n::Locale;
use crate::storage::{Storage, StorageExt, INGREDIENTS_KEY};
use crate::types::{Ingredient, IngredientCategory, UserSelection};

/// On-disk shape of the ingredient store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedIngredients {
    #[serde(default)]
    locale: Locale,
    #[serde(default)]
    selected: Vec<i32>,
    #[serde(default)]
    categories: Option<CacheEnvelope<Vec<IngredientCategory>>>,
}

/// The user's ingredient selection plus the grouped category cache it
/// resolves against.
#[derive(Debug, Clone)]
pub struct IngredientStore {
    locale: Locale,
    selected: UserSelection,
    categories: CachedResource<Vec<IngredientCategory>>,
}

impl Default for IngredientStore {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl IngredientStore {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            selected: UserSelection::new(),
            categories: CachedResource::new(StalenessPolicy::INGREDIENT_CATEGORIES),
        }
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let saved: SavedIngredients = storage.load(INGREDIENTS_KEY).unwrap_or_default();
        Self {
            locale: saved.locale,
            selected: saved.selected.into_iter().collect(),
            categories: CachedResource::with_envelope(
                StalenessPolicy::INGREDIENT_CATEGORIES,
                saved.categories,
            ),
        }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        let saved = SavedIngredients {
            locale: self.locale,
            selected: self.selected.iter().copied().collect(),
            categories: self.categories.envelope().cloned(),
        };
        storage.save(INGREDIENTS_KEY, &saved)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch locale. Ingredient ids are not stable across locales, so a
    /// real change discards both the selection and the cached categories.
    pub fn set_locale(&mut self, locale: Locale) -> bool {
        if self.locale == locale {
            return false;
        }
        tracing::info!(
            from = %self.locale,
            to = %locale,
            discarded = self.selected.len(),
            "locale changed, clearing ingredient selection"
        );
        self.locale = locale;
        self.selected.clear();
        self.categories.invalidate();
        true
    }

    pub fn selected(&self) -> &UserSelection {
        &self.selected
    }

    pub fn is_selected(&self, id: i32) -> bool {
        self.selected.contains(&id)
    }

    pub fn select(&mut self, id: i32) -> bool {
        self.selected.insert(id)
    }

    pub fn deselect(&mut self, id: i32) -> bool {
        self.selected.remove(&id)
    }

    /// Flip one id and return whether it is now selected.
    pub fn toggle(&mut self, id: i32) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Cached categories for the current locale, fresh or not.
    pub fn categories(&self) -> &[IngredientCategory] {
        match self.categories.envelope() {
            Some(env) if env.locale == self.locale => &env.payload,
            _ => &[],
        }
    }

    pub fn categories_stale(&self, now_ms: i64) -> bool {
        self.categories.is_stale(self.locale, now_ms)
    }

    pub fn store_categories(&mut self, categories: Vec<IngredientCategory>, now_ms: i64) {
        self.categories.store(categories, self.locale, now_ms);
        self.prune_unknown();
    }

    /// Every cached ingredient, flattened in category order.
    pub fn all_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.categories().iter().flat_map(|c| c.ingredients.iter())
    }

    pub fn find(&self, id: i32) -> Option<&Ingredient> {
        self.all_ingredients().find(|i| i.id == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Ingredient> {
        let wanted = name.trim().to_lowercase();
        self.all_ingredients()
            .find(|i| i.name.trim().to_lowercase() == wanted)
    }

    /// Selected ids resolved to full ingredients. Ids missing from the
    /// cache are skipped.
    pub fn selected_ingredients(&self) -> Vec<Ingredient> {
        self.all_ingredients()
            .filter(|i| self.selected.contains(&i.id))
            .cloned()
            .collect()
    }

    /// Refetch the grouped categories when the cache is stale.
    pub async fn refresh_categories(
        &mut self,
        api: &dyn RecipeApi,
    ) -> Result<&[IngredientCategory], ApiError> {
        let locale = self.locale;
        let was_stale = self.categories_stale(now_epoch_ms());
        self.categories
            .get_or_refresh(locale, || api.grouped_ingredients(locale))
            .await?;
        if was_stale {
            self.prune_unknown();
        }
        Ok(self.categories())
    }

    /// Drop selected ids that no longer exist in the catalog.
    fn prune_unknown(&mut self) {
        if self.categories().is_empty() {
            return;
        }
        let known: UserSelection = self.all_ingredients().map(|i| i.id).collect();
        let before = self.selected.len();
        self.selected.retain(|id| known.contains(id));
        if self.selected.len() != before {
            tracing::debug!(
                removed = before - self.selected.len(),
                "pruned unknown ingredient ids"
            );
        }
    }
}
