use crate::cache::{CacheEnvelope, CachedResource, StalenessPolicy};
use crate::client::RecipeApi;
use crate::error::{ApiError, StorageError};
use crate::i18n::Locale;
use crate::storage::{Storage, StorageExt, TAGS_KEY};
use crate::types::TagLists;

/// Cached meal-type, kitchen and diet tags.
#[derive(Debug, Clone)]
pub struct TagStore {
    tags: CachedResource<TagLists>,
}

impl Default for TagStore {
    fn default() -> Self {
        Self {
            tags: CachedResource::new(StalenessPolicy::TAGS),
        }
    }
}

impl TagStore {
    pub fn load(storage: &dyn Storage) -> Self {
        let envelope: Option<CacheEnvelope<TagLists>> = storage.load(TAGS_KEY);
        Self {
            tags: CachedResource::with_envelope(StalenessPolicy::TAGS, envelope),
        }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        match self.tags.envelope() {
            Some(envelope) => storage.save(TAGS_KEY, envelope),
            None => storage.remove(TAGS_KEY),
        }
    }

    pub fn is_stale(&self, locale: Locale, now_ms: i64) -> bool {
        self.tags.is_stale(locale, now_ms)
    }

    /// Cached tags for `locale`, even if past their TTL.
    pub fn cached(&self, locale: Locale) -> Option<&TagLists> {
        self.tags
            .envelope()
            .filter(|env| env.locale == locale)
            .map(|env| &env.payload)
    }

    pub fn store(&mut self, tags: TagLists, locale: Locale, now_ms: i64) {
        self.tags.store(tags, locale, now_ms);
    }

    pub async fn refresh(&mut self, api: &dyn RecipeApi, locale: Locale) -> Result<TagLists, ApiError> {
        self.tags
            .get_or_refresh(locale, || api.list_tags(locale))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::now_epoch_ms;
    use crate::storage::MemoryStorage;
    use crate::types::{Tag, TagKind};

    fn tags() -> TagLists {
        TagLists::from_tags(vec![Tag {
            id: 1,
            slug: "breakfast".to_string(),
            name: "Breakfast".to_string(),
            kind: TagKind::MealType,
        }])
    }

    #[test]
    fn test_uses_thirty_day_ttl() {
        let mut store = TagStore::default();
        let day_ms = 24 * 60 * 60 * 1000;
        store.store(tags(), Locale::En, 0);
        assert!(!store.is_stale(Locale::En, 20 * day_ms));
        assert!(store.is_stale(Locale::En, 31 * day_ms));
        assert!(store.is_stale(Locale::Ru, 0));
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut store = TagStore::default();
        store.save(&storage).unwrap();
        assert!(storage.keys().is_empty());

        store.store(tags(), Locale::En, now_epoch_ms());
        store.save(&storage).unwrap();
        let loaded = TagStore::load(&storage);
        assert_eq!(loaded.cached(Locale::En), Some(&tags()));
        assert_eq!(loaded.cached(Locale::Ru), None);
    }
}
