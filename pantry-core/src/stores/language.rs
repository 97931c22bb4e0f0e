use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::i18n::Locale;
use crate::storage::{Storage, StorageExt, LANGUAGE_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStore {
    pub locale: Locale,
}

impl LanguageStore {
    pub fn load(storage: &dyn Storage) -> Self {
        storage.load(LANGUAGE_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        storage.save(LANGUAGE_KEY, self)
    }

    /// Returns true when the locale actually changed.
    pub fn set_locale(&mut self, locale: Locale) -> bool {
        if self.locale == locale {
            return false;
        }
        tracing::info!(from = %self.locale, to = %locale, "switching language");
        self.locale = locale;
        true
    }
}
