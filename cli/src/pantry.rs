//! The ingredient selection, language and tag commands.

use anyhow::{bail, Result};
use pantry_core::{IngredientStore, LanguageStore, Locale, RecipeApi, Storage, TagStore};
use std::io::Write;

use crate::output;

/// Load the ingredient store for the current language, refreshing its
/// category cache when stale. A failed refresh falls back to the cache.
pub async fn load_ingredients(api: &dyn RecipeApi, storage: &dyn Storage) -> Result<IngredientStore> {
    let locale = LanguageStore::load(storage).locale;
    let mut store = IngredientStore::load(storage);
    store.set_locale(locale);

    let refreshed = store.refresh_categories(api).await.map(|_| ());
    if let Err(e) = refreshed {
        if store.categories().is_empty() {
            return Err(e.into());
        }
        tracing::warn!(error = %e, "using cached ingredient categories");
    }
    store.save(storage)?;
    Ok(store)
}

/// Resolve a CLI argument to an ingredient id: a number is taken as an id,
/// anything else is looked up by name.
fn resolve(store: &IngredientStore, arg: &str) -> Option<i32> {
    match arg.trim().parse::<i32>() {
        Ok(id) => store.find(id).map(|i| i.id),
        Err(_) => store.find_by_name(arg).map(|i| i.id),
    }
}

pub async fn list(api: &dyn RecipeApi, storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let store = load_ingredients(api, storage).await?;
    output::categories(out, store.categories(), store.selected())?;
    writeln!(out, "{} selected", store.selected().len())?;
    Ok(())
}

pub async fn select(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    items: &[String],
) -> Result<()> {
    let mut store = load_ingredients(api, storage).await?;

    let mut unknown = Vec::new();
    for item in items {
        match resolve(&store, item) {
            Some(id) => {
                store.select(id);
            }
            None => unknown.push(item.as_str()),
        }
    }
    store.save(storage)?;

    if !unknown.is_empty() {
        bail!("Unknown ingredients: {}", unknown.join(", "));
    }
    writeln!(out, "{} selected", store.selected().len())?;
    Ok(())
}

pub async fn unselect(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    items: &[String],
) -> Result<()> {
    let mut store = load_ingredients(api, storage).await?;
    for item in items {
        if let Some(id) = resolve(&store, item) {
            store.deselect(id);
        }
    }
    store.save(storage)?;
    writeln!(out, "{} selected", store.selected().len())?;
    Ok(())
}

pub fn clear(storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let mut store = IngredientStore::load(storage);
    store.clear();
    store.save(storage)?;
    writeln!(out, "0 selected")?;
    Ok(())
}

/// Print or switch the language. Switching drops the ingredient selection,
/// whose ids only make sense in the old language.
pub fn lang(storage: &dyn Storage, out: &mut dyn Write, locale: Option<Locale>) -> Result<()> {
    let mut language = LanguageStore::load(storage);
    let Some(locale) = locale else {
        writeln!(out, "{}", language.locale)?;
        return Ok(());
    };

    if language.set_locale(locale) {
        language.save(storage)?;
        let mut ingredients = IngredientStore::load(storage);
        ingredients.set_locale(locale);
        ingredients.save(storage)?;
    }
    writeln!(out, "{}", locale)?;
    Ok(())
}

pub async fn tags(api: &dyn RecipeApi, storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let locale = LanguageStore::load(storage).locale;
    let mut store = TagStore::load(storage);

    let tags = match store.refresh(api, locale).await {
        Ok(tags) => tags,
        Err(e) => match store.cached(locale) {
            Some(cached) => {
                tracing::warn!(error = %e, "using cached tags");
                cached.clone()
            }
            None => return Err(e.into()),
        },
    };
    store.save(storage)?;
    output::tag_lists(out, &tags)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{Ingredient, IngredientCategory, MemoryStorage, MockApi, MockFailure};

    fn category(name: &str, items: &[(i32, &str)]) -> IngredientCategory {
        IngredientCategory {
            name: name.to_string(),
            ingredients: items
                .iter()
                .map(|(id, name)| Ingredient {
                    id: *id,
                    name: name.to_string(),
                    category: None,
                })
                .collect(),
        }
    }

    fn api() -> MockApi {
        MockApi::new()
            .with_categories(
                Locale::En,
                vec![
                    category("Vegetables", &[(1, "tomato"), (2, "onion")]),
                    category("Pantry", &[(12, "pasta"), (13, "olive oil")]),
                ],
            )
            .with_categories(Locale::Ru, vec![category("Овощи", &[(101, "помидор")])])
    }

    #[tokio::test]
    async fn test_select_by_name_and_id() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();

        select(&api, &storage, &mut out, &["Olive Oil".to_string(), "1".to_string()])
            .await
            .unwrap();
        let store = IngredientStore::load(&storage);
        assert!(store.is_selected(13));
        assert!(store.is_selected(1));

        unselect(&api, &storage, &mut out, &["tomato".to_string()])
            .await
            .unwrap();
        assert!(!IngredientStore::load(&storage).is_selected(1));

        // Categories were cached by the first call
        assert_eq!(api.call_count("grouped_ingredients"), 1);
    }

    #[tokio::test]
    async fn test_unknown_ingredient_is_reported() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();

        let err = select(&api, &storage, &mut out, &["pasta".to_string(), "saffron".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("saffron"));
        // The known one still sticks
        assert!(IngredientStore::load(&storage).is_selected(12));
    }

    #[tokio::test]
    async fn test_language_switch_clears_selection() {
        let api = api();
        let storage = MemoryStorage::new();
        let mut out = Vec::new();

        select(&api, &storage, &mut out, &["pasta".to_string()])
            .await
            .unwrap();
        lang(&storage, &mut out, Some(Locale::Ru)).unwrap();
        assert!(IngredientStore::load(&storage).selected().is_empty());

        let mut out = Vec::new();
        list(&api, &storage, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("помидор"));
        assert!(!text.contains("pasta"));
    }

    #[tokio::test]
    async fn test_list_without_cache_propagates_failure() {
        let api = MockApi::new().with_failure("grouped_ingredients", MockFailure::ConnectionRefused);
        let storage = MemoryStorage::new();
        let mut out = Vec::new();
        assert!(list(&api, &storage, &mut out).await.is_err());
    }
}
