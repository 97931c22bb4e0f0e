use anyhow::{bail, Result};
use pantry_core::{message, AuthStore, LanguageStore, MessageKey, RecipeApi, Storage};
use std::io::Write;

use crate::output;

fn require_login(storage: &dyn Storage) -> Result<()> {
    if !AuthStore::load(storage).is_authenticated() {
        let locale = LanguageStore::load(storage).locale;
        bail!("{}", message(locale, MessageKey::LoginRequired));
    }
    Ok(())
}

pub async fn list(api: &dyn RecipeApi, storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    require_login(storage)?;
    let locale = LanguageStore::load(storage).locale;
    let recipes = api.favorites(locale).await?;
    output::recipe_list(out, &recipes, locale)?;
    Ok(())
}

pub async fn add(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    recipe_id: i32,
) -> Result<()> {
    require_login(storage)?;
    api.add_favorite(recipe_id).await?;
    writeln!(out, "Saved #{}", recipe_id)?;
    Ok(())
}

pub async fn remove(
    api: &dyn RecipeApi,
    storage: &dyn Storage,
    out: &mut dyn Write,
    recipe_id: i32,
) -> Result<()> {
    require_login(storage)?;
    api.remove_favorite(recipe_id).await?;
    writeln!(out, "Removed #{}", recipe_id)?;
    Ok(())
}
