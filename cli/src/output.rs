//! Plain-text rendering of API types.

use pantry_core::{
    message, IngredientCategory, Locale, MatchResult, MessageKey, RecipeDetail, RecipeSummary,
    Tag, TagLists, UserSelection,
};
use std::io::{self, Write};

fn tag_names(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn recipe_line(out: &mut dyn Write, recipe: &RecipeSummary) -> io::Result<()> {
    write!(out, "{:>5}  {}", recipe.id, recipe.title)?;
    if let Some(minutes) = recipe.cook_time_minutes {
        write!(out, " ({} min)", minutes)?;
    }
    if !recipe.tags.is_empty() {
        write!(out, " [{}]", tag_names(&recipe.tags))?;
    }
    writeln!(out)
}

pub fn recipe_list(out: &mut dyn Write, recipes: &[RecipeSummary], locale: Locale) -> io::Result<()> {
    if recipes.is_empty() {
        return writeln!(out, "{}", message(locale, MessageKey::NoResults));
    }
    for recipe in recipes {
        recipe_line(out, recipe)?;
    }
    Ok(())
}

pub fn recipe_detail(
    out: &mut dyn Write,
    recipe: &RecipeDetail,
    matched: Option<&MatchResult>,
    locale: Locale,
) -> io::Result<()> {
    writeln!(out, "{} (#{})", recipe.title, recipe.id)?;
    if let Some(description) = &recipe.description {
        writeln!(out, "{}", description)?;
    }
    let mut facts = Vec::new();
    if let Some(minutes) = recipe.cook_time_minutes {
        facts.push(format!("{} min", minutes));
    }
    if let Some(servings) = recipe.servings {
        facts.push(format!("serves {}", servings));
    }
    if !recipe.tags.is_empty() {
        facts.push(tag_names(&recipe.tags));
    }
    if !facts.is_empty() {
        writeln!(out, "{}", facts.join(" | "))?;
    }
    writeln!(out)?;

    match matched {
        Some(result) => {
            writeln!(
                out,
                "{}% ({}/{})",
                result.match_percentage, result.owned_count, result.total_count
            )?;
            writeln!(out, "{}:", message(locale, MessageKey::Owned))?;
            for line in &result.owned_lines {
                writeln!(out, "  + {}", line.line)?;
            }
            writeln!(out, "{}:", message(locale, MessageKey::Missing))?;
            for line in &result.missing_lines {
                writeln!(out, "  - {}", line.line)?;
            }
        }
        None => {
            for line in &recipe.ingredients {
                writeln!(out, "  * {}", line.line)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", recipe.instructions)
}

pub fn categories(
    out: &mut dyn Write,
    categories: &[IngredientCategory],
    selected: &UserSelection,
) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{}", category.name)?;
        for ingredient in &category.ingredients {
            let mark = if selected.contains(&ingredient.id) { "x" } else { " " };
            writeln!(out, "  [{}] {:>4}  {}", mark, ingredient.id, ingredient.name)?;
        }
    }
    Ok(())
}

pub fn tag_lists(out: &mut dyn Write, tags: &TagLists) -> io::Result<()> {
    for (heading, list) in [
        ("meal_type", &tags.meal_types),
        ("kitchen", &tags.kitchens),
        ("diet", &tags.diets),
    ] {
        writeln!(out, "{}:", heading)?;
        for tag in list {
            writeln!(out, "  {:<14} {}", tag.slug, tag.name)?;
        }
    }
    Ok(())
}
