//! Owned/missing classification of a recipe's ingredient lines.
//!
//! Matching is a cheap containment heuristic over free-text lines
//! ("2 tbsp olive oil" vs. "olive oil"). False positives and negatives
//! are accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{Ingredient, RecipeIngredientLine};

/// Staples treated as always available, in every supported language.
pub const DEFAULT_PANTRY: &[&str] = &["salt", "pepper", "water", "соль", "перец", "вода"];

/// Outcome of matching one recipe against the user's ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MatchResult {
    pub owned_lines: Vec<RecipeIngredientLine>,
    pub missing_lines: Vec<RecipeIngredientLine>,
    /// 0-100
    pub match_percentage: u8,
    pub total_count: usize,
    pub owned_count: usize,
}

impl MatchResult {
    pub fn is_complete(&self) -> bool {
        self.missing_lines.is_empty()
    }
}

/// Why a line counted as owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchReason {
    Id,
    Name,
    MatchedName,
    DefaultPantry,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn contains_either_way(text: &str, names: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    names
        .iter()
        .any(|name| text.contains(name.as_str()) || name.contains(text))
}

/// Owned ingredients, pre-normalized for repeated lookups.
struct OwnedSet {
    ids: HashSet<i32>,
    names: Vec<String>,
}

impl OwnedSet {
    fn new(user_ingredients: &[Ingredient]) -> Self {
        Self {
            ids: user_ingredients.iter().map(|i| i.id).collect(),
            names: user_ingredients
                .iter()
                .map(|i| normalize(&i.name))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    fn classify(&self, line: &RecipeIngredientLine) -> Option<MatchReason> {
        if line.ingredient_id.is_some_and(|id| self.ids.contains(&id)) {
            return Some(MatchReason::Id);
        }

        let text = normalize(&line.line);
        if contains_either_way(&text, &self.names) {
            return Some(MatchReason::Name);
        }

        if let Some(matched) = line.matched_name.as_deref().map(normalize) {
            if contains_either_way(&matched, &self.names) {
                return Some(MatchReason::MatchedName);
            }
        }

        if DEFAULT_PANTRY.iter().any(|staple| text.contains(staple)) {
            return Some(MatchReason::DefaultPantry);
        }

        None
    }
}

/// Classify a single line against the user's ingredients.
///
/// Rules are tried in order and the first hit wins, so an id match takes
/// priority over whatever the text says.
#[cfg(test)]
fn classify_line(
    line: &RecipeIngredientLine,
    user_ingredients: &[Ingredient],
) -> Option<MatchReason> {
    OwnedSet::new(user_ingredients).classify(line)
}

/// Partition `recipe_lines` into owned and missing, preserving order.
pub fn calculate_ingredient_match(
    recipe_lines: &[RecipeIngredientLine],
    user_ingredients: &[Ingredient],
) -> MatchResult {
    let owned = OwnedSet::new(user_ingredients);

    let (owned_lines, missing_lines): (Vec<_>, Vec<_>) = recipe_lines
        .iter()
        .cloned()
        .partition(|line| owned.classify(line).is_some());

    let total_count = recipe_lines.len();
    let owned_count = owned_lines.len();

    MatchResult {
        owned_lines,
        missing_lines,
        match_percentage: match_percentage(owned_count, total_count),
        total_count,
        owned_count,
    }
}

/// `round(owned / total * 100)`, or 0 for an empty recipe.
pub fn match_percentage(owned_count: usize, total_count: usize) -> u8 {
    if total_count == 0 {
        return 0;
    }
    let pct = (owned_count as f64 / total_count as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: i32, name: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            category: None,
        }
    }

    fn lines(texts: &[&str]) -> Vec<RecipeIngredientLine> {
        texts.iter().map(|t| RecipeIngredientLine::text(*t)).collect()
    }

    #[test]
    fn test_empty_recipe() {
        let result = calculate_ingredient_match(&[], &[ingredient(1, "egg")]);
        assert_eq!(result.total_count, 0);
        assert_eq!(result.owned_count, 0);
        assert_eq!(result.match_percentage, 0);
        assert!(result.is_complete());
    }

    #[test]
    fn test_id_match_wins_over_text() {
        let line = RecipeIngredientLine {
            line: "something unrelated".to_string(),
            matched_name: None,
            ingredient_id: Some(7),
        };
        assert_eq!(
            classify_line(&line, &[ingredient(7, "flour")]),
            Some(MatchReason::Id)
        );
    }

    #[test]
    fn test_name_containment_both_directions() {
        let user = vec![ingredient(1, "Olive Oil"), ingredient(2, "chicken breast")];
        assert_eq!(
            classify_line(&RecipeIngredientLine::text("2 tbsp olive oil"), &user),
            Some(MatchReason::Name)
        );
        // Line contained by the owned name
        assert_eq!(
            classify_line(&RecipeIngredientLine::text("  Chicken "), &user),
            Some(MatchReason::Name)
        );
    }

    #[test]
    fn test_matched_name_fallback() {
        let line = RecipeIngredientLine {
            line: "2 медиум помидора".to_string(),
            matched_name: Some("Tomato".to_string()),
            ingredient_id: Some(99),
        };
        assert_eq!(
            classify_line(&line, &[ingredient(3, "tomato")]),
            Some(MatchReason::MatchedName)
        );
    }

    #[test]
    fn test_default_pantry_without_selection() {
        assert_eq!(
            classify_line(&RecipeIngredientLine::text("Salt"), &[]),
            Some(MatchReason::DefaultPantry)
        );
        assert_eq!(
            classify_line(&RecipeIngredientLine::text("Соль по вкусу"), &[]),
            Some(MatchReason::DefaultPantry)
        );
        assert_eq!(classify_line(&RecipeIngredientLine::text("sugar"), &[]), None);
    }

    #[test]
    fn test_blank_names_never_match() {
        let user = vec![ingredient(1, "   ")];
        assert_eq!(classify_line(&RecipeIngredientLine::text("flour"), &user), None);
        assert_eq!(classify_line(&RecipeIngredientLine::text("  "), &user), None);
    }

    #[test]
    fn test_partition_preserves_order() {
        let recipe = lines(&["flour", "2 eggs", "salt", "milk", "butter"]);
        let user = vec![ingredient(1, "egg"), ingredient(2, "butter")];
        let result = calculate_ingredient_match(&recipe, &user);

        let owned: Vec<&str> = result.owned_lines.iter().map(|l| l.line.as_str()).collect();
        let missing: Vec<&str> = result
            .missing_lines
            .iter()
            .map(|l| l.line.as_str())
            .collect();
        assert_eq!(owned, vec!["2 eggs", "salt", "butter"]);
        assert_eq!(missing, vec!["flour", "milk"]);
        assert_eq!(result.owned_count + result.missing_lines.len(), recipe.len());
        assert_eq!(result.match_percentage, 60);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(match_percentage(1, 3), 33);
        assert_eq!(match_percentage(2, 3), 67);
        assert_eq!(match_percentage(1, 8), 13);
        assert_eq!(match_percentage(3, 3), 100);
        assert_eq!(match_percentage(0, 0), 0);
    }

    #[test]
    fn test_deterministic() {
        let recipe = lines(&["1 cup rice", "water", "2 onions"]);
        let user = vec![ingredient(5, "onion")];
        let first = calculate_ingredient_match(&recipe, &user);
        let second = calculate_ingredient_match(&recipe, &user);
        assert_eq!(first, second);
    }
}
