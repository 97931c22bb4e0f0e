//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::{BigInt, Text};
use diesel::{QueryResult, SqliteConnection};

diesel::define_sql_function! {
    /// Unicode-aware lowercase. SQLite's built-in `LOWER` only folds ASCII,
    /// which breaks case-insensitive search over Cyrillic titles.
    fn unicode_lower(x: Text) -> Text;
}

/// Register the Rust-backed SQL functions on a fresh connection.
pub fn register_functions(conn: &mut SqliteConnection) -> QueryResult<()> {
    unicode_lower_utils::register_impl(conn, |s: String| s.to_lowercase())
}

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
///
/// # Safety
/// Static SQL string with no user input.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// `RANDOM()` as an ordering expression.
///
/// # Safety
/// Static SQL string with no user input.
pub fn random_order() -> SqlLiteral<Text> {
    sql::<Text>("RANDOM()")
}

/// Filter expression: the current `recipes` row carries a tag of the given
/// kind and slug.
///
/// # Safety
/// Kind and slug are passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// A correlated `EXISTS` subquery against the outer boxed query.
#[macro_export]
macro_rules! recipe_has_tag {
    ($kind:expr, $slug:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = recipes.id AND t.kind = ",
        )
        .bind::<diesel::sql_types::Text, _>($kind)
        .sql(" AND t.slug = ")
        .bind::<diesel::sql_types::Text, _>($slug)
        .sql(")")
    };
}

/// Filter expression: case-insensitive substring match on title or
/// description. `$pattern` must already be lowercased and LIKE-escaped
/// with `\`.
///
/// # Safety
/// The pattern is passed via `.bind()`, not interpolated.
#[macro_export]
macro_rules! recipe_text_matches {
    ($pattern:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("(unicode_lower(recipes.title) LIKE ")
            .bind::<diesel::sql_types::Text, _>($pattern)
            .sql(" ESCAPE '\\' OR unicode_lower(COALESCE(recipes.description, '')) LIKE ")
            .bind::<diesel::sql_types::Text, _>($pattern)
            .sql(" ESCAPE '\\')")
    };
}

/// Lowercase a search term and wrap it in `%...%`, escaping LIKE wildcards.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" Pasta "), "%pasta%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("Омлет"), "%омлет%");
    }
}
