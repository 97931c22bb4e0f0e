use chrono::NaiveDateTime;
use diesel::prelude::*;
use pantry_core::{Ingredient, RecipeIngredientLine, Tag, TagKind, UserProfile};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[allow(dead_code)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub google_sub: Option<String>,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub display_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub google_sub: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: i32,
    pub token_hash: &'a str,
    pub expires_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IngredientRow {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
            category: row.category,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TagRow {
    pub id: i32,
    pub kind: String,
    pub slug: String,
    pub name: String,
}

impl TagRow {
    /// Rows with an unknown kind are skipped rather than failing the request.
    pub fn into_tag(self) -> Option<Tag> {
        let kind = TagKind::parse(&self.kind)?;
        Some(Tag {
            id: self.id,
            slug: self.slug,
            name: self.name,
            kind,
        })
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[allow(dead_code)]
pub struct RecipeRow {
    pub id: i32,
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: String,
    pub image_url: Option<String>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// One ingredient line joined with the canonical ingredient name.
#[derive(Queryable, Debug)]
pub struct IngredientLineRow {
    pub line: String,
    pub ingredient_id: Option<i32>,
    pub matched_name: Option<String>,
}

impl From<IngredientLineRow> for RecipeIngredientLine {
    fn from(row: IngredientLineRow) -> Self {
        RecipeIngredientLine {
            line: row.line,
            matched_name: row.matched_name,
            ingredient_id: row.ingredient_id,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::favorites)]
pub struct NewFavorite {
    pub user_id: i32,
    pub recipe_id: i32,
}
