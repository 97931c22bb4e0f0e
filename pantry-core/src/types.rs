use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::i18n::Locale;

/// Anything with a stable integer id, used for de-duplication.
pub trait HasId {
    fn id(&self) -> i32;
}

/// Canonical ingredient reference data. Ids are locale-specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl HasId for Ingredient {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Ingredients grouped under a category heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IngredientCategory {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

/// One row of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeIngredientLine {
    /// Free-text description, e.g. "2 tbsp olive oil"
    pub line: String,
    /// Canonical name of the resolved ingredient, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<i32>,
}

impl RecipeIngredientLine {
    pub fn text(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            matched_name: None,
            ingredient_id: None,
        }
    }

    pub fn resolved(line: impl Into<String>, ingredient_id: i32, matched_name: &str) -> Self {
        Self {
            line: line.into(),
            matched_name: Some(matched_name.to_string()),
            ingredient_id: Some(ingredient_id),
        }
    }
}

/// Ingredient ids the user claims to own.
pub type UserSelection = BTreeSet<i32>;

/// Kind of a catalog tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    MealType,
    Kitchen,
    Diet,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::MealType => "meal_type",
            TagKind::Kitchen => "kitchen",
            TagKind::Diet => "diet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meal_type" => Some(TagKind::MealType),
            "kitchen" => Some(TagKind::Kitchen),
            "diet" => Some(TagKind::Diet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tag {
    pub id: i32,
    /// Locale-independent identifier used in filters
    pub slug: String,
    /// Localized display name
    pub name: String,
    pub kind: TagKind,
}

/// All tags, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TagLists {
    pub meal_types: Vec<Tag>,
    pub kitchens: Vec<Tag>,
    pub diets: Vec<Tag>,
}

impl TagLists {
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut lists = TagLists::default();
        for tag in tags {
            match tag.kind {
                TagKind::MealType => lists.meal_types.push(tag),
                TagKind::Kitchen => lists.kitchens.push(tag),
                TagKind::Diet => lists.diets.push(tag),
            }
        }
        lists
    }

    pub fn is_empty(&self) -> bool {
        self.meal_types.is_empty() && self.kitchens.is_empty() && self.diets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub cook_time_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl HasId for RecipeSummary {
    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub instructions: String,
    pub ingredients: Vec<RecipeIngredientLine>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl HasId for RecipeDetail {
    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaginationMetadata {
    /// Total number of matching recipes
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipePage {
    pub recipes: Vec<RecipeSummary>,
    pub pagination: PaginationMetadata,
}

/// Sort order for recipe listings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    CookTimeAsc,
    CookTimeDesc,
    Title,
    /// Random order, used for "surprise me" suggestions
    Random,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::CookTimeAsc => "cook_time_asc",
            SortOrder::CookTimeDesc => "cook_time_desc",
            SortOrder::Title => "title",
            SortOrder::Random => "random",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortOrder::Newest),
            "oldest" => Some(SortOrder::Oldest),
            "cook_time_asc" => Some(SortOrder::CookTimeAsc),
            "cook_time_desc" => Some(SortOrder::CookTimeDesc),
            "title" => Some(SortOrder::Title),
            "random" => Some(SortOrder::Random),
            _ => None,
        }
    }
}

/// "By time" filter bucket over a recipe's cook time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TimeBucket {
    #[serde(rename = "under_15")]
    Under15,
    #[serde(rename = "under_30")]
    Under30,
    #[serde(rename = "under_60")]
    Under60,
    #[serde(rename = "over_60")]
    Over60,
}

impl TimeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Under15 => "under_15",
            TimeBucket::Under30 => "under_30",
            TimeBucket::Under60 => "under_60",
            TimeBucket::Over60 => "over_60",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "under_15" => Some(TimeBucket::Under15),
            "under_30" => Some(TimeBucket::Under30),
            "under_60" => Some(TimeBucket::Under60),
            "over_60" => Some(TimeBucket::Over60),
            _ => None,
        }
    }

    /// Inclusive minute bounds `(min, max)`; `None` means unbounded.
    pub fn bounds(&self) -> (Option<i32>, Option<i32>) {
        match self {
            TimeBucket::Under15 => (None, Some(15)),
            TimeBucket::Under30 => (None, Some(30)),
            TimeBucket::Under60 => (None, Some(60)),
            TimeBucket::Over60 => (Some(61), None),
        }
    }

    pub fn contains(&self, minutes: i32) -> bool {
        let (min, max) = self.bounds();
        min.map_or(true, |m| minutes >= m) && max.map_or(true, |m| minutes <= m)
    }
}

/// Parameters for a recipe listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    pub locale: Locale,
    pub limit: i64,
    pub offset: i64,
    pub meal_type: Option<String>,
    pub kitchen: Option<String>,
    pub diets: Vec<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub by_time: Option<TimeBucket>,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            limit: 20,
            offset: 0,
            meal_type: None,
            kitchen: None,
            diets: Vec::new(),
            search: None,
            sort: SortOrder::default(),
            by_time: None,
        }
    }
}

impl RecipeQuery {
    /// Query-string pairs in the form the server expects.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("locale", self.locale.as_str().to_string()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("sort", self.sort.as_str().to_string()),
        ];
        if let Some(meal_type) = &self.meal_type {
            pairs.push(("meal_type", meal_type.clone()));
        }
        if let Some(kitchen) = &self.kitchen {
            pairs.push(("kitchen", kitchen.clone()));
        }
        if !self.diets.is_empty() {
            pairs.push(("diet", self.diets.join(",")));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("q", search.to_string()));
            }
        }
        if let Some(by_time) = self.by_time {
            pairs.push(("by_time", by_time.as_str().to_string()));
        }
        pairs
    }

    /// 1-based page number implied by offset and limit.
    pub fn page(&self) -> u32 {
        if self.limit <= 0 {
            return 1;
        }
        (self.offset / self.limit) as u32 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Authorization code handed back by Google's consent screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GoogleLoginRequest {
    pub code: String,
    /// Must equal the redirect URI used to obtain the code
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MatchRequest {
    pub ingredient_ids: Vec<i32>,
}

/// Bearer token plus the signed-in user, as returned by every auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}
