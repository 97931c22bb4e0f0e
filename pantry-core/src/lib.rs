pub mod accumulator;
pub mod cache;
pub mod client;
pub mod error;
pub mod i18n;
pub mod matching;
pub mod oauth;
pub mod storage;
pub mod stores;
pub mod suggestions;
pub mod types;

pub use accumulator::PageAccumulator;
pub use cache::{
    CacheEnvelope, CachedResource, StalenessPolicy, INGREDIENT_CATEGORIES_TTL, TAGS_TTL,
};
pub use client::{
    with_retry, with_timeout, HttpApiClient, HttpApiClientBuilder, MockApi, MockFailure,
    RecipeApi, RetryPolicy,
};
pub use error::{ApiError, OAuthError, StorageError};
pub use i18n::{message, Locale, MessageKey};
pub use matching::{calculate_ingredient_match, match_percentage, MatchResult, DEFAULT_PANTRY};
pub use oauth::{extract_code, GoogleOAuthConfig};
pub use storage::{DiskStorage, MemoryStorage, Storage, StorageExt};
pub use stores::{AuthStore, FilterStore, IngredientStore, LanguageStore, TagStore};
pub use suggestions::{fetch_suggestions, Suggestions};
pub use types::{
    AuthSession, HasId, Ingredient, IngredientCategory, PaginationMetadata, RecipeDetail,
    RecipeIngredientLine, RecipePage, RecipeQuery, RecipeSummary, SortOrder, Tag, TagKind,
    TagLists, TimeBucket, UserProfile, UserSelection,
};
