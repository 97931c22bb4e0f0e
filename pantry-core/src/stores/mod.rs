//! Client state containers.
//!
//! Stores are plain values owned by the caller. Nothing is persisted
//! implicitly: call `load` once at startup and `save` after mutating.

mod auth;
mod filters;
mod ingredients;
mod language;
mod tags;

pub use auth::AuthStore;
pub use filters::FilterStore;
pub use ingredients::IngredientStore;
pub use language::LanguageStore;
pub use tags::TagStore;
