//! Supported locales and the generic UI message catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported UI language.
///
/// Ingredient ids and names are locale-specific, so switching locale
/// invalidates anything keyed by ingredient id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub const ALL: &'static [Locale] = &[Locale::En, Locale::Ru];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Parse a language tag such as `ru`, `ru-RU` or `EN_us`.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    /// Pick the first supported language from an `Accept-Language` header,
    /// honouring `q` weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, usize, Locale)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, part)| {
                let mut pieces = part.split(';');
                let locale = Locale::parse(pieces.next()?)?;
                let weight = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((weight, position, locale))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.first().map(|(_, _, locale)| *locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| format!("unsupported locale: {}", s))
    }
}

/// Keys for the generic messages shown around data fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    GenericError,
    NetworkError,
    NotFound,
    NoResults,
    LoginRequired,
    Retry,
    Owned,
    Missing,
    /// Heading for ingredients without a category
    OtherCategory,
}

pub fn message(locale: Locale, key: MessageKey) -> &'static str {
    match (locale, key) {
        (Locale::En, MessageKey::GenericError) => "Something went wrong. Please try again.",
        (Locale::En, MessageKey::NetworkError) => "Cannot reach the server.",
        (Locale::En, MessageKey::NotFound) => "Recipe not found.",
        (Locale::En, MessageKey::NoResults) => "No recipes match your filters.",
        (Locale::En, MessageKey::LoginRequired) => "Please sign in first.",
        (Locale::En, MessageKey::Retry) => "Retry",
        (Locale::En, MessageKey::Owned) => "You have",
        (Locale::En, MessageKey::Missing) => "You need",
        (Locale::En, MessageKey::OtherCategory) => "Other",
        (Locale::Ru, MessageKey::GenericError) => "Что-то пошло не так. Попробуйте ещё раз.",
        (Locale::Ru, MessageKey::NetworkError) => "Сервер недоступен.",
        (Locale::Ru, MessageKey::NotFound) => "Рецепт не найден.",
        (Locale::Ru, MessageKey::NoResults) => "Нет рецептов по выбранным фильтрам.",
        (Locale::Ru, MessageKey::LoginRequired) => "Сначала войдите в аккаунт.",
        (Locale::Ru, MessageKey::Retry) => "Повторить",
        (Locale::Ru, MessageKey::Owned) => "Есть",
        (Locale::Ru, MessageKey::Missing) => "Нужно купить",
        (Locale::Ru, MessageKey::OtherCategory) => "Прочее",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_tags() {
        assert_eq!(Locale::parse("ru-RU"), Some(Locale::Ru));
        assert_eq!(Locale::parse("EN_us"), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn test_accept_language_weights() {
        assert_eq!(
            Locale::from_accept_language("de-DE,ru;q=0.8,en;q=0.9"),
            Some(Locale::En)
        );
        assert_eq!(
            Locale::from_accept_language("ru-RU,ru;q=0.9,en-US;q=0.8"),
            Some(Locale::Ru)
        );
        assert_eq!(Locale::from_accept_language("fr, de"), None);
        assert_eq!(Locale::from_accept_language("en;q=0, ru;q=0.1"), Some(Locale::Ru));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Locale::Ru).unwrap(), "\"ru\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
    }

    #[test]
    fn test_every_message_is_translated() {
        for locale in Locale::ALL {
            assert!(!message(*locale, MessageKey::GenericError).is_empty());
        }
        assert_ne!(
            message(Locale::En, MessageKey::NotFound),
            message(Locale::Ru, MessageKey::NotFound)
        );
    }
}
