//! Staleness policy for cached reference data (ingredient categories, tags).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::i18n::Locale;

/// Grouped ingredient categories are refetched after a week.
pub const INGREDIENT_CATEGORIES_TTL: Duration = Duration::days(7);

/// Tag lists are kept for 30 days.
pub const TAGS_TTL: Duration = Duration::days(30);

pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Cached payload plus the metadata needed to judge its freshness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEnvelope<T> {
    pub payload: T,
    pub updated_at_epoch_ms: i64,
    pub locale: Locale,
}

impl<T> CacheEnvelope<T> {
    /// Wrap a payload fetched just now.
    pub fn new(payload: T, locale: Locale) -> Self {
        Self::at(payload, locale, now_epoch_ms())
    }

    pub fn at(payload: T, locale: Locale, updated_at_epoch_ms: i64) -> Self {
        Self {
            payload,
            updated_at_epoch_ms,
            locale,
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.updated_at_epoch_ms
    }
}

/// Decides when a cached envelope must be refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub ttl: Duration,
}

impl StalenessPolicy {
    pub const INGREDIENT_CATEGORIES: StalenessPolicy = StalenessPolicy {
        ttl: INGREDIENT_CATEGORIES_TTL,
    };
    pub const TAGS: StalenessPolicy = StalenessPolicy { ttl: TAGS_TTL };

    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Stale when there is no envelope, it belongs to another locale,
    /// or it is older than the TTL.
    pub fn is_stale<T>(
        &self,
        envelope: Option<&CacheEnvelope<T>>,
        locale: Locale,
        now_ms: i64,
    ) -> bool {
        match envelope {
            None => true,
            Some(env) if env.locale != locale => true,
            Some(env) => env.age_ms(now_ms) > self.ttl.num_milliseconds(),
        }
    }
}

/// A slot holding at most one cached envelope, refreshed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource<T> {
    policy: StalenessPolicy,
    envelope: Option<CacheEnvelope<T>>,
}

impl<T: Clone> CachedResource<T> {
    pub fn new(policy: StalenessPolicy) -> Self {
        Self {
            policy,
            envelope: None,
        }
    }

    pub fn with_envelope(policy: StalenessPolicy, envelope: Option<CacheEnvelope<T>>) -> Self {
        Self { policy, envelope }
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    pub fn envelope(&self) -> Option<&CacheEnvelope<T>> {
        self.envelope.as_ref()
    }

    pub fn into_envelope(self) -> Option<CacheEnvelope<T>> {
        self.envelope
    }

    pub fn is_stale(&self, locale: Locale, now_ms: i64) -> bool {
        self.policy.is_stale(self.envelope.as_ref(), locale, now_ms)
    }

    /// Fresh payload for `locale`, if one is cached.
    pub fn get(&self, locale: Locale, now_ms: i64) -> Option<&T> {
        if self.is_stale(locale, now_ms) {
            return None;
        }
        self.envelope.as_ref().map(|e| &e.payload)
    }

    pub fn store(&mut self, payload: T, locale: Locale, now_ms: i64) {
        self.envelope = Some(CacheEnvelope::at(payload, locale, now_ms));
    }

    pub fn invalidate(&mut self) {
        self.envelope = None;
    }

    /// Return the cached payload when fresh; otherwise run `fetch`, store the
    /// result with a new timestamp and return it. A failed fetch keeps the
    /// previous envelope.
    pub async fn get_or_refresh<F, Fut, E>(&mut self, locale: Locale, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = now_epoch_ms();
        if let Some(payload) = self.get(locale, now) {
            tracing::debug!(%locale, "cache hit");
            return Ok(payload.clone());
        }

        tracing::debug!(%locale, "cache stale, refetching");
        let payload = fetch().await?;
        self.store(payload.clone(), locale, now_epoch_ms());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    #[test]
    fn test_missing_envelope_is_stale() {
        let policy = StalenessPolicy::INGREDIENT_CATEGORIES;
        assert!(policy.is_stale::<()>(None, Locale::En, 0));
    }

    #[test]
    fn test_fresh_same_locale() {
        let env = CacheEnvelope::new(vec![1, 2, 3], Locale::En);
        let now = now_epoch_ms();
        assert!(!StalenessPolicy::INGREDIENT_CATEGORIES.is_stale(Some(&env), Locale::En, now));
        assert!(StalenessPolicy::INGREDIENT_CATEGORIES.is_stale(Some(&env), Locale::Ru, now));
    }

    #[test]
    fn test_ttl_boundaries() {
        let env = CacheEnvelope::at("x", Locale::Ru, 0);
        let categories = StalenessPolicy::INGREDIENT_CATEGORIES;
        assert!(!categories.is_stale(Some(&env), Locale::Ru, 7 * DAY_MS));
        assert!(categories.is_stale(Some(&env), Locale::Ru, 7 * DAY_MS + 1));

        let tags = StalenessPolicy::TAGS;
        assert!(!tags.is_stale(Some(&env), Locale::Ru, 8 * DAY_MS));
        assert!(tags.is_stale(Some(&env), Locale::Ru, 30 * DAY_MS + 1));
    }

    #[tokio::test]
    async fn test_get_or_refresh_uses_cache() {
        let mut resource = CachedResource::new(StalenessPolicy::TAGS);
        let first = resource
            .get_or_refresh(Locale::En, || async { Ok::<_, ()>(vec!["breakfast"]) })
            .await;
        assert_eq!(first, Ok(vec!["breakfast"]));

        // A refetch would surface this error
        let second = resource
            .get_or_refresh(Locale::En, || async { Err::<Vec<&str>, ()>(()) })
            .await;
        assert_eq!(second, Ok(vec!["breakfast"]));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_old_envelope() {
        let mut resource = CachedResource::with_envelope(
            StalenessPolicy::TAGS,
            Some(CacheEnvelope::at(vec![1], Locale::En, 0)),
        );
        let result = resource
            .get_or_refresh(Locale::En, || async { Err::<Vec<i32>, _>("offline") })
            .await;
        assert_eq!(result, Err("offline"));
        assert_eq!(resource.envelope().map(|e| e.payload.clone()), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_locale_switch_refetches() {
        let mut resource = CachedResource::new(StalenessPolicy::INGREDIENT_CATEGORIES);
        resource.store(vec!["salt"], Locale::En, now_epoch_ms());
        let result = resource
            .get_or_refresh(Locale::Ru, || async { Ok::<_, ()>(vec!["соль"]) })
            .await;
        assert_eq!(result, Ok(vec!["соль"]));
        assert_eq!(resource.envelope().map(|e| e.locale), Some(Locale::Ru));
    }
}
