use chrono::Datelike;
use tracing::warn;

use crate::domain::lookup::{
    LookupQuery, University, degrees, fallback_cities, fallback_states, filter_institutions, years,
};
use crate::domain::repository::{Clock, LookupCache, LookupProvider};
use crate::domain::types::LOOKUP_CACHE_TTL_SECS;
use crate::error::PortalServiceError;

/// Dropdown data. Never fails: provider and cache errors degrade to the
/// static fallback lists.
pub struct LookupUseCase<K, P, C>
where
    K: LookupCache,
    P: LookupProvider,
    C: Clock,
{
    pub cache: K,
    pub provider: P,
    pub clock: C,
}

impl<K, P, C> LookupUseCase<K, P, C>
where
    K: LookupCache,
    P: LookupProvider,
    C: Clock,
{
    pub async fn execute(&self, query: &LookupQuery) -> Vec<String> {
        match query {
            LookupQuery::Degrees { level } => degrees(*level),
            LookupQuery::Years => years(self.clock.now().year()),
            LookupQuery::States => self
                .cached(query, || self.provider.states())
                .await
                .unwrap_or_else(fallback_states),
            LookupQuery::Cities { state } => {
                let state = state.trim();
                if state.is_empty() {
                    return vec![];
                }
                self.cached(query, || self.provider.cities(state))
                    .await
                    .unwrap_or_else(|| fallback_cities(state))
            }
            LookupQuery::Institutions(filter) => {
                let universities: Vec<University> = self
                    .cached(query, || self.provider.universities())
                    .await
                    .unwrap_or_default();
                filter_institutions(&universities, filter)
            }
        }
    }

    /// Cache hit, else provider (stored for 24 h on success), else `None`.
    async fn cached<T, F, Fut>(&self, query: &LookupQuery, fetch: F) -> Option<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PortalServiceError>>,
    {
        let key = query.cache_key()?;
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => return Some(value),
                Err(e) => warn!(error = %e, %key, "discarding undecodable lookup cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, %key, "lookup cache read failed"),
        }

        let value = match fetch().await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, %key, "lookup provider failed, using fallback");
                return None;
            }
        };
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.cache.put(&key, &raw, LOOKUP_CACHE_TTL_SECS).await {
                    warn!(error = %e, %key, "lookup cache write failed");
                }
            }
            Err(e) => warn!(error = %e, %key, "could not encode lookup payload"),
        }
        Some(value)
    }
}
