//! Date-scoped crime category cache.
//!
//! Crime categories are published per reporting month and do not change
//! once published, so each month's list is fetched once per `PoliceApi`
//! and kept for its lifetime. The key `None` stands for "latest available".
//!
//! Each month maps to its own `OnceCell`: concurrent first lookups for one
//! month wait on a single fetch, while different months load independently.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::domain::{ALL_CRIME, CrimeCategory};
use crate::error::{PoliceError, Result};

/// Cache key: reporting month, or `None` for the latest.
type DateKey = Option<String>;

/// Categories of one month, keyed by slug.
pub type CategoryMap = Arc<HashMap<String, CrimeCategory>>;

/// Per-month category lists.
pub struct CategoryCache {
    dates: MokaCache<DateKey, Arc<OnceCell<CategoryMap>>>,
}

impl CategoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            dates: MokaCache::builder().build(),
        }
    }

    /// Categories for `date`, calling `fetch` on the first lookup only.
    ///
    /// The `all-crime` pseudo-category is dropped from the fetched list. A
    /// failed fetch is not cached.
    pub async fn categories<F, Fut>(&self, date: Option<&str>, fetch: F) -> Result<CategoryMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CrimeCategory>>>,
    {
        let key: DateKey = date.map(str::to_owned);
        let cell = self
            .dates
            .get_with(key, async { Arc::new(OnceCell::new()) })
            .await;

        if let Some(map) = cell.get() {
            trace!(date, "category cache hit");
            return Ok(map.clone());
        }

        let map = cell
            .get_or_try_init(|| async {
                let categories = fetch().await?;
                let map: HashMap<String, CrimeCategory> = categories
                    .into_iter()
                    .filter(|c| c.url != ALL_CRIME)
                    .map(|c| (c.url.clone(), c))
                    .collect();
                debug!(date, count = map.len(), "crime categories cached");
                Ok::<_, PoliceError>(Arc::new(map))
            })
            .await?;

        Ok(map.clone())
    }

    /// Look up one category by slug.
    pub async fn category<F, Fut>(
        &self,
        slug: &str,
        date: Option<&str>,
        fetch: F,
    ) -> Result<CrimeCategory>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CrimeCategory>>>,
    {
        let map = self.categories(date, fetch).await?;
        map.get(slug)
            .cloned()
            .ok_or_else(|| PoliceError::CategoryNotFound {
                slug: slug.to_string(),
                date: date.map(str::to_owned),
            })
    }

    /// Number of months with a cached list.
    pub fn cached_dates(&self) -> usize {
        self.dates
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .count()
    }
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new()
    }
}
