//! Release tracking for the authors a user reads
//!
//! Both flows start from the user's author profile (ranked authors plus
//! owned ids), which is cached on the short tier so `/new-releases` and
//! `/last-releases` share one library load.

use crate::aggregator::{self, Limits};
use crate::cached_catalog::CachedCatalog;
use crate::config::DiscoveryConfig;
use crate::freshness::{self, dedupe, exclude_owned, is_fresh_book, owned_ids};
use crate::ranker::{rank, Attribute};
use crate::sources::LibrarySource;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shelf_common::cache::{get_json, keys, set_json};
use shelf_common::models::UNKNOWN_AUTHOR;
use shelf_common::{Book, CacheStore, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Books per author, keyed by author name in rank order
pub type LastReleases = IndexMap<String, Vec<Book>>;

/// Ranked authors and owned catalog ids for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub authors: Vec<String>,
    pub owned: Vec<String>,
}

impl AuthorProfile {
    pub fn from_library(library: &[Book]) -> Self {
        let authors = rank(library, Attribute::Author)
            .into_iter()
            .filter(|author| author != UNKNOWN_AUTHOR)
            .collect();
        let mut owned: Vec<String> = owned_ids(library).into_iter().collect();
        owned.sort();
        Self { authors, owned }
    }

    fn owned_set(&self) -> HashSet<String> {
        self.owned.iter().cloned().collect()
    }
}

pub struct ReleaseTracker {
    library: Arc<dyn LibrarySource>,
    catalog: Arc<CachedCatalog>,
    cache: Arc<dyn CacheStore>,
    short_ttl: Duration,
    config: DiscoveryConfig,
}

impl ReleaseTracker {
    pub fn new(
        library: Arc<dyn LibrarySource>,
        catalog: Arc<CachedCatalog>,
        cache: Arc<dyn CacheStore>,
        short_ttl: Duration,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            library,
            catalog,
            cache,
            short_ttl,
            config,
        }
    }

    /// Author profile, `None` for an empty library
    ///
    /// Empty libraries are not cached so the first added book shows up
    /// immediately.
    pub async fn author_profile(&self, user_id: &str) -> Result<Option<AuthorProfile>> {
        let key = keys::user_authors(user_id);
        if let Some(profile) = get_json::<AuthorProfile>(self.cache.as_ref(), &key).await {
            return Ok(Some(profile));
        }

        let library = self.library.load_library(user_id).await?;
        if library.is_empty() {
            debug!(user_id, "Empty library");
            return Ok(None);
        }

        let profile = AuthorProfile::from_library(&library);
        set_json(self.cache.as_ref(), &key, &profile, self.short_ttl).await;
        Ok(Some(profile))
    }

    /// Recent books by the user's top authors that they do not own yet
    pub async fn new_releases(&self, user_id: &str) -> Result<Vec<Book>> {
        self.new_releases_on(user_id, freshness::today()).await
    }

    pub async fn new_releases_on(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Book>> {
        let key = keys::new_releases(user_id);
        if let Some(cached) = get_json::<Vec<Book>>(self.cache.as_ref(), &key).await {
            debug!(user_id, "Serving cached new releases");
            return Ok(cached);
        }

        let Some(profile) = self.author_profile(user_id).await? else {
            return Ok(Vec::new());
        };

        let catalog = self.catalog.as_ref();
        let merged = aggregator::aggregate(
            &profile.authors,
            Limits {
                schedule: &self.config.author_schedule,
                global_cap: self.config.global_cap,
                concurrency: self.config.fan_out_concurrency,
            },
            move |author: String| async move { catalog.author_releases(&author).await },
        )
        .await;

        let window = self.config.freshness_window_months;
        let complete = merged.is_complete();
        let fresh: Vec<Book> = merged
            .results
            .into_iter()
            .filter(|book| is_fresh_book(book, window, today))
            .collect();

        let mut releases = exclude_owned(dedupe(fresh), &profile.owned_set());
        releases.truncate(self.config.new_releases_cap);

        if complete {
            set_json(self.cache.as_ref(), &key, &releases, self.short_ttl).await;
        } else {
            warn!(user_id, failed = merged.failed, "Author branches failed, not caching new releases");
        }
        info!(user_id, count = releases.len(), "New releases computed");
        Ok(releases)
    }

    /// Latest unowned books per top author; authors with none are omitted
    pub async fn last_releases(&self, user_id: &str) -> Result<LastReleases> {
        self.last_releases_on(user_id, freshness::today()).await
    }

    pub async fn last_releases_on(&self, user_id: &str, today: NaiveDate) -> Result<LastReleases> {
        let key = keys::last_releases(user_id);
        if let Some(cached) = get_json::<LastReleases>(self.cache.as_ref(), &key).await {
            debug!(user_id, "Serving cached last releases");
            return Ok(cached);
        }

        let Some(profile) = self.author_profile(user_id).await? else {
            return Ok(LastReleases::new());
        };

        let schedule = &self.config.author_schedule;
        let authors: Vec<String> = profile.authors.iter().take(schedule.len()).cloned().collect();
        let catalog = self.catalog.as_ref();
        let branches = aggregator::fan_out(
            authors,
            self.config.fan_out_concurrency,
            move |author: String| async move { catalog.author_releases(&author).await },
        )
        .await;

        let owned = profile.owned_set();
        let window = self.config.freshness_window_months;
        let failed = branches.iter().filter(|branch| branch.failed()).count();
        let mut releases = LastReleases::new();

        for (branch, cap) in branches.into_iter().zip(schedule) {
            let author = branch.item.clone();
            let fresh: Vec<Book> = branch
                .into_results()
                .into_iter()
                .filter(|book| is_fresh_book(book, window, today))
                .collect();

            let mut books = exclude_owned(dedupe(fresh), &owned);
            books.truncate(*cap);
            if !books.is_empty() {
                releases.insert(author, books);
            }
        }

        if failed == 0 {
            set_json(self.cache.as_ref(), &key, &releases, self.short_ttl).await;
        } else {
            warn!(user_id, failed, "Author branches failed, not caching last releases");
        }
        info!(user_id, authors = releases.len(), "Last releases computed");
        Ok(releases)
    }
}
