//! Recommendation flow
//!
//! ```text
//! recommendations:<user> hit ──────────────────────────────────→ response
//!        │ miss
//!        ▼
//! library snapshot → rank genres ─┬─ ≥ threshold → genre fan-out ─┐
//!                                 └─ sparse ─────→ curated lists ─┤
//!                                                                 ▼
//!                      dedupe → drop owned → global cap → cache → response
//! ```

use crate::aggregator::{self, Limits};
use crate::cached_catalog::CachedCatalog;
use crate::config::DiscoveryConfig;
use crate::freshness::{dedupe, exclude_owned, owned_ids};
use crate::ranker::{rank, Attribute};
use crate::sources::LibrarySource;
use shelf_common::cache::{get_json, keys, set_json};
use shelf_common::{Book, CacheStore, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Recommender {
    library: Arc<dyn LibrarySource>,
    catalog: Arc<CachedCatalog>,
    cache: Arc<dyn CacheStore>,
    short_ttl: Duration,
    config: DiscoveryConfig,
}

impl Recommender {
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

    /// Ranked, deduplicated recommendations the user does not already own
    ///
    /// Fails only when the library snapshot cannot be loaded.
    pub async fn recommendations(&self, user_id: &str) -> Result<Vec<Book>> {
        let key = keys::recommendations(user_id);
        if let Some(cached) = get_json::<Vec<Book>>(self.cache.as_ref(), &key).await {
            debug!(user_id, "Serving cached recommendations");
            return Ok(cached);
        }

        let library = self.library.load_library(user_id).await?;
        let genres = rank(&library, Attribute::Genre);
        let catalog = self.catalog.as_ref();

        let merged = if aggregator::is_sparse(&genres, self.config.min_distinct_genres) {
            info!(
                user_id,
                distinct_genres = genres.len(),
                "Sparse library, using curated lists"
            );
            aggregator::concat_all(
                &self.config.fallback_lists,
                self.config.fan_out_concurrency,
                move |list: String| async move { catalog.curated_list(&list).await },
            )
            .await
        } else {
            debug!(user_id, genres = ?genres, "Fanning out over top genres");
            aggregator::aggregate(
                &genres,
                Limits {
                    schedule: &self.config.genre_schedule,
                    global_cap: self.config.global_cap,
                    concurrency: self.config.fan_out_concurrency,
                },
                move |genre: String| async move { catalog.genre_books(&genre).await },
            )
            .await
        };

        let complete = merged.is_complete();
        let mut recommendations = exclude_owned(dedupe(merged.results), &owned_ids(&library));
        recommendations.truncate(self.config.global_cap);

        if !complete {
            warn!(user_id, failed = merged.failed, "Catalog branches failed, not caching");
        } else if recommendations.is_empty() {
            warn!(user_id, "No recommendations produced, not caching");
        } else {
            set_json(self.cache.as_ref(), &key, &recommendations, self.short_ttl).await;
        }

        info!(user_id, count = recommendations.len(), "Recommendations computed");
        Ok(recommendations)
    }
}
