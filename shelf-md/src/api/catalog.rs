//! Catalog API handlers
//!
//! GET /search, GET /isbn/:isbn, GET /lists/:list_name, GET /genres

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shelf_common::genres::{self, GenreEntry};
use shelf_common::models::DEFAULT_SEARCH_RESULTS;
use shelf_common::{Book, SearchOrder, SearchQuery};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /search query parameters
///
/// Kept as raw strings so malformed values get the service's error body
/// rather than the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub max_results: Option<String>,
    pub order_by: Option<String>,
}

impl SearchParams {
    pub fn into_query(self) -> ApiResult<SearchQuery> {
        let q = self
            .q
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("query parameter q is required".to_string()))?;

        let max_results = match self.max_results.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SEARCH_RESULTS,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                ApiError::BadRequest(format!("maxResults must be an integer, got '{}'", raw))
            })?
            .clamp(0, u32::MAX as i64) as u32,
        };

        let order_by = match self.order_by.as_deref().map(str::trim) {
            None | Some("") => SearchOrder::default(),
            Some(raw) => raw.parse::<SearchOrder>()?,
        };

        Ok(SearchQuery::new(q, max_results, order_by)?)
    }
}

/// GET /search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Book>>> {
    let query = params.into_query()?;
    tracing::debug!(q = %query.q, max_results = query.max_results, "Search");

    let books = state.books.search(&query).await?;
    Ok(Json(books))
}

/// GET /isbn/:isbn
pub async fn lookup_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> ApiResult<Json<Book>> {
    state
        .books
        .lookup_isbn(&isbn)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No book found for ISBN {}", isbn)))
}

/// GET /lists/:list_name
pub async fn curated_list(
    State(state): State<AppState>,
    Path(list_name): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    let books = state.lists.list(&list_name).await?;
    Ok(Json(books))
}

/// GET /genres
pub async fn list_genres() -> Json<&'static [GenreEntry]> {
    Json(genres::TAXONOMY)
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/isbn/:isbn", get(lookup_isbn))
        .route("/lists/:list_name", get(curated_list))
        .route("/genres", get(list_genres))
}
