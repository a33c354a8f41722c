//! Discovery API handlers
//!
//! GET /recommendations/:user_id, GET /new-releases/:user_id,
//! GET /last-releases/:user_id

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use shelf_common::Book;

use crate::error::{ApiError, ApiResult};
use crate::releases::LastReleases;
use crate::AppState;

fn require_user_id(user_id: &str) -> ApiResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("user id is required".to_string()));
    }
    Ok(user_id)
}

/// GET /recommendations/:user_id
pub async fn recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.recommender.recommendations(user_id).await?))
}

/// GET /new-releases/:user_id
pub async fn new_releases(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.releases.new_releases(user_id).await?))
}

/// GET /last-releases/:user_id
pub async fn last_releases(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<LastReleases>> {
    let user_id = require_user_id(&user_id)?;
    Ok(Json(state.releases.last_releases(user_id).await?))
}

/// Build discovery routes
pub fn discovery_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations/:user_id", get(recommendations))
        .route("/new-releases/:user_id", get(new_releases))
        .route("/last-releases/:user_id", get(last_releases))
}
