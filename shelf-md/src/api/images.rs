//! Thumbnail proxy
//!
//! GET /proxy-image?url=<encoded origin url>

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// GET /proxy-image
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> ApiResult<impl IntoResponse> {
    let url = params
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("query parameter url is required".to_string()))?;

    let bytes = state.images.get(url.trim()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    ))
}

/// Build image proxy routes
pub fn image_routes() -> Router<AppState> {
    Router::new().route("/proxy-image", get(proxy_image))
}
