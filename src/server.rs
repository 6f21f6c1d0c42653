// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::directory::EpisodeDirectory;
use crate::error::ServeError;
use crate::feed::{EPISODE_ROUTE, FeedOptions, render_feed};

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// State shared by all request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub directory: EpisodeDirectory,
    pub feed: Arc<FeedOptions>,
}

impl AppState {
    pub fn new(directory: EpisodeDirectory, feed: FeedOptions) -> Self {
        Self {
            directory,
            feed: Arc::new(feed),
        }
    }
}

/// Routes: the feed at `/rss`, episode downloads under `/rss/episode/{id}`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rss", get(feed_handler))
        .route(&format!("{EPISODE_ROUTE}/{{id}}"), get(episode_handler))
        .with_state(state)
}

/// Bind the listening socket
pub async fn bind(addr: &str) -> Result<TcpListener, ServeError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::BindFailed {
            addr: addr.to_string(),
            source: e,
        })
}

/// Serve the feed until the listener fails
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ServeError> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Serving feed at http://{addr}/rss");
    }

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn feed_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let base_url = base_url(&state.feed, &headers);
    let episodes = state.directory.list();
    let xml = render_feed(&episodes, &state.feed, &base_url);

    ([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response()
}

/// Serve an episode file, honoring `Range` and `If-Range` so clients can seek
async fn episode_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    let Some(episode) = state.directory.find_by_id(&id) else {
        log::debug!("No episode with id {id}");
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut response = match ServeFile::new(&episode.file).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    if response.status().is_success()
        && let Ok(mime_type) = HeaderValue::from_str(&episode.mime_type)
    {
        response.headers_mut().insert(header::CONTENT_TYPE, mime_type);
    } else if response.status() == StatusCode::NOT_FOUND {
        log::warn!("Episode file {} is gone", episode.file.display());
    }

    response
}

/// Externally visible base URL for links in the feed
fn base_url(options: &FeedOptions, headers: &HeaderMap) -> String {
    if let Some(url) = &options.public_url {
        return url.as_str().trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");

    format!("{scheme}://{host}")
}
