//! Shared response envelope types for API handlers.

use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use petkare_core::pagination::{page_link, PageWindow};
use serde::Serialize;

use crate::config::ServerConfig;

/// Page-number pagination envelope: `{ count, next, previous, results }`.
///
/// `next` and `previous` are absolute URLs, or `null` at either end.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    /// Build the envelope for `window`, deriving links from the request URI.
    pub fn new(
        results: Vec<T>,
        count: i64,
        window: &PageWindow,
        config: &ServerConfig,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Self {
        let base = request_url(config, headers, uri);
        let query = uri.query();

        let next = window
            .has_next()
            .then(|| page_link(&base, query, window.number + 1));
        let previous = window
            .has_previous()
            .then(|| page_link(&base, query, window.number - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Absolute request URL without its query string.
///
/// Prefers the configured public base URL; otherwise uses the `Host`
/// header (or the URI authority) over plain HTTP.
fn request_url(config: &ServerConfig, headers: &HeaderMap, uri: &Uri) -> String {
    let origin = match &config.public_base_url {
        Some(base) => base.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .or_else(|| uri.authority().map(|a| a.as_str()))
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    format!("{origin}{}", uri.path())
}
