//! Page-number pagination for list endpoints.
//!
//! Clients select a page with `?page=N` (1-based) or `?page=last`. The
//! response carries absolute `next`/`previous` links built by
//! [`page_link`], which rewrites the `page` parameter of the incoming query
//! string and keeps every other parameter.

use crate::error::CoreError;

/// Page size used when the server configuration does not override it.
pub const DEFAULT_PAGE_SIZE: i64 = 2;

/// Query parameter carrying the page number.
pub const PAGE_PARAM: &str = "page";

/// Alias accepted in place of a number to select the final page.
pub const LAST_PAGE: &str = "last";

pub const MSG_INVALID_PAGE: &str = "Invalid page.";

/// The slice of a result set covered by one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub number: i64,
    /// Total number of pages (at least 1).
    pub num_pages: i64,
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Number of pages needed for `total` rows. An empty result still has one page.
pub fn num_pages(total: i64, page_size: i64) -> i64 {
    let page_size = page_size.max(1);
    if total <= 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    }
}

/// Resolve the raw `page` query value against the result size.
///
/// A missing or empty value selects page 1. Anything that is not a positive
/// integer within range (or `last`) is rejected with
/// [`CoreError::InvalidPage`].
pub fn resolve_page(raw: Option<&str>, total: i64, page_size: i64) -> Result<PageWindow, CoreError> {
    let page_size = page_size.max(1);
    let pages = num_pages(total, page_size);

    let number = match raw.map(str::trim) {
        None | Some("") => 1,
        Some(LAST_PAGE) => pages,
        Some(value) => value.parse::<i64>().map_err(|_| invalid_page())?,
    };

    if number < 1 || number > pages {
        return Err(invalid_page());
    }

    Ok(PageWindow {
        number,
        num_pages: pages,
        offset: (number - 1) * page_size,
        limit: page_size,
    })
}

/// Rebuild `base_url?query` with the `page` parameter set to `page`.
///
/// Page 1 is expressed by dropping the parameter entirely. The query is
/// decoded, so a percent-encoded `page` key is replaced too, and re-encoded
/// with keys in sorted order. Repeated keys keep their relative order.
pub fn page_link(base_url: &str, query: Option<&str>, page: i64) -> String {
    let raw = query.unwrap_or_default();
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(raw.as_bytes())
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if page > 1 {
        pairs.push((PAGE_PARAM.to_string(), page.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        return base_url.to_string();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs)
        .finish();
    format!("{base_url}?{encoded}")
}

fn invalid_page() -> CoreError {
    CoreError::InvalidPage(MSG_INVALID_PAGE.to_string())
}
