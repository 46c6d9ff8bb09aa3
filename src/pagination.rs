//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for. Larger sizes are clamped.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A page number and page size resolved against a [PaginationConfig].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page, always at least one.
    pub page_size: u64,
}

impl PageRequest {
    /// The number of items to skip to reach the start of the page.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)).saturating_mul(self.page_size)
    }
}

impl PaginationConfig {
    /// Fill in the defaults for a requested page.
    ///
    /// A missing or zero page size falls back to the default page size, and
    /// page sizes above the maximum are clamped to the maximum.
    pub(crate) fn resolve(&self, page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        let page_size = match page_size {
            None | Some(0) => self.default_page_size,
            Some(page_size) => page_size,
        }
        .clamp(1, self.max_page_size.max(1));

        PageRequest {
            page: page.unwrap_or(self.default_page),
            page_size,
        }
    }
}

/// The number of pages needed to show `count` items. There is always at
/// least one page, even if it is empty.
pub(crate) fn total_pages(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1)).max(1)
}

/// One page of results together with the information needed to fetch the
/// pages around it.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// The number of items per page.
    pub page_size: u64,
    /// The 1-based number of this page.
    pub current_page_number: u64,
    /// The number of pages available.
    pub total_pages: u64,
    /// The number of items across all pages.
    pub count: u64,
    /// A relative link to the next page, if there is one.
    pub next: Option<String>,
    /// A relative link to the previous page, if there is one.
    pub previous: Option<String>,
    /// The items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap the `results` for `request` in a page.
    ///
    /// The links point at `path` and repeat `query`, so any filters the
    /// results were selected with carry over to the neighbouring pages.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPage] if the requested page is outside
    /// `1..=total_pages`.
    pub(crate) fn new(
        results: Vec<T>,
        count: u64,
        request: PageRequest,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Self, Error> {
        let total_pages = total_pages(count, request.page_size);

        if request.page == 0 || request.page > total_pages {
            return Err(Error::InvalidPage);
        }

        let next = if request.page < total_pages {
            Some(page_link(path, query, request, request.page + 1)?)
        } else {
            None
        };

        let previous = if request.page > 1 {
            Some(page_link(path, query, request, request.page - 1)?)
        } else {
            None
        };

        Ok(Self {
            page_size: request.page_size,
            current_page_number: request.page,
            total_pages,
            count,
            next,
            previous,
            results,
        })
    }
}

/// Build the link to `page`. The link to the first page leaves out the page
/// number.
fn page_link(
    path: &str,
    query: &[(&str, String)],
    request: PageRequest,
    page: u64,
) -> Result<String, Error> {
    let mut params: Vec<(&str, String)> = query.to_vec();
    params.push(("page_size", request.page_size.to_string()));

    if page > 1 {
        params.push(("page", page.to_string()));
    }

    let query_string = serde_urlencoded::to_string(&params)
        .map_err(|error| Error::InvalidQuery(error.to_string()))?;

    Ok(format!("{path}?{query_string}"))
}
