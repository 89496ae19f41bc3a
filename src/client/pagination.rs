//! Pagination and filter parameters for gateway requests
//!
//! Every resource type has a closed parameter struct. [`QueryParams`] turns it
//! into `(name, value)` pairs, which serve both as the query string and as the
//! canonical input to cache key derivation.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Default number of items per page when none is requested.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page the gateway will serve.
pub const MAX_PAGE_SIZE: usize = 500;

/// Parameters that can be rendered as query pairs.
///
/// Implementations must emit semantically-equal parameter sets as identical
/// pairs: optional fields that are unset or at their neutral value are
/// omitted rather than rendered empty.
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Parameters positioned at a page of a listing.
pub trait PageSelect: Sized {
    fn current_page(&self) -> usize;

    /// The same filters at another page.
    fn at_page(&self, page: usize) -> Self;
}

/// Pagination and name filter for RabbitMQ resource listings.
///
/// ```ignore
/// let params = ResourceParams::new().page(2).page_size(100).name("orders.*").regex(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceParams {
    /// Page number (1-indexed)
    pub page: usize,
    /// Items per page
    pub page_size: usize,
    /// Name filter
    pub name: Option<String>,
    /// Treat `name` as a regular expression
    pub use_regex: bool,
}

impl Default for ResourceParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            name: None,
            use_regex: false,
        }
    }
}

impl ResourceParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn regex(mut self, use_regex: bool) -> Self {
        self.use_regex = use_regex;
        self
    }
}

impl QueryParams for ResourceParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];

        if let Some(ref name) = self.name
            && !name.is_empty()
        {
            params.push(("name", name.clone()));
            // Regex only means something alongside a name filter
            if self.use_regex {
                params.push(("useRegex", "true".to_string()));
            }
        }

        params
    }
}

/// Filters for the audit trail listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFilterParams {
    pub page: usize,
    pub page_size: usize,
    /// Filter by acting user
    pub username: Option<String>,
    /// Filter by operation type (e.g. `PURGE_QUEUE`)
    pub operation: Option<String>,
    /// Filter by outcome (`SUCCESS`, `FAILURE`)
    pub status: Option<String>,
}

impl Default for AuditFilterParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            username: None,
            operation: None,
            status: None,
        }
    }
}

impl AuditFilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl PageSelect for ResourceParams {
    fn current_page(&self) -> usize {
        self.page
    }

    fn at_page(&self, page: usize) -> Self {
        self.clone().page(page)
    }
}

impl PageSelect for AuditFilterParams {
    fn current_page(&self) -> usize {
        self.page
    }

    fn at_page(&self, page: usize) -> Self {
        self.clone().page(page)
    }
}

impl QueryParams for AuditFilterParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        let optional = [
            ("username", &self.username),
            ("operation", &self.operation),
            ("status", &self.status),
        ];
        for (key, value) in optional {
            if let Some(v) = value
                && !v.is_empty()
            {
                params.push((key, v.clone()));
            }
        }
        params
    }
}

/// One page of a gateway listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PagedResponse<T> {
    /// Build a response for `items` as page `page` of `total_items`.
    pub fn new(items: Vec<T>, page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Shape checks serde cannot express.
    pub fn validate(&self) -> ApiResult<()> {
        if self.page_size == 0 {
            return Err(ApiError::InvalidResponse(
                "pageSize must be greater than zero".to_string(),
            ));
        }
        if self.items.len() > self.page_size {
            return Err(ApiError::InvalidResponse(format!(
                "page holds {} items but pageSize is {}",
                self.items.len(),
                self.page_size
            )));
        }
        if self.items.len() > self.total_items {
            return Err(ApiError::InvalidResponse(format!(
                "page holds {} items but totalItems is {}",
                self.items.len(),
                self.total_items
            )));
        }
        Ok(())
    }

    /// Page numbers after this one.
    pub fn remaining_pages(&self) -> Vec<usize> {
        if self.page >= self.total_pages {
            return Vec::new();
        }
        ((self.page + 1)..=self.total_pages).collect()
    }
}
