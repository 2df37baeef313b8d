//! Pagination and the drink list query.
//!
//! Pages are 1-indexed and `total_pages = ceil(total / page_size)`.
//! The offline store and the live API share this arithmetic, so callers
//! cannot tell the two apart by the shape of a page.

use serde::{Deserialize, Serialize};

/// Page size used when a query does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Number of pages needed for `total` items at `page_size` per page.
///
/// Returns 0 for an empty set. A `page_size` of 0 is treated as
/// [`DEFAULT_PAGE_SIZE`].
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let size = u64::from(effective_page_size(page_size));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

fn effective_page_size(page_size: u32) -> u32 {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

// ============================================================================
// Paginated
// ============================================================================

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Size of the full (filtered) set.
    pub total: u64,
    /// 1-indexed page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages in the full set.
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// Slices an already filtered set into the requested page.
    ///
    /// `page` values below 1 are clamped to 1. Pages beyond the end are
    /// empty but keep the correct `total` and `total_pages`.
    pub fn from_filtered(all: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = effective_page_size(page_size);
        let total = all.len() as u64;
        let skip = (page as usize - 1).saturating_mul(page_size as usize);

        let items = all.into_iter().skip(skip).take(page_size as usize).collect();

        Self {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns true if this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Drink Query
// ============================================================================

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(crate::CoreError::InvalidQuery(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Query parameters accepted by the "list drinks" endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkQuery {
    /// Free-text filter against name and description.
    pub q: Option<String>,
    /// Category slug filter.
    pub category: Option<String>,
    /// 1-indexed page.
    pub page: Option<u32>,
    /// Items per page.
    pub page_size: Option<u32>,
    /// Only active (or only inactive) drinks.
    pub is_active: Option<bool>,
    /// Field to sort by (`name`, `price`, `sortOrder`).
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
}

impl DrinkQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text filter.
    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Sets the category slug filter.
    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Sets page and page size.
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    /// Effective 1-indexed page.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size.
    pub fn effective_page_size(&self) -> u32 {
        effective_page_size(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Renders the query as the live API's query-string pairs.
    ///
    /// Unset and blank parameters are omitted.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = self.q.as_deref().filter(|q| !q.trim().is_empty()) {
            pairs.push(("q".to_string(), q.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category".to_string(), category.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize".to_string(), size.to_string()));
        }
        if let Some(active) = self.is_active {
            pairs.push(("isActive".to_string(), active.to_string()));
        }
        if let Some(sort_by) = self.sort_by.as_deref() {
            pairs.push(("sortBy".to_string(), sort_by.to_string()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        pairs
    }

    /// Parses the live API's query-string pairs back into a query.
    ///
    /// Unknown keys and unparsable numbers are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key {
                "q" | "search" => query.q = Some(value.to_string()),
                "category" => query.category = Some(value.to_string()),
                "page" => query.page = value.parse().ok(),
                "pageSize" | "limit" => query.page_size = value.parse().ok(),
                "isActive" => query.is_active = value.parse().ok(),
                "sortBy" => query.sort_by = Some(value.to_string()),
                "sortOrder" => query.sort_order = value.parse().ok(),
                _ => {}
            }
        }
        query
    }
}

// ============================================================================
// Tests
// ============================================================================
