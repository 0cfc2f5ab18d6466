//! Paged response normalization.
//!
//! Backend list endpoints answer either with a Spring-style page envelope
//! (`{ content, number, size, totalElements, totalPages }`) or with a bare
//! JSON array. Callers only ever see [`PagedResult`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page index used when neither the response nor the filter provides one
pub const DEFAULT_PAGE: u64 = 0;

/// Page size used when neither the response nor the filter provides one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Paging metadata attached to every normalized result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Zero-based page index
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl PageInfo {
    /// Whether a page after this one exists
    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    /// Whether a page before this one exists
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Canonical paged result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub content: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> PagedResult<T> {
    /// The degraded result returned for unrecognized input
    pub fn empty(filter: Option<&PageFilter>) -> Self {
        Self {
            content: Vec::new(),
            page_info: PageInfo {
                page: fallback_page(filter),
                size: fallback_size(filter),
                total_elements: 0,
                total_pages: 1,
            },
        }
    }

    /// Transform every row, keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            content: self.content.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl PagedResult<Value> {
    /// Deserialize every row into `T`.
    ///
    /// Normalization itself never fails; this is the step where a caller
    /// commits to a row type, so a row of the wrong shape surfaces here.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<PagedResult<T>, serde_json::Error> {
        let content = self
            .content
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(PagedResult {
            content,
            page_info: self.page_info,
        })
    }
}

/// Page request parameters, also used as fallbacks during normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Spring sort expressions, e.g. `"lastName,asc"`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
}

impl PageFilter {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort: Vec::new(),
        }
    }

    /// Add a sort expression (`field` or `field,asc|desc`)
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    /// Query parameters in the form Spring's `Pageable` resolver expects.
    ///
    /// Unset fields are omitted; each sort expression becomes its own
    /// `sort` parameter.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        for sort in &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

fn fallback_page(filter: Option<&PageFilter>) -> u64 {
    filter.and_then(|f| f.page).unwrap_or(DEFAULT_PAGE)
}

fn fallback_size(filter: Option<&PageFilter>) -> u64 {
    filter.and_then(|f| f.size).unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Read a non-negative integer field; anything else counts as absent.
///
/// Integral floats (`2.0`) are accepted.
fn count_field(object: &serde_json::Map<String, Value>, name: &str) -> Option<u64> {
    let value = object.get(name)?;
    if let Some(count) = value.as_u64() {
        return Some(count);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
        .map(|f| f as u64)
}

/// Normalize an untrusted page response into a [`PagedResult`].
///
/// Recognizes a Spring page envelope (an object with an array `content`
/// field) and a bare array. Everything else degrades to an empty page.
/// Values from the response win over the filter; the filter wins over the
/// defaults (page 0, size 10).
pub fn normalize_page_response(data: &Value, filter: Option<&PageFilter>) -> PagedResult<Value> {
    match data {
        Value::Object(object) => match object.get("content") {
            Some(Value::Array(content)) => {
                let total_elements =
                    count_field(object, "totalElements").unwrap_or(content.len() as u64);

                PagedResult {
                    content: content.clone(),
                    page_info: PageInfo {
                        page: count_field(object, "number").unwrap_or_else(|| fallback_page(filter)),
                        size: count_field(object, "size").unwrap_or_else(|| fallback_size(filter)),
                        total_elements,
                        total_pages: count_field(object, "totalPages").unwrap_or(1),
                    },
                }
            }
            _ => PagedResult::empty(filter),
        },
        Value::Array(items) => PagedResult {
            content: items.clone(),
            page_info: PageInfo {
                page: fallback_page(filter),
                size: fallback_size(filter),
                total_elements: items.len() as u64,
                total_pages: 1,
            },
        },
        _ => PagedResult::empty(filter),
    }
}
