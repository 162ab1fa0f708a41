// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pagination options and metadata for list operations.

use serde::{Deserialize, Serialize};

use crate::document::Resource;

/// Pagination cursor embedded in any list request's query parameters.
///
/// Unset fields are omitted from the query string entirely; the server then
/// applies its own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    /// 1-based page to fetch.
    #[serde(rename = "page[number]", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Number of entries per page.
    #[serde(rename = "page[size]", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Pagination metadata returned in a collection document's `meta` node.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pagination {
    pub current_page: u32,
    #[serde(default)]
    pub prev_page: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    pub total_pages: u32,
    pub total_count: u64,
}

/// One page of a list result, in server-provided order.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<Resource<T>>,
    /// Present when the server included pagination metadata.
    pub pagination: Option<Pagination>,
}

// Derived Default would require T: Default.
impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted() {
        let query = serde_urlencoded::to_string(ListOptions::new()).unwrap();
        assert_eq!(query, "");
    }

    #[test]
    fn set_fields_use_bracketed_keys() {
        let options = ListOptions::new().with_page_number(2).with_page_size(50);
        let query = serde_urlencoded::to_string(options).unwrap();
        assert_eq!(query, "page%5Bnumber%5D=2&page%5Bsize%5D=50");
    }

    #[test]
    fn pagination_meta_parses_kebab_case() {
        let meta: Pagination = serde_json::from_str(
            r#"{"current-page":2,"prev-page":1,"next-page":3,"total-pages":7,"total-count":138}"#,
        )
        .unwrap();
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.prev_page, Some(1));
        assert_eq!(meta.next_page, Some(3));
        assert_eq!(meta.total_pages, 7);
        assert_eq!(meta.total_count, 138);
    }

    #[test]
    fn pagination_meta_tolerates_missing_links() {
        let meta: Pagination = serde_json::from_str(
            r#"{"current-page":1,"total-pages":1,"total-count":0}"#,
        )
        .unwrap();
        assert!(meta.prev_page.is_none());
        assert!(meta.next_page.is_none());
    }
}
