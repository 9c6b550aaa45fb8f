//! Pagination types shared by every list endpoint

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort key sent as `sort=property,direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction.as_str())
    }
}

/// Pagination request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index (0-indexed)
    pub page: u32,
    /// Number of items per page
    pub size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_resources::pagination::{PageRequest, Sort};
    ///
    /// let request = PageRequest::new(2, 10).with_sort(Sort::desc("createdAt"));
    /// assert_eq!(
    ///     request.query_pairs(),
    ///     vec![
    ///         ("page".to_string(), "2".to_string()),
    ///         ("size".to_string(), "10".to_string()),
    ///         ("sort".to_string(), "createdAt,desc".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// First page with the given size.
    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Request for the page after this one, keeping size and sort.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    /// `page`, `size` and optional `sort` as query pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.to_string()));
        }
        pairs
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of a remote collection as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in the current page
    pub content: Vec<T>,
    /// Total number of items across all pages
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    /// Requested page size
    #[serde(default)]
    pub size: u32,
    /// Page index
    #[serde(default)]
    pub number: u32,
    #[serde(default = "default_true")]
    pub first: bool,
    #[serde(default = "default_true")]
    pub last: bool,
}

fn default_true() -> bool {
    true
}

impl<T> Page<T> {
    /// Build a page locally from its content and the total count.
    ///
    /// ```
    /// use core_resources::pagination::{Page, PageRequest};
    ///
    /// let page = Page::new(vec![1, 2, 3], 25, &PageRequest::new(0, 10));
    /// assert_eq!(page.total_pages, 3);
    /// assert!(page.has_next());
    /// ```
    pub fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            u32::try_from(total_elements.div_ceil(u64::from(request.size))).unwrap_or(u32::MAX)
        };

        Self {
            content,
            total_elements,
            total_pages,
            size: request.size,
            number: request.page,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.last
    }

    pub fn has_previous(&self) -> bool {
        !self.first
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Map the items to a different type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_saturates() {
        let page = Page::<u8>::new(vec![], u64::MAX, &PageRequest::new(0, 1));
        assert_eq!(page.total_pages, u32::MAX);
        assert!(page.has_next());

        let page = Page::<u8>::new(vec![], u64::from(u32::MAX) * 4, &PageRequest::new(3, 2));
        assert_eq!(page.total_pages, u32::MAX);
    }

    #[test]
    fn test_page_request_default() {
        let request = PageRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
        assert!(request.sort.is_none());
    }

    #[test]
    fn test_query_pairs_without_sort() {
        let pairs = PageRequest::new(1, 5).query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_next_keeps_size_and_sort() {
        let request = PageRequest::first(10).with_sort(Sort::asc("username"));
        let next = request.next();
        assert_eq!(next.page, 1);
        assert_eq!(next.size, 10);
        assert_eq!(next.sort, Some(Sort::asc("username")));
    }

    #[test]
    fn test_deserialize_spring_envelope() {
        let json = r#"{
            "content": [{"id": 1}, {"id": 2}],
            "pageable": {"pageNumber": 1, "pageSize": 2},
            "totalElements": 5,
            "totalPages": 3,
            "size": 2,
            "number": 1,
            "first": false,
            "last": false,
            "numberOfElements": 2,
            "empty": false
        }"#;

        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.number, 1);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_minimal_envelope_defaults() {
        let page: Page<u32> = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_new_last_page() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 25, &PageRequest::new(4, 5));
        assert_eq!(page.total_pages, 5);
        assert!(page.last);
        assert!(!page.first);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 25, &PageRequest::new(0, 10));
        let mapped = page.map(|x| x * 2);

        assert_eq!(mapped.content, vec![2, 4, 6]);
        assert_eq!(mapped.total_elements, 25);
        assert_eq!(mapped.number, 0);
    }

    #[test]
    fn test_page_zero_size() {
        let page = Page::new(vec![1, 2, 3], 25, &PageRequest::new(0, 0));
        assert_eq!(page.total_pages, 0);
    }
}
