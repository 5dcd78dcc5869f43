//! Pagination math shared by every listing endpoint.

use serde::Serialize;

/// A requested page of a collection. Page numbers are 1-based; both
/// fields are normalized to at least 1 on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// The skip/limit window and page count derived from a request and the
/// matching record count.
///
/// The page number is deliberately not clamped to the valid range:
/// a request past the last page yields an empty item list while the
/// metadata keeps reporting the true totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub skip: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl PagePlan {
    pub fn new(total_count: u64, request: &PageRequest) -> Self {
        Self {
            skip: (request.page - 1) * request.page_size,
            limit: request.page_size,
            total_pages: total_count.div_ceil(request.page_size),
        }
    }

    /// True when the requested page lies past the last page (including
    /// the empty-collection case, where `total_pages` is 0).
    pub fn is_out_of_range(&self, page: u64) -> bool {
        page > self.total_pages
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// The slice of records a repository should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

/// Pagination metadata returned to clients alongside the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_count: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn empty(meta: PageMeta) -> Self {
        Self {
            items: Vec::new(),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_of_count_over_size() {
        let cases = [
            (0u64, 12u64, 0u64),
            (1, 12, 1),
            (12, 12, 1),
            (13, 12, 2),
            (25, 12, 3),
            (100, 10, 10),
            (101, 10, 11),
        ];
        for (total, size, expected) in cases {
            let plan = PagePlan::new(total, &PageRequest::new(1, size));
            assert_eq!(plan.total_pages, expected, "total={total} size={size}");
        }
    }

    #[test]
    fn total_pages_is_zero_iff_count_is_zero() {
        assert_eq!(PagePlan::new(0, &PageRequest::new(1, 10)).total_pages, 0);
        assert!(PagePlan::new(1, &PageRequest::new(1, 10)).total_pages > 0);
    }

    #[test]
    fn skip_advances_by_page_size() {
        let req = PageRequest::new(3, 12);
        let plan = PagePlan::new(25, &req);
        assert_eq!(plan.skip, 24);
        assert_eq!(plan.limit, 12);
    }

    #[test]
    fn page_past_the_end_is_out_of_range_but_keeps_true_totals() {
        let req = PageRequest::new(4, 12);
        let plan = PagePlan::new(25, &req);
        assert_eq!(plan.total_pages, 3);
        assert!(plan.is_out_of_range(req.page));
    }

    #[test]
    fn first_page_of_empty_collection_is_out_of_range() {
        let req = PageRequest::new(1, 10);
        let plan = PagePlan::new(0, &req);
        assert!(plan.is_out_of_range(req.page));
    }

    #[test]
    fn zero_inputs_are_normalized() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);
    }
}
