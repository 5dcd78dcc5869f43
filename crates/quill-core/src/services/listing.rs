//! The listing service: filter + pager composed over a repository.

use crate::error::RepoError;
use crate::filter::ListFilter;
use crate::pagination::{Page, PageMeta, PagePlan, PageRequest};
use crate::ports::PagedRepository;

/// Produce one page of a filtered, sorted collection.
///
/// The count and the fetch are separate queries; the count may be stale
/// by a single concurrent write, which this design accepts. A page past
/// the end short-circuits to an empty item list without issuing the
/// fetch, while the metadata keeps the true totals.
pub async fn list_page<T>(
    repo: &dyn PagedRepository<T>,
    filter: &ListFilter,
    request: &PageRequest,
) -> Result<Page<T>, RepoError> {
    let total_count = repo.count(filter).await?;
    let plan = PagePlan::new(total_count, request);

    let meta = PageMeta {
        total_count,
        current_page: request.page,
        page_size: request.page_size,
        total_pages: plan.total_pages,
    };

    if plan.is_out_of_range(request.page) {
        return Ok(Page::empty(meta));
    }

    let items = repo.fetch_page(filter, plan.window()).await?;
    Ok(Page { items, meta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageWindow;
    use async_trait::async_trait;

    /// In-memory stand-in matching the designated-field semantics of the
    /// real repositories: case-insensitive substring on the keyword.
    struct FakeTitles(Vec<String>);

    impl FakeTitles {
        fn matching(&self, filter: &ListFilter) -> Vec<String> {
            let needle = filter.keyword.as_deref().map(str::to_lowercase);
            self.0
                .iter()
                .filter(|title| match &needle {
                    Some(k) => title.to_lowercase().contains(k),
                    None => true,
                })
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl PagedRepository<String> for FakeTitles {
        async fn count(&self, filter: &ListFilter) -> Result<u64, RepoError> {
            Ok(self.matching(filter).len() as u64)
        }

        async fn fetch_page(
            &self,
            filter: &ListFilter,
            window: PageWindow,
        ) -> Result<Vec<String>, RepoError> {
            Ok(self
                .matching(filter)
                .into_iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .collect())
        }
    }

    fn titles(n: usize) -> FakeTitles {
        FakeTitles((0..n).map(|i| format!("Post number {i}")).collect())
    }

    #[tokio::test]
    async fn pages_through_25_records_with_size_12() {
        let repo = titles(25);
        let filter = ListFilter::default();

        let first = list_page(&repo, &filter, &PageRequest::new(1, 12))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.meta.total_count, 25);
        assert_eq!(first.meta.total_pages, 3);

        let last = list_page(&repo, &filter, &PageRequest::new(3, 12))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn page_past_the_end_returns_empty_items_with_true_meta() {
        let repo = titles(25);
        let page = list_page(&repo, &ListFilter::default(), &PageRequest::new(4, 12))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_count, 25);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.current_page, 4);
    }

    #[tokio::test]
    async fn keyword_matches_case_insensitive_substrings() {
        let repo = FakeTitles(vec![
            "XABCY".to_string(),
            "unrelated".to_string(),
            "abc at the start".to_string(),
        ]);
        let filter = ListFilter::by_keyword(Some("abc".to_string()));

        let page = list_page(&repo, &filter, &PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.total_count, 2);
        assert!(page.items.contains(&"XABCY".to_string()));
    }

    #[tokio::test]
    async fn empty_collection_yields_zero_pages() {
        let repo = titles(0);
        let page = list_page(&repo, &ListFilter::default(), &PageRequest::new(1, 10))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 0);
        assert_eq!(page.meta.total_count, 0);
    }
}
