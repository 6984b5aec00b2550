//! Draining paged collection endpoints.

use crate::error::{BridgeError, Result};
use std::future::Future;
use tracing::debug;

/// Reads every page of a zero-indexed paged endpoint.
///
/// Pages are requested in order starting at 0 until one comes back empty.
/// An optional page cap guards against endpoints that never return an empty
/// page; without it the loop relies on the dataset being finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    max_pages: Option<usize>,
}

impl Paginator {
    /// A paginator with no page cap.
    pub fn unbounded() -> Self {
        Self { max_pages: None }
    }

    /// A paginator that accepts at most `max_pages` non-empty pages and
    /// fails if the page after them still has items.
    pub fn with_max_pages(max_pages: Option<usize>) -> Self {
        Self { max_pages }
    }

    /// Call `fetch_page(0)`, `fetch_page(1)`, ... and concatenate the results.
    ///
    /// Stops at the first empty page. A fetch error is returned as-is and the
    /// pages gathered so far are dropped.
    pub async fn read_all<T, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let mut items = Vec::new();
        let mut page = 0usize;

        loop {
            let batch = fetch_page(page).await?;
            if batch.is_empty() {
                debug!("page {} empty, {} items collected", page, items.len());
                return Ok(items);
            }

            // Page `max` is only read to confirm the end was reached.
            if let Some(max) = self.max_pages {
                if page >= max {
                    return Err(BridgeError::PageLimitExceeded { pages: max });
                }
            }

            items.extend(batch);
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(data: &[&[char]]) -> Vec<Vec<char>> {
        data.iter().map(|p| p.to_vec()).collect()
    }

    #[tokio::test]
    async fn test_reads_until_empty_page() {
        let data = pages(&[&['A', 'B'], &['C'], &[]]);
        let mut fetches = Vec::new();

        let items = Paginator::unbounded()
            .read_all(|page| {
                fetches.push(page);
                let batch = data.get(page).cloned().unwrap_or_default();
                async move { Ok(batch) }
            })
            .await
            .unwrap();

        assert_eq!(items, vec!['A', 'B', 'C']);
        assert_eq!(fetches, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let mut fetches = 0;

        let items: Vec<char> = Paginator::unbounded()
            .read_all(|_| {
                fetches += 1;
                async { Ok(Vec::new()) }
            })
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(fetches, 1);
    }

    #[tokio::test]
    async fn test_error_discards_partial_results() {
        let mut fetches = 0;

        let result: Result<Vec<u32>> = Paginator::unbounded()
            .read_all(|page| {
                fetches += 1;
                async move {
                    if page == 0 {
                        Ok(vec![1, 2, 3])
                    } else {
                        Err(BridgeError::status("get raindrops", "500 Internal Server Error"))
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(BridgeError::UnexpectedStatus { .. })));
        assert_eq!(fetches, 2);
    }

    #[tokio::test]
    async fn test_page_cap_stops_endless_endpoint() {
        let mut fetches = 0;

        let result: Result<Vec<u32>> = Paginator::with_max_pages(Some(3))
            .read_all(|page| {
                fetches += 1;
                async move { Ok(vec![page as u32]) }
            })
            .await;

        assert!(matches!(
            result,
            Err(BridgeError::PageLimitExceeded { pages: 3 })
        ));
        assert_eq!(fetches, 4);
    }

    #[tokio::test]
    async fn test_data_pages_equal_to_cap_are_accepted() {
        for cap in [1, 2] {
            let data: Vec<Vec<u32>> = (0..cap as u32).map(|p| vec![p * 10, p * 10 + 1]).collect();
            let mut fetches = Vec::new();

            let items = Paginator::with_max_pages(Some(cap))
                .read_all(|page| {
                    fetches.push(page);
                    let batch = data.get(page).cloned().unwrap_or_default();
                    async move { Ok(batch) }
                })
                .await
                .unwrap();

            assert_eq!(items.len(), cap * 2);
            assert_eq!(fetches, (0..=cap).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_page_cap_not_hit_by_well_formed_endpoint() {
        let data = pages(&[&['x'], &['y'], &[]]);

        let items = Paginator::with_max_pages(Some(3))
            .read_all(|page| {
                let batch = data.get(page).cloned().unwrap_or_default();
                async move { Ok(batch) }
            })
            .await
            .unwrap();

        assert_eq!(items, vec!['x', 'y']);
    }
}
