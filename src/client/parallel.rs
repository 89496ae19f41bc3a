//! Concurrent fetching of the remaining pages of a listing.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::ApiResult;

type PageFuture<T> = Pin<Box<dyn Future<Output = (usize, ApiResult<Vec<T>>)> + Send>>;

/// Fetch `remaining_pages` with at most `max_concurrent` requests in flight.
///
/// Items are returned in page order regardless of arrival order. The first
/// failed page aborts the whole fetch.
///
/// ```ignore
/// let first = controller.load(&cluster, params.clone()).await?;
/// let rest = fetch_remaining_pages(
///     first.remaining_pages(),
///     move |page| {
///         let controller = controller.clone();
///         let params = params.clone().page(page);
///         async move { controller.fetch_page(&cluster, &params).await.map(|p| p.items) }
///     },
///     4,
/// ).await?;
/// ```
pub async fn fetch_remaining_pages<T, F, Fut>(
    remaining_pages: Vec<usize>,
    fetch_page: F,
    max_concurrent: usize,
) -> ApiResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Vec<T>>> + Send + 'static,
{
    if remaining_pages.is_empty() {
        return Ok(Vec::new());
    }

    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Fetching {} remaining pages with max {} concurrent",
        remaining_pages.len(),
        max_concurrent
    );

    let mut pages: Vec<(usize, Vec<T>)> = Vec::with_capacity(remaining_pages.len());
    let mut futures: FuturesUnordered<PageFuture<T>> = FuturesUnordered::new();
    let mut pending_pages = remaining_pages.into_iter();

    let make_future = |page: usize, f: &F| -> PageFuture<T> {
        let fut = f(page);
        Box::pin(async move { (page, fut.await) })
    };

    for page in pending_pages.by_ref().take(max_concurrent) {
        futures.push(make_future(page, &fetch_page));
    }

    while let Some((page, result)) = futures.next().await {
        let items = result?;
        debug!("Page {} returned {} items", page, items.len());
        pages.push((page, items));

        if let Some(next_page) = pending_pages.next() {
            futures.push(make_future(next_page, &fetch_page));
        }
    }

    pages.sort_by_key(|(page, _)| *page);
    Ok(pages.into_iter().flat_map(|(_, items)| items).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_remaining_pages_empty() {
        let result: ApiResult<Vec<String>> =
            fetch_remaining_pages(vec![], |_page| async { Ok(vec![]) }, 10).await;
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_in_page_order() {
        // Later pages answer first
        let result = fetch_remaining_pages(
            vec![2, 3, 4],
            |page| async move {
                tokio::time::sleep(Duration::from_millis(100 / page as u64)).await;
                Ok(vec![page * 10, page * 10 + 1])
            },
            3,
        )
        .await
        .unwrap();

        assert_eq!(result, vec![20, 21, 30, 31, 40, 41]);
    }

    #[tokio::test]
    async fn test_respects_max_concurrent() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (in_flight_c, peak_c) = (in_flight.clone(), peak.clone());
        let result = fetch_remaining_pages(
            (2..=9).collect(),
            move |page| {
                let in_flight = in_flight_c.clone();
                let peak = peak_c.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(vec![page])
                }
            },
            2,
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_error_aborts() {
        let result: ApiResult<Vec<usize>> = fetch_remaining_pages(
            vec![2, 3],
            |page| async move {
                if page == 3 {
                    Err(ApiError::ClusterUnavailable("down".into()))
                } else {
                    Ok(vec![page])
                }
            },
            2,
        )
        .await;

        assert!(matches!(result, Err(ApiError::ClusterUnavailable(_))));
    }
}
