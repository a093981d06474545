use std::future::Future;

use anyhow::Result;
use futures::stream::{self, Stream, TryStreamExt};

/// The REST listings signal exhaustion with an empty page.
pub fn is_last_page<T>(items: &[T]) -> bool {
    items.is_empty()
}

/// Lazily requests pages 1, 2, ... and yields each non-empty one. The stream
/// ends at the first empty page or right after the first error.
pub fn pages<T, F, Fut>(fetch_page: F) -> impl Stream<Item = Result<Vec<T>>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    stream::unfold(Some((fetch_page, 1u32)), |state| async move {
        let (mut fetch_page, page) = state?;
        match fetch_page(page).await {
            Ok(items) if is_last_page(&items) => None,
            Ok(items) => Some((Ok(items), Some((fetch_page, page + 1)))),
            Err(err) => Some((Err(err), None)),
        }
    })
}

pub async fn collect_pages<T, F, Fut>(fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    pages(fetch_page).try_concat().await
}
