//! Listing collaborator and the lazy page walk over it.

use async_stream::stream;
use async_trait::async_trait;
use futures::Stream;
use std::sync::Arc;
use tracing::debug;

use crate::error::InventoryResult;
use crate::models::ListingPage;

/// Cursor-paginated listing collaborator
#[async_trait]
pub trait ListingClient: Send + Sync {
    /// Fetch one page. `None` requests the first page.
    async fn list(&self, cursor: Option<String>) -> InventoryResult<ListingPage>;
}

#[async_trait]
impl<T: ListingClient + ?Sized> ListingClient for Arc<T> {
    async fn list(&self, cursor: Option<String>) -> InventoryResult<ListingPage> {
        (**self).list(cursor).await
    }
}

#[async_trait]
impl<T: ListingClient + ?Sized> ListingClient for &T {
    async fn list(&self, cursor: Option<String>) -> InventoryResult<ListingPage> {
        (**self).list(cursor).await
    }
}

/// Lazily walk every page of `client`.
///
/// Pages are requested only when polled, so callers can stop early. The stream
/// ends after the first page without a continuation cursor (even an empty page)
/// or right after yielding an error.
pub fn pages<L>(client: &L) -> impl Stream<Item = InventoryResult<ListingPage>> + Send + '_
where
    L: ListingClient + ?Sized,
{
    stream! {
        let mut cursor: Option<String> = None;
        let mut page_number: usize = 0;

        loop {
            page_number += 1;
            match client.list(cursor.take()).await {
                Ok(page) => {
                    let next = page.continuation().map(str::to_string);
                    debug!(page = page_number, items = page.items.len(), more = next.is_some(), "Fetched listing page");
                    yield Ok(page);

                    match next {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}
