//! Cursor pagination with next-page prefetch
//!
//! `PaginatedFetcher::fetch_items` flattens a cursor chain into one ordered
//! stream. As soon as a page arrives and carries a cursor, the following
//! page is spawned on the runtime, then the current page's items are
//! yielded. The consumer therefore overlaps with the next request while
//! items still come out strictly in page order.

use super::envelope::{decode_body, type_label, Page, PaginatedRoot};
use crate::error::{Error, Result};
use crate::http::RequestDispatcher;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::form_urlencoded;

/// Fixed page size requested from the API
pub const PAGE_SIZE: u16 = 100;

/// Lazily produced, single-pass stream of decoded items
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Fetches cursor-paginated collections through a dispatcher
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    dispatcher: Arc<RequestDispatcher>,
}

impl PaginatedFetcher {
    /// Create a fetcher sharing `dispatcher`
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// URL of one page: fixed limit plus the escaped cursor when present
    pub fn page_url(endpoint: &str, cursor: Option<&str>) -> String {
        match cursor {
            Some(cursor) => {
                let escaped: String = form_urlencoded::byte_serialize(cursor.as_bytes()).collect();
                format!("{endpoint}?limit={PAGE_SIZE}&cursor={escaped}")
            }
            None => format!("{endpoint}?limit={PAGE_SIZE}"),
        }
    }

    /// Fetch and decode a single page
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cursor: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page<T>> {
        let url = Self::page_url(endpoint, cursor);
        let response = self.dispatcher.get(&url, cancel).await?;

        let root: Option<PaginatedRoot<T>> = decode_body(response.text(), &url, || {
            format!("PaginatedRoot<{}>", type_label::<T>())
        })?;
        let page = Page::from(root);

        debug!(
            url = %url,
            items = page.items.len(),
            has_next = !page.is_last(),
            "Fetched page"
        );
        Ok(page)
    }

    /// Stream every item of `endpoint` across all pages
    ///
    /// The first page is requested immediately, so this must be called from
    /// within a tokio runtime. Dropping the stream or cancelling `cancel`
    /// aborts any page still in flight. The stream ends after the first
    /// error.
    pub fn fetch_items<T>(&self, endpoint: impl Into<String>, cancel: CancellationToken) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut chain = PageChain {
            fetcher: self.clone(),
            endpoint: Arc::from(endpoint.into()),
            cancel,
            items: Vec::new().into_iter(),
            pending: None,
        };
        chain.pending = Some(chain.spawn_page(None));

        Box::pin(futures::stream::unfold(Some(chain), |state| async move {
            let mut chain = state?;
            match chain.next_item().await {
                Some(Ok(item)) => Some((Ok(item), Some(chain))),
                Some(Err(e)) => Some((Err(e), None)),
                None => None,
            }
        }))
    }
}

/// Page request running in the background; aborted when dropped
struct PendingPage<T> {
    handle: JoinHandle<Result<Page<T>>>,
}

impl<T> Drop for PendingPage<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Iteration state: the current page's remaining items and the in-flight
/// request for the page after it
struct PageChain<T> {
    fetcher: PaginatedFetcher,
    endpoint: Arc<str>,
    cancel: CancellationToken,
    items: std::vec::IntoIter<T>,
    pending: Option<PendingPage<T>>,
}

impl<T> PageChain<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn spawn_page(&self, cursor: Option<String>) -> PendingPage<T> {
        let fetcher = self.fetcher.clone();
        let endpoint = Arc::clone(&self.endpoint);
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            fetcher
                .fetch_page(&endpoint, cursor.as_deref(), &cancel)
                .await
        });
        PendingPage { handle }
    }

    async fn next_item(&mut self) -> Option<Result<T>> {
        loop {
            if self.cancel.is_cancelled() {
                self.pending = None;
                return Some(Err(Error::Cancelled));
            }

            if let Some(item) = self.items.next() {
                return Some(Ok(item));
            }

            let mut pending = self.pending.take()?;
            let joined = tokio::select! {
                () = self.cancel.cancelled() => return Some(Err(Error::Cancelled)),
                joined = &mut pending.handle => joined,
            };

            let page = match joined {
                Ok(Ok(page)) => page,
                Ok(Err(e)) => return Some(Err(e)),
                Err(e) => {
                    return Some(Err(Error::task(format!(
                        "Page fetch for '{}' failed: {e}",
                        self.endpoint
                    ))))
                }
            };

            if let Some(cursor) = page.next_cursor() {
                self.pending = Some(self.spawn_page(Some(cursor.to_string())));
            }
            self.items = page.items.into_iter();
        }
    }
}
