//! Single-object fetching

use super::envelope::{decode_body, type_label, NonPaginatedRoot};
use crate::error::Result;
use crate::http::RequestDispatcher;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fetches endpoints answering with a single `{ "data": ... }` object
#[derive(Debug, Clone)]
pub struct NonPaginatedFetcher {
    dispatcher: Arc<RequestDispatcher>,
}

impl NonPaginatedFetcher {
    /// Create a fetcher sharing `dispatcher`
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Fetch and unwrap the payload; `Ok(None)` when the envelope is empty
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let response = self.dispatcher.get(endpoint, cancel).await?;

        let root: Option<NonPaginatedRoot<T>> = decode_body(response.text(), endpoint, || {
            format!("NonPaginatedRoot<{}>", type_label::<T>())
        })?;
        Ok(root.and_then(|root| root.data))
    }
}
