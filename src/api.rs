//! Named Fivetran resources on top of the generic fetchers

use crate::auth::Credentials;
use crate::config::{ClientOptions, DEFAULT_BASE_URL};
use crate::error::Result;
use crate::fetch::{ItemStream, NonPaginatedFetcher, PaginatedFetcher};
use crate::http::{HttpClientConfig, ReqwestTransport, RequestDispatcher};
use crate::models::{Connector, DataSchemas, Group};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

/// Entry point for the Fivetran REST API
#[derive(Debug, Clone)]
pub struct RestApiManager {
    dispatcher: Arc<RequestDispatcher>,
    paginated: PaginatedFetcher,
    non_paginated: NonPaginatedFetcher,
}

impl RestApiManager {
    /// Client for the public Fivetran API
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, api_secret, options)
    }

    /// Client for an API served from `base_url`
    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        options.validate()?;

        let mut config = HttpClientConfig::from_options(base_url, &options);
        config.credentials = Some(Credentials::new(api_key, api_secret));
        let transport = ReqwestTransport::new(&config)?;

        let dispatcher = RequestDispatcher::new(Arc::new(transport), &options);
        Ok(Self::from_dispatcher(Arc::new(dispatcher)))
    }

    /// Client sharing an existing dispatcher (and its cache, gate and backoff)
    pub fn from_dispatcher(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            paginated: PaginatedFetcher::new(Arc::clone(&dispatcher)),
            non_paginated: NonPaginatedFetcher::new(Arc::clone(&dispatcher)),
            dispatcher,
        }
    }

    /// The dispatcher every request goes through
    pub fn dispatcher(&self) -> &Arc<RequestDispatcher> {
        &self.dispatcher
    }

    /// All groups of the account
    pub fn groups(&self, cancel: CancellationToken) -> ItemStream<Group> {
        self.paginated.fetch_items("groups", cancel)
    }

    /// All connectors of a group
    pub fn connectors(&self, group_id: &str, cancel: CancellationToken) -> ItemStream<Connector> {
        let endpoint = format!("groups/{}/connectors", escape(group_id));
        self.paginated.fetch_items(endpoint, cancel)
    }

    /// Schema configuration of a connector
    pub async fn connector_schemas(
        &self,
        connector_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DataSchemas>> {
        let endpoint = format!("connectors/{}/schemas", escape(connector_id));
        self.non_paginated.fetch(&endpoint, cancel).await
    }
}

fn escape(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
