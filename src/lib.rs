// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_fields_in_debug)]

//! # Fivetran REST client
//!
//! A resilient fetch layer for the Fivetran REST API.
//!
//! ## Features
//!
//! - **Rate-limit handling**: 429 responses are retried after `Retry-After`
//!   (60 s when absent), and the pause applies to every request of the client
//! - **Concurrency gate**: optional bound on transport calls in flight
//! - **Response cache**: successful bodies are reused for a short TTL
//! - **Cursor pagination**: items stream in order while the next page is
//!   already being fetched
//! - **Cancellation**: every operation observes a `CancellationToken`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fivetran_client::{CancellationToken, ClientOptions, RestApiManager};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> fivetran_client::Result<()> {
//!     let options = ClientOptions::builder().max_concurrent_requests(4).build();
//!     let api = RestApiManager::new("key", "secret", options)?;
//!     let cancel = CancellationToken::new();
//!
//!     let groups: Vec<_> = api.groups(cancel.clone()).try_collect().await?;
//!     for group in &groups {
//!         let mut connectors = api.connectors(&group.id, cancel.clone());
//!         while let Some(connector) = connectors.try_next().await? {
//!             println!("{} {}", group.name, connector.service);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      RestApiManager                       │
//! │   groups()     connectors(group)     connector_schemas()  │
//! └───────────────────────────────────────────────────────────┘
//!                 │                               │
//! ┌───────────────┴──────────────┐  ┌─────────────┴───────────┐
//! │ PaginatedFetcher (prefetch)  │  │ NonPaginatedFetcher     │
//! └───────────────┬──────────────┘  └─────────────┬───────────┘
//!                 └───────────────┬───────────────┘
//! ┌───────────────────────────────┴───────────────────────────┐
//! │ RequestDispatcher: cache → gate → 429 deadline → retries  │
//! └───────────────────────────────┬───────────────────────────┘
//!                        Transport (reqwest)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![warn(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Client options and settings files
pub mod config;

/// API credentials
pub mod auth;

/// Time-bounded response cache
pub mod cache;

/// Transport, concurrency gate and request dispatcher
pub mod http;

/// Envelope decoding and pagination
pub mod fetch;

/// Response models
pub mod models;

/// Named API resources
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::RestApiManager;
pub use config::{ClientOptions, ClientSettings};
pub use error::{Error, Result};
pub use fetch::{ItemStream, Page};
pub use tokio_util::sync::CancellationToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
