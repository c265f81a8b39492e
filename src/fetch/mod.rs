//! Fetcher module
//!
//! Decodes API envelopes on top of the request dispatcher.
//!
//! # Overview
//!
//! - `NonPaginatedFetcher` - one GET, one `{ "data": T }` object
//! - `PaginatedFetcher` - cursor chains flattened into an `ItemStream`,
//!   with the next page prefetched while the current one is consumed

mod envelope;
mod fields;
mod paginated;
mod single;

pub use envelope::{type_label, NonPaginatedRoot, Page, PageData, PaginatedRoot};
pub use paginated::{ItemStream, PaginatedFetcher, PAGE_SIZE};
pub use single::NonPaginatedFetcher;
