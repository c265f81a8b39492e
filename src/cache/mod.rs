//! Response cache module
//!
//! A small thread-safe map whose entries expire independently.
//!
//! # Overview
//!
//! The dispatcher keeps successful response bodies here, keyed by the exact
//! request URL, so repeated identical GETs inside the TTL window never reach
//! the network. Expired entries are evicted lazily on access; callers that
//! want to reclaim memory eagerly can call `TtlCache::purge_expired`.

mod ttl;

pub use ttl::{CacheEntry, TtlCache};
