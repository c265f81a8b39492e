//! Response envelopes and decoding
//!
//! Every payload arrives wrapped in a `data` field:
//! - single object: `{ "data": <T> }`
//! - collection page: `{ "data": { "items": [<T>, ...], "next_cursor": "..." } }`
//!
//! Field names are matched ignoring case, see `CaseInsensitive`.

use super::fields::CaseInsensitive;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Envelope around a single object
#[derive(Debug, Clone, Deserialize)]
pub struct NonPaginatedRoot<T> {
    /// The payload, absent when the server sends `null`
    pub data: Option<T>,
}

/// Envelope around one page of a collection
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedRoot<T> {
    /// The page, absent when the server sends `null`
    pub data: Option<PageData<T>>,
}

/// Items and continuation cursor of one page
#[derive(Debug, Clone, Deserialize)]
pub struct PageData<T> {
    /// Items in server order
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Cursor of the next page
    #[serde(alias = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// One decoded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Raw cursor as sent by the server
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Page with no items and no continuation
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Cursor of the next page; blank cursors mean there is none
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor
            .as_deref()
            .filter(|cursor| !cursor.trim().is_empty())
    }

    /// Check if this is the last page
    pub fn is_last(&self) -> bool {
        self.next_cursor().is_none()
    }
}

impl<T> From<Option<PaginatedRoot<T>>> for Page<T> {
    fn from(root: Option<PaginatedRoot<T>>) -> Self {
        match root.and_then(|root| root.data) {
            Some(data) => Self {
                items: data.items,
                next_cursor: data.next_cursor,
            },
            None => Self::empty(),
        }
    }
}

/// Decode `body` as `D` with case-insensitive field names, wrapping failures
/// with endpoint, target and preview
pub(crate) fn decode_body<D, F>(body: &str, endpoint: &str, target: F) -> Result<D>
where
    D: DeserializeOwned,
    F: FnOnce() -> String,
{
    serde_json::from_str::<Value>(body)
        .and_then(|value| D::deserialize(CaseInsensitive(value)))
        .map_err(|source| Error::decode(endpoint, target(), body, source))
}

/// Type name of `T` with module paths stripped, e.g. `Vec<Group>`
pub fn type_label<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut label = String::with_capacity(full.len());
    let mut path = String::new();

    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            path.push(c);
        } else {
            label.push_str(last_segment(&path));
            path.clear();
            label.push(c);
        }
    }
    label.push_str(last_segment(&path));
    label
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
