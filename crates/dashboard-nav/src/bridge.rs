//! Persistence bridge: the active view id in durable storage and in the URL.

use std::borrow::Cow;

use serde::Serialize;

use crate::config::NavConfig;
use crate::platform::{KeyValueStore, NavHistory, NavLocation};

/// Result of a bridge write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    /// The target already held the value; nothing was written.
    Unchanged,
    /// The collaborator was not provided.
    Unavailable,
    /// The collaborator raised an error, which was swallowed.
    Failed,
}

pub struct PersistenceBridge {
    storage: Option<Box<dyn KeyValueStore>>,
    location: Option<Box<dyn NavLocation>>,
    history: Option<Box<dyn NavHistory>>,
    storage_key: String,
    query_param: String,
}

impl PersistenceBridge {
    pub fn new(
        storage: Option<Box<dyn KeyValueStore>>,
        location: Option<Box<dyn NavLocation>>,
        history: Option<Box<dyn NavHistory>>,
        config: &NavConfig,
    ) -> Self {
        Self {
            storage,
            location,
            history,
            storage_key: config.storage_key.clone(),
            query_param: config.query_param.clone(),
        }
    }

    /// Current value of the tab query parameter, or empty.
    pub fn read_from_url(&self) -> String {
        let Some(location) = &self.location else {
            return String::new();
        };
        query_value(&location.search(), &self.query_param).unwrap_or_default()
    }

    /// Replace the tab query parameter in place, leaving every other
    /// parameter and the fragment untouched.
    pub fn write_to_url(&self, id: &str) -> WriteOutcome {
        let (Some(location), Some(history)) = (&self.location, &self.history) else {
            return WriteOutcome::Unavailable;
        };
        let search = location.search();
        if query_value(&search, &self.query_param).as_deref() == Some(id) {
            return WriteOutcome::Unchanged;
        }
        let url = format!(
            "{}{}{}",
            location.pathname(),
            with_query_value(&search, &self.query_param, id),
            location.hash()
        );
        match history.replace_state(&url) {
            Ok(()) => WriteOutcome::Written,
            Err(error) => {
                tracing::warn!(%error, url = %url, "tab navigation failed to replace history entry");
                WriteOutcome::Failed
            }
        }
    }

    /// Trimmed stored id, or empty on absence or access failure.
    pub fn read_from_store(&self) -> String {
        let Some(storage) = &self.storage else {
            return String::new();
        };
        match storage.get_item(&self.storage_key) {
            Ok(value) => value.map(|value| value.trim().to_string()).unwrap_or_default(),
            Err(error) => {
                tracing::warn!(%error, key = %self.storage_key, "tab navigation failed to read storage");
                String::new()
            }
        }
    }

    pub fn write_to_store(&self, id: &str) -> WriteOutcome {
        let Some(storage) = &self.storage else {
            return WriteOutcome::Unavailable;
        };
        if self.read_from_store() == id {
            return WriteOutcome::Unchanged;
        }
        match storage.set_item(&self.storage_key, id) {
            Ok(()) => WriteOutcome::Written,
            Err(error) => {
                tracing::warn!(%error, key = %self.storage_key, "tab navigation failed to write storage");
                WriteOutcome::Failed
            }
        }
    }
}

/// First value of `param` in a query string, form-decoded.
///
/// A value that does not decode is reported as empty.
pub fn query_value(search: &str, param: &str) -> Option<String> {
    split_query(search).find_map(|segment| {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        if decode_component(key).as_deref() != Some(param) {
            return None;
        }
        Some(decode_component(value).unwrap_or_default())
    })
}

/// Rebuild `search` with `param` set to `value`.
///
/// The first occurrence of `param` is replaced in place and later duplicates
/// are dropped; if absent it is appended. Other segments are copied
/// byte-for-byte. Returns the query with its leading `?`, or empty.
pub fn with_query_value(search: &str, param: &str, value: &str) -> String {
    let replacement = format!("{}={}", urlencoding::encode(param), urlencoding::encode(value));
    let mut segments: Vec<Cow<'_, str>> = Vec::new();
    let mut replaced = false;
    for segment in split_query(search) {
        let key = segment.split_once('=').map_or(segment, |(key, _)| key);
        if decode_component(key).as_deref() == Some(param) {
            if !replaced {
                segments.push(Cow::Owned(replacement.clone()));
                replaced = true;
            }
            continue;
        }
        segments.push(Cow::Borrowed(segment));
    }
    if !replaced {
        segments.push(Cow::Owned(replacement));
    }
    format!("?{}", segments.join("&"))
}

fn split_query(search: &str) -> impl Iterator<Item = &str> {
    search
        .strip_prefix('?')
        .unwrap_or(search)
        .split('&')
        .filter(|segment| !segment.is_empty())
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}
