//! Host collaborator contracts.
//!
//! The navigation core never talks to a browser directly. A host (the wasm
//! web shell, or the in-memory doubles in [`crate::memory`]) adapts its
//! document, storage, location and history objects to these traits.

use crate::handle::NavHandle;

/// Stable identity of a host document, used as the bootstrap cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey(pub u64);

/// Failure reported by a platform collaborator.
///
/// These never escape the controller; they are logged and counted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("{0} is unavailable")]
    Unavailable(String),
    #[error("access to {0} was denied")]
    Denied(String),
    #[error("{operation} was rejected: {reason}")]
    Rejected { operation: String, reason: String },
}

/// A view control (the clickable tab).
pub trait TabControl {
    /// Identifier carried by the control's marker attribute.
    fn view_id(&self) -> String;

    /// Whether the markup declares this control as the default selection.
    fn declares_selected(&self) -> bool;

    fn set_selected(&self, selected: bool);

    /// Include or exclude the control from sequential keyboard focus.
    fn set_tab_stop(&self, tab_stop: bool);

    fn set_class(&self, class: &str, enabled: bool);

    fn focus(&self);

    /// Whether [`TabControl::reveal`] does anything on this host. Checked once
    /// at discovery.
    fn supports_reveal(&self) -> bool {
        false
    }

    /// Scroll the control into view.
    fn reveal(&self) {}

    /// Register click and keydown listeners that forward into `handle`.
    fn listen(&self, index: usize, handle: NavHandle);
}

/// A view panel (the content region a control reveals).
pub trait TabPanel {
    fn view_id(&self) -> String;

    /// Toggle the hidden flag and its accessibility mirror together.
    fn set_hidden(&self, hidden: bool);
}

/// Document-like collaborator used once during discovery.
pub trait NavDocument {
    fn identity(&self) -> DocumentKey;

    /// Elements carrying the control marker attribute, in document order.
    fn controls(&self, attribute: &str) -> Vec<Box<dyn TabControl>>;

    /// Elements carrying the panel marker attribute, in document order.
    fn panels(&self, attribute: &str) -> Vec<Box<dyn TabPanel>>;
}

/// Durable key-value storage that outlives a page load.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError>;
}

/// Read access to the current address.
pub trait NavLocation {
    fn pathname(&self) -> String;
    /// Query string including the leading `?`, or empty.
    fn search(&self) -> String;
    /// Fragment including the leading `#`, or empty.
    fn hash(&self) -> String;
}

/// In-place history replacement. The core never pushes entries.
pub trait NavHistory {
    fn replace_state(&self, url: &str) -> Result<(), PlatformError>;
}

/// Global target for back/forward navigation events.
pub trait PopstateTarget {
    fn listen_popstate(&self, handle: NavHandle);
}
