pub(crate) const DOCUMENT_KEY_ATTRIBUTE: &str = "data-dashboard-nav-document";
pub(crate) const ARIA_SELECTED: &str = "aria-selected";
pub(crate) const ARIA_HIDDEN: &str = "aria-hidden";
pub(crate) const CLICK_EVENT: &str = "click";
pub(crate) const KEYDOWN_EVENT: &str = "keydown";
pub(crate) const POPSTATE_EVENT: &str = "popstate";
pub(crate) const RESIZE_EVENT: &str = "resize";
pub(crate) const DEFAULT_STICKY_HEADER_SELECTOR: &str = "[data-dashboard-header]";
