//! In-memory host: a document, storage, location, history and popstate
//! target that live entirely in process.
//!
//! Used by the test suites and by native embedders that want the navigation
//! state machine without a browser. Every collaborator records what the
//! controller did to it so callers can assert on writes, focus and scroll.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handle::NavHandle;
use crate::platform::{
    DocumentKey, KeyValueStore, NavDocument, NavHistory, NavLocation, PlatformError,
    PopstateTarget, TabControl, TabPanel,
};

fn next_document_key() -> DocumentKey {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    DocumentKey(COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// A marked element. The same type backs controls and panels.
#[derive(Debug)]
pub struct MemoryElement {
    id: String,
    declared_selected: Cell<bool>,
    reveal_supported: Cell<bool>,
    selected: Cell<bool>,
    tab_stop: Cell<bool>,
    hidden: Cell<bool>,
    classes: RefCell<BTreeSet<String>>,
    focus_count: Cell<usize>,
    reveal_count: Cell<usize>,
    listeners: RefCell<Vec<(usize, NavHandle)>>,
}

impl MemoryElement {
    fn new(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            declared_selected: Cell::new(false),
            reveal_supported: Cell::new(true),
            selected: Cell::new(false),
            tab_stop: Cell::new(true),
            hidden: Cell::new(false),
            classes: RefCell::new(BTreeSet::new()),
            focus_count: Cell::new(0),
            reveal_count: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }

    pub fn is_tab_stop(&self) -> bool {
        self.tab_stop.get()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.get()
    }

    pub fn reveal_count(&self) -> usize {
        self.reveal_count.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn first_listener(&self) -> Option<(usize, NavHandle)> {
        self.listeners.borrow().first().cloned()
    }
}

struct MemoryControl(Rc<MemoryElement>);

impl TabControl for MemoryControl {
    fn view_id(&self) -> String {
        self.0.id.clone()
    }

    fn declares_selected(&self) -> bool {
        self.0.declared_selected.get()
    }

    fn set_selected(&self, selected: bool) {
        self.0.selected.set(selected);
    }

    fn set_tab_stop(&self, tab_stop: bool) {
        self.0.tab_stop.set(tab_stop);
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let mut classes = self.0.classes.borrow_mut();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn focus(&self) {
        self.0.focus_count.set(self.0.focus_count.get() + 1);
    }

    fn supports_reveal(&self) -> bool {
        self.0.reveal_supported.get()
    }

    fn reveal(&self) {
        self.0.reveal_count.set(self.0.reveal_count.get() + 1);
    }

    fn listen(&self, index: usize, handle: NavHandle) {
        self.0.listeners.borrow_mut().push((index, handle));
    }
}

struct MemoryPanel(Rc<MemoryElement>);

impl TabPanel for MemoryPanel {
    fn view_id(&self) -> String {
        self.0.id.clone()
    }

    fn set_hidden(&self, hidden: bool) {
        self.0.hidden.set(hidden);
    }
}

/// Document with a fixed list of controls and panels.
#[derive(Debug)]
pub struct MemoryDocument {
    key: DocumentKey,
    controls: Vec<Rc<MemoryElement>>,
    panels: Vec<Rc<MemoryElement>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            key: next_document_key(),
            controls: Vec::new(),
            panels: Vec::new(),
        }
    }

    /// Add a control and its panel.
    pub fn with_view(self, id: &str) -> Self {
        self.with_control(id).with_panel(id)
    }

    pub fn with_control(mut self, id: &str) -> Self {
        self.controls.push(MemoryElement::new(id));
        self
    }

    pub fn with_panel(mut self, id: &str) -> Self {
        self.panels.push(MemoryElement::new(id));
        self
    }

    /// Mark the control as selected in the markup (the design-time default).
    pub fn select_in_markup(self, id: &str) -> Self {
        for control in self.controls.iter().filter(|control| control.id == id) {
            control.declared_selected.set(true);
        }
        self
    }

    /// Simulate a host without scroll-into-view support.
    pub fn without_reveal(self) -> Self {
        for control in &self.controls {
            control.reveal_supported.set(false);
        }
        self
    }

    pub fn control(&self, id: &str) -> Option<Rc<MemoryElement>> {
        self.controls.iter().find(|control| control.id == id).cloned()
    }

    pub fn panel(&self, id: &str) -> Option<Rc<MemoryElement>> {
        self.panels.iter().find(|panel| panel.id == id).cloned()
    }

    pub fn selected_controls(&self) -> Vec<String> {
        self.controls
            .iter()
            .filter(|control| control.is_selected())
            .map(|control| control.id.clone())
            .collect()
    }

    pub fn tab_stops(&self) -> Vec<String> {
        self.controls
            .iter()
            .filter(|control| control.is_tab_stop())
            .map(|control| control.id.clone())
            .collect()
    }

    pub fn visible_panels(&self) -> Vec<String> {
        self.panels
            .iter()
            .filter(|panel| !panel.is_hidden())
            .map(|panel| panel.id.clone())
            .collect()
    }

    /// Dispatch a click to the first listener bound on the control.
    pub fn click(&self, id: &str) -> Option<String> {
        let (index, handle) = self.control(id)?.first_listener()?;
        handle.click(index)
    }

    /// Dispatch a keydown; returns whether the default was prevented.
    pub fn key_down(&self, id: &str, key: &str) -> bool {
        let Some((index, handle)) = self.control(id).and_then(|control| control.first_listener())
        else {
            return false;
        };
        handle.key_down(index, key)
    }
}

impl NavDocument for MemoryDocument {
    fn identity(&self) -> DocumentKey {
        self.key
    }

    fn controls(&self, _attribute: &str) -> Vec<Box<dyn TabControl>> {
        self.controls
            .iter()
            .map(|control| Box::new(MemoryControl(Rc::clone(control))) as Box<dyn TabControl>)
            .collect()
    }

    fn panels(&self, _attribute: &str) -> Vec<Box<dyn TabPanel>> {
        self.panels
            .iter()
            .map(|panel| Box::new(MemoryPanel(Rc::clone(panel))) as Box<dyn TabPanel>)
            .collect()
    }
}

#[derive(Debug, Default)]
struct BrowserState {
    pathname: String,
    search: String,
    hash: String,
    storage: BTreeMap<String, String>,
    storage_denied: bool,
    history_rejected: bool,
    replaced_urls: Vec<String>,
    store_writes: usize,
    popstate_listeners: Vec<NavHandle>,
}

impl BrowserState {
    fn set_url(&mut self, url: &str) {
        let (before_hash, hash) = match url.split_once('#') {
            Some((before, fragment)) if !fragment.is_empty() => (before, format!("#{fragment}")),
            Some((before, _)) => (before, String::new()),
            None => (url, String::new()),
        };
        let (pathname, search) = match before_hash.split_once('?') {
            Some((path, query)) if !query.is_empty() => (path, format!("?{query}")),
            Some((path, _)) => (path, String::new()),
            None => (before_hash, String::new()),
        };
        self.pathname = if pathname.is_empty() {
            "/".to_string()
        } else {
            pathname.to_string()
        };
        self.search = search;
        self.hash = hash;
    }
}

/// Shared browser state behind the storage, location, history and popstate
/// doubles.
#[derive(Debug, Clone, Default)]
pub struct MemoryBrowser {
    state: Rc<RefCell<BrowserState>>,
}

impl MemoryBrowser {
    pub fn new(url: &str) -> Self {
        let browser = Self::default();
        browser.state.borrow_mut().set_url(url);
        browser
    }

    pub fn storage(&self) -> MemoryStorage {
        MemoryStorage {
            state: Rc::clone(&self.state),
        }
    }

    pub fn location(&self) -> MemoryLocation {
        MemoryLocation {
            state: Rc::clone(&self.state),
        }
    }

    pub fn history(&self) -> MemoryHistory {
        MemoryHistory {
            state: Rc::clone(&self.state),
        }
    }

    pub fn events(&self) -> MemoryEvents {
        MemoryEvents {
            state: Rc::clone(&self.state),
        }
    }

    /// Seed storage without counting a write.
    pub fn set_stored(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .storage
            .insert(key.to_string(), value.to_string());
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }

    /// Make every storage access fail, like a sandboxed frame.
    pub fn deny_storage(&self, denied: bool) {
        self.state.borrow_mut().storage_denied = denied;
    }

    pub fn reject_history(&self, rejected: bool) {
        self.state.borrow_mut().history_rejected = rejected;
    }

    pub fn url(&self) -> String {
        let state = self.state.borrow();
        format!("{}{}{}", state.pathname, state.search, state.hash)
    }

    pub fn history_writes(&self) -> usize {
        self.state.borrow().replaced_urls.len()
    }

    pub fn replaced_urls(&self) -> Vec<String> {
        self.state.borrow().replaced_urls.clone()
    }

    pub fn store_writes(&self) -> usize {
        self.state.borrow().store_writes
    }

    pub fn popstate_listener_count(&self) -> usize {
        self.state.borrow().popstate_listeners.len()
    }

    /// Simulate back/forward: move to `url` without a history write, then
    /// dispatch popstate to every listener.
    pub fn navigate(&self, url: &str) {
        self.state.borrow_mut().set_url(url);
        self.dispatch_popstate();
    }

    pub fn dispatch_popstate(&self) {
        let listeners = self.state.borrow().popstate_listeners.clone();
        for listener in listeners {
            listener.popstate();
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    state: Rc<RefCell<BrowserState>>,
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let state = self.state.borrow();
        if state.storage_denied {
            return Err(PlatformError::Denied("memory storage".to_string()));
        }
        Ok(state.storage.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if state.storage_denied {
            return Err(PlatformError::Denied("memory storage".to_string()));
        }
        state.storage.insert(key.to_string(), value.to_string());
        state.store_writes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryLocation {
    state: Rc<RefCell<BrowserState>>,
}

impl NavLocation for MemoryLocation {
    fn pathname(&self) -> String {
        self.state.borrow().pathname.clone()
    }

    fn search(&self) -> String {
        self.state.borrow().search.clone()
    }

    fn hash(&self) -> String {
        self.state.borrow().hash.clone()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    state: Rc<RefCell<BrowserState>>,
}

impl NavHistory for MemoryHistory {
    fn replace_state(&self, url: &str) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if state.history_rejected {
            return Err(PlatformError::Rejected {
                operation: "replaceState".to_string(),
                reason: "memory history rejects writes".to_string(),
            });
        }
        state.replaced_urls.push(url.to_string());
        state.set_url(url);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryEvents {
    state: Rc<RefCell<BrowserState>>,
}

impl PopstateTarget for MemoryEvents {
    fn listen_popstate(&self, handle: NavHandle) {
        self.state.borrow_mut().popstate_listeners.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_splits_url_into_location_parts() {
        let browser = MemoryBrowser::new("/ops?tab=config&channel=a#live");
        let location = browser.location();
        assert_eq!(location.pathname(), "/ops");
        assert_eq!(location.search(), "?tab=config&channel=a");
        assert_eq!(location.hash(), "#live");

        browser.navigate("?#");
        assert_eq!(browser.url(), "/");
    }

    #[test]
    fn documents_get_distinct_identities() {
        assert_ne!(
            MemoryDocument::new().identity(),
            MemoryDocument::new().identity()
        );
    }
}
