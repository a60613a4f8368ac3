//! Bootstrap and idempotency guard.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::bridge::PersistenceBridge;
use crate::config::NavConfig;
use crate::engine::{ActivateOptions, ActivationSource, TabController};
use crate::handle::{NavHandle, SharedController};
use crate::platform::{
    DocumentKey, KeyValueStore, NavDocument, NavHistory, NavLocation, PopstateTarget,
};
use crate::registry::TabRegistry;

/// Collaborators handed to [`NavBootstrapper::init`]. Each one is optional;
/// without a document there is nothing to navigate.
#[derive(Default)]
pub struct NavRefs<'a> {
    pub document: Option<&'a dyn NavDocument>,
    pub storage: Option<Box<dyn KeyValueStore>>,
    pub location: Option<Box<dyn NavLocation>>,
    pub history: Option<Box<dyn NavHistory>>,
    pub events: Option<Box<dyn PopstateTarget>>,
    pub config: NavConfig,
}

impl<'a> NavRefs<'a> {
    pub fn new(document: &'a dyn NavDocument) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    pub fn with_storage(mut self, storage: impl KeyValueStore + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn with_location(mut self, location: impl NavLocation + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    pub fn with_history(mut self, history: impl NavHistory + 'static) -> Self {
        self.history = Some(Box::new(history));
        self
    }

    pub fn with_events(mut self, events: impl PopstateTarget + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    pub fn with_config(mut self, config: NavConfig) -> Self {
        self.config = config;
        self
    }
}

/// Which source supplied the initial view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialSource {
    Url,
    Store,
    Markup,
    FirstInOrder,
}

/// Initial view by fixed precedence: URL, then storage, then the markup
/// default, then the first view in document order.
pub fn resolve_initial(
    registry: &TabRegistry,
    bridge: &PersistenceBridge,
) -> (String, InitialSource) {
    let from_url = bridge.read_from_url();
    if registry.is_valid(&from_url) {
        return (from_url, InitialSource::Url);
    }
    let from_store = bridge.read_from_store();
    if registry.is_valid(&from_store) {
        return (from_store, InitialSource::Store);
    }
    if let Some(selected) = registry.markup_selected() {
        return (selected.to_string(), InitialSource::Markup);
    }
    (registry.first_id().to_string(), InitialSource::FirstInOrder)
}

/// Owns the one controller per document.
#[derive(Default)]
pub struct NavBootstrapper {
    controllers: HashMap<DocumentKey, SharedController>,
}

impl NavBootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build, apply and bind the controller for `refs.document`.
    ///
    /// Returns `None` when the document has no navigable views. A second call
    /// for the same document returns the cached controller and binds nothing.
    pub fn init(&mut self, refs: NavRefs<'_>) -> Option<SharedController> {
        let document = refs.document?;
        let key = document.identity();
        if let Some(existing) = self.controllers.get(&key) {
            tracing::debug!(document = key.0, "tab navigation already initialized");
            return Some(Rc::clone(existing));
        }

        let Some(registry) = TabRegistry::discover(document, &refs.config) else {
            tracing::debug!(document = key.0, "tab navigation found no views; inert");
            return None;
        };
        let bridge =
            PersistenceBridge::new(refs.storage, refs.location, refs.history, &refs.config);
        let (initial, resolved_from) = resolve_initial(&registry, &bridge);

        let mut controller =
            TabController::new(registry, bridge, refs.config.active_class, refs.events);
        let applied = controller.activate(
            &initial,
            ActivateOptions::bootstrap(),
            ActivationSource::Bootstrap,
        );
        tracing::info!(
            document = key.0,
            tab_count = controller.registry().len(),
            initial = %applied,
            resolved_from = ?resolved_from,
            "tab navigation initialized"
        );

        let shared = Rc::new(RefCell::new(controller));
        shared.borrow().bind_listeners(&NavHandle::new(&shared));
        self.controllers.insert(key, Rc::clone(&shared));
        Some(shared)
    }

    pub fn controller(&self, key: DocumentKey) -> Option<SharedController> {
        self.controllers.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
