//! Activation engine: the single funnel every view transition goes through.

use serde::{Deserialize, Serialize};

use crate::bridge::PersistenceBridge;
use crate::diagnostics::NavDiagnostics;
use crate::handle::NavHandle;
use crate::platform::PopstateTarget;
use crate::registry::TabRegistry;

/// Per-call activation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivateOptions {
    /// Write the id to durable storage.
    pub persist: bool,
    /// Move input focus to the active control.
    pub focus: bool,
    /// Rewrite the URL query parameter in place.
    pub sync_url: bool,
    /// Scroll the active control into view.
    pub reveal: bool,
}

impl Default for ActivateOptions {
    fn default() -> Self {
        Self {
            persist: true,
            focus: false,
            sync_url: true,
            reveal: true,
        }
    }
}

impl ActivateOptions {
    /// Initial application: normalize the URL, leave storage alone.
    pub fn bootstrap() -> Self {
        Self {
            persist: false,
            ..Self::default()
        }
    }

    pub fn keyboard() -> Self {
        Self {
            focus: true,
            ..Self::default()
        }
    }

    /// The URL is already the trigger, so it is not rewritten.
    pub fn popstate() -> Self {
        Self {
            sync_url: false,
            ..Self::default()
        }
    }
}

/// What triggered a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationSource {
    Bootstrap,
    Click,
    Keyboard,
    Popstate,
    Api,
}

impl ActivationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Click => "click",
            Self::Keyboard => "keyboard",
            Self::Popstate => "popstate",
            Self::Api => "api",
        }
    }
}

/// Navigation controller for one document.
///
/// `active_id` is the only mutable navigation state and is only written by
/// [`TabController::activate`].
pub struct TabController {
    registry: TabRegistry,
    bridge: PersistenceBridge,
    active_class: String,
    active_id: String,
    diagnostics: NavDiagnostics,
    events: Option<Box<dyn PopstateTarget>>,
}

impl TabController {
    pub(crate) fn new(
        registry: TabRegistry,
        bridge: PersistenceBridge,
        active_class: String,
        events: Option<Box<dyn PopstateTarget>>,
    ) -> Self {
        let diagnostics = NavDiagnostics::new(registry.len());
        Self {
            registry,
            bridge,
            active_class,
            active_id: String::new(),
            diagnostics,
            events,
        }
    }

    /// Apply `id` (or the first view when `id` is not valid) and return the
    /// canonical id actually applied.
    pub fn activate_tab(&mut self, id: &str, options: ActivateOptions) -> String {
        self.activate(id, options, ActivationSource::Api)
    }

    pub fn active_tab(&self) -> &str {
        &self.active_id
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &NavDiagnostics {
        &self.diagnostics
    }

    pub(crate) fn bridge(&self) -> &PersistenceBridge {
        &self.bridge
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut NavDiagnostics {
        &mut self.diagnostics
    }

    pub(crate) fn bind_listeners(&self, handle: &NavHandle) {
        self.registry.bind(handle);
        if let Some(events) = &self.events {
            events.listen_popstate(handle.clone());
        }
    }

    pub(crate) fn handle_click(&mut self, index: usize) -> Option<String> {
        let id = self.registry.id_at(index)?.to_string();
        Some(self.activate(&id, ActivateOptions::default(), ActivationSource::Click))
    }

    pub(crate) fn activate(
        &mut self,
        candidate: &str,
        options: ActivateOptions,
        source: ActivationSource,
    ) -> String {
        let target = self.registry.resolve_target(candidate).to_string();
        if target != candidate {
            tracing::debug!(
                candidate,
                fallback = %target,
                "tab navigation candidate is not a known view; using first view"
            );
        }

        for view in self.registry.views() {
            let active = view.id == target;
            view.control.set_selected(active);
            view.control.set_tab_stop(active);
            view.control.set_class(&self.active_class, active);
        }
        for entry in self.registry.panels() {
            entry.panel.set_hidden(entry.id != target);
        }
        for control in self.registry.extra_controls() {
            control.set_selected(false);
            control.set_tab_stop(false);
            control.set_class(&self.active_class, false);
        }
        for panel in self.registry.extra_panels() {
            panel.set_hidden(true);
        }

        let active_view = self
            .registry
            .views()
            .iter()
            .find(|view| view.id == target);
        if options.focus {
            if let Some(view) = active_view {
                view.control.focus();
            }
        }
        if options.persist {
            let outcome = self.bridge.write_to_store(&target);
            self.diagnostics.record_store_write(outcome);
        }
        if options.reveal {
            if let Some(view) = active_view.filter(|view| view.reveal) {
                view.control.reveal();
            }
        }
        if options.sync_url {
            let outcome = self.bridge.write_to_url(&target);
            self.diagnostics.record_url_write(outcome);
        }

        let previous = std::mem::replace(&mut self.active_id, target.clone());
        self.diagnostics.record_transition(source, options, &target);
        tracing::debug!(
            source = source.as_str(),
            from = %previous,
            to = %target,
            persist = options.persist,
            sync_url = options.sync_url,
            "tab navigation transition applied"
        );
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ACTIVE_CLASS, DEFAULT_STORAGE_KEY, NavConfig};
    use crate::memory::{MemoryBrowser, MemoryDocument};

    fn three_views() -> MemoryDocument {
        MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics")
            .with_view("config")
    }

    fn controller(document: &MemoryDocument, browser: &MemoryBrowser) -> TabController {
        let config = NavConfig::default();
        let Some(registry) = TabRegistry::discover(document, &config) else {
            panic!("expected registry");
        };
        let bridge = PersistenceBridge::new(
            Some(Box::new(browser.storage())),
            Some(Box::new(browser.location())),
            Some(Box::new(browser.history())),
            &config,
        );
        TabController::new(registry, bridge, config.active_class, None)
    }

    #[test]
    fn activation_marks_exactly_one_control_and_panel() {
        let document = three_views();
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        assert_eq!(
            controller.activate_tab("analytics", ActivateOptions::default()),
            "analytics"
        );
        assert_eq!(document.selected_controls(), vec!["analytics"]);
        assert_eq!(document.tab_stops(), vec!["analytics"]);
        assert_eq!(document.visible_panels(), vec!["analytics"]);
        let Some(control) = document.control("analytics") else {
            panic!("missing control");
        };
        assert!(control.has_class(DEFAULT_ACTIVE_CLASS));
        let Some(previous) = document.control("operation") else {
            panic!("missing control");
        };
        assert!(!previous.has_class(DEFAULT_ACTIVE_CLASS));
        assert_eq!(controller.active_tab(), "analytics");
    }

    #[test]
    fn invalid_candidate_falls_back_to_first_view() {
        let document = three_views();
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("config", ActivateOptions::default());
        assert_eq!(
            controller.activate_tab("clips", ActivateOptions::default()),
            "operation"
        );
        assert_eq!(controller.activate_tab("", ActivateOptions::default()), "operation");
        assert_eq!(document.visible_panels(), vec!["operation"]);
        assert_eq!(browser.url(), "/dash?tab=operation");
    }

    #[test]
    fn options_gate_each_side_effect() {
        let document = three_views();
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab(
            "config",
            ActivateOptions {
                persist: false,
                focus: false,
                sync_url: false,
                reveal: false,
            },
        );
        let Some(config) = document.control("config") else {
            panic!("missing control");
        };
        assert_eq!(browser.history_writes(), 0);
        assert_eq!(browser.store_writes(), 0);
        assert_eq!(config.focus_count(), 0);
        assert_eq!(config.reveal_count(), 0);

        controller.activate_tab(
            "config",
            ActivateOptions {
                focus: true,
                ..ActivateOptions::default()
            },
        );
        assert_eq!(browser.history_writes(), 1);
        assert_eq!(browser.stored(DEFAULT_STORAGE_KEY).as_deref(), Some("config"));
        assert_eq!(config.focus_count(), 1);
        assert_eq!(config.reveal_count(), 1);
    }

    #[test]
    fn repeated_activation_does_not_rewrite_store_or_url() {
        let document = three_views();
        let browser = MemoryBrowser::new("/dash?channel=canal_a");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("analytics", ActivateOptions::default());
        controller.activate_tab("analytics", ActivateOptions::default());
        controller.activate_tab("analytics", ActivateOptions::default());

        assert_eq!(browser.history_writes(), 1);
        assert_eq!(browser.store_writes(), 1);
        assert_eq!(controller.diagnostics().transitions, 3);
        assert_eq!(controller.diagnostics().url_writes, 1);
    }

    #[test]
    fn missing_reveal_support_is_tolerated() {
        let document = three_views().without_reveal();
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("config", ActivateOptions::default());
        let Some(config) = document.control("config") else {
            panic!("missing control");
        };
        assert_eq!(config.reveal_count(), 0);
        assert_eq!(controller.active_tab(), "config");
    }

    #[test]
    fn denied_storage_keeps_memory_only_navigation_working() {
        let document = three_views();
        let browser = MemoryBrowser::new("/dash");
        browser.deny_storage(true);
        let mut controller = controller(&document, &browser);

        assert_eq!(
            controller.activate_tab("config", ActivateOptions::default()),
            "config"
        );
        assert_eq!(document.visible_panels(), vec!["config"]);
        assert_eq!(browser.url(), "/dash?tab=config");
        assert_eq!(controller.diagnostics().platform_failures, 1);
    }

    #[test]
    fn repeated_panel_ids_stay_hidden() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics")
            .with_panel("analytics")
            .with_panel(" ");
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("operation", ActivateOptions::default());
        assert_eq!(document.visible_panels(), vec!["operation"]);

        controller.activate_tab("analytics", ActivateOptions::default());
        assert_eq!(document.visible_panels(), vec!["analytics"]);
    }

    #[test]
    fn repeated_control_ids_are_never_selected_or_focusable() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics")
            .with_control("analytics")
            .with_control("")
            .select_in_markup("analytics");
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("operation", ActivateOptions::default());
        assert_eq!(document.selected_controls(), vec!["operation"]);
        assert_eq!(document.tab_stops(), vec!["operation"]);

        controller.activate_tab("analytics", ActivateOptions::default());
        assert_eq!(document.selected_controls(), vec!["analytics"]);
        assert_eq!(document.tab_stops(), vec!["analytics"]);
    }

    #[test]
    fn orphan_panels_stay_hidden() {
        let document = three_views().with_panel("legacy");
        let browser = MemoryBrowser::new("/dash");
        let mut controller = controller(&document, &browser);

        controller.activate_tab("legacy", ActivateOptions::default());
        assert_eq!(controller.active_tab(), "operation");
        assert_eq!(document.visible_panels(), vec!["operation"]);
    }
}
