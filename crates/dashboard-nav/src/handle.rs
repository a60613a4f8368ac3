use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::TabController;

/// The controller as held by the bootstrapper and by the host page.
pub type SharedController = Rc<RefCell<TabController>>;

/// Weak handle given to event listeners.
///
/// Listeners are owned (transitively) by the controller, so they only hold a
/// weak reference back to it. Every method funnels into the controller's
/// single activation path.
#[derive(Clone)]
pub struct NavHandle {
    controller: Weak<RefCell<TabController>>,
}

impl NavHandle {
    pub fn new(controller: &SharedController) -> Self {
        Self {
            controller: Rc::downgrade(controller),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.controller.strong_count() > 0
    }

    /// A control was clicked. Returns the applied canonical id.
    pub fn click(&self, index: usize) -> Option<String> {
        self.with_controller(|controller| controller.handle_click(index))
            .flatten()
    }

    /// A key went down on a control. Returns `true` when the key was handled
    /// and the caller must suppress the default browser behavior.
    pub fn key_down(&self, index: usize, key: &str) -> bool {
        self.with_controller(|controller| controller.handle_key_down(index, key))
            .unwrap_or(false)
    }

    /// Back/forward navigation happened. Returns `true` when it caused a
    /// transition.
    pub fn popstate(&self) -> bool {
        self.with_controller(TabController::handle_popstate)
            .unwrap_or(false)
    }

    fn with_controller<R>(&self, apply: impl FnOnce(&mut TabController) -> R) -> Option<R> {
        let controller = self.controller.upgrade()?;
        let Ok(mut controller) = controller.try_borrow_mut() else {
            tracing::warn!("tab navigation event arrived during an in-flight transition; ignored");
            return None;
        };
        Some(apply(&mut controller))
    }
}

impl fmt::Debug for NavHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{NavBootstrapper, NavRefs};
    use crate::memory::{MemoryBrowser, MemoryDocument};

    #[test]
    fn events_during_a_held_borrow_are_dropped() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics");
        let browser = MemoryBrowser::new("/dash?tab=operation");
        let mut bootstrapper = NavBootstrapper::new();
        let Some(controller) = bootstrapper.init(
            NavRefs::new(&document)
                .with_storage(browser.storage())
                .with_location(browser.location())
                .with_history(browser.history())
                .with_events(browser.events()),
        ) else {
            panic!("expected controller");
        };
        let handle = NavHandle::new(&controller);
        let transitions = controller.borrow().diagnostics().transitions;

        {
            let _in_flight = controller.borrow_mut();
            assert_eq!(handle.click(1), None);
            assert!(!handle.key_down(0, "ArrowRight"));
            browser.navigate("/dash?tab=analytics");
            assert!(!handle.popstate());
        }

        let controller = controller.borrow();
        assert_eq!(controller.active_tab(), "operation");
        assert_eq!(controller.diagnostics().transitions, transitions);
        assert_eq!(controller.diagnostics().ignored_popstates, 0);
        assert_eq!(document.visible_panels(), vec!["operation"]);
        assert_eq!(browser.store_writes(), 0);
        assert_eq!(browser.history_writes(), 0);
    }

    #[test]
    fn detached_handle_is_inert() {
        let document = MemoryDocument::new().with_view("operation");
        let mut bootstrapper = NavBootstrapper::new();
        let Some(controller) = bootstrapper.init(NavRefs::new(&document)) else {
            panic!("expected controller");
        };
        let handle = NavHandle::new(&controller);
        drop(controller);
        drop(bootstrapper);

        assert!(!handle.is_attached());
        assert_eq!(handle.click(0), None);
        assert!(!handle.popstate());
    }
}
