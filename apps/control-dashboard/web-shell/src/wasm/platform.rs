use super::*;

use dashboard_nav::{
    KeyValueStore, NavHandle, NavHistory, NavLocation, PlatformError, PopstateTarget,
};
use web_sys::{Storage, Window};

use crate::wasm_constants::POPSTATE_EVENT;

/// `localStorage`, looked up on every access since browsers may revoke it
/// mid-session.
pub(super) struct WebStorage {
    window: Window,
}

impl WebStorage {
    pub(super) fn new(window: Window) -> Self {
        Self { window }
    }

    fn storage(&self) -> Result<Storage, PlatformError> {
        match self.window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(PlatformError::Unavailable("localStorage".to_string())),
            Err(error) => Err(PlatformError::Denied(format!(
                "localStorage ({})",
                js_error_text(&error)
            ))),
        }
    }
}

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        self.storage()?
            .get_item(key)
            .map_err(|error| PlatformError::Rejected {
                operation: format!("localStorage.getItem({key})"),
                reason: js_error_text(&error),
            })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|error| PlatformError::Rejected {
                operation: format!("localStorage.setItem({key})"),
                reason: js_error_text(&error),
            })
    }
}

pub(super) struct WebLocation {
    window: Window,
}

impl WebLocation {
    pub(super) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl NavLocation for WebLocation {
    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn hash(&self) -> String {
        self.window.location().hash().unwrap_or_default()
    }
}

pub(super) struct WebHistory {
    window: Window,
}

impl WebHistory {
    pub(super) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl NavHistory for WebHistory {
    fn replace_state(&self, url: &str) -> Result<(), PlatformError> {
        let history = self
            .window
            .history()
            .map_err(|_| PlatformError::Unavailable("history".to_string()))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|error| PlatformError::Rejected {
                operation: "history.replaceState".to_string(),
                reason: js_error_text(&error),
            })
    }
}

/// Window-level popstate binding. Owns its callback for the page lifetime.
pub(super) struct WebPopstateTarget {
    window: Window,
    handler: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>>,
}

impl WebPopstateTarget {
    pub(super) fn new(window: Window) -> Self {
        Self {
            window,
            handler: RefCell::new(None),
        }
    }
}

impl PopstateTarget for WebPopstateTarget {
    fn listen_popstate(&self, handle: NavHandle) {
        if self.handler.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let _ = handle.popstate();
        }));
        if let Err(error) = self
            .window
            .add_event_listener_with_callback(POPSTATE_EVENT, callback.as_ref().unchecked_ref())
        {
            record_shell_error(&format!(
                "failed to bind popstate: {}",
                js_error_text(&error)
            ));
        }
        *self.handler.borrow_mut() = Some(callback);
    }
}
