#[cfg(any(target_arch = "wasm32", test))]
mod markup;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::{Cell, RefCell};

    use dashboard_nav::{
        ActivateOptions, DocumentKey, NavBootstrapper, NavConfig, NavDiagnostics, NavDocument,
        NavRefs, SharedController, TabController,
    };
    use serde::Serialize;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use crate::markup::normalized_selector;
    use crate::wasm_constants::DEFAULT_STICKY_HEADER_SELECTOR;

    mod dom;
    mod platform;
    mod sticky;

    use dom::WebDocument;
    use platform::{WebHistory, WebLocation, WebPopstateTarget, WebStorage};
    use sticky::StickyInstallation;

    thread_local! {
        static BOOTSTRAPPER: RefCell<NavBootstrapper> = RefCell::new(NavBootstrapper::new());
        static ACTIVE_DOCUMENT: Cell<Option<DocumentKey>> = const { Cell::new(None) };
        static NEXT_DOCUMENT_KEY: Cell<u64> = const { Cell::new(1) };
        static UNSTAMPED_DOCUMENT_KEY: Cell<Option<u64>> = const { Cell::new(None) };
        static SHELL_DIAGNOSTICS: RefCell<ShellDiagnostics> = RefCell::new(ShellDiagnostics::default());
        static STICKY_OFFSET: RefCell<Option<StickyInstallation>> = const { RefCell::new(None) };
    }

    #[derive(Debug, Clone, Default, Serialize)]
    struct ShellDiagnostics {
        initialized: bool,
        document: Option<u64>,
        sticky_offset_px: Option<u32>,
        last_error: Option<String>,
        navigation: Option<NavDiagnostics>,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
    }

    /// Discover the dashboard tabs with the default configuration.
    #[wasm_bindgen]
    pub fn init_tab_navigation() -> bool {
        init_with_config(NavConfig::default())
    }

    #[wasm_bindgen]
    pub fn init_tab_navigation_with_config(config_json: String) -> Result<bool, JsValue> {
        let config = NavConfig::from_json(&config_json).map_err(|error| {
            let message = error.to_string();
            record_shell_error(&message);
            JsValue::from_str(&message)
        })?;
        Ok(init_with_config(config))
    }

    /// Activate `id`; returns the canonical id applied, or empty when
    /// navigation is not initialized.
    #[wasm_bindgen]
    pub fn activate_tab(id: String) -> String {
        activate_with_options(&id, ActivateOptions::default())
    }

    #[wasm_bindgen]
    pub fn activate_tab_with_options(id: String, options_json: String) -> Result<String, JsValue> {
        let options = if options_json.trim().is_empty() {
            ActivateOptions::default()
        } else {
            serde_json::from_str::<ActivateOptions>(&options_json).map_err(|error| {
                JsValue::from_str(&format!("invalid activation options: {error}"))
            })?
        };
        Ok(activate_with_options(&id, options))
    }

    #[wasm_bindgen]
    pub fn active_tab() -> String {
        with_active_controller(|controller| controller.active_tab().to_string()).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn nav_diagnostics_json() -> String {
        let navigation = with_active_controller(|controller| controller.diagnostics().clone());
        let sticky_offset_px = STICKY_OFFSET.with(|slot| {
            slot.borrow()
                .as_ref()
                .and_then(StickyInstallation::applied_px)
        });
        SHELL_DIAGNOSTICS.with(|state| {
            let mut snapshot = state.borrow().clone();
            snapshot.navigation = navigation;
            snapshot.sticky_offset_px = sticky_offset_px;
            serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string())
        })
    }

    /// Publish the sticky header height as a CSS custom property and keep it
    /// current on resize. Replaces any previous installation.
    #[wasm_bindgen]
    pub fn install_sticky_offset(header_selector: Option<String>) -> bool {
        let selector = header_selector
            .as_deref()
            .and_then(normalized_selector)
            .unwrap_or_else(|| DEFAULT_STICKY_HEADER_SELECTOR.to_string());
        let _ = remove_sticky_offset();
        let Some(installation) = StickyInstallation::install(&selector) else {
            return false;
        };
        STICKY_OFFSET.with(|slot| *slot.borrow_mut() = Some(installation));
        true
    }

    /// Detach the resize listener and remove the CSS property.
    #[wasm_bindgen]
    pub fn remove_sticky_offset() -> bool {
        let Some(installation) = STICKY_OFFSET.with(|slot| slot.borrow_mut().take()) else {
            return false;
        };
        installation.cleanup();
        true
    }

    fn init_with_config(config: NavConfig) -> bool {
        let Some(window) = web_sys::window() else {
            record_shell_error("window is unavailable");
            return false;
        };
        let Some(document) = WebDocument::from_window(&window) else {
            record_shell_error("document is unavailable");
            return false;
        };
        let refs = NavRefs::new(&document)
            .with_storage(WebStorage::new(window.clone()))
            .with_location(WebLocation::new(window.clone()))
            .with_history(WebHistory::new(window.clone()))
            .with_events(WebPopstateTarget::new(window))
            .with_config(config);

        let controller = BOOTSTRAPPER.with(|bootstrapper| bootstrapper.borrow_mut().init(refs));
        let key = document.identity();
        SHELL_DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.initialized = controller.is_some();
            state.document = Some(key.0);
            if controller.is_some() {
                state.last_error = None;
            }
        });
        if controller.is_none() {
            return false;
        }
        ACTIVE_DOCUMENT.with(|active| active.set(Some(key)));
        true
    }

    fn activate_with_options(id: &str, options: ActivateOptions) -> String {
        with_active_controller_mut(|controller| controller.activate_tab(id, options))
            .unwrap_or_default()
    }

    fn active_controller() -> Option<SharedController> {
        let key = ACTIVE_DOCUMENT.with(Cell::get)?;
        BOOTSTRAPPER.with(|bootstrapper| bootstrapper.borrow().controller(key))
    }

    fn with_active_controller<R>(read: impl FnOnce(&TabController) -> R) -> Option<R> {
        let controller = active_controller()?;
        let Ok(controller) = controller.try_borrow() else {
            return None;
        };
        Some(read(&controller))
    }

    fn with_active_controller_mut<R>(apply: impl FnOnce(&mut TabController) -> R) -> Option<R> {
        let controller = active_controller()?;
        let Ok(mut controller) = controller.try_borrow_mut() else {
            record_shell_error("tab activation requested during an in-flight transition");
            return None;
        };
        Some(apply(&mut controller))
    }

    fn record_shell_error(message: &str) {
        SHELL_DIAGNOSTICS.with(|state| {
            state.borrow_mut().last_error = Some(message.to_string());
        });
        web_sys::console::warn_1(&JsValue::from_str(message));
    }

    fn next_document_key() -> u64 {
        NEXT_DOCUMENT_KEY.with(|next| {
            let key = next.get();
            next.set(key.saturating_add(1));
            key
        })
    }

    fn js_error_text(error: &JsValue) -> String {
        error
            .as_string()
            .or_else(|| {
                error
                    .dyn_ref::<js_sys::Error>()
                    .map(|error| String::from(error.message()))
            })
            .unwrap_or_else(|| format!("{error:?}"))
    }
}
