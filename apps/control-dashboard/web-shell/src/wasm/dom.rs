use super::*;

use dashboard_nav::{NavHandle, TabControl, TabPanel};
use web_sys::{Document, HtmlElement, Window};

use crate::markup::{
    DocumentKeySource, aria_flag, aria_value, document_key_source, marker_selector, tab_index,
};
use crate::wasm_constants::{
    ARIA_HIDDEN, ARIA_SELECTED, CLICK_EVENT, DOCUMENT_KEY_ATTRIBUTE, KEYDOWN_EVENT,
};

pub(super) struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub(super) fn from_window(window: &Window) -> Option<Self> {
        window.document().map(|document| Self { document })
    }

    fn marked_elements(&self, attribute: &str) -> Vec<HtmlElement> {
        let Ok(nodes) = self.document.query_selector_all(&marker_selector(attribute)) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }
}

impl NavDocument for WebDocument {
    fn identity(&self) -> DocumentKey {
        let Some(root) = self.document.document_element() else {
            return DocumentKey(0);
        };
        let stamped = root.get_attribute(DOCUMENT_KEY_ATTRIBUTE);
        let remembered = UNSTAMPED_DOCUMENT_KEY.with(Cell::get);
        let source = document_key_source(stamped.as_deref(), remembered, next_document_key);
        if let DocumentKeySource::Fresh(key) = source {
            if let Err(error) = root.set_attribute(DOCUMENT_KEY_ATTRIBUTE, &key.to_string()) {
                record_shell_error(&format!(
                    "failed to stamp document identity: {}",
                    js_error_text(&error)
                ));
                UNSTAMPED_DOCUMENT_KEY.with(|slot| slot.set(Some(key)));
            }
        }
        DocumentKey(source.key())
    }

    fn controls(&self, attribute: &str) -> Vec<Box<dyn TabControl>> {
        self.marked_elements(attribute)
            .into_iter()
            .map(|element| Box::new(WebTabControl::new(element, attribute)) as Box<dyn TabControl>)
            .collect()
    }

    fn panels(&self, attribute: &str) -> Vec<Box<dyn TabPanel>> {
        self.marked_elements(attribute)
            .into_iter()
            .map(|element| Box::new(WebTabPanel::new(element, attribute)) as Box<dyn TabPanel>)
            .collect()
    }
}

struct WebTabControl {
    element: HtmlElement,
    view_id: String,
    click_handlers: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>>,
    keydown_handlers: RefCell<Vec<Closure<dyn FnMut(web_sys::KeyboardEvent)>>>,
}

impl WebTabControl {
    fn new(element: HtmlElement, attribute: &str) -> Self {
        let view_id = element.get_attribute(attribute).unwrap_or_default();
        Self {
            element,
            view_id,
            click_handlers: RefCell::new(Vec::new()),
            keydown_handlers: RefCell::new(Vec::new()),
        }
    }
}

impl TabControl for WebTabControl {
    fn view_id(&self) -> String {
        self.view_id.clone()
    }

    fn declares_selected(&self) -> bool {
        aria_flag(self.element.get_attribute(ARIA_SELECTED).as_deref())
    }

    fn set_selected(&self, selected: bool) {
        let _ = self
            .element
            .set_attribute(ARIA_SELECTED, aria_value(selected));
    }

    fn set_tab_stop(&self, tab_stop: bool) {
        self.element.set_tab_index(tab_index(tab_stop));
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let _ = self.element.class_list().toggle_with_force(class, enabled);
    }

    fn focus(&self) {
        let _ = self.element.focus();
    }

    fn supports_reveal(&self) -> bool {
        js_sys::Reflect::has(self.element.as_ref(), &JsValue::from_str("scrollIntoView"))
            .unwrap_or(false)
    }

    fn reveal(&self) {
        self.element.scroll_into_view();
    }

    fn listen(&self, index: usize, handle: NavHandle) {
        let click_handle = handle.clone();
        let on_click = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
            move |event: web_sys::Event| {
                if click_handle.click(index).is_some() {
                    event.prevent_default();
                }
            },
        ));
        if let Err(error) = self
            .element
            .add_event_listener_with_callback(CLICK_EVENT, on_click.as_ref().unchecked_ref())
        {
            record_shell_error(&format!(
                "failed to bind click on view `{}`: {}",
                self.view_id,
                js_error_text(&error)
            ));
        }
        self.click_handlers.borrow_mut().push(on_click);

        let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::wrap(Box::new(
            move |event: web_sys::KeyboardEvent| {
                if handle.key_down(index, &event.key()) {
                    event.prevent_default();
                }
            },
        ));
        if let Err(error) = self
            .element
            .add_event_listener_with_callback(KEYDOWN_EVENT, on_keydown.as_ref().unchecked_ref())
        {
            record_shell_error(&format!(
                "failed to bind keydown on view `{}`: {}",
                self.view_id,
                js_error_text(&error)
            ));
        }
        self.keydown_handlers.borrow_mut().push(on_keydown);
    }
}

struct WebTabPanel {
    element: HtmlElement,
    view_id: String,
}

impl WebTabPanel {
    fn new(element: HtmlElement, attribute: &str) -> Self {
        let view_id = element.get_attribute(attribute).unwrap_or_default();
        Self { element, view_id }
    }
}

impl TabPanel for WebTabPanel {
    fn view_id(&self) -> String {
        self.view_id.clone()
    }

    fn set_hidden(&self, hidden: bool) {
        self.element.set_hidden(hidden);
        let _ = self.element.set_attribute(ARIA_HIDDEN, aria_value(hidden));
    }
}
