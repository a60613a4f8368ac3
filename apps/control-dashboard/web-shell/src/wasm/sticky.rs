use super::*;

use std::rc::{Rc, Weak};

use dashboard_nav::{STICKY_OFFSET_PROPERTY, StickyOffset, StickyOffsetHost};
use web_sys::{Element, HtmlElement, Window};

use crate::wasm_constants::RESIZE_EVENT;

pub(super) struct WebStickyHost {
    header: Element,
    root: HtmlElement,
}

impl StickyOffsetHost for WebStickyHost {
    fn header_height(&self) -> Option<f64> {
        if !self.header.is_connected() {
            return None;
        }
        Some(self.header.get_bounding_client_rect().height())
    }

    fn set_property(&self, name: &str, value: &str) {
        let _ = self.root.style().set_property(name, value);
    }

    fn remove_property(&self, name: &str) {
        let _ = self.root.style().remove_property(name);
    }
}

type SharedOffset = Rc<RefCell<Option<StickyOffset<WebStickyHost>>>>;

/// A live sticky offset plus the resize listener keeping it current.
pub(super) struct StickyInstallation {
    window: Window,
    offset: SharedOffset,
    on_resize: Closure<dyn FnMut(web_sys::Event)>,
}

impl StickyInstallation {
    pub(super) fn install(header_selector: &str) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let header = document.query_selector(header_selector).ok().flatten()?;
        let root = document
            .document_element()?
            .dyn_into::<HtmlElement>()
            .ok()?;

        let offset: SharedOffset = Rc::new(RefCell::new(Some(StickyOffset::install(
            WebStickyHost { header, root },
            STICKY_OFFSET_PROPERTY,
        ))));
        let weak: Weak<RefCell<Option<StickyOffset<WebStickyHost>>>> = Rc::downgrade(&offset);
        let on_resize = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let Some(offset) = weak.upgrade() else {
                return;
            };
            let Ok(mut offset) = offset.try_borrow_mut() else {
                return;
            };
            if let Some(offset) = offset.as_mut() {
                let _ = offset.refresh();
            }
        }));
        if let Err(error) = window
            .add_event_listener_with_callback(RESIZE_EVENT, on_resize.as_ref().unchecked_ref())
        {
            record_shell_error(&format!(
                "failed to bind sticky offset resize: {}",
                js_error_text(&error)
            ));
        }

        Some(Self {
            window,
            offset,
            on_resize,
        })
    }

    pub(super) fn applied_px(&self) -> Option<u32> {
        self.offset
            .try_borrow()
            .ok()
            .and_then(|offset| offset.as_ref().and_then(StickyOffset::applied_px))
    }

    pub(super) fn cleanup(self) {
        let _ = self.window.remove_event_listener_with_callback(
            RESIZE_EVENT,
            self.on_resize.as_ref().unchecked_ref(),
        );
        let taken = self.offset.borrow_mut().take();
        if let Some(offset) = taken {
            let _ = offset.cleanup();
        }
    }
}
