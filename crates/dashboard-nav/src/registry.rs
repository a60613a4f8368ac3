use crate::config::NavConfig;
use crate::handle::NavHandle;
use crate::platform::{NavDocument, TabControl, TabPanel};

/// One discovered control, optionally paired with its panel.
pub(crate) struct ViewDescriptor {
    pub(crate) id: String,
    pub(crate) control: Box<dyn TabControl>,
    pub(crate) has_panel: bool,
    pub(crate) reveal: bool,
}

pub(crate) struct PanelEntry {
    pub(crate) id: String,
    pub(crate) panel: Box<dyn TabPanel>,
}

/// The fixed id -> control -> panel association for one document.
///
/// Marked elements with a blank or repeated id are kept as extras: they never
/// become active but are still deselected and hidden on every activation.
pub struct TabRegistry {
    views: Vec<ViewDescriptor>,
    panels: Vec<PanelEntry>,
    extra_controls: Vec<Box<dyn TabControl>>,
    extra_panels: Vec<Box<dyn TabPanel>>,
}

impl TabRegistry {
    /// Scan `document` for marked controls and panels.
    ///
    /// Returns `None` when there is nothing to navigate: no controls, no
    /// panels, or no control whose id has a panel.
    pub fn discover(document: &dyn NavDocument, config: &NavConfig) -> Option<Self> {
        let mut views: Vec<ViewDescriptor> = Vec::new();
        let mut extra_controls: Vec<Box<dyn TabControl>> = Vec::new();
        for control in document.controls(&config.control_attribute) {
            let id = control.view_id().trim().to_string();
            if id.is_empty() || views.iter().any(|view| view.id == id) {
                tracing::debug!(id = %id, "tab control has a blank or repeated id; kept inactive");
                extra_controls.push(control);
                continue;
            }
            let reveal = control.supports_reveal();
            views.push(ViewDescriptor {
                id,
                control,
                has_panel: false,
                reveal,
            });
        }

        let mut panels: Vec<PanelEntry> = Vec::new();
        let mut extra_panels: Vec<Box<dyn TabPanel>> = Vec::new();
        for panel in document.panels(&config.panel_attribute) {
            let id = panel.view_id().trim().to_string();
            if id.is_empty() || panels.iter().any(|entry| entry.id == id) {
                tracing::debug!(id = %id, "tab panel has a blank or repeated id; kept hidden");
                extra_panels.push(panel);
                continue;
            }
            panels.push(PanelEntry { id, panel });
        }

        if views.is_empty() || panels.is_empty() {
            return None;
        }
        for view in &mut views {
            view.has_panel = panels.iter().any(|entry| entry.id == view.id);
        }
        if !views.iter().any(|view| view.has_panel) {
            return None;
        }

        Some(Self {
            views,
            panels,
            extra_controls,
            extra_panels,
        })
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Known ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(|view| view.id.as_str())
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.views.get(index).map(|view| view.id.as_str())
    }

    /// Known and backed by a panel.
    pub fn is_valid(&self, id: &str) -> bool {
        self.views
            .iter()
            .any(|view| view.has_panel && view.id == id)
    }

    /// First valid id in document order.
    pub fn first_id(&self) -> &str {
        self.views
            .iter()
            .find(|view| view.has_panel)
            .map_or("", |view| view.id.as_str())
    }

    /// `candidate` when valid, otherwise the first view.
    pub fn resolve_target<'a>(&'a self, candidate: &'a str) -> &'a str {
        if self.is_valid(candidate) {
            candidate
        } else {
            self.first_id()
        }
    }

    /// First control the markup declares as selected, if it is valid.
    pub fn markup_selected(&self) -> Option<&str> {
        self.views
            .iter()
            .find(|view| view.control.declares_selected())
            .map(|view| view.id.as_str())
            .filter(|id| self.is_valid(id))
    }

    pub(crate) fn views(&self) -> &[ViewDescriptor] {
        &self.views
    }

    pub(crate) fn panels(&self) -> &[PanelEntry] {
        &self.panels
    }

    pub(crate) fn extra_controls(&self) -> &[Box<dyn TabControl>] {
        &self.extra_controls
    }

    pub(crate) fn extra_panels(&self) -> &[Box<dyn TabPanel>] {
        &self.extra_panels
    }

    /// Index of the closest valid view at or after `from` (before it when
    /// `forward` is false), wrapping around.
    pub(crate) fn nearest_valid(&self, from: usize, forward: bool) -> Option<usize> {
        let len = self.views.len();
        (0..len)
            .map(|offset| {
                if forward {
                    (from + offset) % len
                } else {
                    (from + len - offset) % len
                }
            })
            .find(|index| self.views.get(*index).is_some_and(|view| view.has_panel))
    }

    pub(crate) fn bind(&self, handle: &NavHandle) {
        for (index, view) in self.views.iter().enumerate() {
            view.control.listen(index, handle.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    fn discover(document: &MemoryDocument) -> Option<TabRegistry> {
        TabRegistry::discover(document, &NavConfig::default())
    }

    #[test]
    fn correlates_controls_and_panels_by_id() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics")
            .with_view("config");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["operation", "analytics", "config"]
        );
        assert!(registry.is_valid("analytics"));
        assert!(!registry.is_valid("clips"));
        assert_eq!(registry.first_id(), "operation");
    }

    #[test]
    fn returns_none_without_controls_or_panels() {
        assert!(discover(&MemoryDocument::new()).is_none());
        assert!(discover(&MemoryDocument::new().with_control("operation")).is_none());
        assert!(discover(&MemoryDocument::new().with_panel("operation")).is_none());
        assert!(
            discover(
                &MemoryDocument::new()
                    .with_control("operation")
                    .with_panel("analytics")
            )
            .is_none()
        );
    }

    #[test]
    fn control_without_panel_is_known_but_invalid() {
        let document = MemoryDocument::new()
            .with_control("orphan")
            .with_view("operation");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_valid("orphan"));
        assert_eq!(registry.first_id(), "operation");
        assert_eq!(registry.resolve_target("orphan"), "operation");
    }

    #[test]
    fn skips_blank_and_duplicate_ids() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_control(" ")
            .with_control("operation")
            .with_view("config");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["operation", "config"]
        );
        assert_eq!(registry.extra_controls().len(), 2);
    }

    #[test]
    fn repeated_panels_are_kept_as_extras() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("analytics")
            .with_panel("analytics")
            .with_panel("");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(registry.panels().len(), 2);
        assert_eq!(registry.extra_panels().len(), 2);
    }

    #[test]
    fn nearest_valid_steps_over_controls_without_panels() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_control("orphan")
            .with_view("config");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(registry.nearest_valid(1, true), Some(2));
        assert_eq!(registry.nearest_valid(1, false), Some(0));
        assert_eq!(registry.nearest_valid(2, true), Some(2));
    }

    #[test]
    fn markup_selection_must_be_valid() {
        let document = MemoryDocument::new()
            .with_view("operation")
            .with_control("orphan")
            .with_view("config")
            .select_in_markup("orphan");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(registry.markup_selected(), None);

        let document = MemoryDocument::new()
            .with_view("operation")
            .with_view("config")
            .select_in_markup("config");
        let Some(registry) = discover(&document) else {
            panic!("expected registry");
        };
        assert_eq!(registry.markup_selected(), Some("config"));
    }
}
