use crate::engine::{ActivateOptions, ActivationSource, TabController};

/// Directional keys understood on a view control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowRight,
    ArrowLeft,
    Home,
    End,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value. Anything else is not ours.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "Home" => Some(Self::Home),
            "End" => Some(Self::End),
            _ => None,
        }
    }

    /// Target index when this key is pressed on control `current` of `len`.
    pub fn target_index(self, current: usize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = len - 1;
        Some(match self {
            Self::ArrowRight if current >= last => 0,
            Self::ArrowRight => current + 1,
            Self::ArrowLeft if current == 0 || current > last => last,
            Self::ArrowLeft => current - 1,
            Self::Home => 0,
            Self::End => last,
        })
    }
}

impl NavKey {
    /// Direction to keep moving in when the target view has no panel.
    fn forward(self) -> bool {
        matches!(self, Self::ArrowRight | Self::Home)
    }
}

impl TabController {
    pub(crate) fn handle_key_down(&mut self, index: usize, key: &str) -> bool {
        let Some(key) = NavKey::from_dom_key(key) else {
            return false;
        };
        let registry = self.registry();
        let Some(target) = key
            .target_index(index, registry.len())
            .and_then(|target| registry.nearest_valid(target, key.forward()))
            .and_then(|target| registry.id_at(target))
            .map(str::to_string)
        else {
            return false;
        };
        self.activate(&target, ActivateOptions::keyboard(), ActivationSource::Keyboard);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    #[test]
    fn maps_only_directional_dom_keys() {
        assert_eq!(NavKey::from_dom_key("ArrowRight"), Some(NavKey::ArrowRight));
        assert_eq!(NavKey::from_dom_key("ArrowLeft"), Some(NavKey::ArrowLeft));
        assert_eq!(NavKey::from_dom_key("Home"), Some(NavKey::Home));
        assert_eq!(NavKey::from_dom_key("End"), Some(NavKey::End));
        assert_eq!(NavKey::from_dom_key("ArrowDown"), None);
        assert_eq!(NavKey::from_dom_key("Enter"), None);
        assert_eq!(NavKey::from_dom_key("arrowright"), None);
    }

    #[test]
    fn wraps_in_both_directions() {
        assert_eq!(NavKey::ArrowRight.target_index(2, 3), Some(0));
        assert_eq!(NavKey::ArrowLeft.target_index(0, 3), Some(2));
        assert_eq!(NavKey::ArrowRight.target_index(0, 3), Some(1));
        assert_eq!(NavKey::ArrowLeft.target_index(2, 3), Some(1));
        assert_eq!(NavKey::Home.target_index(2, 3), Some(0));
        assert_eq!(NavKey::End.target_index(0, 3), Some(2));
        assert_eq!(NavKey::End.target_index(0, 0), None);
    }

    #[test]
    fn single_view_wraps_onto_itself() {
        for key in [NavKey::ArrowRight, NavKey::ArrowLeft, NavKey::Home, NavKey::End] {
            assert_eq!(key.target_index(0, 1), Some(0));
        }
    }

    #[test]
    fn arrows_step_over_views_without_panels() {
        use crate::memory::{MemoryBrowser, MemoryDocument};
        use crate::{NavBootstrapper, NavRefs};

        let document = MemoryDocument::new()
            .with_view("operation")
            .with_control("orphan")
            .with_view("config")
            .with_control("trailing-orphan");
        let browser = MemoryBrowser::new("/dash");
        let mut bootstrapper = NavBootstrapper::new();
        let Some(controller) = bootstrapper.init(
            NavRefs::new(&document)
                .with_location(browser.location())
                .with_history(browser.history()),
        ) else {
            panic!("expected controller");
        };

        assert!(document.key_down("operation", "ArrowRight"));
        assert_eq!(controller.borrow().active_tab(), "config");
        assert!(document.key_down("config", "ArrowRight"));
        assert_eq!(controller.borrow().active_tab(), "operation");
        assert!(document.key_down("operation", "ArrowLeft"));
        assert_eq!(controller.borrow().active_tab(), "config");
        assert!(document.key_down("config", "End"));
        assert_eq!(controller.borrow().active_tab(), "config");
        assert!(document.key_down("config", "Home"));
        assert_eq!(controller.borrow().active_tab(), "operation");
    }

    #[test]
    fn right_then_left_returns_to_start() {
        fn property(current: u8, len: u8) -> TestResult {
            let len = usize::from(len);
            let current = usize::from(current);
            if len == 0 || current >= len {
                return TestResult::discard();
            }
            let forward = NavKey::ArrowRight.target_index(current, len);
            let back = forward.and_then(|next| NavKey::ArrowLeft.target_index(next, len));
            TestResult::from_bool(back == Some(current) && forward.is_some_and(|next| next < len))
        }
        QuickCheck::new()
            .tests(500)
            .quickcheck(property as fn(u8, u8) -> TestResult);
    }
}
