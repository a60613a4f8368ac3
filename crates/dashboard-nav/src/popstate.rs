use crate::engine::{ActivateOptions, ActivationSource, TabController};

impl TabController {
    /// Back/forward navigation changed the URL.
    ///
    /// An unknown, empty or unchanged id is ignored outright: state, storage
    /// and URL are left exactly as they were, even when the URL now disagrees
    /// with the active view. A valid new id is applied without rewriting the
    /// URL, which is already the trigger.
    pub(crate) fn handle_popstate(&mut self) -> bool {
        let candidate = self.bridge().read_from_url();
        if !self.registry().is_valid(&candidate) || candidate == self.active_tab() {
            self.diagnostics_mut().ignored_popstates += 1;
            tracing::debug!(
                candidate = %candidate,
                active = %self.active_tab(),
                "tab navigation ignored popstate"
            );
            return false;
        }
        self.activate(
            &candidate,
            ActivateOptions::popstate(),
            ActivationSource::Popstate,
        );
        true
    }
}
