use serde::Serialize;

use crate::bridge::WriteOutcome;
use crate::engine::{ActivateOptions, ActivationSource};

/// Counters describing what the controller has done since bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavDiagnostics {
    pub active_tab: String,
    pub tab_count: usize,
    pub transitions: u64,
    pub url_writes: u64,
    pub store_writes: u64,
    pub platform_failures: u64,
    pub ignored_popstates: u64,
    pub last_source: Option<ActivationSource>,
    pub last_options: Option<ActivateOptions>,
}

impl NavDiagnostics {
    pub(crate) fn new(tab_count: usize) -> Self {
        Self {
            tab_count,
            ..Self::default()
        }
    }

    pub(crate) fn record_transition(
        &mut self,
        source: ActivationSource,
        options: ActivateOptions,
        active_tab: &str,
    ) {
        self.transitions += 1;
        self.last_source = Some(source);
        self.last_options = Some(options);
        active_tab.clone_into(&mut self.active_tab);
    }

    pub(crate) fn record_url_write(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.url_writes += 1,
            WriteOutcome::Failed => self.platform_failures += 1,
            WriteOutcome::Unchanged | WriteOutcome::Unavailable => {}
        }
    }

    pub(crate) fn record_store_write(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.store_writes += 1,
            WriteOutcome::Failed => self.platform_failures += 1,
            WriteOutcome::Unchanged | WriteOutcome::Unavailable => {}
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_counted_separately_from_writes() {
        let mut diagnostics = NavDiagnostics::new(3);
        diagnostics.record_store_write(WriteOutcome::Written);
        diagnostics.record_store_write(WriteOutcome::Unchanged);
        diagnostics.record_store_write(WriteOutcome::Failed);
        diagnostics.record_url_write(WriteOutcome::Unavailable);
        diagnostics.record_url_write(WriteOutcome::Failed);

        assert_eq!(diagnostics.store_writes, 1);
        assert_eq!(diagnostics.url_writes, 0);
        assert_eq!(diagnostics.platform_failures, 2);
    }

    #[test]
    fn json_uses_snake_case_sources() {
        let mut diagnostics = NavDiagnostics::new(2);
        diagnostics.record_transition(
            ActivationSource::Popstate,
            ActivateOptions::popstate(),
            "config",
        );
        let value: serde_json::Value = match serde_json::from_str(&diagnostics.to_json()) {
            Ok(value) => value,
            Err(error) => panic!("diagnostics json did not parse: {error}"),
        };
        assert_eq!(value["active_tab"], "config");
        assert_eq!(value["tab_count"], 2);
        assert_eq!(value["last_source"], "popstate");
        assert_eq!(value["last_options"]["sync_url"], false);
        assert_eq!(value["last_options"]["persist"], true);
    }
}
