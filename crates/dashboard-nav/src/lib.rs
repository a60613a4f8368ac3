//! View navigation for the control dashboard.
//!
//! Keeps exactly one of a fixed set of panels visible while the in-memory
//! active view, a persisted storage entry and the `tab` URL query parameter
//! stay in sync. Every trigger (click, keyboard, back/forward, API) funnels
//! through [`TabController::activate_tab`]'s single activation path.
//!
//! The crate is host-agnostic: a browser shell adapts its DOM, storage,
//! location and history objects to the traits in [`platform`]; the
//! [`memory`] module provides an in-process host.

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod handle;
pub mod keyboard;
pub mod memory;
pub mod platform;
mod popstate;
pub mod registry;
pub mod sticky;

pub use bootstrap::{InitialSource, NavBootstrapper, NavRefs, resolve_initial};
pub use bridge::{PersistenceBridge, WriteOutcome};
pub use config::{
    DEFAULT_ACTIVE_CLASS, DEFAULT_CONTROL_ATTRIBUTE, DEFAULT_PANEL_ATTRIBUTE, DEFAULT_QUERY_PARAM,
    DEFAULT_STORAGE_KEY, NavConfig, NavConfigError,
};
pub use diagnostics::NavDiagnostics;
pub use engine::{ActivateOptions, ActivationSource, TabController};
pub use handle::{NavHandle, SharedController};
pub use keyboard::NavKey;
pub use platform::{
    DocumentKey, KeyValueStore, NavDocument, NavHistory, NavLocation, PlatformError,
    PopstateTarget, TabControl, TabPanel,
};
pub use registry::TabRegistry;
pub use sticky::{STICKY_OFFSET_PROPERTY, StickyOffset, StickyOffsetHost, offset_px};
