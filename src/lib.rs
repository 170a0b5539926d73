//! # murmur-tui
//!
//! Input routing and focus engine for the murmur dictation control
//! panel.
//!
//! Built on [spark-signals](https://crates.io/crates/spark-signals) for
//! fine-grained reactive state.
//!
//! ## Architecture
//!
//! One cooperative, single-threaded router owns every piece of routing
//! state and offers each raw event to a priority chain:
//!
//! ```text
//! Event Source -> Interceptor Stack -> (open overlay) -> focused Field
//!              -> zone navigation -> global bindings
//! ```
//!
//! Panels declare heterogeneous focusable fields (select lists,
//! steppers, toggles, key-combo recorders) in fixed order; a per-panel
//! registry tracks the single focused field and a viewport keeps it
//! visible. Overlays claim input by pushing consuming interceptors and
//! restore the exact interceptor depth and focus target on close.
//!
//! External collaborators (the dictation daemon, the config and history
//! files, the terminal) sit behind narrow injected boundaries: bridge
//! results arrive on a completion queue drained once per tick, and the
//! event source is a trait so tests script the terminal.
//!
//! ## Modules
//!
//! - [`state`] - keyboard events, input conversion, interceptors, focus,
//!   scroll
//! - [`fields`] - the closed focusable field variant set
//! - [`overlay`] - modal overlay controller
//! - [`panel`] / [`panels`] - field containers and the built panel set
//! - [`router`] - the root controller and event loop
//! - [`bridge`] - async daemon boundary
//! - [`store`] - config, history and snippet persistence

pub mod bridge;
pub mod fields;
pub mod overlay;
pub mod panel;
pub mod panels;
pub mod router;
pub mod state;
pub mod store;

// Re-export commonly used items
pub use bridge::{
    AudioDevice, BridgeError, Completion, DaemonBridge, DaemonStatus, ModelInfo, ProcessBridge,
    ScriptedBridge, completion_channel,
};
pub use fields::{Field, FieldId, FieldKind, RecorderField, SelectField, StepperField, ToggleField};
pub use overlay::{
    ClosedOverlay, ModalController, OverlayError, OverlayHandle, OverlayKind, OverlayOutcome,
    OverlayProps, Rect,
};
pub use panel::{Liveness, Panel};
pub use panels::{PanelSet, build_panels};
pub use router::{CompletionTargets, FocusTarget, Router, Zone};
pub use state::{
    EventSource, FocusRegistry, InputEvent, InterceptorId, InterceptorStack, Key, KeyEvent,
    KeyHandler, KeyState, Mods, ScriptedSource, TerminalSource, Viewport, chord_string,
    field_extent, field_offset,
};
pub use store::{
    ConfigStore, HistoryEntry, HistoryStore, Hotkeys, Settings, Snippet, SnippetStore, StoreError,
};
