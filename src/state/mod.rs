//! State Module - Input routing state systems
//!
//! The reactive state systems behind event routing:
//!
//! - **Keyboard** - event types, modifier flags, chord canonicalization
//! - **Input** - crossterm conversion, the injected event source
//! - **Interceptor** - layered interception stack, tried top-down
//! - **Focus** - per-panel field registry and navigation
//! - **Scroll** - viewport synchronization with the focused field

pub mod focus;
pub mod input;
pub mod interceptor;
pub mod keyboard;
pub mod scroll;

pub use focus::FocusRegistry;
pub use input::{EventSource, InputEvent, ScriptedSource, TerminalSource};
pub use interceptor::{InterceptorId, InterceptorStack};
pub use keyboard::{Key, KeyEvent, KeyHandler, KeyState, Mods, chord_string};
pub use scroll::{Viewport, field_extent, field_offset};
