//! Keyboard Module - Key event types and chord canonicalization
//!
//! The event vocabulary for the routing core:
//! - `Key` - closed set of keys the router understands
//! - `Mods` - modifier bitflags (ctrl/alt/shift/super)
//! - `KeyEvent` - key + modifiers + press state
//! - `chord_string` - canonical chord text for hotkey recording
//!
//! Only `Press` events are routed to handlers; repeat and release update
//! last-event state without reaching handlers.
//!
//! # Example
//!
//! ```ignore
//! use murmur_tui::state::keyboard::{chord_string, Key, KeyEvent, Mods};
//!
//! let event = KeyEvent::with_mods(Key::F(2), Mods::CTRL | Mods::SHIFT);
//! assert_eq!(event.chord(), "ctrl+shift+f2");
//! ```

use bitflags::bitflags;

// =============================================================================
// MODIFIERS
// =============================================================================

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Mods: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Mods {
    /// Canonical modifier prefix, fixed order: ctrl, alt, shift, super.
    pub fn chord_prefix(&self) -> String {
        let mut out = String::new();
        if self.contains(Mods::CTRL) {
            out.push_str("ctrl+");
        }
        if self.contains(Mods::ALT) {
            out.push_str("alt+");
        }
        if self.contains(Mods::SHIFT) {
            out.push_str("shift+");
        }
        if self.contains(Mods::SUPER) {
            out.push_str("super+");
        }
        out
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// The closed set of keys the router understands.
///
/// Anything the terminal reports outside this set is dropped at the
/// conversion boundary before it reaches the routing core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl Key {
    /// Lowercase canonical name, as used in chord strings.
    pub fn name(&self) -> String {
        match self {
            Key::Char(' ') => "space".to_string(),
            Key::Char('+') => "plus".to_string(),
            Key::Char(c) => c.to_lowercase().to_string(),
            Key::Enter => "enter".to_string(),
            Key::Tab => "tab".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Delete => "delete".to_string(),
            Key::Up => "up".to_string(),
            Key::Down => "down".to_string(),
            Key::Left => "left".to_string(),
            Key::Right => "right".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::PageUp => "pageup".to_string(),
            Key::PageDown => "pagedown".to_string(),
            Key::F(n) => format!("f{}", n),
        }
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event as seen by the routing core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub mods: Mods,
    pub state: KeyState,
}

impl KeyEvent {
    /// Create a simple key press event.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            mods: Mods::empty(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers.
    pub fn with_mods(key: Key, mods: Mods) -> Self {
        Self {
            key,
            mods,
            state: KeyState::Press,
        }
    }

    /// Check if this is a press event.
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// Canonical chord string for this event.
    pub fn chord(&self) -> String {
        chord_string(self.key, self.mods)
    }

    /// The application-wide interrupt sequence (Ctrl+C).
    ///
    /// Consuming overlays are expected to let this pass; only a
    /// full-screen overlay may swallow it.
    pub fn is_interrupt(&self) -> bool {
        self.key == Key::Char('c') && self.mods.contains(Mods::CTRL)
    }
}

/// Canonical chord string: modifier prefix in fixed order, then the
/// lowercase key name. Input modifier order never matters because the
/// prefix is rebuilt from the flag set.
pub fn chord_string(key: Key, mods: Mods) -> String {
    format!("{}{}", mods.chord_prefix(), key.name())
}

/// Handler for key events. Return true to consume the event.
pub type KeyHandler = Box<dyn FnMut(&KeyEvent) -> bool>;

// =============================================================================
// TESTS
// =============================================================================
