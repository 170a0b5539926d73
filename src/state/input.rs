//! Input Module - Event conversion and the event source boundary
//!
//! Bridges crossterm's event system with the routing core. Conversion from
//! terminal events to [`InputEvent`] happens here and nowhere else; the
//! rest of the crate never sees a crossterm type.
//!
//! The event source is an injected capability behind the [`EventSource`]
//! trait, so tests drive the router with a scripted queue instead of a
//! live terminal.
//!
//! # Example
//!
//! ```ignore
//! use murmur_tui::state::input::{EventSource, TerminalSource};
//! use std::time::Duration;
//!
//! let mut source = TerminalSource;
//! loop {
//!     if let Ok(Some(event)) = source.poll(Duration::from_millis(16)) {
//!         router.route_event(event);
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers,
    MouseEventKind, poll, read,
};

use super::keyboard::{Key, KeyEvent, KeyState, Mods};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Unified event type for the routing core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Keyboard event (press, repeat, release)
    Key(KeyEvent),
    /// Left mouse button press at terminal cell (x, y)
    Click { x: u16, y: u16 },
    /// Terminal resize event (new width, height)
    Resize(u16, u16),
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert a crossterm key event.
///
/// Returns `None` for keys outside the router's vocabulary, including
/// bare modifier presses - a held modifier only ever reaches the core
/// attached to a real key.
pub fn convert_key_event(event: CrosstermKeyEvent) -> Option<KeyEvent> {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };

    let state = match event.kind {
        crossterm::event::KeyEventKind::Press => KeyState::Press,
        crossterm::event::KeyEventKind::Repeat => KeyState::Repeat,
        crossterm::event::KeyEventKind::Release => KeyState::Release,
    };

    Some(KeyEvent {
        key,
        mods: convert_modifiers(event.modifiers, event.code),
        state,
    })
}

/// Convert crossterm KeyModifiers to our Mods.
///
/// BackTab arrives without a SHIFT modifier on most terminals, so it is
/// normalized to Shift+Tab here.
fn convert_modifiers(mods: KeyModifiers, code: KeyCode) -> Mods {
    let mut out = Mods::empty();
    if mods.contains(KeyModifiers::CONTROL) {
        out |= Mods::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out |= Mods::ALT;
    }
    if mods.contains(KeyModifiers::SHIFT) || code == KeyCode::BackTab {
        out |= Mods::SHIFT;
    }
    if mods.contains(KeyModifiers::SUPER) {
        out |= Mods::SUPER;
    }
    out
}

/// Convert any crossterm event to an [`InputEvent`].
///
/// Mouse movement, drag, release and scroll are dropped - the core only
/// routes clicks (for dismissing overlays).
pub fn convert_event(event: CrosstermEvent) -> Option<InputEvent> {
    match event {
        CrosstermEvent::Key(key) => convert_key_event(key).map(InputEvent::Key),
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(InputEvent::Click {
                x: mouse.column,
                y: mouse.row,
            }),
            _ => None,
        },
        CrosstermEvent::Resize(w, h) => Some(InputEvent::Resize(w, h)),
        _ => None,
    }
}

// =============================================================================
// EVENT SOURCE
// =============================================================================

/// The raw event boundary. Implemented by the live terminal and by
/// scripted doubles in tests.
pub trait EventSource {
    /// Poll for the next event, waiting at most `timeout`.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Live crossterm-backed event source.
pub struct TerminalSource;

impl EventSource for TerminalSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if poll(timeout)? {
            Ok(convert_event(read()?))
        } else {
            Ok(None)
        }
    }
}

/// Scripted event source for tests: yields queued events in order, then
/// reports no input.
#[derive(Default)]
pub struct ScriptedSource {
    queue: VecDeque<InputEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    /// Append an event to the script.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self, _timeout: Duration) -> io::Result<Option<InputEvent>> {
        Ok(self.queue.pop_front())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, MouseButton, MouseEvent};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_convert_char() {
        let event = convert_key_event(press(KeyCode::Char('a'), KeyModifiers::empty())).unwrap();
        assert_eq!(event.key, Key::Char('a'));
        assert_eq!(event.state, KeyState::Press);
        assert_eq!(event.mods, Mods::empty());
    }

    #[test]
    fn test_convert_navigation_keys() {
        let cases = [
            (KeyCode::Enter, Key::Enter),
            (KeyCode::Tab, Key::Tab),
            (KeyCode::Esc, Key::Escape),
            (KeyCode::Up, Key::Up),
            (KeyCode::Down, Key::Down),
            (KeyCode::Left, Key::Left),
            (KeyCode::Right, Key::Right),
            (KeyCode::Home, Key::Home),
            (KeyCode::End, Key::End),
            (KeyCode::PageUp, Key::PageUp),
            (KeyCode::PageDown, Key::PageDown),
            (KeyCode::Backspace, Key::Backspace),
            (KeyCode::Delete, Key::Delete),
        ];
        for (code, expected) in cases {
            let event = convert_key_event(press(code, KeyModifiers::empty())).unwrap();
            assert_eq!(event.key, expected);
        }
    }

    #[test]
    fn test_convert_modifiers() {
        let event = convert_key_event(press(
            KeyCode::Char('x'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        ))
        .unwrap();
        assert!(event.mods.contains(Mods::CTRL));
        assert!(event.mods.contains(Mods::ALT));
        assert!(!event.mods.contains(Mods::SHIFT));
    }

    #[test]
    fn test_back_tab_normalizes_to_shift_tab() {
        let event = convert_key_event(press(KeyCode::BackTab, KeyModifiers::empty())).unwrap();
        assert_eq!(event.key, Key::Tab);
        assert!(event.mods.contains(Mods::SHIFT));
    }

    #[test]
    fn test_unknown_keys_dropped() {
        assert!(convert_key_event(press(KeyCode::Insert, KeyModifiers::empty())).is_none());
        assert!(convert_key_event(press(KeyCode::Null, KeyModifiers::empty())).is_none());
    }

    #[test]
    fn test_convert_mouse_down_to_click() {
        let event = convert_event(CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::empty(),
        }));
        assert_eq!(event, Some(InputEvent::Click { x: 10, y: 5 }));
    }

    #[test]
    fn test_mouse_move_dropped() {
        let event = convert_event(CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::empty(),
        }));
        assert_eq!(event, None);
    }

    #[test]
    fn test_convert_resize() {
        let event = convert_event(CrosstermEvent::Resize(120, 40));
        assert_eq!(event, Some(InputEvent::Resize(120, 40)));
    }

    #[test]
    fn test_scripted_source_yields_in_order() {
        let mut source = ScriptedSource::new([
            InputEvent::Key(KeyEvent::new(Key::Tab)),
            InputEvent::Resize(80, 24),
        ]);

        let first = source.poll(Duration::ZERO).unwrap();
        assert_eq!(first, Some(InputEvent::Key(KeyEvent::new(Key::Tab))));

        let second = source.poll(Duration::ZERO).unwrap();
        assert_eq!(second, Some(InputEvent::Resize(80, 24)));

        assert_eq!(source.poll(Duration::ZERO).unwrap(), None);
        assert!(source.is_empty());
    }
}
