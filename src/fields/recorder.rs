//! Recorder Field - Key-combo capture
//!
//! On focus the recorder enters a capture sub-mode that claims every
//! subsequent key. The first completed chord (any key in the router's
//! vocabulary, with whatever modifiers are held) ends the capture and
//! becomes the recorded value; Escape ends the capture and keeps the
//! previous value. Outside capture the field is a plain focused row -
//! Enter re-arms it, everything else passes to the outer router.
//!
//! Bare modifier presses never arrive here: they are dropped at the event
//! conversion boundary, so a chord cannot complete on modifiers alone.

use super::FieldId;
use crate::state::keyboard::{Key, KeyEvent};

/// Callback fired when a chord is recorded. Receives the canonical chord.
pub type ChordHandler = Box<dyn FnMut(&str)>;

/// Key-combo recorder field.
pub struct RecorderField {
    id: FieldId,
    label: String,
    chord: Option<String>,
    focused: bool,
    capturing: bool,
    on_chord: Option<ChordHandler>,
}

impl RecorderField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(id),
            label: label.into(),
            chord: None,
            focused: false,
            capturing: false,
            on_chord: None,
        }
    }

    /// Seed the recorded chord (e.g. the binding loaded from config).
    pub fn with_chord(mut self, chord: impl Into<String>) -> Self {
        self.chord = Some(chord.into());
        self
    }

    pub fn on_chord(mut self, handler: ChordHandler) -> Self {
        self.on_chord = Some(handler);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The currently recorded chord, if any.
    pub fn chord(&self) -> Option<&str> {
        self.chord.as_deref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Focus enters capture immediately: the next chord is the binding.
    pub fn focus(&mut self) {
        self.focused = true;
        self.capturing = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.capturing = false;
    }

    /// Handle a key event. Returns true if consumed.
    pub fn activate(&mut self, event: &KeyEvent) -> bool {
        if self.capturing {
            if event.key == Key::Escape && event.mods.is_empty() {
                // Cancelled: keep the previous chord
                self.capturing = false;
                return true;
            }
            let chord = event.chord();
            self.chord = Some(chord.clone());
            self.capturing = false;
            if let Some(handler) = self.on_chord.as_mut() {
                handler(&chord);
            }
            return true;
        }
        if event.key == Key::Enter {
            self.capturing = true;
            return true;
        }
        false
    }
}
