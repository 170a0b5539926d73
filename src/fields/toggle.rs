//! Toggle Field - Boolean flipped by a designated key
//!
//! Space (or Enter) flips the value and fires the change callback.

use super::FieldId;
use crate::state::keyboard::{Key, KeyEvent};

/// Callback fired when the value flips. Receives the new value.
pub type ToggleHandler = Box<dyn FnMut(bool)>;

/// Boolean toggle field.
pub struct ToggleField {
    id: FieldId,
    label: String,
    value: bool,
    focused: bool,
    on_toggle: Option<ToggleHandler>,
}

impl ToggleField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: bool) -> Self {
        Self {
            id: FieldId::new(id),
            label: label.into(),
            value,
            focused: false,
            on_toggle: None,
        }
    }

    pub fn on_toggle(mut self, handler: ToggleHandler) -> Self {
        self.on_toggle = Some(handler);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Handle a key event. Returns true if consumed.
    pub fn activate(&mut self, event: &KeyEvent) -> bool {
        match event.key {
            Key::Char(' ') | Key::Enter => {
                self.value = !self.value;
                if let Some(handler) = self.on_toggle.as_mut() {
                    handler(self.value);
                }
                true
            }
            _ => false,
        }
    }
}
