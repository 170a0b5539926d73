//! Select Field - Vertical list with cursor and committed selection
//!
//! Arrow keys move an internal cursor over the items; Enter commits the
//! cursor position as the selection and fires the commit callback. An
//! empty list passes every key so outer navigation keeps working.

use super::FieldId;
use crate::state::keyboard::{Key, KeyEvent};

/// Callback fired when a selection is committed. Receives the item index.
pub type CommitHandler = Box<dyn FnMut(usize)>;

/// Selectable list field.
pub struct SelectField {
    id: FieldId,
    label: String,
    items: Vec<String>,
    cursor: usize,
    committed: Option<usize>,
    focused: bool,
    on_commit: Option<CommitHandler>,
}

impl SelectField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            id: FieldId::new(id),
            label: label.into(),
            items,
            cursor: 0,
            committed: None,
            focused: false,
            on_commit: None,
        }
    }

    /// Attach a commit callback.
    pub fn on_commit(mut self, handler: CommitHandler) -> Self {
        self.on_commit = Some(handler);
        self
    }

    /// Pre-commit a selection (e.g. the value loaded from config).
    pub fn with_committed(mut self, index: usize) -> Self {
        if index < self.items.len() {
            self.cursor = index;
            self.committed = Some(index);
        }
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn committed(&self) -> Option<usize> {
        self.committed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Replace the items in place (a fresher async snapshot arrived).
    /// Cursor and committed selection are clamped or cleared to stay
    /// inside the new list.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        if self.items.is_empty() {
            self.cursor = 0;
            self.committed = None;
        } else {
            self.cursor = self.cursor.min(self.items.len() - 1);
            self.committed = self.committed.filter(|&i| i < self.items.len());
        }
    }

    /// Label row plus one row per item.
    pub fn height(&self) -> u16 {
        1 + self.items.len() as u16
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Handle a key event. Returns true if consumed.
    pub fn activate(&mut self, event: &KeyEvent) -> bool {
        if self.items.is_empty() {
            return false;
        }
        match event.key {
            Key::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            Key::Down => {
                self.cursor = (self.cursor + 1).min(self.items.len() - 1);
                true
            }
            Key::Home => {
                self.cursor = 0;
                true
            }
            Key::End => {
                self.cursor = self.items.len() - 1;
                true
            }
            Key::Enter => {
                self.committed = Some(self.cursor);
                if let Some(handler) = self.on_commit.as_mut() {
                    handler(self.cursor);
                }
                true
            }
            _ => false,
        }
    }
}
