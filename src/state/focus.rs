//! Focus Module - Per-panel field registry and focus navigation
//!
//! A [`FocusRegistry`] owns a panel's fields in declared presentation
//! order plus the current focus index as a reactive signal (-1 = none).
//! Exactly zero or one field is focused at any time, and the focused
//! field always matches the index.
//!
//! Navigation is cyclic: `focus_next` / `focus_prev` advance modulo the
//! registry length. Late-arriving fields are spliced in with
//! `insert_at`, which keeps the focus pointing at the same logical field
//! by shifting the index when the insertion lands at or before it.
//!
//! # Example
//!
//! ```ignore
//! use murmur_tui::state::focus::FocusRegistry;
//!
//! let mut registry = FocusRegistry::from_fields(fields);
//! registry.focus_next();           // -> field 0
//! registry.activate_current(&event);
//! ```

use spark_signals::{Signal, signal};

use crate::fields::{Field, FieldId};
use crate::state::keyboard::KeyEvent;

// =============================================================================
// FOCUS REGISTRY
// =============================================================================

/// Ordered field sequence plus the focused index.
pub struct FocusRegistry {
    fields: Vec<Field>,
    current: Signal<i32>,
}

impl Default for FocusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            current: signal(-1),
        }
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            current: signal(-1),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.fields.get_mut(index)
    }

    /// The currently focused index (-1 if none).
    pub fn current_index(&self) -> i32 {
        self.current.get()
    }

    /// Reactive handle on the focused index, for render subscriptions.
    pub fn current_signal(&self) -> Signal<i32> {
        self.current.clone()
    }

    pub fn has_focus(&self) -> bool {
        self.current_index() >= 0
    }

    pub fn current_field(&self) -> Option<&Field> {
        let index = self.current_index();
        if index < 0 {
            None
        } else {
            self.fields.get(index as usize)
        }
    }

    pub fn find_index(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id() == id)
    }

    pub fn contains_id(&self, id: &FieldId) -> bool {
        self.find_index(id).is_some()
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Focus the field at `index`, blurring the previous one first.
    /// No-op on an empty registry.
    ///
    /// An out-of-range index on a non-empty registry is a programming
    /// error; release builds leave focus unchanged.
    pub fn focus_at(&mut self, index: usize) {
        if self.fields.is_empty() {
            return;
        }
        debug_assert!(
            index < self.fields.len(),
            "focus_at({}) out of range (len {})",
            index,
            self.fields.len()
        );
        if index >= self.fields.len() {
            return;
        }
        let old = self.current_index();
        if old == index as i32 {
            return;
        }
        if old >= 0 {
            if let Some(field) = self.fields.get_mut(old as usize) {
                field.blur();
            }
        }
        self.fields[index].focus();
        self.current.set(index as i32);
    }

    /// Move focus to the next field, wrapping past the end. No-op on an
    /// empty registry.
    pub fn focus_next(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as i32;
        let next = match self.current_index() {
            c if c < 0 => 0,
            c => (c + 1) % len,
        };
        self.focus_at(next as usize);
    }

    /// Move focus to the previous field, wrapping past the start. No-op
    /// on an empty registry.
    pub fn focus_prev(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as i32;
        let prev = match self.current_index() {
            c if c < 0 => len - 1,
            c => (c - 1 + len) % len,
        };
        self.focus_at(prev as usize);
    }

    /// Clear focus entirely.
    pub fn blur_current(&mut self) {
        let index = self.current_index();
        if index >= 0 {
            if let Some(field) = self.fields.get_mut(index as usize) {
                field.blur();
            }
            self.current.set(-1);
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Offer a key event to the focused field. Returns true if consumed.
    pub fn activate_current(&mut self, event: &KeyEvent) -> bool {
        let index = self.current_index();
        if index < 0 {
            return false;
        }
        match self.fields.get_mut(index as usize) {
            Some(field) => field.activate(event),
            None => false,
        }
    }

    /// True while the focused field claims every key.
    pub fn captures_all(&self) -> bool {
        self.current_field().map(Field::captures_all).unwrap_or(false)
    }

    // =========================================================================
    // LATE INSERTION
    // =========================================================================

    /// Splice a field in at `index` without disturbing the identity of
    /// fields before it. If the focused index is at or past the insertion
    /// point it shifts by one so focus keeps referencing the same logical
    /// field. Re-inserting an id already present is a no-op.
    ///
    /// Returns true if the field was inserted.
    pub fn insert_at(&mut self, index: usize, field: Field) -> bool {
        if self.contains_id(field.id()) {
            return false;
        }
        let index = index.min(self.fields.len());
        self.fields.insert(index, field);

        let current = self.current_index();
        if current >= index as i32 {
            self.current.set(current + 1);
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{SelectField, ToggleField};
    use crate::state::keyboard::{Key, KeyEvent};

    fn toggle(id: &str) -> Field {
        Field::Toggle(ToggleField::new(id, id.to_uppercase(), false))
    }

    fn registry(n: usize) -> FocusRegistry {
        FocusRegistry::from_fields((0..n).map(|i| toggle(&format!("f{}", i))).collect())
    }

    fn assert_single_focus(reg: &FocusRegistry) {
        let focused: Vec<usize> = reg
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_focused())
            .map(|(i, _)| i)
            .collect();
        match reg.current_index() {
            -1 => assert!(focused.is_empty()),
            c => assert_eq!(focused, vec![c as usize]),
        }
    }

    #[test]
    fn test_initial_state() {
        let reg = registry(3);
        assert_eq!(reg.current_index(), -1);
        assert!(!reg.has_focus());
        assert_single_focus(&reg);
    }

    #[test]
    fn test_focus_next_cycles() {
        let mut reg = registry(3);

        reg.focus_next();
        assert_eq!(reg.current_index(), 0);
        reg.focus_next();
        assert_eq!(reg.current_index(), 1);
        reg.focus_next();
        assert_eq!(reg.current_index(), 2);

        // Wrap around
        reg.focus_next();
        assert_eq!(reg.current_index(), 0);
        assert_single_focus(&reg);
    }

    #[test]
    fn test_focus_next_n_times_returns_to_start() {
        let mut reg = registry(5);
        reg.focus_at(2);
        for _ in 0..5 {
            reg.focus_next();
        }
        assert_eq!(reg.current_index(), 2);
    }

    #[test]
    fn test_focus_prev_wraps_backward() {
        let mut reg = registry(3);
        reg.focus_prev();
        assert_eq!(reg.current_index(), 2);
        reg.focus_prev();
        assert_eq!(reg.current_index(), 1);
    }

    #[test]
    fn test_focus_at_blurs_previous() {
        let mut reg = registry(3);
        reg.focus_at(0);
        assert!(reg.field(0).unwrap().is_focused());

        reg.focus_at(2);
        assert!(!reg.field(0).unwrap().is_focused());
        assert!(reg.field(2).unwrap().is_focused());
        assert_single_focus(&reg);
    }

    #[test]
    fn test_empty_registry_is_inert() {
        let mut reg = FocusRegistry::new();
        reg.focus_next();
        reg.focus_prev();
        assert_eq!(reg.current_index(), -1);
        assert!(!reg.activate_current(&KeyEvent::new(Key::Enter)));
    }

    #[test]
    fn test_blur_current() {
        let mut reg = registry(2);
        reg.focus_at(1);
        reg.blur_current();
        assert_eq!(reg.current_index(), -1);
        assert!(!reg.field(1).unwrap().is_focused());
    }

    #[test]
    fn test_activate_routes_to_focused_field() {
        let mut reg = registry(2);
        reg.focus_at(1);

        assert!(reg.activate_current(&KeyEvent::new(Key::Char(' '))));
        match reg.field(1).unwrap() {
            Field::Toggle(t) => assert!(t.value()),
            _ => unreachable!(),
        }
        // Unfocused sibling untouched
        match reg.field(0).unwrap() {
            Field::Toggle(t) => assert!(!t.value()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_insert_before_focus_shifts_index() {
        let mut reg = registry(7);
        reg.focus_at(6);

        let inserted = reg.insert_at(4, toggle("late"));
        assert!(inserted);
        assert_eq!(reg.current_index(), 7);
        // Still the same logical field
        assert_eq!(reg.current_field().unwrap().id().as_str(), "f6");
        assert_single_focus(&reg);
    }

    #[test]
    fn test_insert_at_focus_index_shifts() {
        let mut reg = registry(3);
        reg.focus_at(1);

        reg.insert_at(1, toggle("late"));
        assert_eq!(reg.current_index(), 2);
        assert_eq!(reg.current_field().unwrap().id().as_str(), "f1");
    }

    #[test]
    fn test_insert_after_focus_leaves_index() {
        let mut reg = registry(3);
        reg.focus_at(1);

        reg.insert_at(2, toggle("late"));
        assert_eq!(reg.current_index(), 1);
        assert_eq!(reg.current_field().unwrap().id().as_str(), "f1");
    }

    #[test]
    fn test_insert_same_id_is_idempotent() {
        let mut reg = registry(3);
        reg.focus_at(2);

        assert!(reg.insert_at(0, toggle("late")));
        assert_eq!(reg.current_index(), 3);

        // Second arrival of the same field id must not duplicate
        assert!(!reg.insert_at(0, toggle("late")));
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.current_index(), 3);
    }

    #[test]
    fn test_insert_into_empty_registry() {
        let mut reg = FocusRegistry::new();
        assert!(reg.insert_at(0, toggle("first")));
        assert_eq!(reg.len(), 1);
        // Nothing was focused, nothing becomes focused
        assert_eq!(reg.current_index(), -1);
    }

    #[test]
    fn test_mixed_field_kinds_navigate() {
        let mut reg = FocusRegistry::from_fields(vec![
            Field::Select(SelectField::new("s", "List", vec!["a".into(), "b".into()])),
            toggle("t"),
        ]);
        reg.focus_next();
        assert!(reg.activate_current(&KeyEvent::new(Key::Down)));
        reg.focus_next();
        assert!(reg.activate_current(&KeyEvent::new(Key::Char(' '))));
        assert_single_focus(&reg);
    }
}
