//! Panel Module - A named field registry with viewport and liveness
//!
//! A panel owns its focus registry and scroll viewport, and carries a
//! liveness flag that outlives it. Async completions hold a clone of the
//! flag and check it before touching the panel, so results that arrive
//! after teardown are dropped instead of mutating a dead panel.
//!
//! Every focus change and consumed activation re-synchronizes the
//! viewport, so the focused field is always visible.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::fields::Field;
use crate::state::focus::FocusRegistry;
use crate::state::keyboard::KeyEvent;
use crate::state::scroll::Viewport;

// =============================================================================
// LIVENESS
// =============================================================================

/// Cloneable teardown flag. Pending callbacks check it before mutating
/// panel state; pointer validity is never the liveness signal.
#[derive(Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    fn kill(&self) {
        self.0.set(false);
    }
}

// =============================================================================
// PANEL
// =============================================================================

/// A named content panel: fields, viewport, liveness.
pub struct Panel {
    title: String,
    registry: FocusRegistry,
    viewport: Viewport,
    alive: Liveness,
}

impl Panel {
    pub fn new(title: impl Into<String>, fields: Vec<Field>, viewport_height: u16) -> Self {
        Self {
            title: title.into(),
            registry: FocusRegistry::from_fields(fields),
            viewport: Viewport::new(viewport_height),
            alive: Liveness::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn registry(&self) -> &FocusRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FocusRegistry {
        &mut self.registry
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Clone of the liveness flag, for pending async work.
    pub fn liveness(&self) -> Liveness {
        self.alive.clone()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.is_alive()
    }

    /// Tear the panel down: blur focus and mark the liveness flag so
    /// pending completions become no-ops.
    pub fn teardown(&mut self) {
        self.registry.blur_current();
        self.alive.kill();
        debug!(panel = %self.title, "panel torn down");
    }

    // =========================================================================
    // FOCUS (viewport-synchronized)
    // =========================================================================

    pub fn focus_next(&mut self) {
        self.registry.focus_next();
        self.viewport.sync(&self.registry);
    }

    pub fn focus_prev(&mut self) {
        self.registry.focus_prev();
        self.viewport.sync(&self.registry);
    }

    pub fn focus_at(&mut self, index: usize) {
        self.registry.focus_at(index);
        self.viewport.sync(&self.registry);
    }

    pub fn blur(&mut self) {
        self.registry.blur_current();
    }

    /// Offer a key event to the focused field. Returns true if consumed.
    pub fn activate(&mut self, event: &KeyEvent) -> bool {
        let consumed = self.registry.activate_current(event);
        if consumed {
            self.viewport.sync(&self.registry);
        }
        consumed
    }

    /// True while the focused field claims every key.
    pub fn captures_all(&self) -> bool {
        self.registry.captures_all()
    }

    // =========================================================================
    // ASYNC INSERTION
    // =========================================================================

    /// Splice a late-arriving field into the registry.
    ///
    /// Silent no-op when the panel has been torn down; idempotent per
    /// field id. Focus keeps referencing the same logical field, and the
    /// viewport follows it.
    pub fn insert_field(&mut self, index: usize, field: Field) -> bool {
        if !self.alive.is_alive() {
            debug!(panel = %self.title, id = field.id().as_str(), "insert after teardown dropped");
            return false;
        }
        let inserted = self.registry.insert_at(index, field);
        if inserted {
            self.viewport.sync(&self.registry);
        }
        inserted
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
        Field::Toggle(ToggleField::new(id, id, false))
    }

    fn device_list(id: &str, items: usize) -> Field {
        Field::Select(SelectField::new(
            id,
            "Input device",
            (0..items).map(|i| format!("device {}", i)).collect(),
        ))
    }

    fn panel(n: usize) -> Panel {
        Panel::new(
            "Devices",
            (0..n).map(|i| toggle(&format!("f{}", i))).collect(),
            6,
        )
    }

    #[test]
    fn test_spliced_list_shifts_focus_past_it() {
        // A list of 5 devices arrives as one select field at index 4
        // while focus sits at index 6
        let mut p = panel(8);
        p.focus_at(6);

        assert!(p.insert_field(4, device_list("devices", 5)));
        assert_eq!(p.registry().current_index(), 7);
        assert_eq!(p.registry().current_field().unwrap().id().as_str(), "f6");
    }

    #[test]
    fn test_insert_after_focus_leaves_it() {
        let mut p = panel(4);
        p.focus_at(1);

        p.insert_field(3, device_list("devices", 2));
        assert_eq!(p.registry().current_index(), 1);
    }

    #[test]
    fn test_insert_into_torn_down_panel_is_noop() {
        let mut p = panel(3);
        p.teardown();

        assert!(!p.insert_field(0, device_list("devices", 5)));
        assert_eq!(p.registry().len(), 3);
    }

    #[test]
    fn test_liveness_flag_outlives_teardown_check() {
        let p = panel(1);
        let liveness = p.liveness();
        assert!(liveness.is_alive());

        let mut p = p;
        p.teardown();
        assert!(!liveness.is_alive());
    }

    #[test]
    fn test_duplicate_arrival_not_duplicated() {
        let mut p = panel(2);
        assert!(p.insert_field(1, device_list("devices", 3)));
        assert!(!p.insert_field(1, device_list("devices", 3)));
        assert_eq!(p.registry().len(), 3);
    }

    #[test]
    fn test_teardown_blurs() {
        let mut p = panel(3);
        p.focus_at(1);
        p.teardown();
        assert_eq!(p.registry().current_index(), -1);
    }

    #[test]
    fn test_focus_keeps_viewport_in_sync() {
        // 8 single-row fields in a 6-row viewport
        let mut p = panel(8);
        p.focus_at(7);
        assert_eq!(p.viewport().top(), 2);

        p.focus_at(0);
        assert_eq!(p.viewport().top(), 0);
    }

    #[test]
    fn test_insertion_above_focus_rescrolls() {
        let mut p = panel(8);
        p.focus_at(7);
        assert_eq!(p.viewport().top(), 2);

        // 5 rows of devices land above the focus; offset is recomputed
        // from live heights, so the viewport follows the field down
        p.insert_field(0, device_list("devices", 4));
        let index = p.registry().current_index();
        assert_eq!(index, 8);
        assert_eq!(p.viewport().top(), 7);
    }

    #[test]
    fn test_activate_consumes_and_syncs() {
        let mut p = Panel::new("Test", vec![device_list("devices", 3), toggle("t")], 4);
        p.focus_at(0);
        assert!(p.activate(&KeyEvent::new(Key::Down)));
        assert!(!p.activate(&KeyEvent::new(Key::Tab)));
    }
}
