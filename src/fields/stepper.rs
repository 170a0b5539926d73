//! Stepper Field - Bounded ordered value set
//!
//! Left/Right move one step through a fixed, ordered set of values. The
//! ends are hard stops - no wraparound.

use super::FieldId;
use crate::state::keyboard::{Key, KeyEvent};

/// Callback fired when the position changes. Receives the new index.
pub type StepHandler = Box<dyn FnMut(usize)>;

/// Stepper over an ordered value set.
pub struct StepperField {
    id: FieldId,
    label: String,
    values: Vec<String>,
    pos: usize,
    focused: bool,
    on_step: Option<StepHandler>,
}

impl StepperField {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        values: Vec<String>,
        pos: usize,
    ) -> Self {
        let pos = if values.is_empty() {
            0
        } else {
            pos.min(values.len() - 1)
        };
        Self {
            id: FieldId::new(id),
            label: label.into(),
            values,
            pos,
            focused: false,
            on_step: None,
        }
    }

    pub fn on_step(mut self, handler: StepHandler) -> Self {
        self.on_step = Some(handler);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn value(&self) -> Option<&str> {
        self.values.get(self.pos).map(String::as_str)
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
        if self.values.is_empty() {
            return false;
        }
        let next = match event.key {
            Key::Left => self.pos.saturating_sub(1),
            Key::Right => (self.pos + 1).min(self.values.len() - 1),
            _ => return false,
        };
        if next != self.pos {
            self.pos = next;
            if let Some(handler) = self.on_step.as_mut() {
                handler(next);
            }
        }
        // A step key at the boundary is still consumed
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn rates() -> StepperField {
        StepperField::new(
            "rate",
            "Sample rate",
            vec!["8000".into(), "16000".into(), "44100".into()],
            1,
        )
    }

    #[test]
    fn test_steps_left_and_right() {
        let mut f = rates();
        assert_eq!(f.value(), Some("16000"));

        assert!(f.activate(&KeyEvent::new(Key::Right)));
        assert_eq!(f.value(), Some("44100"));

        assert!(f.activate(&KeyEvent::new(Key::Left)));
        assert!(f.activate(&KeyEvent::new(Key::Left)));
        assert_eq!(f.value(), Some("8000"));
    }

    #[test]
    fn test_no_wraparound_at_ends() {
        let mut f = rates();
        f.activate(&KeyEvent::new(Key::Right));
        assert_eq!(f.pos(), 2);

        // Right at the last value stays (consumed, no wrap)
        assert!(f.activate(&KeyEvent::new(Key::Right)));
        assert_eq!(f.pos(), 2);

        f.activate(&KeyEvent::new(Key::Left));
        f.activate(&KeyEvent::new(Key::Left));
        assert!(f.activate(&KeyEvent::new(Key::Left)));
        assert_eq!(f.pos(), 0);
    }

    #[test]
    fn test_step_callback_fires_on_change_only() {
        let steps = Rc::new(Cell::new(0u32));
        let steps_clone = steps.clone();

        let mut f = rates().on_step(Box::new(move |_| {
            steps_clone.set(steps_clone.get() + 1);
        }));

        f.activate(&KeyEvent::new(Key::Right)); // 1 -> 2
        f.activate(&KeyEvent::new(Key::Right)); // boundary, no change
        assert_eq!(steps.get(), 1);
    }

    #[test]
    fn test_position_clamped_at_construction() {
        let f = StepperField::new("x", "X", vec!["a".into(), "b".into()], 10);
        assert_eq!(f.pos(), 1);
    }

    #[test]
    fn test_other_keys_pass() {
        let mut f = rates();
        assert!(!f.activate(&KeyEvent::new(Key::Up)));
        assert!(!f.activate(&KeyEvent::new(Key::Enter)));
    }
}
