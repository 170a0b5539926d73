//! Fields Module - Focusable field variants
//!
//! The closed set of focusable field kinds a panel can declare:
//!
//! - **Select** - vertical list with an internal cursor and a committed
//!   selection
//! - **Stepper** - bounded ordered value set stepped left/right
//! - **Toggle** - boolean flipped by a designated key
//! - **Recorder** - key-combo recorder with a capture sub-mode
//!
//! Every variant implements the same capability contract: `focus()`,
//! `blur()`, and `activate(&event) -> bool` (true = consumed). Dispatch is
//! by kind through the [`Field`] enum - there is no open trait object, the
//! variant set is closed on purpose.
//!
//! Per-field state machine: Idle -> Focused on `focus()`, back to Idle on
//! `blur()`. The recorder nests a capture sub-mode inside Focused; while
//! capturing it reports `captures_all()` so the router hands it every key.

mod list;
mod recorder;
mod stepper;
mod toggle;

pub use list::SelectField;
pub use recorder::RecorderField;
pub use stepper::StepperField;
pub use toggle::ToggleField;

use crate::state::keyboard::KeyEvent;

// =============================================================================
// IDENTITY
// =============================================================================

/// Stable field identity. Late-arriving fields are deduplicated by id, so
/// ids must be unique within a panel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Field variant kind, for dispatch-by-kind queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Stepper,
    Toggle,
    Recorder,
}

// =============================================================================
// FIELD
// =============================================================================

/// A focusable field. Closed tagged-variant set dispatched by kind.
pub enum Field {
    Select(SelectField),
    Stepper(StepperField),
    Toggle(ToggleField),
    Recorder(RecorderField),
}

impl Field {
    pub fn id(&self) -> &FieldId {
        match self {
            Field::Select(f) => f.id(),
            Field::Stepper(f) => f.id(),
            Field::Toggle(f) => f.id(),
            Field::Recorder(f) => f.id(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Select(_) => FieldKind::Select,
            Field::Stepper(_) => FieldKind::Stepper,
            Field::Toggle(_) => FieldKind::Toggle,
            Field::Recorder(_) => FieldKind::Recorder,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Field::Select(f) => f.label(),
            Field::Stepper(f) => f.label(),
            Field::Toggle(f) => f.label(),
            Field::Recorder(f) => f.label(),
        }
    }

    /// Rendered height in terminal rows, computed from live state.
    /// Scroll offsets are always derived from these at sync time.
    pub fn height(&self) -> u16 {
        match self {
            Field::Select(f) => f.height(),
            Field::Stepper(_) | Field::Toggle(_) | Field::Recorder(_) => 1,
        }
    }

    pub fn is_focused(&self) -> bool {
        match self {
            Field::Select(f) => f.is_focused(),
            Field::Stepper(f) => f.is_focused(),
            Field::Toggle(f) => f.is_focused(),
            Field::Recorder(f) => f.is_focused(),
        }
    }

    pub fn focus(&mut self) {
        match self {
            Field::Select(f) => f.focus(),
            Field::Stepper(f) => f.focus(),
            Field::Toggle(f) => f.focus(),
            Field::Recorder(f) => f.focus(),
        }
    }

    pub fn blur(&mut self) {
        match self {
            Field::Select(f) => f.blur(),
            Field::Stepper(f) => f.blur(),
            Field::Toggle(f) => f.blur(),
            Field::Recorder(f) => f.blur(),
        }
    }

    /// Offer a key event to the focused field. Returns true if consumed.
    pub fn activate(&mut self, event: &KeyEvent) -> bool {
        match self {
            Field::Select(f) => f.activate(event),
            Field::Stepper(f) => f.activate(event),
            Field::Toggle(f) => f.activate(event),
            Field::Recorder(f) => f.activate(event),
        }
    }

    /// True while the field claims every key (recorder capture sub-mode).
    pub fn captures_all(&self) -> bool {
        match self {
            Field::Recorder(f) => f.is_capturing(),
            _ => false,
        }
    }

    pub fn as_select(&self) -> Option<&SelectField> {
        match self {
            Field::Select(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_recorder(&self) -> Option<&RecorderField> {
        match self {
            Field::Recorder(f) => Some(f),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
