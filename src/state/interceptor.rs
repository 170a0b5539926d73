//! Interceptor Module - Layered input interception
//!
//! An ordered stack of handlers offered each key event before default
//! routing. The most recently pushed handler sees the event first; a
//! handler returns true to consume it and stop the walk.
//!
//! Removal is by identity and idempotent - overlay teardown order is not
//! guaranteed relative to event delivery, so removing a handler that is
//! already gone is a silent no-op.
//!
//! # Example
//!
//! ```ignore
//! use murmur_tui::state::interceptor::InterceptorStack;
//!
//! let mut stack = InterceptorStack::new();
//! let id = stack.push(Box::new(|event| {
//!     event.key == Key::Escape // consume Escape, pass the rest
//! }));
//!
//! stack.dispatch(&KeyEvent::new(Key::Escape)); // -> true
//! stack.remove(id);
//! stack.remove(id); // no-op
//! ```

use super::keyboard::{KeyEvent, KeyHandler};

// =============================================================================
// INTERCEPTOR STACK
// =============================================================================

/// Identity of a pushed interceptor, used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterceptorId(usize);

/// Ordered stack of key interceptors, dispatched top-down.
#[derive(Default)]
pub struct InterceptorStack {
    entries: Vec<(usize, KeyHandler)>,
    next_id: usize,
}

impl InterceptorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a handler onto the top of the stack.
    pub fn push(&mut self, handler: KeyHandler) -> InterceptorId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, handler));
        InterceptorId(id)
    }

    /// Remove a handler by identity. Idempotent: removing an absent or
    /// already-removed handler does nothing.
    pub fn remove(&mut self, id: InterceptorId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id.0);
    }

    /// Number of installed interceptors.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop interceptors until the stack is back at `depth`.
    ///
    /// Truncating to a depth at or above the current one is a programming
    /// error; release builds leave the stack untouched.
    pub fn truncate(&mut self, depth: usize) {
        debug_assert!(
            depth <= self.entries.len(),
            "truncate({}) above current depth {}",
            depth,
            self.entries.len()
        );
        if depth <= self.entries.len() {
            self.entries.truncate(depth);
        }
    }

    /// Offer an event to each interceptor, most recently pushed first.
    /// Returns true if one of them consumed it.
    pub fn dispatch(&mut self, event: &KeyEvent) -> bool {
        for (_, handler) in self.entries.iter_mut().rev() {
            if handler(event) {
                return true;
            }
        }
        false
    }
}

// =============================================================================
// TESTS
// =============================================================================
