//! Overlay Module - Modal overlay controller
//!
//! Exclusive overlays (help, confirm dialogs, the snippet editor, option
//! pickers) claim input by pushing a consuming interceptor, and release
//! it by truncating the interceptor stack back to the depth recorded when
//! they opened. Sessions stack LIFO so an overlay may open a nested
//! overlay and every close still restores exactly the depth and focus
//! snapshot taken at its own open.
//!
//! Overlay interceptors never mutate the controller directly - they hold
//! an [`OverlayHandle`] and request an outcome; the router calls
//! [`ModalController::resolve`] after dispatch to perform the close on
//! the same event-loop turn.
//!
//! # Example
//!
//! ```ignore
//! let handle = modal.handle();
//! modal.open(&mut stack, OverlayProps {
//!     kind: OverlayKind::Confirm,
//!     prior_focus: snapshot,
//!     bounds: Some(Rect::new(10, 5, 40, 7)),
//!     interceptor: Box::new(move |event| {
//!         match event.key {
//!             Key::Enter => handle.request_commit(),
//!             Key::Escape => handle.request_close(),
//!             _ if event.is_interrupt() => return false,
//!             _ => {}
//!         }
//!         true
//!     }),
//!     on_commit: Some(Box::new(|| delete_entry())),
//!     on_close: None,
//! })?;
//! ```

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::state::interceptor::InterceptorStack;
use crate::state::keyboard::KeyHandler;

// =============================================================================
// TYPES
// =============================================================================

/// The overlay kinds the control panel opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    /// Full-screen key reference; swallows everything but its close keys
    Help,
    /// Small confirm dialog with a commit action
    Confirm,
    /// Text-expansion snippet editor
    SnippetEditor,
    /// List picker rendered over the panel
    OptionPicker,
}

/// Terminal-cell rectangle of a rendered overlay, for click-outside
/// dismissal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// How an overlay ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayOutcome {
    Committed,
    Cancelled,
}

/// Rejection of an `open` request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("overlay {0:?} is already open")]
    AlreadyOpen(OverlayKind),
}

// =============================================================================
// OVERLAY HANDLE
// =============================================================================

/// Cloneable handle through which overlay interceptors request an
/// outcome. The requested outcome applies to the top session and is
/// performed by the next `resolve` call.
#[derive(Clone, Default)]
pub struct OverlayHandle {
    pending: Rc<Cell<Option<OverlayOutcome>>>,
}

impl OverlayHandle {
    /// Request dismissal of the top overlay.
    pub fn request_close(&self) {
        self.pending.set(Some(OverlayOutcome::Cancelled));
    }

    /// Request commit-then-close of the top overlay.
    pub fn request_commit(&self) {
        self.pending.set(Some(OverlayOutcome::Committed));
    }

    fn take(&self) -> Option<OverlayOutcome> {
        self.pending.take()
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Everything needed to open an overlay.
pub struct OverlayProps<S> {
    pub kind: OverlayKind,
    /// Caller's focus snapshot, returned verbatim on close.
    pub prior_focus: S,
    /// Rendered bounds; clicks outside dismiss. None = cannot be
    /// dismissed by click (full-screen overlays).
    pub bounds: Option<Rect>,
    /// The consuming interceptor that owns input while the overlay is
    /// open.
    pub interceptor: KeyHandler,
    /// Runs on commit, before the closed transition.
    pub on_commit: Option<Box<dyn FnOnce()>>,
    /// Runs after the interceptor stack and focus are restored.
    pub on_close: Option<Box<dyn FnOnce(OverlayOutcome)>>,
}

struct ModalSession<S> {
    kind: OverlayKind,
    depth_before: usize,
    prior_focus: S,
    bounds: Option<Rect>,
    on_commit: Option<Box<dyn FnOnce()>>,
    on_close: Option<Box<dyn FnOnce(OverlayOutcome)>>,
}

/// A closed session, handed back to the caller for focus restoration.
pub struct ClosedOverlay<S> {
    pub kind: OverlayKind,
    pub outcome: OverlayOutcome,
    pub prior_focus: S,
}

// =============================================================================
// MODAL CONTROLLER
// =============================================================================

/// LIFO stack of modal sessions. `S` is the caller's focus snapshot
/// type; the controller stores it untouched and returns it on close.
pub struct ModalController<S> {
    sessions: Vec<ModalSession<S>>,
    handle: OverlayHandle,
}

impl<S> Default for ModalController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ModalController<S> {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            handle: OverlayHandle::default(),
        }
    }

    /// Handle for overlay interceptors to request close/commit.
    pub fn handle(&self) -> OverlayHandle {
        self.handle.clone()
    }

    pub fn is_open(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Kind of the top (input-owning) overlay.
    pub fn top_kind(&self) -> Option<OverlayKind> {
        self.sessions.last().map(|s| s.kind)
    }

    /// Bounds of the top overlay, when it is click-dismissable.
    pub fn top_bounds(&self) -> Option<Rect> {
        self.sessions.last().and_then(|s| s.bounds)
    }

    /// Number of open sessions (nested overlays included).
    pub fn open_count(&self) -> usize {
        self.sessions.len()
    }

    /// Open an overlay: snapshot the interceptor depth, push the
    /// consuming interceptor, push the session.
    ///
    /// A kind that is already open is rejected - the caller must wait
    /// for it to close. This is a programming error, asserted in debug.
    pub fn open(
        &mut self,
        stack: &mut InterceptorStack,
        props: OverlayProps<S>,
    ) -> Result<(), OverlayError> {
        if self.sessions.iter().any(|s| s.kind == props.kind) {
            debug_assert!(false, "overlay {:?} opened twice", props.kind);
            return Err(OverlayError::AlreadyOpen(props.kind));
        }

        let depth_before = stack.depth();
        stack.push(props.interceptor);
        debug!(kind = ?props.kind, depth_before, "overlay opened");

        self.sessions.push(ModalSession {
            kind: props.kind,
            depth_before,
            prior_focus: props.prior_focus,
            bounds: props.bounds,
            on_commit: props.on_commit,
            on_close: props.on_close,
        });
        Ok(())
    }

    /// Perform a pending outcome requested through the handle, if any.
    /// Called by the router after every dispatch.
    pub fn resolve(&mut self, stack: &mut InterceptorStack) -> Option<ClosedOverlay<S>> {
        let outcome = self.handle.take()?;
        self.close_top(stack, outcome)
    }

    /// Close the top overlay with the given outcome, restoring the
    /// interceptor stack to the depth recorded at open. Any interceptors
    /// the overlay pushed on top of its own (nested or otherwise) are
    /// removed by the same truncation.
    pub fn close_top(
        &mut self,
        stack: &mut InterceptorStack,
        outcome: OverlayOutcome,
    ) -> Option<ClosedOverlay<S>> {
        let mut session = self.sessions.pop()?;

        if outcome == OverlayOutcome::Committed {
            if let Some(commit) = session.on_commit.take() {
                commit();
            }
        }

        stack.truncate(session.depth_before);
        debug!(kind = ?session.kind, ?outcome, depth = session.depth_before, "overlay closed");

        if let Some(close) = session.on_close.take() {
            close(outcome);
        }

        Some(ClosedOverlay {
            kind: session.kind,
            outcome,
            prior_focus: session.prior_focus,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::{Key, KeyEvent};
    use std::cell::RefCell;

    fn consume_all() -> KeyHandler {
        Box::new(|_| true)
    }

    fn props(kind: OverlayKind, prior_focus: i32) -> OverlayProps<i32> {
        OverlayProps {
            kind,
            prior_focus,
            bounds: None,
            interceptor: consume_all(),
            on_commit: None,
            on_close: None,
        }
    }

    #[test]
    fn test_open_pushes_consuming_interceptor() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();

        modal
            .open(&mut stack, props(OverlayKind::Help, 0))
            .unwrap();
        assert!(modal.is_open());
        assert_eq!(stack.depth(), 1);
        assert!(stack.dispatch(&KeyEvent::new(Key::Tab)));
    }

    #[test]
    fn test_close_restores_depth_and_snapshot() {
        let mut stack = InterceptorStack::new();
        stack.push(Box::new(|_| false)); // a pre-existing global interceptor
        let mut modal: ModalController<i32> = ModalController::new();

        modal
            .open(&mut stack, props(OverlayKind::Confirm, 2))
            .unwrap();
        assert_eq!(stack.depth(), 2);

        let closed = modal
            .close_top(&mut stack, OverlayOutcome::Cancelled)
            .unwrap();
        assert_eq!(closed.prior_focus, 2);
        assert_eq!(closed.kind, OverlayKind::Confirm);
        assert_eq!(stack.depth(), 1);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_nested_overlays_restore_in_lifo_order() {
        // confirm opened at depth 1, nested detail picker at depth 2;
        // closing the picker restores depth 2->1... and so on down
        let mut stack = InterceptorStack::new();
        stack.push(Box::new(|_| false));
        let mut modal: ModalController<i32> = ModalController::new();

        modal
            .open(&mut stack, props(OverlayKind::Confirm, 2))
            .unwrap();
        modal
            .open(&mut stack, props(OverlayKind::OptionPicker, 2))
            .unwrap();
        assert_eq!(stack.depth(), 3);
        assert_eq!(modal.open_count(), 2);

        let closed = modal
            .close_top(&mut stack, OverlayOutcome::Cancelled)
            .unwrap();
        assert_eq!(closed.kind, OverlayKind::OptionPicker);
        assert_eq!(stack.depth(), 2);
        assert_eq!(modal.top_kind(), Some(OverlayKind::Confirm));

        let closed = modal
            .close_top(&mut stack, OverlayOutcome::Cancelled)
            .unwrap();
        assert_eq!(closed.prior_focus, 2);
        assert_eq!(stack.depth(), 1);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_close_removes_extra_interceptors_the_overlay_pushed() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();

        modal
            .open(&mut stack, props(OverlayKind::SnippetEditor, 0))
            .unwrap();
        // The overlay pushes two more interceptors of its own
        stack.push(consume_all());
        stack.push(consume_all());
        assert_eq!(stack.depth(), 3);

        modal.close_top(&mut stack, OverlayOutcome::Cancelled);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_double_open_same_kind_rejected() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();

        modal
            .open(&mut stack, props(OverlayKind::Help, 0))
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            modal.open(&mut stack, props(OverlayKind::Help, 1))
        }));

        // Debug builds assert; release builds report the rejection
        match result {
            Ok(outcome) => assert_eq!(outcome, Err(OverlayError::AlreadyOpen(OverlayKind::Help))),
            Err(_) => assert!(cfg!(debug_assertions)),
        }
        assert_eq!(modal.open_count(), 1);
    }

    #[test]
    fn test_commit_runs_before_close_callback() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();

        let order = Rc::new(RefCell::new(Vec::new()));
        let order_commit = order.clone();
        let order_close = order.clone();

        modal
            .open(
                &mut stack,
                OverlayProps {
                    kind: OverlayKind::Confirm,
                    prior_focus: 0,
                    bounds: None,
                    interceptor: consume_all(),
                    on_commit: Some(Box::new(move || {
                        order_commit.borrow_mut().push("commit");
                    })),
                    on_close: Some(Box::new(move |outcome| {
                        assert_eq!(outcome, OverlayOutcome::Committed);
                        order_close.borrow_mut().push("close");
                    })),
                },
            )
            .unwrap();

        modal.close_top(&mut stack, OverlayOutcome::Committed);
        assert_eq!(*order.borrow(), vec!["commit", "close"]);
    }

    #[test]
    fn test_cancel_skips_commit_callback() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();

        let committed = Rc::new(Cell::new(false));
        let committed_clone = committed.clone();

        modal
            .open(
                &mut stack,
                OverlayProps {
                    kind: OverlayKind::Confirm,
                    prior_focus: 0,
                    bounds: None,
                    interceptor: consume_all(),
                    on_commit: Some(Box::new(move || committed_clone.set(true))),
                    on_close: None,
                },
            )
            .unwrap();

        modal.close_top(&mut stack, OverlayOutcome::Cancelled);
        assert!(!committed.get());
    }

    #[test]
    fn test_handle_outcome_applies_on_resolve() {
        let mut stack = InterceptorStack::new();
        let mut modal: ModalController<i32> = ModalController::new();
        let handle = modal.handle();

        modal
            .open(&mut stack, props(OverlayKind::Confirm, 5))
            .unwrap();

        // Nothing pending: resolve is a no-op
        assert!(modal.resolve(&mut stack).is_none());

        handle.request_commit();
        let closed = modal.resolve(&mut stack).unwrap();
        assert_eq!(closed.outcome, OverlayOutcome::Committed);
        assert_eq!(closed.prior_focus, 5);
        assert_eq!(stack.depth(), 0);

        // The request was consumed
        assert!(modal.resolve(&mut stack).is_none());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 5, 20, 4);
        assert!(rect.contains(10, 5));
        assert!(rect.contains(29, 8));
        assert!(!rect.contains(30, 8));
        assert!(!rect.contains(9, 5));
        assert!(!rect.contains(10, 9));
    }
}
