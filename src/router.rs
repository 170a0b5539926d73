//! Router Module - Root controller and event routing
//!
//! One cooperative, single-threaded dispatcher owns the interceptor
//! stack, the panel set, the modal controller, and the completion queue.
//! Every raw event flows through one priority chain, in strict arrival
//! order:
//!
//! 1. Interceptor stack (overlay interceptors live on top)
//! 2. While an overlay is open, only the interrupt binding remains
//! 3. The focused field of the active panel
//! 4. Zone navigation (nav bar vs. panel content)
//! 5. Global bindings (interrupt, help)
//!
//! Focus is two-level: `Zone::Nav` moves between panels, `Zone::Content`
//! moves between the active panel's fields. Overlay open snapshots the
//! focus target and interceptor depth; close restores both exactly,
//! however many nested overlays were opened in between.
//!
//! Async results never mutate state mid-call: bridge completions queue
//! up and are drained once per [`Router::tick`].

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::bridge::{BridgeError, Completion, DaemonStatus, ModelInfo, ProcessBridge};
use crate::fields::{Field, SelectField};
use crate::overlay::{
    ModalController, OverlayError, OverlayKind, OverlayOutcome, OverlayProps, Rect,
};
use crate::panel::Panel;
use crate::state::input::{EventSource, InputEvent};
use crate::state::interceptor::InterceptorStack;
use crate::state::keyboard::{Key, KeyEvent};
use crate::store::{HistoryEntry, Settings, Snippet};

/// Rows reserved for the nav bar and the status line.
const CHROME_ROWS: u16 = 2;

// =============================================================================
// FOCUS TARGET
// =============================================================================

/// The two focus levels: the nav bar, or the active panel's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Nav,
    Content,
}

/// A restorable focus target: zone, active panel, focused field (-1 =
/// none). Snapshotted by overlay opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusTarget {
    pub zone: Zone,
    pub panel: usize,
    pub field: i32,
}

/// Panel indices that receive async completions.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionTargets {
    pub devices: Option<usize>,
    pub models: Option<usize>,
    pub history: Option<usize>,
}

// =============================================================================
// ROUTER
// =============================================================================

/// Root controller. Owns all routing state; subordinate components
/// receive it by reference, never through globals.
pub struct Router {
    stack: InterceptorStack,
    modal: ModalController<FocusTarget>,
    panels: Vec<Panel>,
    active: usize,
    zone: Zone,
    running: bool,
    size: (u16, u16),

    status: Signal<String>,
    daemon: Signal<Option<DaemonStatus>>,

    completions: Receiver<Completion>,
    targets: CompletionTargets,
    bridge: Option<Rc<dyn ProcessBridge>>,

    settings: Rc<RefCell<Settings>>,
    history: Rc<RefCell<Vec<HistoryEntry>>>,
    snippets: Rc<RefCell<Vec<Snippet>>>,
    // Id lists backing the async select fields; commit callbacks read
    // them through the Rc so refreshes never leave a stale capture
    device_ids: Rc<RefCell<Vec<String>>>,
    installed_model_ids: Rc<RefCell<Vec<String>>>,
    available_models: Vec<ModelInfo>,
}

impl Router {
    pub fn new(
        panels: Vec<Panel>,
        settings: Rc<RefCell<Settings>>,
        completions: Receiver<Completion>,
    ) -> Self {
        Self {
            stack: InterceptorStack::new(),
            modal: ModalController::new(),
            panels,
            active: 0,
            zone: Zone::Nav,
            running: true,
            size: (80, 24),
            status: signal(String::new()),
            daemon: signal(None),
            completions,
            targets: CompletionTargets::default(),
            bridge: None,
            settings,
            history: Rc::new(RefCell::new(Vec::new())),
            snippets: Rc::new(RefCell::new(Vec::new())),
            device_ids: Rc::new(RefCell::new(Vec::new())),
            installed_model_ids: Rc::new(RefCell::new(Vec::new())),
            available_models: Vec::new(),
        }
    }

    pub fn set_completion_targets(&mut self, targets: CompletionTargets) {
        self.targets = targets;
    }

    pub fn set_bridge(&mut self, bridge: Rc<dyn ProcessBridge>) {
        self.bridge = Some(bridge);
    }

    pub fn set_history(&mut self, history: Rc<RefCell<Vec<HistoryEntry>>>) {
        self.history = history;
    }

    pub fn set_snippets(&mut self, snippets: Rc<RefCell<Vec<Snippet>>>) {
        self.snippets = snippets;
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request graceful shutdown.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_panel(&self) -> &Panel {
        &self.panels[self.active]
    }

    pub fn active_panel_mut(&mut self) -> &mut Panel {
        &mut self.panels[self.active]
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut Panel> {
        self.panels.get_mut(index)
    }

    pub fn interceptor_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Install an application-level interceptor below any overlay
    /// interceptors opened later.
    pub fn push_interceptor(
        &mut self,
        handler: crate::state::keyboard::KeyHandler,
    ) -> crate::state::interceptor::InterceptorId {
        self.stack.push(handler)
    }

    /// Remove an installed interceptor. Idempotent.
    pub fn remove_interceptor(&mut self, id: crate::state::interceptor::InterceptorId) {
        self.stack.remove(id);
    }

    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        self.modal.top_kind()
    }

    pub fn status(&self) -> String {
        self.status.get()
    }

    /// Reactive handle on the status line.
    pub fn status_signal(&self) -> Signal<String> {
        self.status.clone()
    }

    pub fn set_status(&self, message: impl Into<String>) {
        self.status.set(message.into());
    }

    /// Reactive handle on the last daemon status snapshot.
    pub fn daemon_signal(&self) -> Signal<Option<DaemonStatus>> {
        self.daemon.clone()
    }

    /// Current focus target, as snapshotted by overlay opens.
    pub fn snapshot(&self) -> FocusTarget {
        FocusTarget {
            zone: self.zone,
            panel: self.active,
            field: self.active_panel().registry().current_index(),
        }
    }

    // =========================================================================
    // EVENT ROUTING
    // =========================================================================

    /// Route one input event through the priority chain. Returns true if
    /// something consumed it.
    pub fn route_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => self.route_key(&key),
            InputEvent::Click { x, y } => self.route_click(x, y),
            InputEvent::Resize(w, h) => {
                self.size = (w, h);
                let content = h.saturating_sub(CHROME_ROWS);
                for panel in &mut self.panels {
                    panel.viewport_mut().set_height(content);
                }
                false
            }
        }
    }

    fn route_key(&mut self, event: &KeyEvent) -> bool {
        if !event.is_press() {
            return false;
        }

        // 1. Interceptors, most recently installed first
        if self.stack.dispatch(event) {
            self.resolve_overlays();
            return true;
        }

        // 2. An open overlay passed the event through: only the
        //    interrupt stays reachable underneath it
        if self.modal.is_open() {
            if event.is_interrupt() {
                self.stop();
                return true;
            }
            return false;
        }

        // 3. Focused field of the active panel
        if self.zone == Zone::Content && self.active_panel_mut().activate(event) {
            return true;
        }

        // 4. Panel-specific bindings, then zone navigation
        if self.route_panel_keys(event) {
            return true;
        }
        if self.route_navigation(event) {
            return true;
        }

        // 5. Global bindings
        self.route_global(event)
    }

    fn route_navigation(&mut self, event: &KeyEvent) -> bool {
        use crate::state::keyboard::Mods;

        match self.zone {
            Zone::Nav => match event.key {
                Key::Left => {
                    self.switch_panel(-1);
                    true
                }
                Key::Right => {
                    self.switch_panel(1);
                    true
                }
                Key::Tab if event.mods.contains(Mods::SHIFT) => {
                    self.switch_panel(-1);
                    true
                }
                Key::Tab => {
                    self.switch_panel(1);
                    true
                }
                Key::Enter | Key::Down => {
                    self.enter_content();
                    true
                }
                _ => false,
            },
            Zone::Content => match event.key {
                Key::Escape => {
                    self.leave_content();
                    true
                }
                Key::Tab if event.mods.contains(Mods::SHIFT) => {
                    self.active_panel_mut().focus_prev();
                    true
                }
                Key::Tab | Key::Down => {
                    self.active_panel_mut().focus_next();
                    true
                }
                Key::Up => {
                    self.active_panel_mut().focus_prev();
                    true
                }
                _ => false,
            },
        }
    }

    fn route_global(&mut self, event: &KeyEvent) -> bool {
        if event.is_interrupt() {
            self.stop();
            return true;
        }
        if event.key == Key::Char('?') {
            let _ = self.open_help();
            return true;
        }
        false
    }

    /// Bindings that only exist on specific panels.
    fn route_panel_keys(&mut self, event: &KeyEvent) -> bool {
        match event.key {
            // Refresh the device list
            Key::Char('r') if Some(self.active) == self.targets.devices => {
                if let Some(bridge) = &self.bridge {
                    bridge.list_audio_devices();
                }
                true
            }
            // Browse downloadable models
            Key::Char('d') if Some(self.active) == self.targets.models => {
                let _ = self.open_model_picker();
                true
            }
            // Delete the selected history entry, behind a confirm
            Key::Delete if Some(self.active) == self.targets.history => {
                let _ = self.open_history_delete_confirm();
                true
            }
            // New text-expansion snippet
            Key::Char('s') if Some(self.active) == self.targets.history => {
                let _ = self.open_snippet_editor();
                true
            }
            _ => false,
        }
    }

    fn route_click(&mut self, x: u16, y: u16) -> bool {
        if let Some(bounds) = self.modal.top_bounds() {
            if !bounds.contains(x, y) {
                self.modal.handle().request_close();
                self.resolve_overlays();
                return true;
            }
        }
        false
    }

    // =========================================================================
    // ZONE TRANSITIONS
    // =========================================================================

    fn switch_panel(&mut self, direction: i32) {
        if self.panels.is_empty() {
            return;
        }
        let len = self.panels.len() as i32;
        self.active = ((self.active as i32 + direction + len) % len) as usize;
    }

    fn enter_content(&mut self) {
        self.zone = Zone::Content;
        let panel = self.active_panel_mut();
        if !panel.registry().is_empty() {
            panel.focus_at(0);
        }
    }

    fn leave_content(&mut self) {
        self.active_panel_mut().blur();
        self.zone = Zone::Nav;
    }

    /// Restore a focus target recorded before an overlay opened. Focus
    /// that survived underneath the overlay is left alone - the registry
    /// already kept it pointing at the same logical field through any
    /// late insertions.
    fn apply_snapshot(&mut self, target: FocusTarget) {
        if target.panel < self.panels.len() {
            self.active = target.panel;
        }
        self.zone = target.zone;
        let panel = &mut self.panels[self.active];
        if target.zone == Zone::Content
            && panel.registry().current_index() < 0
            && target.field >= 0
            && (target.field as usize) < panel.registry().len()
        {
            panel.focus_at(target.field as usize);
        }
    }

    // =========================================================================
    // OVERLAYS
    // =========================================================================

    fn resolve_overlays(&mut self) {
        if let Some(done) = self.modal.resolve(&mut self.stack) {
            self.apply_snapshot(done.prior_focus);
            if done.kind == OverlayKind::Confirm && done.outcome == OverlayOutcome::Committed {
                self.refresh_history_field();
            }
        }
    }

    /// Full-screen key reference. Swallows everything except its own
    /// close keys - the only overlay allowed to eat the interrupt.
    pub fn open_help(&mut self) -> Result<(), OverlayError> {
        let handle = self.modal.handle();
        let snapshot = self.snapshot();
        self.modal.open(
            &mut self.stack,
            OverlayProps {
                kind: OverlayKind::Help,
                prior_focus: snapshot,
                bounds: None,
                interceptor: Box::new(move |event| {
                    match event.key {
                        Key::Escape | Key::Char('?') | Key::Char('q') => handle.request_close(),
                        _ => {}
                    }
                    true
                }),
                on_commit: None,
                on_close: None,
            },
        )
    }

    /// Confirm dialog: Enter commits, Escape or a click outside cancels.
    /// The interrupt passes through.
    pub fn open_confirm(
        &mut self,
        message: impl Into<String>,
        on_commit: Box<dyn FnOnce()>,
    ) -> Result<(), OverlayError> {
        let message = message.into();
        let handle = self.modal.handle();
        let snapshot = self.snapshot();
        let bounds = self.centered_bounds(44, 7);
        self.set_status(message);
        self.modal.open(
            &mut self.stack,
            OverlayProps {
                kind: OverlayKind::Confirm,
                prior_focus: snapshot,
                bounds: Some(bounds),
                interceptor: Box::new(move |event| {
                    if event.is_interrupt() {
                        return false;
                    }
                    match event.key {
                        Key::Enter => handle.request_commit(),
                        Key::Escape => handle.request_close(),
                        _ => {}
                    }
                    true
                }),
                on_commit: Some(on_commit),
                on_close: None,
            },
        )
    }

    /// List picker over the panel: arrows move, Enter picks, Escape or a
    /// click outside cancels. The interrupt passes through.
    pub fn open_option_picker(
        &mut self,
        items: Vec<String>,
        on_pick: Box<dyn FnOnce(usize)>,
    ) -> Result<(), OverlayError> {
        let handle = self.modal.handle();
        let cursor = Rc::new(Cell::new(0usize));
        let len = items.len();
        let height = (len as u16).saturating_add(2);

        let cursor_for_keys = cursor.clone();
        let cursor_for_commit = cursor.clone();
        let snapshot = self.snapshot();
        let bounds = self.centered_bounds(40, height);
        self.modal.open(
            &mut self.stack,
            OverlayProps {
                kind: OverlayKind::OptionPicker,
                prior_focus: snapshot,
                bounds: Some(bounds),
                interceptor: Box::new(move |event| {
                    if event.is_interrupt() {
                        return false;
                    }
                    match event.key {
                        Key::Up => cursor_for_keys.set(cursor_for_keys.get().saturating_sub(1)),
                        Key::Down => {
                            cursor_for_keys
                                .set((cursor_for_keys.get() + 1).min(len.saturating_sub(1)));
                        }
                        Key::Enter if len > 0 => handle.request_commit(),
                        Key::Escape => handle.request_close(),
                        _ => {}
                    }
                    true
                }),
                on_commit: Some(Box::new(move || on_pick(cursor_for_commit.get()))),
                on_close: None,
            },
        )
    }

    /// Snippet editor: type into the trigger or expansion part, Tab
    /// switches parts, Enter saves, Escape cancels.
    pub fn open_snippet_editor(&mut self) -> Result<(), OverlayError> {
        let handle = self.modal.handle();
        let draft = Rc::new(RefCell::new(Snippet {
            trigger: String::new(),
            expansion: String::new(),
        }));
        let editing_expansion = Rc::new(Cell::new(false));

        let draft_for_keys = draft.clone();
        let draft_for_commit = draft.clone();
        let snippets = self.snippets.clone();
        let snapshot = self.snapshot();
        let bounds = self.centered_bounds(50, 8);
        self.modal.open(
            &mut self.stack,
            OverlayProps {
                kind: OverlayKind::SnippetEditor,
                prior_focus: snapshot,
                bounds: Some(bounds),
                interceptor: Box::new(move |event| {
                    if event.is_interrupt() {
                        return false;
                    }
                    let mut draft = draft_for_keys.borrow_mut();
                    let part = if editing_expansion.get() {
                        &mut draft.expansion
                    } else {
                        &mut draft.trigger
                    };
                    match event.key {
                        Key::Tab => editing_expansion.set(!editing_expansion.get()),
                        Key::Enter => handle.request_commit(),
                        Key::Escape => handle.request_close(),
                        Key::Backspace => {
                            part.pop();
                        }
                        Key::Char(c) => part.push(c),
                        _ => {}
                    }
                    true
                }),
                on_commit: Some(Box::new(move || {
                    let snippet = draft_for_commit.borrow().clone();
                    if !snippet.trigger.is_empty() {
                        snippets.borrow_mut().push(snippet);
                    }
                })),
                on_close: None,
            },
        )
    }

    /// Picker over the models the daemon can download.
    pub fn open_model_picker(&mut self) -> Result<(), OverlayError> {
        let downloadable: Vec<ModelInfo> = self
            .available_models
            .iter()
            .filter(|m| !m.installed)
            .cloned()
            .collect();
        if downloadable.is_empty() {
            self.set_status("no models available to download");
            return Ok(());
        }
        let labels = downloadable.iter().map(|m| m.name.clone()).collect();
        let bridge = self.bridge.clone();
        let status = self.status.clone();
        self.open_option_picker(
            labels,
            Box::new(move |index| {
                let model = &downloadable[index];
                status.set(format!("downloading {}", model.name));
                if let Some(bridge) = bridge {
                    bridge.download_model(&model.id);
                }
            }),
        )
    }

    fn open_history_delete_confirm(&mut self) -> Result<(), OverlayError> {
        let Some(panel_index) = self.targets.history else {
            return Ok(());
        };
        let field_id = crate::fields::FieldId::new("history");
        let cursor = self
            .panels
            .get(panel_index)
            .and_then(|p| {
                let index = p.registry().find_index(&field_id)?;
                p.registry().field(index)
            })
            .and_then(Field::as_select)
            .filter(|f| !f.items().is_empty())
            .map(SelectField::cursor);
        let Some(cursor) = cursor else {
            return Ok(());
        };
        let history = self.history.clone();
        self.open_confirm(
            "delete this history entry?",
            Box::new(move || {
                let mut history = history.borrow_mut();
                if cursor < history.len() {
                    history.remove(cursor);
                }
            }),
        )
    }

    fn centered_bounds(&self, width: u16, height: u16) -> Rect {
        let (w, h) = self.size;
        Rect::new(
            w.saturating_sub(width) / 2,
            h.saturating_sub(height) / 2,
            width.min(w),
            height.min(h),
        )
    }

    // =========================================================================
    // COMPLETIONS
    // =========================================================================

    /// Ask the bridge for everything the panels render. Results arrive
    /// on the completion queue over the next ticks.
    pub fn request_initial_data(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.list_audio_devices();
            bridge.list_models();
            bridge.daemon_status();
        }
    }

    pub fn refresh_daemon_status(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.daemon_status();
        }
    }

    /// Drain the completion queue. Called once per tick; completions for
    /// torn-down panels are dropped after the liveness check.
    pub fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions.try_recv() {
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::AudioDevices(Ok(devices)) => {
                *self.device_ids.borrow_mut() = devices.iter().map(|d| d.id.clone()).collect();
                let names = devices.iter().map(|d| d.name.clone()).collect();
                let settings = self.settings.clone();
                let ids = self.device_ids.clone();
                self.splice_select(
                    self.targets.devices,
                    "devices",
                    "Input device",
                    names,
                    Box::new(move |index| {
                        settings.borrow_mut().device_id = ids.borrow().get(index).cloned();
                    }),
                );
            }
            Completion::AudioDevices(Err(err)) => self.report_error("device list", err),
            Completion::Models(Ok(models)) => {
                let installed: Vec<&ModelInfo> = models.iter().filter(|m| m.installed).collect();
                *self.installed_model_ids.borrow_mut() =
                    installed.iter().map(|m| m.id.clone()).collect();
                let names = installed.iter().map(|m| m.name.clone()).collect();
                let settings = self.settings.clone();
                let ids = self.installed_model_ids.clone();
                self.splice_select(
                    self.targets.models,
                    "models",
                    "Recognition model",
                    names,
                    Box::new(move |index| {
                        settings.borrow_mut().model_id = ids.borrow().get(index).cloned();
                    }),
                );
                self.available_models = models;
            }
            Completion::Models(Err(err)) => self.report_error("model list", err),
            Completion::ModelDownloaded { id, result } => match result {
                Ok(()) => {
                    self.set_status(format!("model {} installed", id));
                    // Pick up the new install state
                    if let Some(bridge) = &self.bridge {
                        bridge.list_models();
                    }
                }
                Err(err) => self.report_error("model download", err),
            },
            Completion::DaemonStatus(Ok(status)) => {
                self.daemon.set(Some(status));
            }
            Completion::DaemonStatus(Err(err)) => self.report_error("daemon status", err),
        }
    }

    /// Insert an async select field, or refresh its items when a later
    /// snapshot arrives. Dropped silently when the target panel is gone
    /// or torn down.
    fn splice_select(
        &mut self,
        panel_index: Option<usize>,
        id: &str,
        label: &str,
        items: Vec<String>,
        on_commit: Box<dyn FnMut(usize)>,
    ) {
        let Some(panel) = panel_index.and_then(|i| self.panels.get_mut(i)) else {
            return;
        };
        if !panel.is_alive() {
            debug!(field = id, "completion for torn-down panel dropped");
            return;
        }
        let field_id = crate::fields::FieldId::new(id);
        if let Some(index) = panel.registry().find_index(&field_id) {
            if let Some(Field::Select(existing)) = panel.registry_mut().field_mut(index) {
                existing.set_items(items);
            }
            panel.viewport().sync(panel.registry());
        } else {
            let field = SelectField::new(id, label, items).on_commit(on_commit);
            panel.insert_field(0, Field::Select(field));
        }
    }

    /// Rebuild the history select items after a committed deletion.
    fn refresh_history_field(&mut self) {
        let Some(panel_index) = self.targets.history else {
            return;
        };
        let labels: Vec<String> = self
            .history
            .borrow()
            .iter()
            .map(|e| e.text.clone())
            .collect();
        let Some(panel) = self.panels.get_mut(panel_index) else {
            return;
        };
        let field_id = crate::fields::FieldId::new("history");
        if let Some(index) = panel.registry().find_index(&field_id) {
            if let Some(Field::Select(existing)) = panel.registry_mut().field_mut(index) {
                existing.set_items(labels);
            }
            panel.viewport().sync(panel.registry());
        }
    }

    fn report_error(&mut self, context: &str, err: BridgeError) {
        warn!(context, %err, "collaborator failure");
        self.set_status(format!("{}: {}", context, err));
    }

    // =========================================================================
    // EVENT LOOP
    // =========================================================================

    /// Run the loop once: poll one event, route it, drain completions.
    /// Returns `Ok(false)` when the application should stop.
    pub fn tick(
        &mut self,
        source: &mut dyn EventSource,
        timeout: Duration,
    ) -> io::Result<bool> {
        if !self.running {
            return Ok(false);
        }
        if let Some(event) = source.poll(timeout)? {
            self.route_event(event);
        }
        self.drain_completions();
        Ok(self.running)
    }

    /// Run the event loop until stopped.
    pub fn run(&mut self, source: &mut dyn EventSource) -> io::Result<()> {
        while self.tick(source, Duration::from_millis(16))? {}
        Ok(())
    }

    /// Tear down every panel. Pending completions become no-ops.
    pub fn teardown(&mut self) {
        for panel in &mut self.panels {
            panel.teardown();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
