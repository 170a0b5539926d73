//! Panels Module - Declarative construction of the control panels
//!
//! Builds the five panels of the control surface in nav order and wires
//! their field callbacks to the shared settings snapshot. Panels are
//! plain data for the router; everything interactive goes through the
//! field capability contract.
//!
//! The Devices and Models panels start empty - their select fields are
//! spliced in by the router when the bridge snapshots arrive.

use std::cell::RefCell;
use std::rc::Rc;

use crate::fields::{Field, RecorderField, SelectField, StepperField, ToggleField};
use crate::panel::Panel;
use crate::router::CompletionTargets;
use crate::store::{HistoryEntry, Settings};

/// Nav order of the built panels.
pub const GENERAL: usize = 0;
pub const DEVICES: usize = 1;
pub const MODELS: usize = 2;
pub const HOTKEYS: usize = 3;
pub const HISTORY: usize = 4;

/// Selectable sample rates, in Hz.
const SAMPLE_RATES: [u32; 4] = [8_000, 16_000, 22_050, 44_100];

/// Selectable silence timeouts, in milliseconds.
const SILENCE_TIMEOUTS_MS: [u64; 5] = [500, 1_000, 1_500, 2_000, 3_000];

/// The built panel set plus the completion-target indices the router
/// needs for async splicing.
pub struct PanelSet {
    pub panels: Vec<Panel>,
    pub targets: CompletionTargets,
}

/// Build the control panels against a shared settings snapshot.
pub fn build_panels(
    settings: &Rc<RefCell<Settings>>,
    history: &[HistoryEntry],
    viewport_height: u16,
) -> PanelSet {
    let panels = vec![
        general_panel(settings, viewport_height),
        Panel::new("Devices", Vec::new(), viewport_height),
        Panel::new("Models", Vec::new(), viewport_height),
        hotkeys_panel(settings, viewport_height),
        history_panel(history, viewport_height),
    ];
    PanelSet {
        panels,
        targets: CompletionTargets {
            devices: Some(DEVICES),
            models: Some(MODELS),
            history: Some(HISTORY),
        },
    }
}

fn general_panel(settings: &Rc<RefCell<Settings>>, viewport_height: u16) -> Panel {
    let current = settings.borrow().clone();

    let rate_pos = SAMPLE_RATES
        .iter()
        .position(|&r| r == current.sample_rate)
        .unwrap_or(1);
    let rate_settings = settings.clone();
    let sample_rate = StepperField::new(
        "sample-rate",
        "Sample rate",
        SAMPLE_RATES.iter().map(|r| format!("{} Hz", r)).collect(),
        rate_pos,
    )
    .on_step(Box::new(move |pos| {
        rate_settings.borrow_mut().sample_rate = SAMPLE_RATES[pos];
    }));

    let timeout_pos = SILENCE_TIMEOUTS_MS
        .iter()
        .position(|&t| t == current.silence_timeout_ms)
        .unwrap_or(2);
    let timeout_settings = settings.clone();
    let silence_timeout = StepperField::new(
        "silence-timeout",
        "Silence timeout",
        SILENCE_TIMEOUTS_MS
            .iter()
            .map(|t| format!("{} ms", t))
            .collect(),
        timeout_pos,
    )
    .on_step(Box::new(move |pos| {
        timeout_settings.borrow_mut().silence_timeout_ms = SILENCE_TIMEOUTS_MS[pos];
    }));

    let punct_settings = settings.clone();
    let punctuation = ToggleField::new("punctuation", "Auto punctuation", current.punctuation)
        .on_toggle(Box::new(move |value| {
            punct_settings.borrow_mut().punctuation = value;
        }));

    let login_settings = settings.clone();
    let launch_at_login =
        ToggleField::new("launch-at-login", "Launch at login", current.launch_at_login)
            .on_toggle(Box::new(move |value| {
                login_settings.borrow_mut().launch_at_login = value;
            }));

    Panel::new(
        "General",
        vec![
            Field::Stepper(sample_rate),
            Field::Stepper(silence_timeout),
            Field::Toggle(punctuation),
            Field::Toggle(launch_at_login),
        ],
        viewport_height,
    )
}

fn hotkeys_panel(settings: &Rc<RefCell<Settings>>, viewport_height: u16) -> Panel {
    let current = settings.borrow().clone();

    let mut toggle = RecorderField::new("hk-toggle", "Toggle dictation");
    if let Some(chord) = current.hotkeys.toggle {
        toggle = toggle.with_chord(chord);
    }
    let toggle_settings = settings.clone();
    let toggle = toggle.on_chord(Box::new(move |chord| {
        toggle_settings.borrow_mut().hotkeys.toggle = Some(chord.to_string());
    }));

    let mut ptt = RecorderField::new("hk-ptt", "Push to talk");
    if let Some(chord) = current.hotkeys.push_to_talk {
        ptt = ptt.with_chord(chord);
    }
    let ptt_settings = settings.clone();
    let ptt = ptt.on_chord(Box::new(move |chord| {
        ptt_settings.borrow_mut().hotkeys.push_to_talk = Some(chord.to_string());
    }));

    Panel::new(
        "Hotkeys",
        vec![Field::Recorder(toggle), Field::Recorder(ptt)],
        viewport_height,
    )
}

fn history_panel(history: &[HistoryEntry], viewport_height: u16) -> Panel {
    let labels = history.iter().map(|e| e.text.clone()).collect();
    Panel::new(
        "History",
        vec![Field::Select(SelectField::new("history", "History", labels))],
        viewport_height,
    )
}

// =============================================================================
// TESTS
// =============================================================================
