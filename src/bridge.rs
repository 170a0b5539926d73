//! Bridge Module - Async boundary to the dictation daemon
//!
//! Every operation is a one-shot snapshot: the call returns immediately
//! and the eventual result arrives as a [`Completion`] on a
//! single-consumer queue that the router drains once per tick. A result
//! is never delivered synchronously within the issuing call, so callers
//! treat the data as eventually consistent.
//!
//! Failures are values, not unwinds: a subprocess error or malformed
//! reply travels through the queue as a [`BridgeError`] and surfaces as
//! a status message at the drain site.
//!
//! # Example
//!
//! ```ignore
//! let (tx, rx) = completion_channel();
//! let bridge = DaemonBridge::new("murmurd", tx);
//! bridge.list_audio_devices();
//! // ...next tick:
//! while let Ok(completion) = rx.try_recv() {
//!     router.apply(completion);
//! }
//! ```

use std::process::Command;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use thiserror::Error;
use tracing::warn;

// =============================================================================
// TYPES
// =============================================================================

/// Failure at the daemon boundary. Recovered locally - converted to a
/// status message plus a safe fallback, never propagated as a panic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("failed to reach daemon: {0}")]
    Unreachable(String),
    #[error("daemon reported: {0}")]
    Daemon(String),
    #[error("malformed daemon reply: {0}")]
    Malformed(String),
}

/// An enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: String,
    pub name: String,
}

/// A recognition model known to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub installed: bool,
}

/// One-shot daemon status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonStatus {
    pub running: bool,
    pub model: Option<String>,
}

/// A finished bridge operation, delivered through the completion queue.
#[derive(Debug)]
pub enum Completion {
    AudioDevices(Result<Vec<AudioDevice>, BridgeError>),
    Models(Result<Vec<ModelInfo>, BridgeError>),
    ModelDownloaded {
        id: String,
        result: Result<(), BridgeError>,
    },
    DaemonStatus(Result<DaemonStatus, BridgeError>),
}

/// The single-consumer completion queue: bridges hold the sender, the
/// router drains the receiver once per tick.
pub fn completion_channel() -> (Sender<Completion>, Receiver<Completion>) {
    channel()
}

// =============================================================================
// BRIDGE TRAIT
// =============================================================================

/// Fire-and-forget operations against the daemon. Implementations must
/// deliver results through the completion queue only.
pub trait ProcessBridge {
    fn list_audio_devices(&self);
    fn list_models(&self);
    fn download_model(&self, id: &str);
    fn daemon_status(&self);
}

// =============================================================================
// SUBPROCESS IMPLEMENTATION
// =============================================================================

/// Bridge that shells out to the daemon CLI and parses its line-oriented
/// replies. Each operation runs on a short-lived worker thread; all
/// state mutation stays on the event-loop side of the queue.
pub struct DaemonBridge {
    program: String,
    tx: Sender<Completion>,
}

impl DaemonBridge {
    pub fn new(program: impl Into<String>, tx: Sender<Completion>) -> Self {
        Self {
            program: program.into(),
            tx,
        }
    }

    fn spawn<F>(&self, args: &[&str], build: F)
    where
        F: FnOnce(Result<String, BridgeError>) -> Completion + Send + 'static,
    {
        let program = self.program.clone();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = match Command::new(&program).args(&args).output() {
                Err(err) => Err(BridgeError::Unreachable(err.to_string())),
                Ok(output) if !output.status.success() => Err(BridgeError::Daemon(
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                )),
                Ok(output) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            };
            if let Err(ref err) = result {
                warn!(%err, "bridge operation failed");
            }
            // Receiver gone means shutdown mid-flight; nothing to do
            let _ = tx.send(build(result));
        });
    }
}

impl ProcessBridge for DaemonBridge {
    fn list_audio_devices(&self) {
        self.spawn(&["devices", "--list"], |raw| {
            Completion::AudioDevices(raw.and_then(|s| parse_devices(&s)))
        });
    }

    fn list_models(&self) {
        self.spawn(&["models", "--list"], |raw| {
            Completion::Models(raw.and_then(|s| parse_models(&s)))
        });
    }

    fn download_model(&self, id: &str) {
        let id = id.to_string();
        let arg = id.clone();
        self.spawn(&["models", "--download", arg.as_str()], move |raw| {
            Completion::ModelDownloaded {
                id,
                result: raw.map(|_| ()),
            }
        });
    }

    fn daemon_status(&self) {
        self.spawn(&["status"], |raw| {
            Completion::DaemonStatus(raw.and_then(|s| parse_status(&s)))
        });
    }
}

// =============================================================================
// REPLY PARSING
// =============================================================================

/// One device per line: `id<TAB>name`.
fn parse_devices(raw: &str) -> Result<Vec<AudioDevice>, BridgeError> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (id, name) = line
                .split_once('\t')
                .ok_or_else(|| BridgeError::Malformed(line.to_string()))?;
            Ok(AudioDevice {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// One model per line: `id<TAB>name<TAB>installed|available`.
fn parse_models(raw: &str) -> Result<Vec<ModelInfo>, BridgeError> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.split('\t');
            let (Some(id), Some(name), Some(state)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(BridgeError::Malformed(line.to_string()));
            };
            let installed = match state {
                "installed" => true,
                "available" => false,
                other => return Err(BridgeError::Malformed(other.to_string())),
            };
            Ok(ModelInfo {
                id: id.to_string(),
                name: name.to_string(),
                installed,
            })
        })
        .collect()
}

/// First line: `running` or `stopped`, optionally `running<TAB>model`.
fn parse_status(raw: &str) -> Result<DaemonStatus, BridgeError> {
    let line = raw
        .lines()
        .next()
        .ok_or_else(|| BridgeError::Malformed("empty status reply".to_string()))?;
    let mut parts = line.split('\t');
    let running = match parts.next() {
        Some("running") => true,
        Some("stopped") => false,
        other => return Err(BridgeError::Malformed(format!("{:?}", other))),
    };
    Ok(DaemonStatus {
        running,
        model: parts.next().map(str::to_string),
    })
}

// =============================================================================
// SCRIPTED DOUBLE
// =============================================================================

/// Bridge double with canned results. Results still travel through the
/// completion queue, so delivery order and asynchrony match production.
pub struct ScriptedBridge {
    tx: Sender<Completion>,
    pub devices: Vec<AudioDevice>,
    pub models: Vec<ModelInfo>,
    pub status: DaemonStatus,
}

impl ScriptedBridge {
    pub fn new(tx: Sender<Completion>) -> Self {
        Self {
            tx,
            devices: Vec::new(),
            models: Vec::new(),
            status: DaemonStatus {
                running: false,
                model: None,
            },
        }
    }
}

impl ProcessBridge for ScriptedBridge {
    fn list_audio_devices(&self) {
        let _ = self
            .tx
            .send(Completion::AudioDevices(Ok(self.devices.clone())));
    }

    fn list_models(&self) {
        let _ = self.tx.send(Completion::Models(Ok(self.models.clone())));
    }

    fn download_model(&self, id: &str) {
        let _ = self.tx.send(Completion::ModelDownloaded {
            id: id.to_string(),
            result: Ok(()),
        });
    }

    fn daemon_status(&self) {
        let _ = self
            .tx
            .send(Completion::DaemonStatus(Ok(self.status.clone())));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_devices() {
        let raw = "default\tSystem default\nusb-0\tUSB Microphone\n";
        let devices = parse_devices(raw).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "default");
        assert_eq!(devices[1].name, "USB Microphone");
    }

    #[test]
    fn test_parse_devices_malformed() {
        let err = parse_devices("no-tab-here").unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
    }

    #[test]
    fn test_parse_models() {
        let raw = "base.en\tBase (English)\tinstalled\nlarge\tLarge\tavailable\n";
        let models = parse_models(raw).unwrap();
        assert!(models[0].installed);
        assert!(!models[1].installed);
    }

    #[test]
    fn test_parse_models_unknown_state() {
        let err = parse_models("base\tBase\tweird").unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            parse_status("running\tbase.en\n").unwrap(),
            DaemonStatus {
                running: true,
                model: Some("base.en".to_string())
            }
        );
        assert_eq!(
            parse_status("stopped\n").unwrap(),
            DaemonStatus {
                running: false,
                model: None
            }
        );
    }

    #[test]
    fn test_scripted_bridge_delivers_through_queue() {
        let (tx, rx) = completion_channel();
        let mut bridge = ScriptedBridge::new(tx);
        bridge.devices = vec![AudioDevice {
            id: "usb-0".to_string(),
            name: "USB Microphone".to_string(),
        }];

        bridge.list_audio_devices();

        // Nothing was applied synchronously; the result sits in the
        // queue until the drain
        match rx.try_recv().unwrap() {
            Completion::AudioDevices(Ok(devices)) => assert_eq!(devices.len(), 1),
            other => panic!("unexpected completion: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_daemon_yields_unreachable() {
        let (tx, rx) = completion_channel();
        let bridge = DaemonBridge::new("definitely-not-a-real-daemon-binary", tx);

        bridge.daemon_status();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Completion::DaemonStatus(Err(BridgeError::Unreachable(_))) => {}
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn test_download_completion_carries_id() {
        let (tx, rx) = completion_channel();
        let bridge = ScriptedBridge::new(tx);

        bridge.download_model("large-v3");
        match rx.try_recv().unwrap() {
            Completion::ModelDownloaded { id, result: Ok(()) } => assert_eq!(id, "large-v3"),
            other => panic!("unexpected completion: {:?}", other),
        }
    }
}
