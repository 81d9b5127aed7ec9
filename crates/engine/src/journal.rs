//! Append-only run journal: bounded in-memory ring, flat log file, live
//! fan-out to observers.
//!
//! The journal is product state — the control panel's log pane reads it — and
//! is distinct from `tracing`, which stays the operator-telemetry channel.
//! Entries preserve emission order for every subscriber; a lagging or
//! disconnected subscriber never affects the sink or its peers.

use std::{
    collections::VecDeque,
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::{Mutex, RwLock},
};

use {
    serde::{Deserialize, Serialize},
    tokio::sync::broadcast,
    tracing::warn,
};

// ── Entry ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// One timestamped journal line. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub message: String,
    /// Serialized as `type` for the control panel.
    #[serde(rename = "type")]
    pub severity: Severity,
}

// ── Journal ─────────────────────────────────────────────────────────────────

const DEFAULT_CAPACITY: usize = 100;
const BROADCAST_CAPACITY: usize = 256;

pub struct Journal {
    /// Most recent entries, oldest dropped past capacity.
    ring: RwLock<VecDeque<JournalEntry>>,
    capacity: usize,
    tx: broadcast::Sender<JournalEntry>,
    /// Append-only file writer (set after `enable_persistence`).
    writer: Mutex<Option<File>>,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            ring: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            tx,
            writer: Mutex::new(None),
        }
    }

    /// Enable the durable log file. New entries are appended as
    /// `[timestamp] [SEVERITY] message` lines; nothing is read back at
    /// startup.
    pub fn enable_persistence(&self, path: PathBuf) {
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(error = %e, "cannot create journal directory");
            return;
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                if let Ok(mut writer) = self.writer.lock() {
                    *writer = Some(file);
                }
            },
            Err(e) => warn!(path = %path.display(), error = %e, "cannot open journal file"),
        }
    }

    pub fn emit(&self, severity: Severity, message: impl Into<String>) {
        let entry = JournalEntry {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            message: message.into(),
            severity,
        };

        // Best-effort fan-out — receivers may be behind or gone.
        let _ = self.tx.send(entry.clone());

        if let Ok(mut writer) = self.writer.lock()
            && let Some(ref mut file) = *writer
        {
            let _ = writeln!(
                file,
                "[{}] [{}] {}",
                entry.timestamp,
                entry.severity.label(),
                entry.message
            );
        }

        if let Ok(mut ring) = self.ring.write() {
            if ring.len() >= self.capacity {
                ring.pop_front();
            }
            ring.push_back(entry);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Severity::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message);
    }

    /// The ring contents, oldest first.
    pub fn snapshot(&self) -> Vec<JournalEntry> {
        self.ring
            .read()
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JournalEntry> {
        self.tx.subscribe()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_keeps_most_recent_in_order() {
        let journal = Journal::new(100);
        for i in 0..150 {
            journal.info(format!("msg{i}"));
        }
        let entries = journal.snapshot();
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].message, "msg50");
        assert_eq!(entries[99].message, "msg149");
    }

    #[test]
    fn subscriber_sees_emission_order() {
        let journal = Journal::default();
        let mut rx = journal.subscribe();

        journal.info("first");
        journal.error("second");

        assert_eq!(rx.try_recv().unwrap().message, "first");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.message, "second");
        assert_eq!(second.severity, Severity::Error);
    }

    #[test]
    fn dropped_subscriber_does_not_affect_the_sink() {
        let journal = Journal::default();
        let rx = journal.subscribe();
        drop(rx);
        journal.info("still fine");
        assert_eq!(journal.snapshot().len(), 1);
    }

    #[test]
    fn severity_serializes_as_type_field() {
        let journal = Journal::default();
        journal.success("done");
        let json = serde_json::to_value(&journal.snapshot()[0]).unwrap();
        assert_eq!(json["type"], "success");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn persistence_appends_human_readable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let journal = Journal::default();
        journal.enable_persistence(path.clone());
        journal.info("hello");
        journal.warning("careful");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO] hello"));
        assert!(lines[1].contains("[WARNING] careful"));
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        {
            let journal = Journal::default();
            journal.enable_persistence(path.clone());
            journal.info("one");
        }
        {
            let journal = Journal::default();
            journal.enable_persistence(path.clone());
            journal.info("two");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
