//! Append-only JSONL journal of a replay run, for post-run inspection.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// Waveform loaded and driver ready; ticking is about to begin.
    RunStarted,
    /// A stop was requested, from the control marker or an interrupt.
    StopRequested,
    /// The loop exited and the driver was released.
    RunCompleted,
    /// The run aborted before or during playback.
    RunFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Wall-clock Unix timestamp in microseconds.
    pub unix_us: u64,
    pub kind: RunEventKind,
    pub details: serde_json::Value,
}

/// Thread-safe JSONL writer; the monitor thread and the interrupt handler
/// log through the same instance as the main thread.
pub struct RunLogger {
    writer: Mutex<BufWriter<File>>,
}

impl RunLogger {
    pub fn new(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn event(&self, kind: RunEventKind, details: serde_json::Value) -> std::io::Result<()> {
        let entry = RunEvent {
            unix_us: unix_us(),
            kind,
            details,
        };
        let mut writer = self.writer.lock().unwrap();
        serde_json::to_writer(&mut *writer, &entry)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

fn unix_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_parseable_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let logger = RunLogger::new(&path).unwrap();
        logger
            .event(RunEventKind::RunStarted, json!({"grid_points": 4}))
            .unwrap();
        logger
            .event(RunEventKind::RunCompleted, json!({"ticks_executed": 4}))
            .unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let events: Vec<RunEvent> = body
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, RunEventKind::RunStarted));
        assert_eq!(events[0].details["grid_points"], 4);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/journal.jsonl");
        let logger = RunLogger::new(&path).unwrap();
        logger
            .event(RunEventKind::StopRequested, json!({"source": "interrupt"}))
            .unwrap();
        assert!(path.exists());
    }
}
