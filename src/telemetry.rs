//! Fire-and-forget gameplay events.
//!
//! Sinks are best-effort: a failing sink logs and carries on, gameplay never waits on it.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    StartGame,
    GameOver { score: u32 },
    NewHighScore { score: u32 },
    ChangeSetting { setting_id: String, setting_value: String },
    ClimbLadder { to_floor: u32 },
}

impl Event {
    pub fn change_setting(id: &str, value: impl ToString) -> Self {
        Self::ChangeSetting {
            setting_id: id.to_string(),
            setting_value: value.to_string(),
        }
    }
}

pub trait Telemetry {
    fn track(&self, event: &Event);
}

/// Writes events to the log under the `telemetry` target.
#[derive(Debug, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn track(&self, event: &Event) {
        log::info!(target: "telemetry", "{:?}", event);
    }
}

/// Appends one JSON object per line.
#[derive(Debug)]
pub struct JsonlTelemetry {
    file: Mutex<File>,
}

impl JsonlTelemetry {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl Telemetry for JsonlTelemetry {
    fn track(&self, event: &Event) {
        let line = match serde_json::to_string(event) {
            Ok(l) => l,
            Err(e) => {
                log::debug!("telemetry encode failed: {}", e);
                return;
            }
        };
        let Ok(mut f) = self.file.lock() else {
            return;
        };
        if let Err(e) = writeln!(f, "{}", line) {
            log::debug!("telemetry write failed: {}", e);
        }
    }
}

/// Fan-out to every configured sink.
#[derive(Default)]
pub struct Tracker {
    sinks: Vec<Box<dyn Telemetry>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl Telemetry + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn track(&self, event: Event) {
        for sink in &self.sinks {
            sink.track(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&Event::GameOver { score: 9 }).unwrap();
        assert_eq!(json, r#"{"action":"game_over","score":9}"#);
        let json = serde_json::to_string(&Event::change_setting("game_speed", "fast")).unwrap();
        assert_eq!(
            json,
            r#"{"action":"change_setting","setting_id":"game_speed","setting_value":"fast"}"#
        );
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let tracker = Tracker::new()
            .with_sink(LogTelemetry)
            .with_sink(JsonlTelemetry::open(&path).unwrap());
        tracker.track(Event::StartGame);
        tracker.track(Event::ClimbLadder { to_floor: 2 });
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"action":"start_game"}"#);
        assert_eq!(lines[1], r#"{"action":"climb_ladder","to_floor":2}"#);
    }

    #[test]
    fn test_empty_tracker_is_fine() {
        Tracker::new().track(Event::NewHighScore { score: 1 });
    }
}
