//! JSONL transcript of remote results.
//!
//! Every [`ConversationEvent`] becomes one JSON line carrying the event's
//! payload plus `type`, `seq` and `timestamp`. The file is opened in append
//! mode so several runs can share one transcript.

use serde_json::{Map, Value};
use shoplens_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// JSONL conversation logger that appends one JSON object per line.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    seq: AtomicU64,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`, creating parent directories.
    ///
    /// Returns `None` and logs a warning when the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
                seq: AtomicU64::new(0),
            }),
            Err(e) => {
                warn!(
                    "Conversation log disabled, cannot open {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn open(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, event: ConversationEvent) -> Value {
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::from(event.event_type));
        map.insert(
            "seq".to_string(),
            Value::from(self.seq.fetch_add(1, Ordering::Relaxed)),
        );
        map.insert(
            "timestamp".to_string(),
            Value::from(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        Value::Object(map)
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&self.record(event)) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let written = writeln!(writer, "{}", line).and_then(|()| writer.flush());
            if let Err(e) = written {
                warn!("Failed to write conversation log {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoplens_domain::{
        AnalysisOutcome, AnalysisReport, BoundingBox, DetectedObject, Identification,
    };
    use std::io::Read;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.conversation.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::detections(&[DetectedObject::new(
            "Mug",
            Some(BoundingBox::new(0.0, 0.0, 500.0, 500.0)),
            0.9,
        )]));
        logger.log(ConversationEvent::identification(
            0,
            &Identification::new("Ceramic Mug XL", Some(0.95)),
            false,
        ));
        logger.log(ConversationEvent::deep_analysis(
            "Ceramic Mug XL",
            &AnalysisReport {
                summary: Some("Great mug".to_string()),
                outcome: AnalysisOutcome::Recommended,
                ..Default::default()
            },
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.get("type").is_some());
            assert!(record.get("timestamp").is_some());
        }

        assert_eq!(records[0]["type"], "detections");
        assert_eq!(records[2]["seq"], 2);
        assert_eq!(records[0]["count"], 1);
        assert_eq!(records[0]["objects"][0]["name"], "Mug");
        assert_eq!(records[1]["type"], "identification");
        assert_eq!(records[1]["product_name"], "Ceramic Mug XL");
        assert_eq!(records[2]["type"], "deep_analysis");
        assert_eq!(records[2]["outcome"], "recommended");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.conversation.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            "note",
            serde_json::json!("just a string"),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just a string");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.jsonl");
        for text in ["first", "second"] {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::chat_response(false, None, text));
        }
        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["text"], "second");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/chat.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());
        assert!(path.exists());
    }
}
