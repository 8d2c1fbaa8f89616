use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value, json};

/// JSONL diagnostic sink: one record per line plus per-key counters.
#[derive(Debug, Clone)]
pub struct DebugLogger {
    path: PathBuf,
    inner: Arc<Mutex<DebugState>>,
}

#[derive(Debug)]
struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `fields` as one record tagged with `"type": kind` and count it.
    pub fn log_event(&self, kind: &str, fields: Value) {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::String(kind.to_string()));
        if let Value::Object(fields) = fields {
            record.extend(fields);
        }
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{}", Value::Object(record));
            let entry = state.counters.entry(kind.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.counters.get(key).copied())
            .unwrap_or(0)
    }

    /// Write a `debug.summary` record with the counters and reset them.
    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts: Map<String, Value> = counters
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect();
            let record = json!({
                "type": "debug.summary",
                "context": context,
                "counts": counts,
            });
            let _ = writeln!(state.writer, "{record}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vectorstyle-{name}-{}.jsonl", std::process::id()))
    }

    fn read_records(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .expect("read log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn events_are_tagged_and_counted() {
        let path = temp_log("events");
        let logger = DebugLogger::new(&path).expect("logger");
        logger.log_event("path.parse", json!({"tokens": 3}));
        logger.log_event("path.parse", json!({"tokens": 5}));
        logger.log_event("css.parse_failed", json!({"kind": "NoSelectors"}));
        assert_eq!(logger.counter("path.parse"), 2);
        logger.flush();

        let records = read_records(&path);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["type"], "path.parse");
        assert_eq!(records[1]["tokens"], 5);
        assert_eq!(records[2]["kind"], "NoSelectors");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn summary_reports_sorted_counts_and_resets() {
        let path = temp_log("summary");
        let logger = DebugLogger::new(&path).expect("logger");
        logger.increment("z.count", 2);
        logger.increment("a.count", 1);
        logger.emit_summary("batch");
        logger.flush();
        assert_eq!(logger.counter("z.count"), 0);

        let records = read_records(&path);
        let summary = records.last().expect("summary");
        assert_eq!(summary["type"], "debug.summary");
        assert_eq!(summary["context"], "batch");
        assert_eq!(summary["counts"]["z.count"], 2);
        let keys: Vec<&String> = summary["counts"]
            .as_object()
            .expect("counts")
            .keys()
            .collect();
        assert_eq!(keys, vec!["a.count", "z.count"]);
        let _ = std::fs::remove_file(&path);
    }
}
