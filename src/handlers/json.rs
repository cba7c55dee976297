//! JSON-lines handler for structured logging
//!
//! Each record becomes one compact JSON object followed by a newline:
//!
//! ```text
//! {"time":"2025/11/08 12:34:56","level":"INFO","msg":"json test","attrs":{"age":42,"key":"val"}}
//! ```
//!
//! `prefix` is present only when non-empty, `attrs` only when there is at
//! least one attribute, and `source` only when a call site was captured.
//! serde_json never HTML-escapes, so `<`, `>` and `&` are written as-is.

use crate::core::{Handler, Record, Result};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::io::{self, Write};

/// Wire shape of one line
#[derive(Serialize)]
struct JsonLine<'a> {
    time: String,
    level: Cow<'static, str>,
    msg: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    prefix: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    attrs: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl<'a> JsonLine<'a> {
    fn from_record(record: &'a Record) -> Self {
        let attrs = record
            .attrs
            .iter()
            .map(|attr| (attr.key.clone(), attr.value.to_json_value()))
            .collect();

        Self {
            time: record.timestamp(),
            level: record.level.as_str(),
            msg: &record.message,
            prefix: &record.prefix,
            attrs,
            source: record.source_location(),
        }
    }
}

/// JSON-lines handler
///
/// The encode-and-write step holds the handler's own lock, so one instance
/// can be shared by several loggers without interleaving partial lines.
pub struct JsonHandler {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonHandler {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Encode a record to its line, without the trailing newline
    pub fn encode(record: &Record) -> Result<String> {
        Ok(serde_json::to_string(&JsonLine::from_record(record))?)
    }
}

impl Handler for JsonHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        let line = JsonLine::from_record(record);
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attr, Flags, Level};
    use crate::testing::CaptureBuffer;
    use std::panic::Location;

    #[test]
    fn test_json_minimal_fields() {
        let record = Record::new(Level::INFO, "m");
        let parsed: Value = serde_json::from_str(&JsonHandler::encode(&record).unwrap()).unwrap();
        assert_eq!(parsed["time"], "");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["msg"], "m");
        assert!(parsed.get("prefix").is_none());
        assert!(parsed.get("attrs").is_none());
        assert!(parsed.get("source").is_none());
    }

    #[test]
    fn test_json_prefix_and_attrs() {
        let buf = CaptureBuffer::new();
        let handler = JsonHandler::new(buf.clone());
        let record = Record::new(Level::INFO, "json test")
            .with_prefix("p")
            .with_flags(Flags::STD)
            .with_attrs(vec![Attr::new("key", "val"), Attr::new("age", 42)]);
        handler.handle(&record).unwrap();

        let out = buf.contents();
        assert!(out.contains("\"prefix\":\"p\""));
        assert_eq!(out.lines().count(), 1);

        let parsed: Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(parsed["attrs"], serde_json::json!({"key": "val", "age": 42}));
        assert_eq!(parsed["time"].as_str().unwrap().len(), 19);
    }

    #[test]
    fn test_json_source_and_no_html_escaping() {
        let record = Record::new(Level::ERROR, "<b>&</b>")
            .with_flags(Flags::LONG_FILE)
            .with_source(Location::caller());
        let line = JsonHandler::encode(&record).unwrap();
        assert!(line.contains("\"msg\":\"<b>&</b>\""), "{}", line);

        let parsed: Value = serde_json::from_str(&line).unwrap();
        let source = parsed["source"].as_str().unwrap();
        assert!(source.contains("json.rs:"), "{}", source);
    }
}
