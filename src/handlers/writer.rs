//! Plain text writer handler

use crate::core::{Handler, Record, Result};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Writes one text line per record:
/// `[timestamp ]LEVEL   [ [prefix]][ message][ key=value...]`
pub struct WriterHandler {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterHandler {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// A handler that accepts and drops everything
    pub fn discard() -> Self {
        Self::new(io::sink())
    }
}

impl Handler for WriterHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        let line = format_text(record);
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Render the full text line, newline included
pub(crate) fn format_text(record: &Record) -> String {
    let mut out = String::with_capacity(64 + record.message.len());

    let ts = record.timestamp();
    if !ts.is_empty() {
        out.push_str(&ts);
        out.push(' ');
    }
    out.push_str(&record.level.label());

    if !record.prefix.is_empty() {
        out.push_str(" [");
        out.push_str(&record.prefix);
        out.push(']');
    }
    if !record.message.is_empty() {
        out.push(' ');
        out.push_str(&record.message);
    }
    for attr in &record.attrs {
        let _ = write!(out, " {}={}", attr.key, attr.value);
    }

    out.push('\n');
    out
}
