//! Log record structure

use super::attr::Attr;
use super::flags::Flags;
use super::level::Level;
use super::timestamp::format_timestamp;
use chrono::{DateTime, FixedOffset, Local};
use std::panic::Location;
use std::path::Path;

/// One log event as seen by handlers
///
/// Records are built fresh for each call and handed to every matching
/// handler by shared reference; handlers never mutate them.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<FixedOffset>,
    pub level: Level,
    pub message: String,
    pub prefix: String,
    pub attrs: Vec<Attr>,
    /// Call site, captured only when a file flag is set
    pub source: Option<&'static Location<'static>>,
    pub flags: Flags,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Local::now().fixed_offset(),
            level,
            message: message.into(),
            prefix: String::new(),
            attrs: Vec::new(),
            source: None,
            flags: Flags::empty(),
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: Vec<Attr>) -> Self {
        self.attrs = attrs;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: &'static Location<'static>) -> Self {
        self.source = Some(source);
        self
    }

    /// Timestamp rendered per this record's flags (may be empty)
    #[must_use]
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.time, self.flags)
    }

    /// `file:line` of the call site, if one was captured
    ///
    /// `SHORT_FILE` keeps only the final path element.
    #[must_use]
    pub fn source_location(&self) -> Option<String> {
        let location = self.source?;
        let file = location.file();
        if file.is_empty() {
            return None;
        }
        let file = if self.flags.contains(Flags::SHORT_FILE) {
            Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file)
        } else {
            file
        };
        Some(format!("{}:{}", file, location.line()))
    }
}
