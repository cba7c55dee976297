//! Severity level definitions
//!
//! `Level` is an integer-backed severity. Named levels leave gaps between
//! them so new points can be inserted later; any other integer is still a
//! valid level and renders as `LEVEL(<n>)`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    /// Captures everything when used as an output threshold
    pub const ALL: Level = Level(-1000);
    /// Disables an output when used as its threshold
    pub const OFF: Level = Level(1000);

    pub const TRACE: Level = Level(-8);
    pub const VERBOSE: Level = Level(-6);
    pub const DEBUG: Level = Level(-4);
    pub const DETAIL: Level = Level(-2);

    pub const INFO: Level = Level(0);
    pub const NOTICE: Level = Level(2);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);
    pub const CRITICAL: Level = Level(10);
    pub const ALERT: Level = Level(12);
    pub const FATAL: Level = Level(14);
    pub const PANIC: Level = Level(16);

    /// Every named level, lowest first
    pub const NAMED: [Level; 14] = [
        Level::ALL,
        Level::TRACE,
        Level::VERBOSE,
        Level::DEBUG,
        Level::DETAIL,
        Level::INFO,
        Level::NOTICE,
        Level::WARN,
        Level::ERROR,
        Level::CRITICAL,
        Level::ALERT,
        Level::FATAL,
        Level::PANIC,
        Level::OFF,
    ];

    #[must_use]
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Trimmed label for a named level, `None` for anything else
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            -1000 => Some("ALL"),
            1000 => Some("OFF"),
            -8 => Some("TRACE"),
            -6 => Some("VERBOSE"),
            -4 => Some("DEBUG"),
            -2 => Some("DETAIL"),
            0 => Some("INFO"),
            2 => Some("NOTICE"),
            4 => Some("WARN"),
            8 => Some("ERROR"),
            10 => Some("CRITICAL"),
            12 => Some("ALERT"),
            14 => Some("FATAL"),
            16 => Some("PANIC"),
            _ => None,
        }
    }

    /// Trimmed label, falling back to `LEVEL(<n>)` for unnamed values
    ///
    /// This is the form used by the JSON handler.
    #[must_use]
    pub fn as_str(self) -> Cow<'static, str> {
        match self.name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("LEVEL({})", self.0)),
        }
    }

    /// Fixed-width (8 column) label used by the text handlers
    #[must_use]
    pub fn label(self) -> Cow<'static, str> {
        match self.name() {
            Some(name) => Cow::Owned(format!("{:<8}", name)),
            None => Cow::Owned(format!("LEVEL({})", self.0)),
        }
    }

    /// Whether a record at this level passes an output with threshold `min`
    #[inline]
    #[must_use]
    pub fn meets(self, min: Level) -> bool {
        self >= min
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_uppercase();
        let named = match upper.as_str() {
            "ALL" => Some(Level::ALL),
            "OFF" => Some(Level::OFF),
            "TRACE" => Some(Level::TRACE),
            "VERBOSE" => Some(Level::VERBOSE),
            "DEBUG" => Some(Level::DEBUG),
            "DETAIL" => Some(Level::DETAIL),
            "INFO" => Some(Level::INFO),
            "NOTICE" => Some(Level::NOTICE),
            "WARN" | "WARNING" => Some(Level::WARN),
            "ERROR" => Some(Level::ERROR),
            "CRITICAL" => Some(Level::CRITICAL),
            "ALERT" => Some(Level::ALERT),
            "FATAL" => Some(Level::FATAL),
            "PANIC" => Some(Level::PANIC),
            _ => None,
        };
        if let Some(level) = named {
            return Ok(level);
        }

        let numeric = upper
            .strip_prefix("LEVEL(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(&upper);
        numeric
            .parse::<i32>()
            .map(Level)
            .map_err(|_| format!("Invalid log level: '{}'", s))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::ALL.to_string(), "ALL     ");
        assert_eq!(Level::OFF.to_string(), "OFF     ");
        assert_eq!(Level::TRACE.to_string(), "TRACE   ");
        assert_eq!(Level::VERBOSE.to_string(), "VERBOSE ");
        assert_eq!(Level::DEBUG.to_string(), "DEBUG   ");
        assert_eq!(Level::DETAIL.to_string(), "DETAIL  ");
        assert_eq!(Level::INFO.to_string(), "INFO    ");
        assert_eq!(Level::NOTICE.to_string(), "NOTICE  ");
        assert_eq!(Level::WARN.to_string(), "WARN    ");
        assert_eq!(Level::ERROR.to_string(), "ERROR   ");
        assert_eq!(Level::CRITICAL.to_string(), "CRITICAL");
        assert_eq!(Level::ALERT.to_string(), "ALERT   ");
        assert_eq!(Level::FATAL.to_string(), "FATAL   ");
        assert_eq!(Level::PANIC.to_string(), "PANIC   ");
        assert_eq!(Level::new(123).to_string(), "LEVEL(123)");
    }

    #[test]
    fn test_level_ordering() {
        for pair in Level::NAMED.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should sort before {:?}", pair[0], pair[1]);
        }
        assert!(Level::WARN.meets(Level::WARN));
        assert!(Level::ERROR.meets(Level::WARN));
        assert!(!Level::INFO.meets(Level::WARN));
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("info".parse::<Level>(), Ok(Level::INFO));
        assert_eq!("Warning".parse::<Level>(), Ok(Level::WARN));
        assert_eq!("LEVEL(3)".parse::<Level>(), Ok(Level::new(3)));
        assert_eq!("-4".parse::<Level>(), Ok(Level::DEBUG));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&Level::CRITICAL).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let back: Level = serde_json::from_str("\"notice\"").unwrap();
        assert_eq!(back, Level::NOTICE);
    }
}
