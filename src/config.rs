//! Declarative logger configuration
//!
//! ```
//! use multilog::config::LoggerConfig;
//! use multilog::files::FileRegistry;
//!
//! let config = LoggerConfig::from_json_str(r#"{
//!     "prefix": "api",
//!     "flags": "date|time|utc",
//!     "outputs": [
//!         { "kind": "text", "target": "discard", "min_level": "info" },
//!         { "kind": "json", "target": "discard", "min_level": "error" }
//!     ]
//! }"#).unwrap();
//!
//! let logger = config.build(&FileRegistry::new()).unwrap();
//! assert_eq!(logger.output_count(), 2);
//! assert_eq!(logger.prefix(), "api");
//! ```

use crate::core::{Flags, Handler, Level, Logger, LoggerError, Result};
use crate::files::FileRegistry;
use crate::handlers::{JsonHandler, WriterHandler};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

fn default_flags() -> String {
    "date|time".to_string()
}

fn default_kind() -> String {
    "text".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_min_level() -> String {
    "debug".to_string()
}

fn default_color_mode() -> String {
    "on".to_string()
}

/// Whole-logger configuration
///
/// With no `outputs` the logger gets the usual stderr text output at DEBUG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub prefix: String,
    /// `|` or `,` separated flag names, e.g. `"date|time|microseconds"`
    pub flags: String,
    pub outputs: Vec<OutputConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            flags: default_flags(),
            outputs: Vec::new(),
        }
    }
}

/// One output binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `text`, `json` or `colored`
    pub kind: String,
    /// `stderr`, `stdout`, `discard`, or a file path
    pub target: String,
    pub min_level: String,
    /// File targets only: append instead of truncating
    pub append: bool,
    /// `colored` only: `on`, `off` or `auto`
    pub color_mode: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            target: default_target(),
            min_level: default_min_level(),
            append: false,
            color_mode: default_color_mode(),
        }
    }
}

enum Target {
    Stderr,
    Stdout,
    Discard,
    File(String),
}

impl Target {
    fn parse(target: &str) -> Result<Target> {
        match target.trim() {
            "" => Err(LoggerError::config("output", "empty target")),
            "stderr" => Ok(Target::Stderr),
            "stdout" => Ok(Target::Stdout),
            "discard" => Ok(Target::Discard),
            path => Ok(Target::File(path.to_string())),
        }
    }

    fn open(&self, append: bool, registry: &FileRegistry) -> Result<Box<dyn Write + Send>> {
        Ok(match self {
            Target::Stderr => Box::new(io::stderr()),
            Target::Stdout => Box::new(io::stdout()),
            Target::Discard => Box::new(io::sink()),
            Target::File(path) if append => Box::new(registry.open_append(path)?),
            Target::File(path) => Box::new(registry.open_truncate(path)?),
        })
    }
}

impl LoggerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a logger; file targets are opened through `registry`
    pub fn build(&self, registry: &FileRegistry) -> Result<Logger> {
        let flags: Flags = self
            .flags
            .parse()
            .map_err(|e: String| LoggerError::config("flags", e))?;

        let mut builder = Logger::builder().prefix(self.prefix.clone()).flags(flags);
        if self.outputs.is_empty() {
            return Ok(builder.build());
        }

        builder = builder.no_default_output();
        for output in &self.outputs {
            let (min_level, handler) = output.build(registry)?;
            builder = builder.output(min_level, handler);
        }
        Ok(builder.build())
    }
}

impl OutputConfig {
    fn build(&self, registry: &FileRegistry) -> Result<(Level, Box<dyn Handler>)> {
        let min_level: Level = self
            .min_level
            .parse()
            .map_err(|e: String| LoggerError::config("min_level", e))?;
        let target = Target::parse(&self.target)?;

        let handler: Box<dyn Handler> = match self.kind.trim().to_ascii_lowercase().as_str() {
            "text" => Box::new(WriterHandler::new(target.open(self.append, registry)?)),
            "json" => Box::new(JsonHandler::new(target.open(self.append, registry)?)),
            #[cfg(feature = "console")]
            "colored" => Box::new(self.colored(&target, registry)?),
            other => {
                return Err(LoggerError::config(
                    "output",
                    format!("unknown kind '{}'", other),
                ))
            }
        };
        Ok((min_level, handler))
    }

    #[cfg(feature = "console")]
    fn colored(
        &self,
        target: &Target,
        registry: &FileRegistry,
    ) -> Result<crate::handlers::ColoredHandler> {
        use crate::handlers::{ColorMode, ColorOptions, ColoredHandler};

        let mode = match self.color_mode.trim().to_ascii_lowercase().as_str() {
            "on" => ColorMode::On,
            "off" => ColorMode::Off,
            "auto" => ColorMode::Auto,
            other => {
                return Err(LoggerError::config(
                    "color_mode",
                    format!("unknown mode '{}'", other),
                ))
            }
        };
        let opts = ColorOptions::with_mode(mode);
        Ok(match target {
            Target::Stderr => ColoredHandler::stderr(opts),
            Target::Stdout => ColoredHandler::stdout(opts),
            _ => ColoredHandler::new(target.open(self.append, registry)?, opts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());

        let logger = config.build(&FileRegistry::new()).unwrap();
        assert_eq!(logger.output_count(), 1);
        assert_eq!(logger.flags(), Flags::STD);
    }

    #[test]
    fn test_file_targets() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested/app.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "existing\n").unwrap();

        let config = LoggerConfig {
            flags: String::new(),
            outputs: vec![OutputConfig {
                target: path.display().to_string(),
                min_level: "warn".into(),
                append: true,
                ..OutputConfig::default()
            }],
            ..LoggerConfig::default()
        };
        let registry = FileRegistry::new();
        let logger = config.build(&registry).unwrap();
        assert_eq!(registry.len(), 1);

        logger.info("skipped");
        logger.warn("kept");
        registry.close_all();
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nWARN     kept\n");
    }

    #[test]
    fn test_invalid_values() {
        let registry = FileRegistry::new();
        for json in [
            r#"{"flags": "date|bogus"}"#,
            r#"{"outputs": [{"kind": "xml"}]}"#,
            r#"{"outputs": [{"min_level": "loud"}]}"#,
            r#"{"outputs": [{"target": " "}]}"#,
            r#"{"outputs": [{"kind": "colored", "color_mode": "rainbow"}]}"#,
        ] {
            let err = LoggerConfig::from_json_str(json)
                .unwrap()
                .build(&registry)
                .err()
                .unwrap_or_else(|| panic!("expected error for {json}"));
            assert!(
                matches!(err, LoggerError::InvalidConfiguration { .. }),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = LoggerConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, LoggerError::Json(_)));
    }
}
