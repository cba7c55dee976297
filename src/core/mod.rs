//! Core logger types and traits

pub mod attr;
pub mod error;
pub mod flags;
pub mod handler;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod timestamp;

pub use attr::{Attr, Value};
pub use error::{LoggerError, Result};
pub use flags::Flags;
pub use handler::Handler;
pub use level::Level;
pub use logger::{process_exit_hook, ExitHook, Logger, LoggerBuilder, DEFAULT_OUTPUT_LEVEL};
pub use metrics::LoggerMetrics;
pub use record::Record;
pub use timestamp::{fixed_time_source, format_timestamp, system_time_source, TimeSource};
