//! # multilog
//!
//! A leveled logger with a stdlib-style surface, structured key-value
//! attributes and any number of simultaneous outputs, each with its own
//! minimum level.
//!
//! ## Features
//!
//! - **Fine-grained levels**: TRACE through PANIC plus `ALL`/`OFF` sentinels
//! - **Multiple outputs**: text, JSON lines, ANSI colored console, channels
//! - **Per-output filtering**: every output binding has its own threshold
//! - **Thread safe**: handlers never run under the logger's lock
//! - **HTTP access logs**: axum middleware behind the `http` feature
//!
//! ## Example
//!
//! ```
//! use multilog::prelude::*;
//! use multilog::{attrs, info};
//!
//! let logger = Logger::new(std::io::stderr(), "app", Flags::STD);
//! logger.add_handler(Level::ERROR, JsonHandler::stderr());
//!
//! info!(logger, "listening on port {}", 8080);
//! logger.warn_with("slow request", attrs!["path" => "/search", "ms" => 1250]);
//! ```

pub mod config;
pub mod core;
pub mod files;
pub mod global;
pub mod handlers;
#[cfg(feature = "http")]
pub mod http;
pub mod macros;
pub mod testing;

pub mod prelude {
    pub use crate::core::{
        Attr, ExitHook, Flags, Handler, Level, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        Record, Result, TimeSource, Value,
    };
    pub use crate::handlers::{ChannelHandler, JsonHandler, WriterHandler};

    #[cfg(feature = "console")]
    pub use crate::handlers::{ColorMode, ColorOptions, ColoredHandler};
}

pub use crate::core::{
    Attr, ExitHook, Flags, Handler, Level, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    Record, Result, TimeSource, Value,
};
pub use global::default_logger;
