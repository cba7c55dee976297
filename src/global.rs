//! Process-wide default logger
//!
//! The default logger is created on first use (standard error, empty
//! prefix, date and time flags) unless a composition root installs its own
//! with [`install_default`] beforehand. The free functions below forward to
//! it and nothing else.

use crate::core::{Attr, Flags, Handler, Level, Logger, LoggerError, Result, TimeSource};
use crate::files::{file_registry, LogFile};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static DEFAULT: OnceLock<Arc<Logger>> = OnceLock::new();

/// The process-wide logger, initialized on first call
pub fn default_logger() -> &'static Arc<Logger> {
    DEFAULT.get_or_init(|| Arc::new(Logger::default()))
}

/// Install `logger` as the default; fails once the default has been used or installed
pub fn install_default(logger: Arc<Logger>) -> Result<()> {
    DEFAULT
        .set(logger)
        .map_err(|_| LoggerError::config("default logger", "already initialized"))
}

pub fn set_flags(flags: Flags) {
    default_logger().set_flags(flags);
}

pub fn flags() -> Flags {
    default_logger().flags()
}

pub fn set_prefix(prefix: impl Into<String>) {
    default_logger().set_prefix(prefix);
}

pub fn prefix() -> String {
    default_logger().prefix()
}

pub fn set_output<W: Write + Send + 'static>(writer: W) {
    default_logger().set_output(writer);
}

pub fn reset_output() {
    default_logger().reset_output();
}

pub fn add_writer<W: Write + Send + 'static>(min_level: Level, writer: W) {
    default_logger().add_writer(min_level, writer);
}

pub fn add_handler<H: Handler + 'static>(min_level: Level, handler: H) {
    default_logger().add_handler(min_level, handler);
}

pub fn with<I, A>(attrs: I) -> Logger
where
    I: IntoIterator<Item = A>,
    A: Into<Attr>,
{
    default_logger().with(attrs)
}

pub fn set_time_source(now: TimeSource) {
    default_logger().set_time_source(now);
}

pub fn set_exit_hook(exit: crate::core::ExitHook) {
    default_logger().set_exit_hook(exit);
}

pub fn set_testing_mode(on: bool) {
    default_logger().set_testing_mode(on);
}

#[cfg(feature = "console")]
pub fn set_colored_output(min_level: Level, opts: crate::handlers::ColorOptions) {
    default_logger().set_colored_output(min_level, opts);
}

/// Replace the default logger's outputs with a truncated file
pub fn set_output_file(path: impl AsRef<Path>) -> Result<LogFile> {
    file_registry().set_output_file(default_logger(), path)
}

pub fn add_file_writer(min_level: Level, path: impl AsRef<Path>) -> Result<LogFile> {
    file_registry().add_file_writer(default_logger(), min_level, path)
}

pub fn add_json_file(min_level: Level, path: impl AsRef<Path>) -> Result<LogFile> {
    file_registry().add_json_file(default_logger(), min_level, path)
}

/// Close every file opened through the helpers above; returns how many were open
pub fn close() -> usize {
    file_registry().close_all()
}

#[track_caller]
pub fn log(level: Level, message: impl Into<String>) {
    default_logger().log(level, message);
}

#[track_caller]
pub fn log_with(level: Level, message: impl Into<String>, attrs: Vec<Attr>) {
    default_logger().log_with(level, message, attrs);
}

#[track_caller]
pub fn logf(level: Level, args: fmt::Arguments<'_>) {
    default_logger().logf(level, args);
}

macro_rules! forward_levels {
    ($($plain:ident, $with:ident;)+) => {
        $(
            #[track_caller]
            pub fn $plain(message: impl Into<String>) {
                default_logger().$plain(message);
            }

            #[track_caller]
            pub fn $with(message: impl Into<String>, attrs: Vec<Attr>) {
                default_logger().$with(message, attrs);
            }
        )+
    };
}

forward_levels! {
    trace, trace_with;
    verbose, verbose_with;
    debug, debug_with;
    detail, detail_with;
    info, info_with;
    notice, notice_with;
    warn, warn_with;
    error, error_with;
    critical, critical_with;
    alert, alert_with;
}

#[track_caller]
pub fn print(message: impl fmt::Display) {
    default_logger().print(message);
}

#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    default_logger().printf(args);
}

#[track_caller]
pub fn println(message: impl fmt::Display) {
    default_logger().println(message);
}

#[track_caller]
pub fn fatal(message: impl fmt::Display) {
    default_logger().fatal(message);
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    default_logger().fatalf(args);
}

#[track_caller]
pub fn fatalln(message: impl fmt::Display) {
    default_logger().fatalln(message);
}

#[track_caller]
pub fn panic(message: impl fmt::Display) -> ! {
    default_logger().panic(message)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    default_logger().panicf(args)
}

#[track_caller]
pub fn panicln(message: impl fmt::Display) -> ! {
    default_logger().panicln(message)
}
