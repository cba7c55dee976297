//! Main logger implementation

use super::{
    attr::Attr,
    flags::Flags,
    handler::Handler,
    level::Level,
    metrics::LoggerMetrics,
    record::Record,
    timestamp::{system_time_source, TimeSource},
};
use crate::handlers::WriterHandler;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Arc;

/// Hook invoked with exit code 1 after a fatal record has been dispatched
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Threshold used for the single binding installed by `set_output`
pub const DEFAULT_OUTPUT_LEVEL: Level = Level::DEBUG;

/// The process-terminating exit hook
#[must_use]
pub fn process_exit_hook() -> ExitHook {
    Arc::new(|code| std::process::exit(code))
}

/// A handler paired with the minimum level it accepts
#[derive(Clone)]
struct Output {
    handler: Arc<dyn Handler>,
    min_level: Level,
}

struct LoggerState {
    prefix: String,
    flags: Flags,
    outputs: Vec<Output>,
    now: TimeSource,
    exit: ExitHook,
}

/// Leveled, multi-output logger with a stdlib-style surface
///
/// Every record is routed to each output whose minimum level it meets or
/// exceeds. The lock guarding prefix, flags and outputs is held only while
/// copying them at the start of a dispatch, never across a handler call.
///
/// # Example
///
/// ```
/// use multilog::prelude::*;
/// use multilog::attrs;
/// use multilog::testing::CaptureBuffer;
///
/// let errors = CaptureBuffer::new();
/// let logger = Logger::new(std::io::sink(), "api", Flags::empty());
/// logger.add_writer(Level::ERROR, errors.clone());
///
/// logger.info("started");
/// logger.error_with("request failed", attrs!["status" => 503]);
///
/// assert_eq!(errors.contents(), "ERROR    [api] request failed status=503\n");
/// ```
pub struct Logger {
    state: Mutex<LoggerState>,
    /// Attributes bound with [`Logger::with`], prepended to every record
    attrs: Vec<Attr>,
    metrics: Arc<LoggerMetrics>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $with:ident;)+) => {
        $(
            #[doc = concat!("Log `message` at `", stringify!($level), "`")]
            #[inline]
            #[track_caller]
            pub fn $plain(&self, message: impl Into<String>) {
                self.dispatch(Level::$level, message.into(), Vec::new());
            }

            #[doc = concat!("Log `message` at `", stringify!($level), "` with extra attributes")]
            #[inline]
            #[track_caller]
            pub fn $with(&self, message: impl Into<String>, attrs: Vec<Attr>) {
                self.dispatch(Level::$level, message.into(), attrs);
            }
        )+
    };
}

impl Logger {
    /// Logger writing every record at DEBUG and above to `writer`
    ///
    /// Mirrors the shape of the stdlib constructor.
    pub fn new<W: Write + Send + 'static>(writer: W, prefix: impl Into<String>, flags: Flags) -> Self {
        Logger::builder()
            .writer(writer)
            .prefix(prefix)
            .flags(flags)
            .build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn set_flags(&self, flags: Flags) {
        self.state.lock().flags = flags;
    }

    pub fn flags(&self) -> Flags {
        self.state.lock().flags
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.state.lock().prefix = prefix.into();
    }

    pub fn prefix(&self) -> String {
        self.state.lock().prefix.clone()
    }

    /// Replace every output with a single text writer at DEBUG
    ///
    /// Earlier `add_writer`/`add_handler` registrations are discarded.
    pub fn set_output<W: Write + Send + 'static>(&self, writer: W) {
        self.replace_outputs(Arc::new(WriterHandler::new(writer)));
    }

    /// `set_output` to the process's standard error
    pub fn reset_output(&self) {
        self.replace_outputs(Arc::new(WriterHandler::stderr()));
    }

    fn replace_outputs(&self, handler: Arc<dyn Handler>) {
        self.state.lock().outputs = vec![Output {
            handler,
            min_level: DEFAULT_OUTPUT_LEVEL,
        }];
    }

    /// Append a text writer that receives records at `min_level` and above
    pub fn add_writer<W: Write + Send + 'static>(&self, min_level: Level, writer: W) {
        self.add_handler(min_level, WriterHandler::new(writer));
    }

    /// Append a handler that receives records at `min_level` and above
    ///
    /// Pass an `Arc` to share one handler between several loggers.
    pub fn add_handler<H: Handler + 'static>(&self, min_level: Level, handler: H) {
        self.state.lock().outputs.push(Output {
            handler: Arc::new(handler),
            min_level,
        });
    }

    /// Number of output bindings currently installed
    pub fn output_count(&self) -> usize {
        self.state.lock().outputs.len()
    }

    /// Replace the clock used to stamp records
    pub fn set_time_source(&self, now: TimeSource) {
        self.state.lock().now = now;
    }

    /// Replace the hook called by the fatal family
    pub fn set_exit_hook(&self, exit: ExitHook) {
        self.state.lock().exit = exit;
    }

    /// When on, the primary output discards everything; when off it goes to stderr
    pub fn set_testing_mode(&self, on: bool) {
        if on {
            self.set_output(io::sink());
        } else {
            self.reset_output();
        }
    }

    /// Discard plain output and attach a colored stdout handler at `min_level`
    #[cfg(feature = "console")]
    pub fn set_colored_output(&self, min_level: Level, opts: crate::handlers::ColorOptions) {
        self.set_output(io::sink());
        self.add_handler(min_level, crate::handlers::ColoredHandler::stdout(opts));
    }

    /// Derived logger whose records all carry `attrs` ahead of their own
    ///
    /// The derived logger starts from a copy of this logger's prefix, flags,
    /// outputs and hooks; later changes to either logger are not shared.
    /// Metrics are shared.
    pub fn with<I, A>(&self, attrs: I) -> Logger
    where
        I: IntoIterator<Item = A>,
        A: Into<Attr>,
    {
        let state = self.state.lock();
        let mut bound = self.attrs.clone();
        bound.extend(attrs.into_iter().map(Into::into));
        Logger {
            state: Mutex::new(LoggerState {
                prefix: state.prefix.clone(),
                flags: state.flags,
                outputs: state.outputs.clone(),
                now: Arc::clone(&state.now),
                exit: Arc::clone(&state.exit),
            }),
            attrs: bound,
            metrics: Arc::clone(&self.metrics),
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    #[inline]
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.dispatch(level, message.into(), Vec::new());
    }

    #[inline]
    #[track_caller]
    pub fn log_with(&self, level: Level, message: impl Into<String>, attrs: Vec<Attr>) {
        self.dispatch(level, message.into(), attrs);
    }

    /// Formatted logging, e.g. `logger.logf(Level::INFO, format_args!("{} items", n))`
    #[inline]
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        self.dispatch(level, args.to_string(), Vec::new());
    }

    level_methods! {
        TRACE => trace, trace_with;
        VERBOSE => verbose, verbose_with;
        DEBUG => debug, debug_with;
        DETAIL => detail, detail_with;
        INFO => info, info_with;
        NOTICE => notice, notice_with;
        WARN => warn, warn_with;
        ERROR => error, error_with;
        CRITICAL => critical, critical_with;
        ALERT => alert, alert_with;
    }

    /// Logs at INFO
    #[track_caller]
    pub fn print(&self, message: impl fmt::Display) {
        self.dispatch(Level::INFO, message.to_string(), Vec::new());
    }

    /// Logs at INFO
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Level::INFO, args.to_string(), Vec::new());
    }

    /// Logs at INFO with one trailing newline removed
    #[track_caller]
    pub fn println(&self, message: impl fmt::Display) {
        self.dispatch(Level::INFO, trim_newline(message.to_string()), Vec::new());
    }

    /// Logs at FATAL, then calls the exit hook with code 1
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.dispatch(Level::FATAL, message.to_string(), Vec::new());
        self.exit(1);
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.dispatch(Level::FATAL, args.to_string(), Vec::new());
        self.exit(1);
    }

    #[track_caller]
    pub fn fatalln(&self, message: impl fmt::Display) {
        self.dispatch(Level::FATAL, trim_newline(message.to_string()), Vec::new());
        self.exit(1);
    }

    /// Logs at PANIC, then panics with the message as payload
    ///
    /// The payload is a `String`, so callers can recover it with
    /// `std::panic::catch_unwind` and `downcast_ref::<String>()`.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        self.panic_with_message(message.to_string())
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panic_with_message(args.to_string())
    }

    #[track_caller]
    pub fn panicln(&self, message: impl fmt::Display) -> ! {
        self.panic_with_message(trim_newline(message.to_string()))
    }

    #[track_caller]
    fn panic_with_message(&self, message: String) -> ! {
        self.dispatch(Level::PANIC, message.clone(), Vec::new());
        panic::panic_any(message)
    }

    fn exit(&self, code: i32) {
        let exit = Arc::clone(&self.state.lock().exit);
        exit(code);
    }

    /// Build one record and hand it to every output whose threshold it meets
    ///
    /// Handler errors and panics are isolated per output: they are counted
    /// in the metrics and the remaining outputs still run.
    #[track_caller]
    fn dispatch(&self, level: Level, message: String, attrs: Vec<Attr>) {
        let (prefix, flags, outputs, now) = {
            let state = self.state.lock();
            (
                state.prefix.clone(),
                state.flags,
                state.outputs.clone(),
                Arc::clone(&state.now),
            )
        };

        let attrs = if self.attrs.is_empty() {
            attrs
        } else {
            let mut merged = Vec::with_capacity(self.attrs.len() + attrs.len());
            merged.extend(self.attrs.iter().cloned());
            merged.extend(attrs);
            merged
        };

        let mut record = Record::new(level, message)
            .with_time(now())
            .with_prefix(prefix)
            .with_attrs(attrs)
            .with_flags(flags);
        if flags.wants_source() {
            record = record.with_source(Location::caller());
        }

        self.metrics.record_dispatched();
        for output in &outputs {
            if !level.meets(output.min_level) {
                self.metrics.record_filtered();
                continue;
            }

            let result = panic::catch_unwind(AssertUnwindSafe(|| output.handler.handle(&record)));
            match result {
                Ok(Ok(())) => {
                    self.metrics.record_delivered();
                }
                Ok(Err(_)) | Err(_) => {
                    self.metrics.record_handler_failure();
                }
            }
        }
    }
}

impl Default for Logger {
    /// Standard error, empty prefix, date and time
    fn default() -> Self {
        Logger::builder().build()
    }
}

fn trim_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
    }
    s
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
/// ```
/// use multilog::prelude::*;
///
/// let (channel, rx) = ChannelHandler::unbounded();
/// let logger = Logger::builder()
///     .prefix("worker")
///     .flags(Flags::empty())
///     .no_default_output()
///     .output(Level::WARN, channel)
///     .build();
///
/// logger.info("hidden");
/// logger.warn("shown");
/// assert_eq!(rx.try_recv().unwrap(), "WARN     shown");
/// assert!(rx.try_recv().is_err());
/// ```
pub struct LoggerBuilder {
    prefix: String,
    flags: Flags,
    default_writer: Option<Box<dyn Write + Send>>,
    default_output: bool,
    outputs: Vec<Output>,
    now: TimeSource,
    exit: ExitHook,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            flags: Flags::STD,
            default_writer: None,
            default_output: true,
            outputs: Vec::new(),
            now: system_time_source(),
            exit: process_exit_hook(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Destination of the default DEBUG-level text output (stderr if unset)
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.default_writer = Some(Box::new(writer));
        self.default_output = true;
        self
    }

    /// Start without the default text output
    #[must_use = "builder methods return a new value"]
    pub fn no_default_output(mut self) -> Self {
        self.default_output = false;
        self
    }

    /// Add a handler receiving records at `min_level` and above
    #[must_use = "builder methods return a new value"]
    pub fn output<H: Handler + 'static>(mut self, min_level: Level, handler: H) -> Self {
        self.outputs.push(Output {
            handler: Arc::new(handler),
            min_level,
        });
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_source(mut self, now: TimeSource) -> Self {
        self.now = now;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_hook(mut self, exit: ExitHook) -> Self {
        self.exit = exit;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let mut outputs = Vec::with_capacity(self.outputs.len() + 1);
        if self.default_output {
            let handler = match self.default_writer {
                Some(writer) => WriterHandler::new(writer),
                None => WriterHandler::stderr(),
            };
            outputs.push(Output {
                handler: Arc::new(handler),
                min_level: DEFAULT_OUTPUT_LEVEL,
            });
        }
        outputs.extend(self.outputs);

        Logger {
            state: Mutex::new(LoggerState {
                prefix: self.prefix,
                flags: self.flags,
                outputs,
                now: self.now,
                exit: self.exit,
            }),
            attrs: Vec::new(),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timestamp::fixed_time_source;
    use crate::core::LoggerError;
    use crate::handlers::ChannelHandler;
    use crate::testing::{CaptureBuffer, RecordingExit};
    use chrono::{FixedOffset, TimeZone};

    fn quiet_logger() -> (Logger, CaptureBuffer) {
        let buf = CaptureBuffer::new();
        let logger = Logger::new(io::sink(), "", Flags::empty());
        logger.add_writer(Level::ALL, buf.clone());
        (logger, buf)
    }

    #[test]
    fn test_new_has_single_debug_output() {
        let buf = CaptureBuffer::new();
        let logger = Logger::new(buf.clone(), "", Flags::empty());
        assert_eq!(logger.output_count(), 1);

        logger.trace("dropped");
        logger.debug("kept");
        assert_eq!(buf.contents(), "DEBUG    kept\n");
    }

    #[test]
    fn test_set_output_replaces_all_bindings() {
        let logger = Logger::default();
        logger.add_writer(Level::INFO, io::sink());
        logger.add_handler(Level::ERROR, WriterHandler::discard());
        assert_eq!(logger.output_count(), 3);

        logger.set_output(io::sink());
        assert_eq!(logger.output_count(), 1);

        logger.reset_output();
        assert_eq!(logger.output_count(), 1);
    }

    #[test]
    fn test_routing_by_threshold() {
        let all = CaptureBuffer::new();
        let errors = CaptureBuffer::new();
        let logger = Logger::builder()
            .flags(Flags::empty())
            .no_default_output()
            .build();
        logger.add_writer(Level::ALL, all.clone());
        logger.add_writer(Level::ERROR, errors.clone());

        logger.info("i");
        logger.warn("w");
        logger.error("e");
        logger.critical("c");

        assert_eq!(all.contents().lines().count(), 4);
        assert_eq!(errors.contents(), "ERROR    e\nCRITICAL c\n");
    }

    #[test]
    fn test_prefix_and_flags_snapshot() {
        let (logger, buf) = quiet_logger();
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 5, 6, 7)
            .unwrap();
        logger.set_time_source(fixed_time_source(at));
        logger.set_prefix("pfx");
        logger.set_flags(Flags::STD);

        logger.notice("n");
        assert_eq!(logger.prefix(), "pfx");
        assert_eq!(logger.flags(), Flags::STD);
        assert_eq!(buf.contents(), "2024/03/04 05:06:07 NOTICE   [pfx] n\n");
    }

    #[test]
    fn test_print_family() {
        let (logger, buf) = quiet_logger();
        logger.print("p");
        logger.printf(format_args!("{}-{}", "a", 1));
        logger.println("line\n");
        assert_eq!(buf.contents(), "INFO     p\nINFO     a-1\nINFO     line\n");
    }

    #[test]
    fn test_structured_attrs() {
        let (logger, buf) = quiet_logger();
        logger.info_with(
            "user",
            vec![Attr::new("id", 7), Attr::new("name", "ann")],
        );
        assert_eq!(buf.contents(), "INFO     user id=7 name=ann\n");
    }

    #[test]
    fn test_with_binds_attrs() {
        let (logger, buf) = quiet_logger();
        let child = logger.with([("request_id", "abc")]);
        child.info_with("handled", vec![Attr::new("status", 200)]);
        logger.info("parent");

        assert_eq!(
            buf.contents(),
            "INFO     handled request_id=abc status=200\nINFO     parent\n"
        );
        assert_eq!(child.output_count(), logger.output_count());
    }

    #[test]
    fn test_handler_errors_are_swallowed() {
        let (channel, rx) = ChannelHandler::unbounded();
        drop(rx);
        let buf = CaptureBuffer::new();
        let logger = Logger::builder().flags(Flags::empty()).no_default_output().build();
        logger.add_handler(Level::ALL, channel);
        logger.add_writer(Level::ALL, buf.clone());

        logger.error("still written");
        assert_eq!(buf.contents(), "ERROR    still written\n");
        assert_eq!(logger.metrics().handler_failures(), 1);
        assert_eq!(logger.metrics().delivered(), 1);
    }

    struct PanickingHandler;

    impl Handler for PanickingHandler {
        fn handle(&self, _record: &Record) -> crate::core::Result<()> {
            panic!("handler exploded");
        }
    }

    struct FailingHandler;

    impl Handler for FailingHandler {
        fn handle(&self, _record: &Record) -> crate::core::Result<()> {
            Err(LoggerError::other("nope"))
        }
    }

    #[test]
    fn test_handler_panic_is_isolated() {
        let (logger, buf) = quiet_logger();
        logger.add_handler(Level::ALL, PanickingHandler);
        logger.add_handler(Level::ALL, FailingHandler);
        logger.warn("survives");
        assert_eq!(buf.contents(), "WARN     survives\n");
        assert_eq!(logger.metrics().handler_failures(), 2);
    }

    #[test]
    fn test_fatal_calls_exit_hook() {
        let exit = RecordingExit::new();
        let (logger, buf) = quiet_logger();
        logger.set_exit_hook(exit.hook());

        logger.fatal("bye");
        logger.fatalf(format_args!("code {}", 2));
        logger.fatalln("ln\n");

        assert_eq!(exit.codes(), vec![1, 1, 1]);
        assert_eq!(buf.contents(), "FATAL    bye\nFATAL    code 2\nFATAL    ln\n");
    }

    #[test]
    fn test_panic_is_recoverable() {
        let (logger, buf) = quiet_logger();
        let result = panic::catch_unwind(AssertUnwindSafe(|| logger.panicf(format_args!("bad {}", 1))));
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("bad 1"));
        assert_eq!(buf.contents(), "PANIC    bad 1\n");
    }

    #[test]
    fn test_source_captured_only_with_file_flags() {
        let (channel, _rx) = ChannelHandler::unbounded();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        struct Capture(Arc<Mutex<Vec<Option<String>>>>);
        impl Handler for Capture {
            fn handle(&self, record: &Record) -> crate::core::Result<()> {
                self.0.lock().push(record.source_location());
                Ok(())
            }
        }

        let logger = Logger::builder()
            .flags(Flags::empty())
            .no_default_output()
            .output(Level::ALL, Capture(sink))
            .output(Level::ALL, channel)
            .build();
        logger.info("no source");
        logger.set_flags(Flags::SHORT_FILE);
        logger.info("with source");

        let seen = captured.lock();
        assert_eq!(seen[0], None);
        let source = seen[1].as_deref().unwrap();
        assert!(source.starts_with("logger.rs:"), "{}", source);
    }

    #[test]
    fn test_testing_mode_discards() {
        let logger = Logger::default();
        logger.add_writer(Level::ALL, io::sink());
        logger.set_testing_mode(true);
        assert_eq!(logger.output_count(), 1);
        logger.info("nowhere");
        assert_eq!(logger.metrics().delivered(), 1);
    }
}
