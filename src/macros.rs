//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`.
//!
//! # Examples
//!
//! ```
//! use multilog::prelude::*;
//! use multilog::{attrs, info};
//!
//! let logger = Logger::new(std::io::sink(), "app", Flags::STD);
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Structured key-value pairs
//! logger.info_with("User logged in", attrs!["user_id" => 42, "action" => "login"]);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(std::io::sink(), "", Flags::empty());
/// use multilog::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level::ERROR, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($arg)+)
    };
}

/// Log a verbose-level message.
#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::VERBOSE, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(std::io::sink(), "", Flags::empty());
/// use multilog::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

/// Log a detail-level message.
#[macro_export]
macro_rules! detail {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DETAIL, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(std::io::sink(), "", Flags::empty());
/// use multilog::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::NOTICE, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(std::io::sink(), "", Flags::empty());
/// use multilog::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::CRITICAL, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ALERT, $($arg)+)
    };
}

/// Log at FATAL, then run the logger's exit hook.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # use multilog::testing::RecordingExit;
/// # let exit = RecordingExit::new();
/// # let logger = Logger::builder().writer(std::io::sink()).exit_hook(exit.hook()).build();
/// use multilog::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// # assert_eq!(exit.codes(), vec![1]);
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

/// Log at PANIC, then panic with the formatted message.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(format_args!($($arg)+))
    };
}

/// Build a `Vec<Attr>` from `key => value` pairs.
///
/// ```
/// use multilog::attrs;
///
/// let pairs = attrs!["method" => "GET", "status" => 200];
/// assert_eq!(pairs[1].to_string(), "status=200");
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::vec::Vec::<$crate::Attr>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        vec![$($crate::Attr::new($key, $value)),+]
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Flags, Level, Logger};
    use crate::testing::{CaptureBuffer, RecordingExit};

    fn capture() -> (Logger, CaptureBuffer) {
        let buf = CaptureBuffer::new();
        let logger = Logger::builder()
            .flags(Flags::empty())
            .no_default_output()
            .build();
        logger.add_writer(Level::ALL, buf.clone());
        (logger, buf)
    }

    #[test]
    fn test_log_macro() {
        let (logger, buf) = capture();
        log!(logger, Level::INFO, "Test message");
        log!(logger, Level::new(3), "Formatted: {}", 42);
        assert_eq!(buf.contents(), "INFO     Test message\nLEVEL(3) Formatted: 42\n");
    }

    #[test]
    fn test_level_macros() {
        let (logger, buf) = capture();
        trace!(logger, "t{}", 1);
        verbose!(logger, "v");
        debug!(logger, "d");
        detail!(logger, "de");
        info!(logger, "i");
        notice!(logger, "n");
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        critical!(logger, "c");
        alert!(logger, "a");

        let labels: Vec<String> = buf
            .lines()
            .iter()
            .map(|line| line[..8].trim_end().to_owned())
            .collect();
        assert_eq!(
            labels,
            vec![
                "TRACE", "VERBOSE", "DEBUG", "DETAIL", "INFO", "NOTICE", "WARN", "ERROR",
                "CRITICAL", "ALERT"
            ]
        );
        assert!(buf.contents().contains("WARN     Retry 1 of 3\n"));
    }

    #[test]
    fn test_fatal_macro() {
        let exit = RecordingExit::new();
        let (logger, buf) = capture();
        logger.set_exit_hook(exit.hook());
        fatal!(logger, "Critical failure: {}", "system");
        assert_eq!(buf.contents(), "FATAL    Critical failure: system\n");
        assert_eq!(exit.codes(), vec![1]);
    }

    #[test]
    fn test_panic_log_macro() {
        let (logger, buf) = capture();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            panic_log!(logger, "broken {}", "invariant");
        }));
        assert!(result.is_err());
        assert_eq!(buf.contents(), "PANIC    broken invariant\n");
    }

    #[test]
    fn test_attrs_macro() {
        let empty = attrs![];
        assert!(empty.is_empty());

        let pairs = attrs!["a" => 1, "b" => "two",];
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].key, "b");
    }
}
