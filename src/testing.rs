//! Helpers for asserting on log output in tests

use crate::core::ExitHook;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Clonable in-memory writer; every clone appends to the same buffer
///
/// ```
/// use multilog::prelude::*;
/// use multilog::testing::CaptureBuffer;
///
/// let buf = CaptureBuffer::new();
/// let logger = Logger::new(buf.clone(), "", Flags::empty());
/// logger.warn("low disk");
/// assert_eq!(buf.contents(), "WARN     low disk\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Non-empty lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Exit hook that records the codes it was called with instead of exiting
#[derive(Debug, Clone, Default)]
pub struct RecordingExit {
    codes: Arc<Mutex<Vec<i32>>>,
}

impl RecordingExit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook to install with `Logger::set_exit_hook` or `LoggerBuilder::exit_hook`
    pub fn hook(&self) -> ExitHook {
        let codes = Arc::clone(&self.codes);
        Arc::new(move |code| codes.lock().push(code))
    }

    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().clone()
    }

    pub fn called(&self) -> bool {
        !self.codes.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_buffer_shares_storage() {
        let buf = CaptureBuffer::new();
        let mut writer = buf.clone();
        writer.write_all(b"one\n\ntwo\n").unwrap();
        assert_eq!(buf.lines(), vec!["one", "two"]);

        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_recording_exit() {
        let exit = RecordingExit::new();
        assert!(!exit.called());
        let hook = exit.hook();
        hook(1);
        hook(3);
        assert_eq!(exit.codes(), vec![1, 3]);
    }
}
