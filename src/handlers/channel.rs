//! In-process channel handler

use crate::core::{Handler, LoggerError, Record, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

/// Sends `[timestamp ]LEVEL    message` strings into a channel
///
/// Prefix and attributes are not included. Sending blocks while a bounded
/// channel is full; with zero capacity and nobody receiving, the calling
/// thread blocks indefinitely. Nothing is ever dropped silently: if every
/// receiver is gone the handler returns [`LoggerError::ChannelDisconnected`].
pub struct ChannelHandler {
    sender: Sender<String>,
}

impl ChannelHandler {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }

    /// Handler plus the receiving end of a fresh unbounded channel
    pub fn unbounded() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }

    /// Handler plus the receiving end of a fresh bounded channel
    pub fn bounded(capacity: usize) -> (Self, Receiver<String>) {
        let (sender, receiver) = bounded(capacity);
        (Self::new(sender), receiver)
    }
}

impl Handler for ChannelHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        let ts = record.timestamp();
        let line = if ts.is_empty() {
            format!("{} {}", record.level.label(), record.message)
        } else {
            format!("{} {} {}", ts, record.level.label(), record.message)
        };
        self.sender
            .send(line)
            .map_err(|_| LoggerError::ChannelDisconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attr, Flags, Level};

    #[test]
    fn test_channel_format_without_prefix_or_attrs() {
        let (handler, rx) = ChannelHandler::unbounded();
        let record = Record::new(Level::WARN, "careful")
            .with_prefix("ignored")
            .with_attrs(vec![Attr::new("k", "v")]);
        handler.handle(&record).unwrap();
        assert_eq!(rx.recv().unwrap(), "WARN     careful");
    }

    #[test]
    fn test_channel_includes_timestamp_when_flagged() {
        let (handler, rx) = ChannelHandler::bounded(1);
        handler
            .handle(&Record::new(Level::INFO, "tick").with_flags(Flags::STD))
            .unwrap();
        let line = rx.recv().unwrap();
        assert!(line.ends_with(" INFO     tick"), "{}", line);
        assert_eq!(line.len(), "2025/01/01 00:00:00 INFO     tick".len());
    }

    #[test]
    fn test_channel_disconnected_is_an_error() {
        let (handler, rx) = ChannelHandler::unbounded();
        drop(rx);
        let err = handler.handle(&Record::new(Level::INFO, "x")).unwrap_err();
        assert!(matches!(err, LoggerError::ChannelDisconnected));
    }
}
