//! Handler implementations

pub mod channel;
pub mod json;
pub mod writer;

#[cfg(feature = "console")]
pub mod console;

pub use channel::ChannelHandler;
pub use json::JsonHandler;
pub use writer::WriterHandler;

#[cfg(feature = "console")]
pub use console::{ColorMode, ColorOptions, ColoredHandler, Paint, Palette, NO_COLOR_ENV};

pub use crate::core::Handler;
