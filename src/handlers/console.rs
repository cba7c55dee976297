//! ANSI colored console handler
//!
//! Produces the same line layout as [`WriterHandler`](super::WriterHandler),
//! wrapping selected parts in escape codes taken from a per-level palette.

use crate::core::{Handler, Level, Record, Result};
use colored::Color;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

/// Environment variable that turns `ColorMode::Auto` off when non-empty
pub const NO_COLOR_ENV: &str = "NO_COLOR";

const ANSI_RESET: &str = "\x1b[0m";

/// Whether coloring is applied at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Always emit escape codes
    #[default]
    On,
    /// Never emit escape codes
    Off,
    /// Emit only on a real terminal and when `NO_COLOR` is unset or empty
    Auto,
}

impl ColorMode {
    /// Decide for a destination whose terminal status is `is_terminal`,
    /// reading `NO_COLOR` from the environment
    #[must_use]
    pub fn resolve(self, is_terminal: bool) -> bool {
        self.resolve_with(is_terminal, no_color_requested())
    }

    /// Like [`resolve`](Self::resolve) with the `NO_COLOR` state supplied
    #[must_use]
    pub fn resolve_with(self, is_terminal: bool, no_color: bool) -> bool {
        match self {
            ColorMode::On => true,
            ColorMode::Off => false,
            ColorMode::Auto => is_terminal && !no_color,
        }
    }
}

pub(crate) fn no_color_requested() -> bool {
    std::env::var_os(NO_COLOR_ENV).is_some_and(|v| !v.is_empty())
}

/// An SGR style: optional foreground/background plus bold and dim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paint {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    dimmed: bool,
}

impl Paint {
    #[must_use]
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on(mut self, background: Color) -> Self {
        self.bg = Some(background);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn dimmed(mut self) -> Self {
        self.dimmed = true;
        self
    }

    /// The opening escape sequence, e.g. `\x1b[97;41m`
    #[must_use]
    pub fn escape(&self) -> String {
        let mut codes: Vec<Cow<'static, str>> = Vec::with_capacity(4);
        if self.bold {
            codes.push(Cow::Borrowed("1"));
        }
        if self.dimmed {
            codes.push(Cow::Borrowed("2"));
        }
        if let Some(fg) = self.fg {
            codes.push(fg.to_fg_str());
        }
        if let Some(bg) = self.bg {
            codes.push(bg.to_bg_str());
        }
        if codes.is_empty() {
            codes.push(Cow::Borrowed("0"));
        }
        format!("\x1b[{}m", codes.join(";"))
    }

    /// `text` wrapped in this style and a reset
    #[must_use]
    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.escape(), text, ANSI_RESET)
    }
}

/// Level to style mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Palette(HashMap<Level, Paint>);

impl Palette {
    #[must_use]
    pub fn empty() -> Self {
        Palette(HashMap::new())
    }

    #[must_use]
    pub fn with(mut self, level: Level, paint: Paint) -> Self {
        self.0.insert(level, paint);
        self
    }

    #[must_use]
    pub fn without(mut self, level: Level) -> Self {
        self.0.remove(&level);
        self
    }

    #[must_use]
    pub fn get(&self, level: Level) -> Option<&Paint> {
        self.0.get(&level)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::empty()
            .with(Level::TRACE, Paint::default().dimmed())
            .with(Level::VERBOSE, Paint::fg(Color::White))
            .with(Level::DEBUG, Paint::fg(Color::Cyan))
            .with(Level::DETAIL, Paint::fg(Color::Green))
            .with(Level::INFO, Paint::fg(Color::Green))
            .with(Level::NOTICE, Paint::fg(Color::Cyan))
            .with(Level::WARN, Paint::fg(Color::Yellow))
            .with(Level::ERROR, Paint::fg(Color::Red))
            .with(Level::CRITICAL, Paint::fg(Color::Magenta))
            .with(Level::ALERT, Paint::fg(Color::BrightRed))
            .with(Level::FATAL, Paint::fg(Color::BrightWhite).on(Color::Red))
            .with(Level::PANIC, Paint::fg(Color::BrightWhite).on(Color::Red))
    }
}

/// Configuration for [`ColoredHandler`]
///
/// When none of the `color_*` toggles is set, only the level token is colored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    pub mode: ColorMode,
    #[serde(skip)]
    pub palette: Option<Palette>,
    pub color_level: bool,
    pub color_prefix: bool,
    pub color_message: bool,
    /// Colors each `key=value` pair as a whole
    pub color_attrs: bool,
}

impl ColorOptions {
    #[must_use]
    pub fn with_mode(mode: ColorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Text handler with ANSI coloring
pub struct ColoredHandler {
    writer: Mutex<Box<dyn Write + Send>>,
    palette: Palette,
    color_level: bool,
    color_prefix: bool,
    color_message: bool,
    color_attrs: bool,
    enabled: bool,
}

impl ColoredHandler {
    /// Colored handler over an arbitrary writer
    ///
    /// The writer is not a known terminal, so `ColorMode::Auto` resolves to off.
    pub fn new<W: Write + Send + 'static>(writer: W, opts: ColorOptions) -> Self {
        Self::build(Box::new(writer), opts, false)
    }

    /// Colored handler over a writer that can report whether it is a terminal
    pub fn for_terminal<W>(writer: W, opts: ColorOptions) -> Self
    where
        W: Write + IsTerminal + Send + 'static,
    {
        let is_terminal = writer.is_terminal();
        Self::build(Box::new(writer), opts, is_terminal)
    }

    pub fn stdout(opts: ColorOptions) -> Self {
        Self::for_terminal(io::stdout(), opts)
    }

    pub fn stderr(opts: ColorOptions) -> Self {
        Self::for_terminal(io::stderr(), opts)
    }

    fn build(writer: Box<dyn Write + Send>, opts: ColorOptions, is_terminal: bool) -> Self {
        let any_part =
            opts.color_level || opts.color_prefix || opts.color_message || opts.color_attrs;
        Self {
            writer: Mutex::new(writer),
            palette: opts.palette.unwrap_or_default(),
            color_level: opts.color_level || !any_part,
            color_prefix: opts.color_prefix,
            color_message: opts.color_message,
            color_attrs: opts.color_attrs,
            enabled: opts.mode.resolve(is_terminal),
        }
    }

    /// Whether escape codes are emitted at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint<'a>(&self, part_on: bool, level: Level, text: &'a str) -> Cow<'a, str> {
        if !(self.enabled && part_on) {
            return Cow::Borrowed(text);
        }
        match self.palette.get(level) {
            Some(paint) => Cow::Owned(paint.paint(text)),
            None => Cow::Borrowed(text),
        }
    }

    fn format(&self, record: &Record) -> String {
        let mut out = String::with_capacity(96 + record.message.len());

        let ts = record.timestamp();
        if !ts.is_empty() {
            out.push_str(&ts);
            out.push(' ');
        }

        let label = record.level.label();
        out.push_str(&self.paint(self.color_level, record.level, &label));

        if !record.prefix.is_empty() {
            let bracketed = format!("[{}]", record.prefix);
            out.push(' ');
            out.push_str(&self.paint(self.color_prefix, record.level, &bracketed));
        }
        if !record.message.is_empty() {
            out.push(' ');
            out.push_str(&self.paint(self.color_message, record.level, &record.message));
        }
        for attr in &record.attrs {
            let pair = attr.to_string();
            let _ = write!(out, " {}", self.paint(self.color_attrs, record.level, &pair));
        }

        out.push('\n');
        out
    }
}

impl Handler for ColoredHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        let line = self.format(record);
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attr, Flags};
    use crate::testing::CaptureBuffer;

    fn render(opts: ColorOptions, record: &Record) -> String {
        let buf = CaptureBuffer::new();
        let handler = ColoredHandler::new(buf.clone(), opts);
        handler.handle(record).unwrap();
        buf.contents()
    }

    #[test]
    fn test_level_only_by_default() {
        let record = Record::new(Level::WARN, "hello")
            .with_prefix("p")
            .with_flags(Flags::STD);
        let out = render(ColorOptions::with_mode(ColorMode::On), &record);
        assert!(out.contains("\x1b[33mWARN    \x1b[0m"), "{:?}", out);
        assert!(out.contains(" [p] hello\n"), "{:?}", out);
    }

    #[test]
    fn test_all_parts_colored() {
        let opts = ColorOptions {
            mode: ColorMode::On,
            color_level: true,
            color_prefix: true,
            color_message: true,
            color_attrs: true,
            ..ColorOptions::default()
        };
        let record = Record::new(Level::ERROR, "boom")
            .with_prefix("db")
            .with_attrs(vec![Attr::new("code", 7)]);
        let out = render(opts, &record);
        assert_eq!(
            out,
            "\x1b[31mERROR   \x1b[0m \x1b[31m[db]\x1b[0m \x1b[31mboom\x1b[0m \x1b[31mcode=7\x1b[0m\n"
        );
    }

    #[test]
    fn test_off_mode_has_no_escapes() {
        let opts = ColorOptions {
            mode: ColorMode::Off,
            color_level: true,
            color_message: true,
            color_attrs: true,
            ..ColorOptions::default()
        };
        let record = Record::new(Level::FATAL, "x").with_attrs(vec![Attr::new("k", "v")]);
        let out = render(opts, &record);
        assert!(!out.contains("\x1b["));
        assert_eq!(out, "FATAL    x k=v\n");
    }

    #[test]
    fn test_level_missing_from_palette_is_plain() {
        let opts = ColorOptions {
            mode: ColorMode::On,
            palette: Some(Palette::default().without(Level::INFO)),
            ..ColorOptions::default()
        };
        let out = render(opts.clone(), &Record::new(Level::INFO, "m"));
        assert!(!out.contains("\x1b["));

        let out = render(opts, &Record::new(Level::new(3), "m"));
        assert_eq!(out, "LEVEL(3) m\n");
    }

    #[test]
    fn test_auto_mode_on_plain_writer_is_off() {
        let buf = CaptureBuffer::new();
        let handler = ColoredHandler::new(buf, ColorOptions::with_mode(ColorMode::Auto));
        assert!(!handler.is_enabled());
    }

    #[test]
    fn test_paint_escapes() {
        assert_eq!(Paint::fg(Color::Green).escape(), "\x1b[32m");
        assert_eq!(Paint::default().dimmed().escape(), "\x1b[2m");
        assert_eq!(Paint::default().bold().escape(), "\x1b[1m");
        assert_eq!(
            Paint::fg(Color::BrightWhite).on(Color::Red).escape(),
            "\x1b[97;41m"
        );
    }

    #[test]
    fn test_mode_resolution() {
        assert!(ColorMode::On.resolve(false));
        assert!(!ColorMode::Off.resolve(true));
        assert!(!ColorMode::Auto.resolve(false));
    }

    #[test]
    fn test_auto_honours_no_color() {
        assert!(ColorMode::Auto.resolve_with(true, false));
        assert!(!ColorMode::Auto.resolve_with(true, true));
        assert!(!ColorMode::Auto.resolve_with(false, false));
        // Explicit modes ignore both inputs
        assert!(ColorMode::On.resolve_with(false, true));
        assert!(!ColorMode::Off.resolve_with(true, false));
    }
}
