//! Leveled, depth-indented logging for transformation runs.
//!
//! Every run threads one `Logger` through the call chain; nested operations
//! log one indent level deeper. Warnings and infos are suppressed unless the
//! logger is verbose, errors are always emitted.

use std::io::Write;
use std::sync::{Arc, Mutex};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
}

/// Destination for log lines. Mirrors the output-sink split used for engine
/// output: a real stderr sink for the CLI and a buffer sink for tests.
pub trait LogSink: Send {
    fn write_line(&mut self, level: Level, text: &str);
}

/// Writes colorized lines to stderr.
pub struct StderrSink {
    choice: ColorChoice,
}

impl StderrSink {
    pub fn new() -> Self {
        let choice = if atty::is(atty::Stream::Stderr) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { choice }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write_line(&mut self, level: Level, text: &str) {
        let mut stream = StandardStream::stderr(self.choice);
        let color = match level {
            Level::Error => Color::Red,
            Level::Warning => Color::Yellow,
            Level::Info => Color::Blue,
        };
        let _ = stream.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
        let _ = writeln!(stream, "{}", text);
        let _ = stream.reset();
    }
}

/// Collects log lines into memory for programmatic capture.
#[derive(Default)]
pub struct BufferSink {
    pub lines: Vec<(Level, String)>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for BufferSink {
    fn write_line(&mut self, level: Level, text: &str) {
        self.lines.push((level, text.to_string()));
    }
}

/// Handle to the shared sink, cheap to clone; `nested()` yields a handle one
/// indent level deeper.
#[derive(Clone)]
pub struct Logger {
    verbose: bool,
    depth: usize,
    sink: Arc<Mutex<dyn LogSink>>,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self::with_sink(verbose, StderrSink::new())
    }

    pub fn with_sink(verbose: bool, sink: impl LogSink + 'static) -> Self {
        Self {
            verbose,
            depth: 0,
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Buffered logger plus a handle to the captured lines, for tests.
    pub fn buffered(verbose: bool) -> (Self, Arc<Mutex<BufferSink>>) {
        let sink = Arc::new(Mutex::new(BufferSink::new()));
        let logger = Self {
            verbose,
            depth: 0,
            sink: sink.clone(),
        };
        (logger, sink)
    }

    /// A logger one nesting level deeper, sharing the same sink.
    pub fn nested(&self) -> Self {
        Self {
            verbose: self.verbose,
            depth: self.depth + 1,
            sink: self.sink.clone(),
        }
    }

    /// Errors are always emitted, regardless of verbosity.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        if self.verbose {
            self.emit(Level::Warning, message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbose {
            self.emit(Level::Info, message);
        }
    }

    fn emit(&self, level: Level, message: &str) {
        let text = self.indent_message(message);
        if let Ok(mut sink) = self.sink.lock() {
            sink.write_line(level, &text);
        }
    }

    fn indent_message(&self, message: &str) -> String {
        let indent = "  ".repeat(self.depth);
        message
            .lines()
            .map(|line| format!("{}{}", indent, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}
