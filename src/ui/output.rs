//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! All user-facing output goes through a [`Console`], which owns the
//! standard output and diagnostic streams. Progress lines and results are
//! always written; decoration (banners, spacing) is dropped in quiet mode.
//! Tests swap the streams for [`SharedBuffer`]s and read them back.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default tracing filter directive for this verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "debug",
        }
    }
}

/// Destination for everything the tool prints.
///
/// Write failures (e.g. a closed pipe) are ignored; there is nowhere left
/// to report them.
pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    verbosity: Verbosity,
}

impl Console {
    /// Console on the process's stdout and stderr.
    pub fn stdio(verbosity: Verbosity) -> Self {
        Self::new(io::stdout(), io::stderr(), verbosity)
    }

    /// Console on arbitrary streams.
    pub fn new(out: impl Write + 'static, err: impl Write + 'static, verbosity: Verbosity) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            verbosity,
        }
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Print a line of output (always shown).
    pub fn line(&mut self, message: impl Display) {
        let _ = writeln!(self.out, "{}", message);
    }

    /// Print a decorative line (respects quiet mode).
    pub fn note(&mut self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            self.line(message);
        }
    }

    /// Print an empty spacer line (respects quiet mode).
    pub fn blank(&mut self) {
        self.note("");
    }

    /// Print a message surrounded by spacer lines.
    pub fn banner(&mut self, message: impl Display) {
        self.blank();
        self.note(message);
        self.blank();
    }

    /// Print a message surrounded by spacer lines on the diagnostic stream
    /// (always shown).
    pub fn failure(&mut self, message: impl Display) {
        self.diag("");
        self.diag(message);
        self.diag("");
    }

    /// Print a line to the diagnostic stream, verbatim (always shown).
    pub fn diag(&mut self, message: impl Display) {
        let _ = writeln!(self.err, "{}", message);
    }

    /// Print an error message (always shown).
    pub fn error(&mut self, message: impl Display) {
        self.diag(format_args!("error: {}", message));
    }

    /// Flush both streams.
    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

/// In-memory stream whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written text split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console writing into fresh buffers, returned alongside it.
pub fn capture(verbosity: Verbosity) -> (Console, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::new();
    let err = SharedBuffer::new();
    let console = Console::new(out.clone(), err.clone(), verbosity);
    (console, out, err)
}
