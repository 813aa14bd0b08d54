//! Console writer implementation

use crate::core::{Result, Writer};
use std::io::Write;

/// Which standard stream a [`ConsoleWriter`] targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes payloads to stdout or stderr, one line per record
///
/// The stream lock is held for the whole payload so a batch is never
/// interleaved with output from other threads.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    stream: ConsoleStream,
}

impl ConsoleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Writer for ConsoleWriter {
    fn write(&self, payload: &str) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(payload.as_bytes())?;
                handle.write_all(b"\n")?;
            }
            ConsoleStream::Stderr => {
                let stderr = std::io::stderr();
                let mut handle = stderr.lock();
                handle.write_all(payload.as_bytes())?;
                handle.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}
