//! Writer trait for log output destinations

use super::error::Result;

/// Sink for formatted output
///
/// `payload` is one formatted record, or several joined with `\n` when the
/// caller batches. It never carries a trailing newline; line-oriented writers
/// append their own. Implementations use interior mutability because one
/// writer is shared by every thread that logs through its pipeline.
pub trait Writer: Send + Sync {
    fn write(&self, payload: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<F> Writer for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn write(&self, payload: &str) -> Result<()> {
        self(payload)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
