//! File writer implementation

use crate::core::{diagnostics, LoggerError, Result, Writer};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends payloads to a single file
///
/// Naming and rotation are left to the host; this writer only appends.
pub struct FileWriter {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    flush_each_write: bool,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            flush_each_write: false,
        })
    }

    /// Flush the OS buffer after every payload instead of only on `flush()`
    #[must_use]
    pub fn with_flush_each_write(mut self, enabled: bool) -> Self {
        self.flush_each_write = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Writer for FileWriter {
    fn write(&self, payload: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        if self.flush_each_write {
            writer.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        if let Err(e) = self.writer.get_mut().flush() {
            diagnostics::report("file writer", &LoggerError::from(e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_writer_appends_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("app.log");

        let writer = FileWriter::new(&path)?;
        writer.write("first")?;
        writer.write("second\nthird")?;
        writer.flush()?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn test_file_writer_reopens_in_append_mode() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");

        {
            let writer = FileWriter::new(&path)?;
            writer.write("one")?;
        }
        let writer = FileWriter::new(&path)?.with_flush_each_write(true);
        writer.write("two")?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "one\ntwo\n");
        Ok(())
    }
}
