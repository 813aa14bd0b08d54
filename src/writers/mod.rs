//! Writer implementations

pub mod console;
pub mod file;
pub mod memory;

pub use console::{ConsoleStream, ConsoleWriter};
pub use file::FileWriter;
pub use memory::{MemoryWriter, NullWriter};

pub use crate::core::Writer;
