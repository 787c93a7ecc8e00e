//! Structured error types for perf map parsing and lookup.
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerfMapError {
    /// The map file could not be opened or read. Fatal to this read attempt;
    /// the caller gets no partial snapshot.
    #[error("failed to read perf map {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A non-blank line failed the `<start-hex> <size-hex> <symbol>` grammar.
    /// One corrupt line fails the whole file: a partially-built index could
    /// silently mis-attribute samples.
    #[error("malformed perf map line {line_no}: {line:?}")]
    Format { line_no: usize, line: String },

    /// The looked-up address falls outside every known range. An expected,
    /// common outcome ("this address is not JIT code"), not a system fault.
    #[error("no symbol found for address")]
    NoSymbolFound,
}

impl PerfMapError {
    /// True for an ordinary lookup miss, as opposed to a broken map file.
    #[must_use]
    pub fn is_no_symbol_found(&self) -> bool {
        matches!(self, PerfMapError::NoSymbolFound)
    }
}
