//! # perfmap - JIT perf map parsing and symbolization
//!
//! JIT runtimes (V8/Node.js, the BEAM, and others) compile code at runtime,
//! so a profiler sampling instruction pointers from such a process sees raw
//! addresses that no ELF symbol table explains. The perf map convention
//! fills the gap: the runtime appends one line per compiled code block to
//! `/tmp/perf-<pid>.map`, naming the block's address range and symbol:
//!
//! ```text
//! 4edd4f12 35 LazyCompile:~remove internal/linkedlist.js:15
//! ```
//!
//! meaning the half-open range `[0x4edd4f12, 0x4edd4f47)` belongs to that
//! function. This crate reads such a file into an immutable, sorted snapshot
//! and answers "what symbol owns address A" in O(log n):
//!
//! ```text
//! file bytes ──▶ parser ──▶ sorted ranges ──▶ PerfMap::lookup(addr) ──▶ symbol
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use perfmap::read_perf_map;
//!
//! # fn main() -> Result<(), perfmap::PerfMapError> {
//! let map = read_perf_map("/tmp/perf-4093.map")?;
//! match map.lookup(0x4edd_4f16) {
//!     Ok(symbol) => println!("{symbol}"),
//!     Err(err) if err.is_no_symbol_found() => println!("<unknown>"),
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design notes
//!
//! - Parsing is strict: one malformed line fails the whole read. A silently
//!   truncated index would mis-attribute profiling cost to the wrong symbol,
//!   which is worse than a loud error.
//! - The symbol field is opaque. `LazyCompile:~` and friends are V8's
//!   business; a BEAM map with entirely different naming parses identically.
//! - Snapshots are immutable. A runtime keeps appending to its map file, but
//!   refresh is modeled as "parse again, swap the value" (see
//!   [`PerfMapCache`]), never in-place mutation; the lookup path needs no
//!   locks.
//! - Overlapping ranges resolve to the entry with the larger start — the
//!   runtime recompiled that region and the later entry shadows the earlier
//!   one. For duplicate starts, the last line in the file wins.

pub mod error;
pub mod map;
pub mod parser;
pub mod process;

pub use error::PerfMapError;
pub use map::{MapAddr, PerfMap};
pub use parser::read_perf_map;
pub use process::{find_perf_map_path, PerfMapCache};
