//! Perf map file parsing.
//!
//! The format is loosely specified and externally produced: one entry per
//! physical line, `<start-hex> <size-hex> <symbol rest of line>`, no header
//! or footer. The runtime that wrote it may have been killed mid-write, so
//! parsing is strict — a line that fails the grammar fails the whole read
//! rather than silently dropping ranges from the index.

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::PerfMapError;
use crate::map::{MapAddr, PerfMap};

/// Read a perf map file into an immutable, queryable snapshot.
///
/// Opens the file, decodes every line, sorts by start address, and returns
/// the snapshot. All-or-nothing: on error no partial snapshot is produced.
/// Blank lines are skipped; the source need not be pre-sorted (a JIT emits
/// ranges in compilation order, not address order).
///
/// # Errors
/// - [`PerfMapError::Read`] if the file cannot be opened or read.
/// - [`PerfMapError::Format`] if a non-blank line fails the grammar.
pub fn read_perf_map<P: AsRef<Path>>(path: P) -> Result<PerfMap, PerfMapError> {
    let path = path.as_ref();
    let read_err = |source| PerfMapError::Read { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(read_err)?;
    let reader = BufReader::new(file);

    let mut addrs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(read_err)?;
        if line.trim().is_empty() {
            continue;
        }
        addrs.push(parse_line(&line, idx + 1)?);
    }

    debug!("parsed {} perf map entries from {}", addrs.len(), path.display());
    Ok(PerfMap::new(addrs))
}

/// Decode one line into a half-open address range.
///
/// The first two space-separated fields are hex (no `0x` prefix); everything
/// after the second space is the symbol, stored verbatim — it routinely
/// contains spaces, so it must not be tokenized further.
fn parse_line(line: &str, line_no: usize) -> Result<MapAddr, PerfMapError> {
    let format_err = || PerfMapError::Format { line_no, line: line.to_string() };

    let mut fields = line.splitn(3, ' ');
    let start_hex = fields.next().ok_or_else(format_err)?;
    let size_hex = fields.next().ok_or_else(format_err)?;
    let symbol = fields.next().ok_or_else(format_err)?;

    let start = u64::from_str_radix(start_hex, 16).map_err(|_| format_err())?;
    let size = u64::from_str_radix(size_hex, 16).map_err(|_| format_err())?;
    // A size that wraps past u64::MAX cannot describe a real range.
    let end = start.checked_add(size).ok_or_else(format_err)?;

    Ok(MapAddr { start, end, symbol: symbol.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn map_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp map file");
        file.write_all(contents.as_bytes()).expect("write temp map file");
        file
    }

    #[test]
    fn test_parse_line_symbol_kept_verbatim() {
        let addr = parse_line("4edd4f12 35 LazyCompile:~remove internal/linkedlist.js:15", 1)
            .expect("valid line");

        assert_eq!(addr.start, 0x4edd_4f12);
        assert_eq!(addr.end, 0x4edd_4f47);
        assert_eq!(addr.symbol, "LazyCompile:~remove internal/linkedlist.js:15");
    }

    #[test]
    fn test_parse_line_rejects_non_hex_start() {
        let err = parse_line("zzzz 10 foo", 3).unwrap_err();
        assert!(matches!(err, PerfMapError::Format { line_no: 3, .. }));
    }

    #[test]
    fn test_parse_line_rejects_non_hex_size() {
        let err = parse_line("1000 0x10 foo", 1).unwrap_err();
        assert!(matches!(err, PerfMapError::Format { .. }));
    }

    #[test]
    fn test_parse_line_rejects_missing_symbol() {
        let err = parse_line("1000 10", 1).unwrap_err();
        assert!(matches!(err, PerfMapError::Format { .. }));
    }

    #[test]
    fn test_parse_line_rejects_overflowing_size() {
        let err = parse_line("ffffffffffffffff 2 wraps", 1).unwrap_err();
        assert!(matches!(err, PerfMapError::Format { .. }));
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let file = map_file("1000 10 a\n\n2000 10 b\n");
        let map = read_perf_map(file.path()).expect("valid map");

        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(0x2005).unwrap(), "b");
    }

    #[test]
    fn test_read_sorts_by_start() {
        let file = map_file("2000 10 second\n1000 10 first\n");
        let map = read_perf_map(file.path()).expect("valid map");

        assert_eq!(map.ranges()[0].symbol, "first");
        assert_eq!(map.ranges()[1].symbol, "second");
    }

    #[test]
    fn test_read_one_bad_line_fails_whole_file() {
        let file = map_file("1000 10 good\nnot-hex 10 bad\n2000 10 good\n");
        let err = read_perf_map(file.path()).unwrap_err();

        assert!(matches!(err, PerfMapError::Format { line_no: 2, .. }));
    }

    #[test]
    fn test_read_missing_file_is_read_error() {
        let err = read_perf_map("/nonexistent/perf-0.map").unwrap_err();
        assert!(matches!(err, PerfMapError::Read { .. }));
    }

    #[test]
    fn test_boundary_law() {
        // lookup(start) and lookup(start + size - 1) hit; lookup(start + size)
        // misses when nothing starts there.
        let file = map_file("1000 80 sym\n");
        let map = read_perf_map(file.path()).expect("valid map");

        assert_eq!(map.lookup(0x1000).unwrap(), "sym");
        assert_eq!(map.lookup(0x107F).unwrap(), "sym");
        assert!(map.lookup(0x1080).unwrap_err().is_no_symbol_found());
    }
}
