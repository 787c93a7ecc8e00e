//! Locating a process's perf map file and caching parsed snapshots.
//!
//! A JIT runtime writes its map to `/tmp/perf-<pid>.map` using the pid it
//! sees *inside its own pid namespace*, so for a containerized process the
//! host-side path is `/proc/<host-pid>/root/tmp/perf-<ns-pid>.map`. The
//! namespace pid comes from the `NSpid` row of `/proc/<pid>/status`.
//!
//! Runtimes keep appending to the file over the process lifetime, so
//! [`PerfMapCache`] re-parses on demand when the file has changed and hands
//! out `Arc` snapshots; lookups in flight on an old snapshot are never
//! disturbed by a refresh.

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::PerfMapError;
use crate::map::PerfMap;
use crate::parser::read_perf_map;

/// Resolve the perf map path for a process, namespace-aware.
///
/// # Errors
/// [`PerfMapError::Read`] if `/proc/<pid>/status` is not readable (process
/// gone, or insufficient permissions).
pub fn find_perf_map_path(pid: i32) -> Result<PathBuf, PerfMapError> {
    let status_path = PathBuf::from(format!("/proc/{pid}/status"));
    let status = fs::read_to_string(&status_path)
        .map_err(|source| PerfMapError::Read { path: status_path, source })?;

    let ns_pid = parse_ns_pid(&status).unwrap_or(pid);
    Ok(PathBuf::from(format!("/proc/{pid}/root/tmp/perf-{ns_pid}.map")))
}

/// Extract the innermost namespace pid from `/proc/<pid>/status` contents.
///
/// The `NSpid` row lists the pid at each namespace level, outermost first;
/// the last field is what the process calls itself. Returns `None` on
/// kernels without the row (pre-4.1), in which case the host pid applies.
fn parse_ns_pid(status: &str) -> Option<i32> {
    let row = status.lines().find_map(|l| l.strip_prefix("NSpid:"))?;
    row.split_whitespace().last()?.parse().ok()
}

/// Freshness stamp for a cached snapshot. A runtime only ever appends to its
/// map file, so length alone catches growth; mtime catches truncate-rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: SystemTime,
}

impl FileStamp {
    fn of(path: &Path) -> Result<FileStamp, PerfMapError> {
        let read_err = |source| PerfMapError::Read { path: path.to_path_buf(), source };
        let meta = fs::metadata(path).map_err(read_err)?;
        Ok(FileStamp { len: meta.len(), modified: meta.modified().map_err(read_err)? })
    }
}

/// Demand-driven cache of parsed perf map snapshots, keyed by file path.
///
/// Not a refresh scheduler: it re-reads only when asked, and only when the
/// file's stamp has changed since the cached parse.
#[derive(Debug, Default)]
pub struct PerfMapCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    map: Arc<PerfMap>,
    stamp: FileStamp,
}

impl PerfMapCache {
    #[must_use]
    pub fn new() -> Self {
        PerfMapCache::default()
    }

    /// Snapshot for a process, locating its map file first.
    ///
    /// # Errors
    /// [`PerfMapError::Read`] if the process status or map file is
    /// unreadable, [`PerfMapError::Format`] if the map fails to parse.
    pub fn map_for_pid(&mut self, pid: i32) -> Result<Arc<PerfMap>, PerfMapError> {
        let path = find_perf_map_path(pid)?;
        self.map_for_path(&path)
    }

    /// Snapshot for a map file, parsing it only if it changed since the
    /// cached parse. A parse failure evicts any stale entry rather than
    /// serving ranges that no longer match the file.
    ///
    /// # Errors
    /// [`PerfMapError::Read`] or [`PerfMapError::Format`] as for
    /// [`read_perf_map`].
    pub fn map_for_path(&mut self, path: &Path) -> Result<Arc<PerfMap>, PerfMapError> {
        let stamp = FileStamp::of(path)?;

        if let Some(entry) = self.entries.get(path) {
            if entry.stamp == stamp {
                return Ok(Arc::clone(&entry.map));
            }
            debug!("perf map {} changed, re-parsing", path.display());
        }

        let map = match read_perf_map(path) {
            Ok(map) => Arc::new(map),
            Err(err) => {
                self.entries.remove(path);
                return Err(err);
            }
        };
        self.entries.insert(path.to_path_buf(), CacheEntry { map: Arc::clone(&map), stamp });
        Ok(map)
    }
}
