//! Immutable address index with binary-search lookup.
//!
//! A [`PerfMap`] is one point-in-time snapshot of a runtime's perf map file:
//! a sequence of address ranges sorted ascending by start address. It is
//! built once by the parser and never mutated afterwards, so any number of
//! threads may run lookups against the same snapshot without locking.

use crate::error::PerfMapError;

/// One entry of a perf map: the half-open address range
/// `[start, end)` owned by `symbol`.
///
/// The symbol is whatever the runtime wrote after the two hex fields,
/// verbatim. It may contain spaces, colons, and tildes
/// (e.g. `LazyCompile:~remove internal/linkedlist.js:15`); this crate never
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAddr {
    /// First address of the range, inclusive.
    pub start: u64,
    /// One past the last address of the range, exclusive.
    pub end: u64,
    /// Symbol owning the range, as an opaque string.
    pub symbol: String,
}

/// Immutable snapshot of a parsed perf map.
///
/// Construct one with [`read_perf_map`](crate::read_perf_map); query it with
/// [`lookup`](PerfMap::lookup). A fresh parse produces a fresh snapshot —
/// there is no in-place update, so a snapshot handed to concurrent samplers
/// stays valid while a newer one is being built.
#[derive(Debug, Default)]
pub struct PerfMap {
    addrs: Vec<MapAddr>,
}

impl PerfMap {
    /// Build a snapshot from decoded entries, sorting by start address.
    ///
    /// The sort is stable: entries with equal starts keep file order, which
    /// fixes the shadowing tie-break (`lookup` picks the rightmost candidate,
    /// so for duplicate starts the last line in the file wins).
    pub(crate) fn new(mut addrs: Vec<MapAddr>) -> Self {
        addrs.sort_by_key(|a| a.start);
        PerfMap { addrs }
    }

    /// Resolve an instruction address to the symbol owning it.
    ///
    /// Binary search for the entry with the greatest `start <= addr`, then
    /// verify `addr < end`. Entries whose ranges overlap resolve to the one
    /// with the larger start: the runtime recompiled that region, and the
    /// later entry shadows the earlier one. Only the rightmost candidate is
    /// checked; if it is too short to cover `addr`, the lookup misses even
    /// when an earlier, wider range would have.
    ///
    /// # Errors
    /// [`PerfMapError::NoSymbolFound`] if the address falls outside every
    /// known range. Callers should absorb this as "unresolved frame", not
    /// treat it as a profiling-run failure.
    pub fn lookup(&self, addr: u64) -> Result<&str, PerfMapError> {
        let idx = self.addrs.partition_point(|a| a.start <= addr);
        let candidate = idx
            .checked_sub(1)
            .and_then(|i| self.addrs.get(i))
            .ok_or(PerfMapError::NoSymbolFound)?;

        if addr < candidate.end {
            Ok(&candidate.symbol)
        } else {
            Err(PerfMapError::NoSymbolFound)
        }
    }

    /// All entries, sorted ascending by start address.
    #[must_use]
    pub fn ranges(&self) -> &[MapAddr] {
        &self.addrs
    }

    /// Number of entries in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
