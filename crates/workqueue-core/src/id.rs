//! Work entry identifier type

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a work entry
///
/// Ids are handed out from a process-wide monotonic counter. They exist
/// for debugging and log correlation only; no dispatch decision is ever
/// made from an id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntryId(u64);

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

impl EntryId {
    /// Sentinel value indicating no entry
    pub const NONE: EntryId = EntryId(0);

    /// Allocate the next id from the global counter
    #[inline]
    pub fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an EntryId from a raw value
    #[inline]
    pub const fn from_raw(id: u64) -> Self {
        EntryId(id)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Check if this is the NONE sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wq#{}", self.0)
    }
}
