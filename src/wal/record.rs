//! WAL record types.

use crate::page::PageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log sequence number. Monotonically increasing; orders log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lsn(pub u64);

impl Lsn {
    /// Sentinel for "no record". Real LSNs start at 1.
    pub const INVALID: Lsn = Lsn(0);

    pub fn next(&self) -> Self {
        Lsn(self.0 + 1)
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lsn({})", self.0)
    }
}

/// What a log record describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogPayload {
    Begin { txn_id: u64 },
    Commit { txn_id: u64 },
    Abort { txn_id: u64 },
    /// A byte-range change to a page: offset plus before/after images.
    PageDelta {
        page_id: PageId,
        offset: u16,
        before: Vec<u8>,
        after: Vec<u8>,
    },
    Checkpoint,
}

/// A single WAL entry: the payload stamped with its LSN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub lsn: Lsn,
    pub payload: LogPayload,
}
