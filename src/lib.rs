//! A buffer pool manager for disk-backed storage engines.
//!
//! The pool caches fixed-size disk pages in a bounded set of in-memory
//! frames, mediating all page-level I/O for higher layers:
//! - pinned page access through RAII guards
//! - LRU-K replacement with pluggable policies
//! - write-back of dirty pages on eviction and explicit flushes
//! - a file-backed disk manager and a write-ahead logging hook

pub mod buffer;
pub mod disk;
pub mod error;
pub mod page;
pub mod wal;

pub use buffer::replacer::{FrameId, Replacer};
pub use buffer::{BufferPoolManager, PageReadGuard, PageWriteGuard};
pub use disk::{DiskManager, IoStats, PAGE_SIZE};
pub use error::{StorageError, StorageResult};
pub use page::PageId;
