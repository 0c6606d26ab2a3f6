use std::fmt::Debug;

/// Index of a slot in the buffer pool's frame array.
pub type FrameId = usize;

/// Tracks frame usage and picks eviction victims when the pool is full.
///
/// A replacer only does frame-id bookkeeping; it never touches page bytes.
/// All methods take `&mut self`: the buffer pool invokes the replacer while
/// holding its own latch, so the replacer carries no lock of its own.
pub trait Replacer: Send + Sync + Debug {
    /// Record an access to `frame_id` at the current logical time. Unknown or
    /// out-of-range frame ids are ignored.
    fn record_access(&mut self, frame_id: FrameId);

    /// Toggle whether a tracked frame may be returned by `evict`. Untracked
    /// frame ids are a no-op.
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool);

    /// Select a victim among the evictable frames and drop all of its state.
    /// Returns `None` if no frame can be evicted.
    fn evict(&mut self) -> Option<FrameId>;

    /// Unconditionally drop a frame's history and evictable flag. The caller
    /// must ensure the frame is not pinned.
    fn remove(&mut self, frame_id: FrameId);

    /// Number of evictable tracked frames.
    fn size(&self) -> usize;
}
