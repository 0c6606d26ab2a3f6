use super::replacer::{FrameId, Replacer};
use std::collections::{HashMap, HashSet, VecDeque};

/// LRU-K replacement policy.
///
/// Among evictable frames, the victim is the one with the greatest backward
/// k-distance: the elapsed logical time since the frame's k-th most recent
/// access, infinite for frames with fewer than k recorded accesses.
///
/// Bookkeeping is split into two tiers:
/// - a preliminary tier for frames with fewer than k accesses, ordered by
///   their earliest recorded access (all infinite distances tie, so they
///   fall back to classical LRU on the first access);
/// - a cache tier for frames with at least k accesses, keeping only the k
///   most recent timestamps, ordered by the oldest retained one.
///
/// Eviction always prefers the preliminary tier; the cache tier is consulted
/// only when no evictable preliminary frame exists. Victim search is a linear
/// scan over the tier, which is fine at the pool sizes this crate targets.
#[derive(Debug)]
pub struct LruKReplacer {
    k: usize,
    /// Frame ids live in `[0, capacity)`; anything else is ignored.
    capacity: usize,
    /// Logical clock. Advances once per recorded access.
    clock: u64,
    preliminary: HashMap<FrameId, VecDeque<u64>>,
    cache: HashMap<FrameId, VecDeque<u64>>,
    evictable: HashSet<FrameId>,
}

impl LruKReplacer {
    pub fn new(capacity: usize, k: usize) -> Self {
        assert!(k > 0, "LRU-K requires k >= 1");
        Self {
            k,
            capacity,
            clock: 0,
            preliminary: HashMap::new(),
            cache: HashMap::new(),
            evictable: HashSet::new(),
        }
    }

    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    fn is_tracked(&self, frame_id: FrameId) -> bool {
        self.preliminary.contains_key(&frame_id) || self.cache.contains_key(&frame_id)
    }

    /// The evictable frame in `tier` with the oldest front timestamp.
    fn victim_in(
        tier: &HashMap<FrameId, VecDeque<u64>>,
        evictable: &HashSet<FrameId>,
    ) -> Option<FrameId> {
        tier.iter()
            .filter(|&(frame_id, _)| evictable.contains(frame_id))
            .min_by_key(|&(_, history)| history.front().copied().unwrap_or(u64::MAX))
            .map(|(&frame_id, _)| frame_id)
    }
}

impl Replacer for LruKReplacer {
    fn record_access(&mut self, frame_id: FrameId) {
        if frame_id >= self.capacity {
            return;
        }
        let now = self.tick();

        // A cached frame keeps a bounded window: drop the oldest of its k
        // timestamps and append the new one.
        if let Some(history) = self.cache.get_mut(&frame_id) {
            history.pop_front();
            history.push_back(now);
            return;
        }

        let promote = {
            let history = self.preliminary.entry(frame_id).or_default();
            history.push_back(now);
            history.len() >= self.k
        };

        // The k-th access graduates the frame into the cache tier.
        if promote {
            if let Some(history) = self.preliminary.remove(&frame_id) {
                self.cache.insert(frame_id, history);
            }
        }
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if !self.is_tracked(frame_id) {
            return;
        }
        if evictable {
            self.evictable.insert(frame_id);
        } else {
            self.evictable.remove(&frame_id);
        }
    }

    fn evict(&mut self) -> Option<FrameId> {
        // Preliminary frames have infinite backward k-distance and always
        // beat cached frames.
        let victim = Self::victim_in(&self.preliminary, &self.evictable)
            .or_else(|| Self::victim_in(&self.cache, &self.evictable))?;

        self.preliminary.remove(&victim);
        self.cache.remove(&victim);
        self.evictable.remove(&victim);
        Some(victim)
    }

    fn remove(&mut self, frame_id: FrameId) {
        self.preliminary.remove(&frame_id);
        self.cache.remove(&frame_id);
        self.evictable.remove(&frame_id);
    }

    fn size(&self) -> usize {
        self.evictable.len()
    }
}
