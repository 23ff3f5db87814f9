use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Sliding-window counter: a count per key plus a time-ordered queue of the
/// increments still inside the window. Expired events are trimmed from the
/// front before every read and write, so counts stay O(1) amortized.
///
/// Seeded keys keep their zero count after eviction; everything else is
/// dropped at zero so high-cardinality keys do not accumulate.
pub struct RollingCounter<K> {
    window: Duration,
    counts: HashMap<K, u64>,
    events: VecDeque<(Instant, K)>,
    seeded: HashSet<K>,
}

impl<K: Eq + Hash + Clone> RollingCounter<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            counts: HashMap::new(),
            events: VecDeque::new(),
            seeded: HashSet::new(),
        }
    }

    /// Registers a key that must appear with a zero count even when no
    /// event for it is inside the window.
    pub fn seed(&mut self, key: K) {
        self.counts.entry(key.clone()).or_insert(0);
        self.seeded.insert(key);
    }

    pub fn record(&mut self, key: K, now: Instant) {
        self.evict(now);
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        self.events.push_back((now, key));
    }

    /// Drops events recorded at or before `now - window`.
    pub fn evict(&mut self, now: Instant) {
        while let Some((t, _)) = self.events.front() {
            if now.duration_since(*t) < self.window {
                break;
            }
            if let Some((_, key)) = self.events.pop_front() {
                if let Some(count) = self.counts.get_mut(&key) {
                    *count = count.saturating_sub(1);
                    if *count == 0 && !self.seeded.contains(&key) {
                        self.counts.remove(&key);
                    }
                }
            }
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<K, u64> {
        &self.counts
    }
}

/// All-time counter with a cardinality bound. Counts are never evicted,
/// but once the key count reaches 1.5x the retention size the map is
/// compacted back down to exactly `retain` keys, keeping the most frequent
/// ones. Bounds memory under arbitrary-cardinality input.
pub struct TopCounter<K> {
    counts: HashMap<K, u64>,
    retain: usize,
}

impl<K: Eq + Hash + Ord + Clone> TopCounter<K> {
    pub fn new(retain: usize) -> Self {
        Self {
            counts: HashMap::new(),
            retain,
        }
    }

    pub fn record(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
        if self.counts.len() >= self.retain + self.retain / 2 {
            self.compact();
        }
    }

    fn compact(&mut self) {
        let mut entries: Vec<(K, u64)> = self.counts.drain().collect();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        entries.truncate(self.retain);
        self.counts = entries.into_iter().collect();
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent keys, ties broken by key order for stable
    /// report output.
    pub fn most_common(&self, n: usize) -> Vec<(&K, u64)> {
        let mut entries: Vec<(&K, u64)> = self.counts.iter().map(|(k, &c)| (k, c)).collect();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        entries.truncate(n);
        entries
    }
}
