//! Rune resolution cache
//!
//! Bounded least-recently-used cache from `(families, aspect, rune)` to the
//! resolved face. Entries live in an arena and are chained by index in
//! recency order; a hash map locates them by key.

use crate::aspect::Aspect;
use crate::face::Face;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Default number of cached resolutions
pub const DEFAULT_RUNE_CACHE_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LruKey {
    families_hash: u64,
    aspect: Aspect,
    rune: char,
}

#[derive(Debug)]
struct Slot {
    key: LruKey,
    families: Vec<String>,
    face: Face,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered by the cache
    pub hits: u64,
    /// Number of lookups not found in the cache
    pub misses: u64,
    /// Number of entries dropped to stay within capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Get the hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Recency cache of rune resolutions
#[derive(Debug)]
pub struct RuneLru {
    capacity: usize,
    slots: Vec<Slot>,
    index: HashMap<LruKey, usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    /// Seed of the family list hash, renewed on each clear
    seed: RandomState,
    stats: CacheStats,
}

impl RuneLru {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            seed: RandomState::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping every entry.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.seed = RandomState::new();
    }

    fn key(&self, families: &[String], aspect: Aspect, rune: char) -> LruKey {
        LruKey {
            families_hash: self.seed.hash_one(families),
            aspect,
            rune,
        }
    }

    /// Look up a resolution, marking it as most recently used.
    ///
    /// The stored family list must equal `families`, so that two lists with
    /// the same hash never share an entry.
    pub fn get(&mut self, families: &[String], aspect: Aspect, rune: char) -> Option<Face> {
        let key = self.key(families, aspect, rune);
        let slot = match self.index.get(&key) {
            Some(&slot) if self.slots[slot].families == families => slot,
            _ => {
                self.stats.misses += 1;
                return None;
            }
        };
        self.stats.hits += 1;
        self.unlink(slot);
        self.push_front(slot);
        Some(self.slots[slot].face.clone())
    }

    /// Record a resolution, evicting the least recently used entry when the
    /// cache is full.
    pub fn insert(&mut self, families: &[String], aspect: Aspect, rune: char, face: Face) {
        if self.capacity == 0 {
            return;
        }
        let key = self.key(families, aspect, rune);

        if let Some(slot) = self.index.get(&key).copied() {
            let entry = &mut self.slots[slot];
            entry.families = families.to_vec();
            entry.face = face;
            self.unlink(slot);
            self.push_front(slot);
            return;
        }

        let slot = if self.slots.len() < self.capacity {
            self.slots.push(Slot {
                key,
                families: families.to_vec(),
                face,
                prev: None,
                next: None,
            });
            self.slots.len() - 1
        } else {
            // reuse the storage of the least recently used entry
            let Some(lru) = self.tail else {
                return;
            };
            self.unlink(lru);
            let evicted = std::mem::replace(
                &mut self.slots[lru],
                Slot {
                    key,
                    families: families.to_vec(),
                    face,
                    prev: None,
                    next: None,
                },
            );
            self.index.remove(&evicted.key);
            self.stats.evictions += 1;
            lru
        };
        self.index.insert(key, slot);
        self.push_front(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    fn push_front(&mut self, slot: usize) {
        self.slots[slot].next = self.head;
        if let Some(h) = self.head {
            self.slots[h].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}

impl Default for RuneLru {
    fn default() -> Self {
        Self::new(DEFAULT_RUNE_CACHE_SIZE)
    }
}
