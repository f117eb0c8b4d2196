//! Content-addressed, process-wide caches for inline images and
//! hypertext (spec §4.F "Inline Objects"), grounded in the teacher's
//! `crc.rs` hashing idiom and its `parking_lot`-guarded shared state.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

/// A 32-bit folded content hash, used as the cache key for both images
/// and hypertext so a cell only needs to carry a `u32` (spec §3 Cell's
/// `data` field) instead of a full string or image buffer.
pub fn fold_hash(bytes: &[u8]) -> u32 {
    // FNV-1a, folded to 32 bits; simple, fast, and collision-rare enough
    // for a display-only dedup cache (not used for anything security
    // sensitive).
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    ((hash >> 32) as u32) ^ (hash as u32)
}

#[derive(Clone, Debug)]
pub struct ImageTile {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

/// A generic, LRU-evicting, hash-keyed object cache shared across every
/// `Page`/`Terminal` clone that points at the same underlying pty; the
/// teacher keeps its palette and font caches similarly global via
/// `once_cell`/`parking_lot`-style statics rather than threading a
/// context handle through every call.
pub struct ObjectCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
}

struct Inner<V> {
    map: HashMap<u32, V>,
    order: Vec<u32>,
}

impl<V: Clone> ObjectCache<V> {
    pub fn new(capacity: usize) -> Self {
        ObjectCache {
            inner: Mutex::new(Inner { map: HashMap::new(), order: Vec::new() }),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: u32) -> Option<V> {
        self.inner.lock().map.get(&key).cloned()
    }

    /// Insert `value` under `key`, evicting the least-recently-inserted
    /// entry if the cache is over capacity. Re-inserting an existing key
    /// refreshes its recency.
    pub fn insert(&self, key: u32, value: V) {
        let mut inner = self.inner.lock();
        if !inner.map.contains_key(&key) {
            inner.order.push(key);
        }
        inner.map.insert(key, value);
        while inner.order.len() > self.capacity {
            let evict = inner.order.remove(0);
            inner.map.remove(&evict);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default cache capacities; generous enough for a long scrollback full
/// of distinct images/links without unbounded growth.
const IMAGE_CACHE_CAPACITY: usize = 256;
const HYPERTEXT_CACHE_CAPACITY: usize = 1024;

static IMAGE_CACHE: OnceLock<ObjectCache<ImageTile>> = OnceLock::new();
static HYPERTEXT_CACHE: OnceLock<ObjectCache<Arc<str>>> = OnceLock::new();
static ANNOTATION_CACHE: OnceLock<ObjectCache<Arc<str>>> = OnceLock::new();

pub fn image_cache() -> &'static ObjectCache<ImageTile> {
    IMAGE_CACHE.get_or_init(|| ObjectCache::new(IMAGE_CACHE_CAPACITY))
}

pub fn hypertext_cache() -> &'static ObjectCache<Arc<str>> {
    HYPERTEXT_CACHE.get_or_init(|| ObjectCache::new(HYPERTEXT_CACHE_CAPACITY))
}

pub fn annotation_cache() -> &'static ObjectCache<Arc<str>> {
    ANNOTATION_CACHE.get_or_init(|| ObjectCache::new(HYPERTEXT_CACHE_CAPACITY))
}

/// Intern a hypertext URI (OSC 8) or annotation string, returning the id
/// a `Cell::data` field should carry.
pub fn intern_text(cache: &ObjectCache<Arc<str>>, text: &str) -> u32 {
    let key = fold_hash(text.as_bytes());
    if cache.get(key).is_none() {
        cache.insert(key, Arc::from(text));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_hash_is_stable() {
        assert_eq!(fold_hash(b"hello"), fold_hash(b"hello"));
        assert_ne!(fold_hash(b"hello"), fold_hash(b"world"));
    }

    #[test]
    fn cache_evicts_oldest() {
        let cache: ObjectCache<u8> = ObjectCache::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
        assert!(cache.get(3).is_some());
    }
}
