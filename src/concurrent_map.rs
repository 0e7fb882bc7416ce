//! Sharded lock-partitioned map used to accumulate per-document scores
//! from parallel worker tasks.
//!
//! The key space is split across a fixed number of shards, each an ordinary
//! `BTreeMap` behind its own mutex, so writers to different shards never
//! contend. No raw map reference ever escapes a lock: access goes through
//! `with_lock`, `erase`, and the merging snapshot operations.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Integer key that can pick its own shard.
///
/// The selection is a plain cast-and-modulo, matching on every call for a
/// given key and shard count.
pub trait ShardKey: Copy + Ord + Send {
    fn shard_index(self, shard_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard_index(self, shard_count: usize) -> usize {
                (self as u64 % shard_count as u64) as usize
            }
        })*
    };
}

impl_shard_key!(i32, i64, u32, u64, usize);

struct Shard<K, V> {
    map: Mutex<BTreeMap<K, V>>,
}

pub struct ConcurrentMap<K, V> {
    shards: Vec<Shard<K, V>>,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: ShardKey,
    V: Default,
{
    /// Create a map partitioned into `shard_count` independently locked
    /// shards. `shard_count` must be non-zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be non-zero");
        let shards = (0..shard_count)
            .map(|_| Shard {
                map: Mutex::new(BTreeMap::new()),
            })
            .collect();
        ConcurrentMap { shards }
    }

    #[inline]
    fn shard_for(&self, key: K) -> &Shard<K, V> {
        &self.shards[key.shard_index(self.shards.len())]
    }

    /// Run `op` on the value for `key` under the owning shard's lock,
    /// default-constructing the value if the key is absent.
    pub fn with_lock<R>(&self, key: K, op: impl FnOnce(&mut V) -> R) -> R {
        let mut map = self.shard_for(key).map.lock();
        op(map.entry(key).or_default())
    }

    /// Remove `key` under its shard's lock. No-op when absent.
    pub fn erase(&self, key: K) {
        self.shard_for(key).map.lock().remove(&key);
    }

    /// Merge every shard into one ordinary map, taking each shard's lock
    /// in turn. Safe to call while other threads keep writing; the result
    /// is consistent per shard.
    pub fn snapshot(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut merged = BTreeMap::new();
        for shard in &self.shards {
            let map = shard.map.lock();
            merged.extend(map.iter().map(|(k, v)| (*k, v.clone())));
        }
        merged
    }

    /// Consume the map and merge all shards without cloning values. Used
    /// once every worker task has joined.
    pub fn into_snapshot(self) -> BTreeMap<K, V> {
        self.shards
            .into_iter()
            .flat_map(|shard| shard.map.into_inner())
            .collect()
    }
}
