use crate::{Bound, Map, Order, PrefixedMap, PrimaryKey, StdResult, Storage};

/// A set of keys, stored as a map with empty values.
pub struct Set<'a, K> {
    map: Map<'a, K, ()>,
}

impl<'a, K> Set<'a, K> {
    pub const fn new(namespace: &'a str) -> Self {
        Self {
            map: Map::new(namespace),
        }
    }
}

impl<K> Set<'_, K>
where
    K: PrimaryKey,
{
    pub fn has(&self, storage: &dyn Storage, key: K) -> bool {
        self.map.has(storage, key)
    }

    pub fn insert(&self, storage: &mut dyn Storage, key: K) -> StdResult<()> {
        self.map.save(storage, key, &())
    }

    pub fn remove(&self, storage: &mut dyn Storage, key: K) {
        self.map.remove(storage, key);
    }

    pub fn range<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<K>>,
        max: Option<Bound<K>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<K::Output>> + 'b> {
        self.map.keys(storage, min, max, order)
    }

    pub fn clear(&self, storage: &mut dyn Storage, min: Option<Bound<K>>, max: Option<Bound<K>>) {
        self.map.clear(storage, min, max);
    }

    /// Narrow the set down to the keys starting with the given prefix.
    pub fn prefix(&self, prefix: K::Prefix) -> PrefixedMap<K::Suffix, ()> {
        self.map.prefix(prefix)
    }
}
