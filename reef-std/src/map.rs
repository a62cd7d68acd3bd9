use {
    crate::{
        nested_namespaces_with_key, Borsh, Codec, Order, PrimaryKey, StdError, StdResult, Storage,
    },
    std::marker::PhantomData,
};

/// An inclusive or exclusive bound on a key range.
pub enum Bound<K> {
    Inclusive(K),
    Exclusive(K),
}

impl<K> Bound<K>
where
    K: PrimaryKey,
{
    fn to_raw_min(&self) -> Vec<u8> {
        match self {
            Bound::Inclusive(key) => key.joined_key(),
            Bound::Exclusive(key) => {
                // The smallest byte string strictly greater than `key`.
                let mut raw = key.joined_key();
                raw.push(0);
                raw
            },
        }
    }

    fn to_raw_max(&self) -> Vec<u8> {
        match self {
            Bound::Inclusive(key) => {
                let mut raw = key.joined_key();
                raw.push(0);
                raw
            },
            Bound::Exclusive(key) => key.joined_key(),
        }
    }
}

/// The end of the key range covered by `prefix`: the smallest byte string
/// greater than every string starting with `prefix`. `None` means unbounded.
fn prefix_range_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last() {
        if *last == u8::MAX {
            end.pop();
        } else {
            *end.last_mut().unwrap() += 1;
            return Some(end);
        }
    }
    None
}

fn range_bounds<K>(
    prefix: &[u8],
    min: Option<&Bound<K>>,
    max: Option<&Bound<K>>,
) -> (Vec<u8>, Option<Vec<u8>>)
where
    K: PrimaryKey,
{
    let min = match min {
        Some(bound) => {
            let mut raw = prefix.to_vec();
            raw.extend(bound.to_raw_min());
            raw
        },
        None => prefix.to_vec(),
    };
    let max = match max {
        Some(bound) => {
            let mut raw = prefix.to_vec();
            raw.extend(bound.to_raw_max());
            Some(raw)
        },
        None => prefix_range_end(prefix),
    };
    (min, max)
}

/// A typed key-value namespace in the KV store.
pub struct Map<'a, K, V, C = Borsh> {
    namespace: &'a str,
    key: PhantomData<K>,
    value: PhantomData<V>,
    codec: PhantomData<C>,
}

impl<'a, K, V, C> Map<'a, K, V, C> {
    pub const fn new(namespace: &'a str) -> Self {
        Self {
            namespace,
            key: PhantomData,
            value: PhantomData,
            codec: PhantomData,
        }
    }

    fn namespace_prefix(&self) -> Vec<u8> {
        nested_namespaces_with_key(Some(self.namespace.as_bytes()), &[], None)
    }
}

impl<K, V, C> Map<'_, K, V, C>
where
    K: PrimaryKey,
    C: Codec<V>,
{
    pub fn path(&self, key: K) -> Vec<u8> {
        let mut full = self.namespace_prefix();
        full.extend(key.joined_key());
        full
    }

    pub fn has(&self, storage: &dyn Storage, key: K) -> bool {
        storage.read(&self.path(key)).is_some()
    }

    pub fn may_load(&self, storage: &dyn Storage, key: K) -> StdResult<Option<V>> {
        storage
            .read(&self.path(key))
            .map(|value| C::decode(&value))
            .transpose()
    }

    pub fn load(&self, storage: &dyn Storage, key: K) -> StdResult<V> {
        let path = self.path(key);
        storage
            .read(&path)
            .ok_or_else(|| StdError::data_not_found::<V>(&path))
            .and_then(|value| C::decode(&value))
    }

    pub fn save(&self, storage: &mut dyn Storage, key: K, value: &V) -> StdResult<()> {
        let value_raw = C::encode(value)?;
        storage.write(&self.path(key), &value_raw);
        Ok(())
    }

    pub fn remove(&self, storage: &mut dyn Storage, key: K) {
        storage.remove(&self.path(key));
    }

    pub fn may_modify<F, E>(
        &self,
        storage: &mut dyn Storage,
        key: K,
        action: F,
    ) -> Result<Option<V>, E>
    where
        K: Copy,
        F: FnOnce(Option<V>) -> Result<Option<V>, E>,
        E: From<StdError>,
    {
        let maybe_data = action(self.may_load(storage, key)?)?;

        match &maybe_data {
            Some(data) => self.save(storage, key, data)?,
            None => self.remove(storage, key),
        }

        Ok(maybe_data)
    }

    pub fn range<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<K>>,
        max: Option<Bound<K>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<(K::Output, V)>> + 'b> {
        let prefix = self.namespace_prefix();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan(Some(&min), max.as_deref(), order)
            .map(move |(k, v)| {
                let key = K::from_slice(&k[prefix.len()..])?;
                let value = C::decode(&v)?;
                Ok((key, value))
            });
        Box::new(iter)
    }

    pub fn keys<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<K>>,
        max: Option<Bound<K>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<K::Output>> + 'b> {
        let prefix = self.namespace_prefix();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan_keys(Some(&min), max.as_deref(), order)
            .map(move |k| K::from_slice(&k[prefix.len()..]));
        Box::new(iter)
    }

    pub fn values<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<K>>,
        max: Option<Bound<K>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<V>> + 'b> {
        let prefix = self.namespace_prefix();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan_values(Some(&min), max.as_deref(), order)
            .map(|v| C::decode(&v));
        Box::new(iter)
    }

    pub fn clear(&self, storage: &mut dyn Storage, min: Option<Bound<K>>, max: Option<Bound<K>>) {
        let prefix = self.namespace_prefix();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        storage.remove_range(Some(&min), max.as_deref());
    }

    /// Narrow the map down to the keys starting with the given prefix.
    pub fn prefix(&self, prefix: K::Prefix) -> PrefixedMap<K::Suffix, V, C> {
        let mut raw = self.namespace_prefix();
        raw.extend(prefix.joined_prefix());
        PrefixedMap {
            prefix: raw,
            key: PhantomData,
            value: PhantomData,
            codec: PhantomData,
        }
    }
}

/// A view of a [`Map`] under a fixed key prefix, iterable by the remaining
/// key elements.
pub struct PrefixedMap<S, V, C = Borsh> {
    prefix: Vec<u8>,
    key: PhantomData<S>,
    value: PhantomData<V>,
    codec: PhantomData<C>,
}

impl<S, V, C> PrefixedMap<S, V, C>
where
    S: PrimaryKey,
    C: Codec<V>,
{
    pub fn range<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<S>>,
        max: Option<Bound<S>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<(S::Output, V)>> + 'b> {
        let prefix = self.prefix.clone();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan(Some(&min), max.as_deref(), order)
            .map(move |(k, v)| {
                let key = S::from_slice(&k[prefix.len()..])?;
                let value = C::decode(&v)?;
                Ok((key, value))
            });
        Box::new(iter)
    }

    pub fn keys<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<S>>,
        max: Option<Bound<S>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<S::Output>> + 'b> {
        let prefix = self.prefix.clone();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan_keys(Some(&min), max.as_deref(), order)
            .map(move |k| S::from_slice(&k[prefix.len()..]));
        Box::new(iter)
    }

    pub fn values<'b>(
        &self,
        storage: &'b dyn Storage,
        min: Option<Bound<S>>,
        max: Option<Bound<S>>,
        order: Order,
    ) -> Box<dyn Iterator<Item = StdResult<V>> + 'b> {
        let prefix = self.prefix.clone();
        let (min, max) = range_bounds(&prefix, min.as_ref(), max.as_ref());
        let iter = storage
            .scan_values(Some(&min), max.as_deref(), order)
            .map(|v| C::decode(&v));
        Box::new(iter)
    }

    pub fn clear(&self, storage: &mut dyn Storage, min: Option<Bound<S>>, max: Option<Bound<S>>) {
        let (min, max) = range_bounds(&self.prefix, min.as_ref(), max.as_ref());
        storage.remove_range(Some(&min), max.as_deref());
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, crate::MemStorage};

    const BALANCES: Map<(&str, &str), u64> = Map::new("balance");

    #[test]
    fn save_load_remove() {
        let mut storage = MemStorage::new();

        BALANCES.save(&mut storage, ("alice", "gold"), &100).unwrap();

        assert_eq!(BALANCES.load(&storage, ("alice", "gold")).unwrap(), 100);
        assert_eq!(BALANCES.may_load(&storage, ("bob", "gold")).unwrap(), None);

        BALANCES.remove(&mut storage, ("alice", "gold"));

        assert!(!BALANCES.has(&storage, ("alice", "gold")));
    }

    #[test]
    fn range_and_prefix() {
        let mut storage = MemStorage::new();

        BALANCES.save(&mut storage, ("alice", "gold"), &100).unwrap();
        BALANCES.save(&mut storage, ("alice", "iron"), &50).unwrap();
        BALANCES.save(&mut storage, ("bob", "gold"), &75).unwrap();

        let all = BALANCES
            .range(&storage, None, None, Order::Ascending)
            .collect::<StdResult<Vec<_>>>()
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], (("alice".to_string(), "gold".to_string()), 100));

        let alices = BALANCES
            .prefix("alice")
            .range(&storage, None, None, Order::Ascending)
            .collect::<StdResult<Vec<_>>>()
            .unwrap();
        assert_eq!(alices, vec![
            ("gold".to_string(), 100),
            ("iron".to_string(), 50),
        ]);
    }

    #[test]
    fn bounded_range() {
        const SEQUENCES: Map<u64, u64> = Map::new("seq");

        let mut storage = MemStorage::new();
        for i in 0..5 {
            SEQUENCES.save(&mut storage, i, &i).unwrap();
        }

        let keys = SEQUENCES
            .keys(
                &storage,
                Some(Bound::Inclusive(1)),
                Some(Bound::Exclusive(4)),
                Order::Ascending,
            )
            .collect::<StdResult<Vec<_>>>()
            .unwrap();
        assert_eq!(keys, vec![1, 2, 3]);
    }
}
