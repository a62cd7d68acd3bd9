use {
    crate::{Order, Record, Storage},
    std::collections::BTreeMap,
};

/// A pending write or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Insert(Vec<u8>),
    Delete,
}

pub type Batch = BTreeMap<Vec<u8>, Op>;

/// A write buffer over a base store.
///
/// Reads see pending writes; nothing touches the base until the batch is
/// taken and flushed. Dropping the buffer discards the writes; this is how
/// a failed message's state changes are reverted.
pub struct Buffer<'a> {
    base: &'a dyn Storage,
    pending: Batch,
}

impl<'a> Buffer<'a> {
    pub fn new(base: &'a dyn Storage) -> Self {
        Self {
            base,
            pending: Batch::new(),
        }
    }

    /// Consume the buffer, returning the batch of pending ops.
    pub fn into_batch(self) -> Batch {
        self.pending
    }
}

/// Apply a batch of ops to a store.
pub fn flush(storage: &mut dyn Storage, batch: Batch) {
    for (key, op) in batch {
        match op {
            Op::Insert(value) => storage.write(&key, &value),
            Op::Delete => storage.remove(&key),
        }
    }
}

impl Storage for Buffer<'_> {
    fn read(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(Op::Insert(value)) => Some(value.clone()),
            Some(Op::Delete) => None,
            None => self.base.read(key),
        }
    }

    fn scan<'b>(
        &'b self,
        min: Option<&[u8]>,
        max: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        // Materialize the merged view. Simple and deterministic; the ranges
        // walked during message execution are small.
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self
            .base
            .scan(min, max, Order::Ascending)
            .collect();
        for (key, op) in &self.pending {
            let in_min = min.map_or(true, |min| key.as_slice() >= min);
            let in_max = max.map_or(true, |max| key.as_slice() < max);
            if !(in_min && in_max) {
                continue;
            }
            match op {
                Op::Insert(value) => {
                    merged.insert(key.clone(), value.clone());
                },
                Op::Delete => {
                    merged.remove(key);
                },
            }
        }
        match order {
            Order::Ascending => Box::new(merged.into_iter()),
            Order::Descending => Box::new(merged.into_iter().rev()),
        }
    }

    fn write(&mut self, key: &[u8], value: &[u8]) {
        self.pending.insert(key.to_vec(), Op::Insert(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), Op::Delete);
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, crate::MemStorage};

    #[test]
    fn buffered_writes_are_invisible_until_flushed() {
        let mut base = MemStorage::new();
        base.write(b"a", b"1");

        let mut buffer = Buffer::new(&base);
        buffer.write(b"b", b"2");
        buffer.remove(b"a");

        assert_eq!(buffer.read(b"a"), None);
        assert_eq!(buffer.read(b"b"), Some(b"2".to_vec()));
        assert_eq!(base.read(b"a"), Some(b"1".to_vec()));

        let batch = buffer.into_batch();
        flush(&mut base, batch);

        assert_eq!(base.read(b"a"), None);
        assert_eq!(base.read(b"b"), Some(b"2".to_vec()));
    }

    #[test]
    fn scan_merges_pending_ops() {
        let mut base = MemStorage::new();
        base.write(b"a", b"1");
        base.write(b"c", b"3");

        let mut buffer = Buffer::new(&base);
        buffer.write(b"b", b"2");
        buffer.remove(b"c");

        let keys = buffer.scan_keys(None, None, Order::Ascending).collect::<Vec<_>>();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
