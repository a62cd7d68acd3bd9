use crate::{Item, Number, StdResult, Storage};

/// A single number that is monotonically incremented by the given step size.
pub struct Counter<'a, T> {
    item: Item<'a, T>,
    base: T,
    step: T,
}

impl<'a, T> Counter<'a, T>
where
    T: Number + Copy + borsh::BorshSerialize + borsh::BorshDeserialize,
{
    pub const fn new(storage_key: &'a str, base: T, step: T) -> Self {
        Self {
            item: Item::new(storage_key),
            base,
            step,
        }
    }

    /// Load the current counter value.
    pub fn current(&self, storage: &dyn Storage) -> StdResult<T> {
        self.item
            .may_load(storage)
            .map(|maybe_value| maybe_value.unwrap_or(self.base))
    }

    /// Increment the value by the step size; return the values before and
    /// after incrementing.
    pub fn increment(&self, storage: &mut dyn Storage) -> StdResult<(T, T)> {
        let old_value = self.current(storage)?;
        let new_value = old_value.checked_add(self.step)?;

        self.item.save(storage, &new_value)?;

        Ok((old_value, new_value))
    }

    /// Overwrite the counter value. Used by genesis import.
    pub fn set(&self, storage: &mut dyn Storage, value: T) -> StdResult<()> {
        self.item.save(storage, &value)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, crate::MemStorage};

    #[test]
    fn counter_increments_from_base() {
        const SEQ: Counter<u64> = Counter::new("seq", 1, 1);

        let mut storage = MemStorage::new();

        assert_eq!(SEQ.current(&storage).unwrap(), 1);
        assert_eq!(SEQ.increment(&mut storage).unwrap(), (1, 2));
        assert_eq!(SEQ.increment(&mut storage).unwrap(), (2, 3));
        assert_eq!(SEQ.current(&storage).unwrap(), 3);
    }
}
