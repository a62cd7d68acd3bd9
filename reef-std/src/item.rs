use {
    crate::{Borsh, Codec, StdError, StdResult, Storage},
    std::marker::PhantomData,
};

/// A single value stored under a fixed key.
pub struct Item<'a, T, C = Borsh> {
    storage_key: &'a str,
    data: PhantomData<T>,
    codec: PhantomData<C>,
}

impl<'a, T, C> Item<'a, T, C>
where
    C: Codec<T>,
{
    pub const fn new(storage_key: &'a str) -> Self {
        Self {
            storage_key,
            data: PhantomData,
            codec: PhantomData,
        }
    }

    pub fn storage_key(&self) -> &[u8] {
        self.storage_key.as_bytes()
    }

    pub fn exists(&self, storage: &dyn Storage) -> bool {
        storage.read(self.storage_key()).is_some()
    }

    pub fn may_load(&self, storage: &dyn Storage) -> StdResult<Option<T>> {
        storage
            .read(self.storage_key())
            .map(|value| C::decode(&value))
            .transpose()
    }

    pub fn load(&self, storage: &dyn Storage) -> StdResult<T> {
        storage
            .read(self.storage_key())
            .ok_or_else(|| StdError::data_not_found::<T>(self.storage_key()))
            .and_then(|value| C::decode(&value))
    }

    pub fn save(&self, storage: &mut dyn Storage, data: &T) -> StdResult<()> {
        let data_raw = C::encode(data)?;
        storage.write(self.storage_key(), &data_raw);
        Ok(())
    }

    pub fn remove(&self, storage: &mut dyn Storage) {
        storage.remove(self.storage_key());
    }

    pub fn update<F, E>(&self, storage: &mut dyn Storage, action: F) -> Result<T, E>
    where
        F: FnOnce(T) -> Result<T, E>,
        E: From<StdError>,
    {
        let data = action(self.load(storage)?)?;

        self.save(storage, &data)?;

        Ok(data)
    }
}
