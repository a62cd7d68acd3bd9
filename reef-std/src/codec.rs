use {
    crate::{StdError, StdResult},
    borsh::{BorshDeserialize, BorshSerialize},
};

/// A marker that designates an encoding scheme for stored values.
pub trait Codec<T> {
    fn encode(data: &T) -> StdResult<Vec<u8>>;

    fn decode(data: &[u8]) -> StdResult<T>;
}

/// The Borsh encoding scheme, the only codec module state uses.
pub struct Borsh;

impl<T> Codec<T> for Borsh
where
    T: BorshSerialize + BorshDeserialize,
{
    fn encode(data: &T) -> StdResult<Vec<u8>> {
        borsh::to_vec(data).map_err(|err| StdError::serialize::<T, _>(err))
    }

    fn decode(data: &[u8]) -> StdResult<T> {
        borsh::from_slice(data).map_err(|err| StdError::deserialize::<T, _>(err))
    }
}
