use {crate::MathError, std::any::type_name, thiserror::Error};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StdError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("data not found! type: {ty}, storage key: {key}")]
    DataNotFound { ty: &'static str, key: String },

    #[error("invalid denom `{denom}`: {reason}")]
    InvalidDenom { denom: String, reason: &'static str },

    #[error("invalid coins: {reason}")]
    InvalidCoins { reason: String },

    #[error("invalid storage key: {reason}")]
    InvalidKey { reason: String },

    #[error("invalid address `{addr}`: {reason}")]
    InvalidAddr { addr: String, reason: &'static str },

    #[error("failed to serialize! type: {ty}, reason: {reason}")]
    Serialize { ty: &'static str, reason: String },

    #[error("failed to deserialize! type: {ty}, reason: {reason}")]
    Deserialize { ty: &'static str, reason: String },

    #[error("value out of range: {value} {comparator} {bound}")]
    OutOfRange {
        value: String,
        comparator: &'static str,
        bound: String,
    },
}

impl StdError {
    pub fn data_not_found<T>(key: &[u8]) -> Self {
        Self::DataNotFound {
            ty: type_name::<T>(),
            key: hex::encode(key),
        }
    }

    pub fn invalid_denom<D>(denom: D, reason: &'static str) -> Self
    where
        D: ToString,
    {
        Self::InvalidDenom {
            denom: denom.to_string(),
            reason,
        }
    }

    pub fn invalid_coins<R>(reason: R) -> Self
    where
        R: ToString,
    {
        Self::InvalidCoins {
            reason: reason.to_string(),
        }
    }

    pub fn invalid_key<R>(reason: R) -> Self
    where
        R: ToString,
    {
        Self::InvalidKey {
            reason: reason.to_string(),
        }
    }

    pub fn serialize<T, R>(reason: R) -> Self
    where
        R: ToString,
    {
        Self::Serialize {
            ty: type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    pub fn deserialize<T, R>(reason: R) -> Self
    where
        R: ToString,
    {
        Self::Deserialize {
            ty: type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    pub fn out_of_range<V, B>(value: V, comparator: &'static str, bound: B) -> Self
    where
        V: ToString,
        B: ToString,
    {
        Self::OutOfRange {
            value: value.to_string(),
            comparator,
            bound: bound.to_string(),
        }
    }
}

pub type StdResult<T> = Result<T, StdError>;
