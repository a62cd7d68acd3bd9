use {reef_std::StdError, thiserror::Error};

/// The module-level error taxonomy. Every failure surfaced to a user maps to
/// one of these variants; the host reverts the message's state changes when
/// one bubbles up to the transaction boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("feature {feature} is disabled for {denom}")]
    FeatureDisabled { denom: String, feature: &'static str },

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: String,
        available: String,
    },

    #[error("whitelisted limit exceeded: available to receive {available}, requested {requested}")]
    WhitelistedLimitExceeded {
        requested: String,
        available: String,
    },

    #[error("{denom} is globally frozen")]
    GloballyFrozen { denom: String },

    #[error("not enough liquidity to fully fill the order")]
    NoSufficientLiquidity,

    #[error("order id `{id}` is already used by {creator}")]
    DuplicateOrderId { creator: String, id: String },

    /// An internal invariant was violated. Fatal: the block must abort
    /// rather than commit incorrect state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Std(#[from] StdError),
}

impl Error {
    pub fn invalid_input<R: ToString>(reason: R) -> Self {
        Self::InvalidInput(reason.to_string())
    }

    pub fn not_found<R: ToString>(what: R) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn unauthorized<R: ToString>(reason: R) -> Self {
        Self::Unauthorized(reason.to_string())
    }

    pub fn insufficient_funds<R: ToString, A: ToString>(requested: R, available: A) -> Self {
        Self::InsufficientFunds {
            requested: requested.to_string(),
            available: available.to_string(),
        }
    }

    pub fn invalid_state<R: ToString>(reason: R) -> Self {
        Self::InvalidState(reason.to_string())
    }
}

impl From<reef_std::MathError> for Error {
    fn from(err: reef_std::MathError) -> Self {
        Self::Std(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
