use {
    crate::{MathError, MathResult, PrimaryKey, RawKey, StdError, StdResult},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display},
};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A length of time, in nanoseconds.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy,
    PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Duration(u64);

impl Duration {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds * NANOS_PER_SECOND)
    }

    pub const fn nanos(self) -> u64 {
        self.0
    }
}

/// A point in time, as nanoseconds since the UNIX epoch.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy,
    PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds * NANOS_PER_SECOND)
    }

    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Whole seconds, truncated.
    pub const fn seconds(self) -> u64 {
        self.0 / NANOS_PER_SECOND
    }

    /// Truncate to the block clock's resolution (one second).
    pub const fn truncate_to_second(self) -> Self {
        Self(self.0 / NANOS_PER_SECOND * NANOS_PER_SECOND)
    }

    pub fn checked_add(self, duration: Duration) -> MathResult<Self> {
        self.0
            .checked_add(duration.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_add(self.0, duration.0))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds(), self.0 % NANOS_PER_SECOND)
    }
}

impl PrimaryKey for Timestamp {
    type Output = Timestamp;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Fixed8(self.0.to_be_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => (*bytes)
                .try_into()
                .map(|bytes| Self(u64::from_be_bytes(bytes)))
                .map_err(|_| StdError::invalid_key("expecting exactly 8 bytes")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}
