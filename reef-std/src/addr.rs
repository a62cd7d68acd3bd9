use {
    crate::{PrimaryKey, RawKey, StdError, StdResult},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    sha2::{Digest, Sha256},
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
};

/// A 20-byte account address, displayed as `0x`-prefixed lowercase hex.
#[derive(
    BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Addr([u8; Self::LENGTH]);

impl Addr {
    pub const LENGTH: usize = 20;

    pub const fn from_array(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// A deterministic mock address. For use in tests.
    pub const fn mock(index: u8) -> Self {
        let mut bytes = [0; Self::LENGTH];
        bytes[Self::LENGTH - 1] = index;
        Self(bytes)
    }

    /// The address of a module account, derived from the module's name.
    pub fn module(name: &str) -> Self {
        let digest = Sha256::new_with_prefix(b"module/")
            .chain_update(name.as_bytes())
            .finalize();
        let mut bytes = [0; Self::LENGTH];
        bytes.copy_from_slice(&digest[..Self::LENGTH]);
        Self(bytes)
    }
}

impl Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Addr {
    type Err = StdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s.strip_prefix("0x").ok_or_else(|| StdError::InvalidAddr {
            addr: s.to_string(),
            reason: "missing `0x` prefix",
        })?;
        let bytes = hex::decode(hex_str).map_err(|_| StdError::InvalidAddr {
            addr: s.to_string(),
            reason: "non-hex character",
        })?;
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| StdError::InvalidAddr {
                addr: s.to_string(),
                reason: "incorrect length",
            })
    }
}

impl ser::Serialize for Addr {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Addr {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as de::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl PrimaryKey for Addr {
    type Output = Addr;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Borrowed(&self.0)]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => bytes
                .to_vec()
                .try_into()
                .map(Self)
                .map_err(|_| StdError::invalid_key("expecting exactly 20 bytes")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_from_str_round_trips() {
        let addr = Addr::mock(7);
        let parsed: Addr = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!("1234".parse::<Addr>().is_err());
        assert!("0x1234".parse::<Addr>().is_err());
        assert!("0xzz00000000000000000000000000000000000000".parse::<Addr>().is_err());
    }

    #[test]
    fn module_addresses_are_distinct() {
        assert_ne!(Addr::module("dex"), Addr::module("ft"));
    }
}
