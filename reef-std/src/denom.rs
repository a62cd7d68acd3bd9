use {
    crate::{Addr, PrimaryKey, RawKey, StdError, StdResult},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    sha2::{Digest, Sha256},
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
};

const MIN_SUBUNIT_LENGTH: usize = 1;
const MAX_SUBUNIT_LENGTH: usize = 50;
const MIN_NATIVE_LENGTH: usize = 3;
const MAX_NATIVE_LENGTH: usize = 127;

/// A token denomination. One of:
///
/// - a chain-native denom, e.g. `ureef`;
/// - an issued denom, `{subunit}-{issuer}`, e.g. `coral-0x00…01`;
/// - an IBC voucher denom, `ibc/{sha256-hex}`.
#[derive(
    BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Denom(String);

/// `[a-z][a-z0-9]*`, within the length limits.
pub fn validate_subunit(subunit: &str) -> StdResult<()> {
    if subunit.len() < MIN_SUBUNIT_LENGTH || subunit.len() > MAX_SUBUNIT_LENGTH {
        return Err(StdError::invalid_denom(subunit, "subunit length out of bounds"));
    }
    let mut chars = subunit.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(StdError::invalid_denom(
            subunit,
            "subunit must start with a lowercase letter",
        ));
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(StdError::invalid_denom(
            subunit,
            "subunit must be lowercase alphanumeric",
        ));
    }
    Ok(())
}

fn validate_native(denom: &str) -> StdResult<()> {
    if denom.len() < MIN_NATIVE_LENGTH || denom.len() > MAX_NATIVE_LENGTH {
        return Err(StdError::invalid_denom(denom, "length out of bounds"));
    }
    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(StdError::invalid_denom(
            denom,
            "must start with a lowercase letter",
        ));
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '/') {
        return Err(StdError::invalid_denom(denom, "invalid character"));
    }
    Ok(())
}

impl Denom {
    /// Build the denom of an issued token: `{subunit}-{issuer}`.
    pub fn issued(subunit: &str, issuer: &Addr) -> StdResult<Self> {
        validate_subunit(subunit)?;
        Ok(Self(format!("{subunit}-{issuer}")))
    }

    /// Build an IBC voucher denom from its denom trace.
    pub fn ibc_from_trace(trace: &str) -> Self {
        let digest = Sha256::digest(trace.as_bytes());
        Self(format!("ibc/{}", hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_ibc(&self) -> bool {
        self.0.starts_with("ibc/")
    }

    pub fn is_issued(&self) -> bool {
        self.0.contains('-')
    }

    /// Split an issued denom back into `(subunit, issuer)`.
    ///
    /// Errors for native and IBC denoms, which have no issuer.
    pub fn deconstruct(&self) -> StdResult<(String, Addr)> {
        let (subunit, issuer) = self
            .0
            .split_once('-')
            .ok_or_else(|| StdError::invalid_denom(&self.0, "denom has no issuer"))?;
        let issuer = issuer
            .parse()
            .map_err(|_| StdError::invalid_denom(&self.0, "invalid issuer address"))?;
        validate_subunit(subunit)?;
        Ok((subunit.to_string(), issuer))
    }
}

impl Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Denom {
    type Err = StdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hash) = s.strip_prefix("ibc/") {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(StdError::invalid_denom(s, "malformed ibc denom hash"));
            }
            return Ok(Self(s.to_string()));
        }

        if let Some((subunit, issuer)) = s.split_once('-') {
            validate_subunit(subunit)?;
            issuer
                .parse::<Addr>()
                .map_err(|_| StdError::invalid_denom(s, "invalid issuer address"))?;
            return Ok(Self(s.to_string()));
        }

        validate_native(s)?;
        Ok(Self(s.to_string()))
    }
}

impl ser::Serialize for Denom {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> de::Deserialize<'de> for Denom {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as de::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl PrimaryKey for Denom {
    type Output = Denom;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Borrowed(self.0.as_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| StdError::invalid_key("invalid utf-8"))?;
                s.parse()
            },
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test]
    fn issued_denom_deconstructs() {
        let issuer = Addr::mock(1);
        let denom = Denom::issued("coral", &issuer).unwrap();
        assert_eq!(denom.deconstruct().unwrap(), ("coral".to_string(), issuer));
    }

    #[test_case("ureef", true; "native")]
    #[test_case("u", false; "too short")]
    #[test_case("UREEF", false; "uppercase")]
    #[test_case("0reef", false; "leading digit")]
    fn native_denom_validation(input: &str, ok: bool) {
        assert_eq!(input.parse::<Denom>().is_ok(), ok);
    }

    #[test]
    fn native_denom_has_no_issuer() {
        let denom: Denom = "ureef".parse().unwrap();
        assert!(denom.deconstruct().is_err());
    }

    #[test]
    fn ibc_denom_shape() {
        let denom = Denom::ibc_from_trace("transfer/channel-0/ureef");
        assert!(denom.is_ibc());
        assert!(denom.as_str().parse::<Denom>().is_ok());
        assert!(denom.deconstruct().is_err());
    }
}
