use {
    bnum::types::U256,
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, ser},
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
    thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("addition overflow: {a} + {b}")]
    OverflowAdd { a: String, b: String },

    #[error("subtraction underflow: {a} - {b}")]
    OverflowSub { a: String, b: String },

    #[error("multiplication overflow: {a} * {b}")]
    OverflowMul { a: String, b: String },

    #[error("division by zero: {a} / 0")]
    DivisionByZero { a: String },

    #[error("conversion overflow: {value} doesn't fit in {target}")]
    OverflowConversion { value: String, target: &'static str },

    #[error("failed to parse `{input}` into {target}: {reason}")]
    ParseNumber {
        input: String,
        target: &'static str,
        reason: &'static str,
    },
}

impl MathError {
    pub fn overflow_add<A: ToString, B: ToString>(a: A, b: B) -> Self {
        Self::OverflowAdd {
            a: a.to_string(),
            b: b.to_string(),
        }
    }

    pub fn overflow_sub<A: ToString, B: ToString>(a: A, b: B) -> Self {
        Self::OverflowSub {
            a: a.to_string(),
            b: b.to_string(),
        }
    }

    pub fn overflow_mul<A: ToString, B: ToString>(a: A, b: B) -> Self {
        Self::OverflowMul {
            a: a.to_string(),
            b: b.to_string(),
        }
    }

    pub fn division_by_zero<A: ToString>(a: A) -> Self {
        Self::DivisionByZero { a: a.to_string() }
    }

    pub fn overflow_conversion<V: ToString>(value: V, target: &'static str) -> Self {
        Self::OverflowConversion {
            value: value.to_string(),
            target,
        }
    }

    pub fn parse_number<I: ToString>(input: I, target: &'static str, reason: &'static str) -> Self {
        Self::ParseNumber {
            input: input.to_string(),
            target,
            reason,
        }
    }
}

pub type MathResult<T> = Result<T, MathError>;

/// Checked arithmetic shared by the numeric types that back counters.
pub trait Number: Sized {
    fn checked_add(self, other: Self) -> MathResult<Self>;
}

impl Number for u32 {
    fn checked_add(self, other: Self) -> MathResult<Self> {
        u32::checked_add(self, other).ok_or_else(|| MathError::overflow_add(self, other))
    }
}

impl Number for u64 {
    fn checked_add(self, other: Self) -> MathResult<Self> {
        u64::checked_add(self, other).ok_or_else(|| MathError::overflow_add(self, other))
    }
}

impl Number for Uint128 {
    fn checked_add(self, other: Self) -> MathResult<Self> {
        Uint128::checked_add(self, other)
    }
}

// ---------------------------------- uint ------------------------------------

/// A 128-bit unsigned integer with checked arithmetic only.
///
/// Serialized as a string in JSON, because JSON numbers lose precision above
/// 2^53 - 1.
#[derive(
    BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
    Hash,
)]
pub struct Uint128(u128);

impl Uint128 {
    pub const MAX: Self = Self(u128::MAX);
    pub const ONE: Self = Self(1);
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn u128(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_add(self, other))
    }

    pub fn checked_sub(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_sub(self, other))
    }

    pub fn checked_mul(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_mul(self, other))
    }

    pub fn checked_div(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_div(other.0)
            .map(Self)
            .ok_or_else(|| MathError::division_by_zero(self))
    }

    pub fn checked_rem(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_rem(other.0)
            .map(Self)
            .ok_or_else(|| MathError::division_by_zero(self))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn checked_multiple_of(self, step: Self) -> MathResult<bool> {
        Ok(self.checked_rem(step)?.is_zero())
    }

    /// `floor(self * dec)`.
    pub fn checked_mul_dec_floor(self, dec: Udec128) -> MathResult<Self> {
        let numerator = U256::from(self.0) * U256::from(dec.0);
        let quotient = numerator / U256::from(Udec128::PRECISION);
        u128::try_from(quotient)
            .map(Self)
            .map_err(|_| MathError::overflow_mul(self, dec))
    }

    /// `ceil(self * dec)`.
    pub fn checked_mul_dec_ceil(self, dec: Udec128) -> MathResult<Self> {
        let precision = U256::from(Udec128::PRECISION);
        let numerator = U256::from(self.0) * U256::from(dec.0);
        let quotient = (numerator + precision - U256::ONE) / precision;
        u128::try_from(quotient)
            .map(Self)
            .map_err(|_| MathError::overflow_mul(self, dec))
    }

    /// Number of decimal digits, minus one. Zero for zero.
    pub fn integer_log10(self) -> u32 {
        if self.0 == 0 {
            0
        } else {
            self.0.ilog10()
        }
    }
}

impl From<u64> for Uint128 {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}

impl Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint128 {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| MathError::parse_number(s, "Uint128", "not a decimal integer"))
    }
}

impl ser::Serialize for Uint128 {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Uint128 {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as de::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ----------------------------------- udec -----------------------------------

/// An unsigned fixed-point decimal with 18 decimal places, backed by `u128`.
///
/// Used for rates (burn, commission) and gas prices. Not for order prices,
/// which have their own exponent-normalized representation.
#[derive(
    BorshSerialize, BorshDeserialize, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Udec128(pub(crate) u128);

impl Udec128 {
    pub const DECIMAL_PLACES: u32 = 18;
    pub const ONE: Self = Self(Self::PRECISION);
    pub(crate) const PRECISION: u128 = 10_u128.pow(Self::DECIMAL_PLACES);
    pub const ZERO: Self = Self(0);

    /// Create a decimal equal to the given whole number.
    pub const fn new(whole: u128) -> Self {
        Self(whole * Self::PRECISION)
    }

    pub const fn new_percent(percent: u128) -> Self {
        Self(percent * Self::PRECISION / 100)
    }

    pub const fn raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_add(self, other))
    }

    pub fn checked_sub(self, other: Self) -> MathResult<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| MathError::overflow_sub(self, other))
    }

    pub fn checked_mul(self, other: Self) -> MathResult<Self> {
        let numerator = U256::from(self.0) * U256::from(other.0);
        u128::try_from(numerator / U256::from(Self::PRECISION))
            .map(Self)
            .map_err(|_| MathError::overflow_mul(self, other))
    }

    /// `self * numerator / denominator`, rounding down.
    pub fn checked_mul_ratio(self, numerator: u128, denominator: u128) -> MathResult<Self> {
        if denominator == 0 {
            return Err(MathError::division_by_zero(self));
        }
        let value = U256::from(self.0) * U256::from(numerator) / U256::from(denominator);
        u128::try_from(value)
            .map(Self)
            .map_err(|_| MathError::overflow_mul(self, numerator))
    }

    pub fn checked_from_ratio(numerator: u128, denominator: u128) -> MathResult<Self> {
        if denominator == 0 {
            return Err(MathError::division_by_zero(numerator));
        }
        let value = U256::from(numerator) * U256::from(Self::PRECISION) / U256::from(denominator);
        u128::try_from(value)
            .map(Self)
            .map_err(|_| MathError::overflow_conversion(numerator, "Udec128"))
    }
}

impl Display for Udec128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let whole = self.0 / Self::PRECISION;
        let fractional = self.0 % Self::PRECISION;
        if fractional == 0 {
            write!(f, "{whole}")
        } else {
            let padded = format!("{fractional:018}");
            write!(f, "{whole}.{}", padded.trim_end_matches('0'))
        }
    }
}

impl FromStr for Udec128 {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole_str, fractional_str) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if fractional_str.len() > Self::DECIMAL_PLACES as usize {
            return Err(MathError::parse_number(
                s,
                "Udec128",
                "too many decimal places",
            ));
        }

        let whole = if whole_str.is_empty() {
            0
        } else {
            whole_str
                .parse::<u128>()
                .map_err(|_| MathError::parse_number(s, "Udec128", "invalid whole part"))?
        };

        let fractional = if fractional_str.is_empty() {
            0
        } else {
            let parsed = fractional_str
                .parse::<u128>()
                .map_err(|_| MathError::parse_number(s, "Udec128", "invalid fractional part"))?;
            parsed * 10_u128.pow(Self::DECIMAL_PLACES - fractional_str.len() as u32)
        };

        whole
            .checked_mul(Self::PRECISION)
            .and_then(|raw| raw.checked_add(fractional))
            .map(Self)
            .ok_or_else(|| MathError::parse_number(s, "Udec128", "overflow"))
    }
}

impl ser::Serialize for Udec128 {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Udec128 {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as de::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test]
    fn uint_checked_ops() {
        assert_eq!(
            Uint128::new(2).checked_add(Uint128::new(3)).unwrap(),
            Uint128::new(5)
        );
        assert!(Uint128::MAX.checked_add(Uint128::ONE).is_err());
        assert!(Uint128::ZERO.checked_sub(Uint128::ONE).is_err());
        assert!(Uint128::ONE.checked_div(Uint128::ZERO).is_err());
    }

    #[test_case("0", 0; "zero")]
    #[test_case("1", Udec128::PRECISION; "one")]
    #[test_case("0.5", Udec128::PRECISION / 2; "half")]
    #[test_case("1.25", Udec128::PRECISION + Udec128::PRECISION / 4; "one and a quarter")]
    fn udec_from_str(input: &str, raw: u128) {
        assert_eq!(input.parse::<Udec128>().unwrap(), Udec128::raw(raw));
    }

    #[test]
    fn udec_display_round_trips() {
        for s in ["0", "1", "0.5", "1.25", "0.000000000000000001"] {
            let dec: Udec128 = s.parse().unwrap();
            assert_eq!(dec.to_string(), s);
        }
    }

    #[test_case(100, "0.1", 10, 10; "exact")]
    #[test_case(100, "0.25", 25, 25; "exact quarter")]
    #[test_case(10, "0.25", 2, 3; "floor and ceil differ")]
    #[test_case(1, "0.999999999999999999", 0, 1; "just below one")]
    fn mul_dec_rounding(amount: u128, rate: &str, floor: u128, ceil: u128) {
        let rate: Udec128 = rate.parse().unwrap();
        let amount = Uint128::new(amount);
        assert_eq!(amount.checked_mul_dec_floor(rate).unwrap(), Uint128::new(floor));
        assert_eq!(amount.checked_mul_dec_ceil(rate).unwrap(), Uint128::new(ceil));
    }
}
