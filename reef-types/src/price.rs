use {
    crate::{Error, Result},
    bnum::types::U256,
    borsh::{BorshDeserialize, BorshSerialize},
    reef_std::{MathError, MathResult, PrimaryKey, RawKey, StdError, StdResult, Uint128},
    serde::{de, ser},
    std::{
        cmp::Ordering,
        fmt::{self, Display},
        str::FromStr,
    },
};

/// Exponent bounds after canonicalization.
pub const MAX_PRICE_EXPONENT: i8 = 100;
pub const MIN_PRICE_EXPONENT: i8 = -100;

/// Canonical mantissas have at most 19 digits, so they can be normalized to
/// exactly 19 digits for the order-preserving storage key.
const MAX_MANTISSA: u128 = 10_u128.pow(19);

/// An order price: how much of the quote asset buys one unit of the base
/// asset, as `mantissa · 10^exp`.
///
/// The representation is canonical (the mantissa is non-zero and carries no
/// trailing zeros), so structural equality is value equality. Prices are
/// immutable once constructed.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    mantissa: u64,
    exp: i8,
}

impl Price {
    pub fn new(mantissa: u64, exp: i8) -> Result<Self> {
        if mantissa == 0 {
            return Err(Error::invalid_input("price mantissa must not be zero"));
        }

        let mut mantissa = mantissa;
        let mut exp = exp as i32;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exp += 1;
        }

        if (mantissa as u128) >= MAX_MANTISSA {
            return Err(Error::invalid_input("price mantissa out of range"));
        }
        if exp < MIN_PRICE_EXPONENT as i32 || exp > MAX_PRICE_EXPONENT as i32 {
            return Err(Error::invalid_input("price exponent out of range"));
        }

        Ok(Self {
            mantissa,
            exp: exp as i8,
        })
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exp(&self) -> i8 {
        self.exp
    }

    /// The unique `(exp', mantissa')` form with the mantissa shifted to
    /// exactly 19 digits. Lexicographic order of this pair is value order.
    fn normalized(&self) -> (i16, u64) {
        let digits = self.mantissa.ilog10() as i16 + 1;
        let shifted = (self.mantissa as u128) * 10_u128.pow((19 - digits) as u32);
        (self.exp as i16 + digits - 19, shifted as u64)
    }

    /// An order-preserving 9-byte storage key: bigger price, bigger key.
    pub fn to_sort_key(&self) -> [u8; 9] {
        let (exp, mantissa) = self.normalized();
        // exp' ranges [-118, 100]; offset it into a single byte.
        let mut key = [0; 9];
        key[0] = (exp + 118) as u8;
        key[1..].copy_from_slice(&mantissa.to_be_bytes());
        key
    }

    /// Both integer bounds of `self · quantity`, so the caller picks the
    /// side-appropriate rounding.
    pub fn checked_mul_to_amounts(&self, quantity: Uint128) -> MathResult<(Uint128, Uint128)> {
        let product = U256::from(self.mantissa) * U256::from(quantity.u128());
        let (floor, ceil) = if self.exp >= 0 {
            let scale = U256::from(10_u8)
                .checked_pow(self.exp as u32)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, quantity))?;
            let scaled = product
                .checked_mul(scale)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, quantity))?;
            (scaled, scaled)
        } else {
            let scale = U256::from(10_u8)
                .checked_pow(-(self.exp as i32) as u32)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, quantity))?;
            let floor = product / scale;
            let ceil = (product + scale - U256::ONE) / scale;
            (floor, ceil)
        };

        let floor = u128::try_from(floor)
            .map_err(|_| MathError::overflow_conversion(self, "Uint128"))?;
        let ceil = u128::try_from(ceil)
            .map_err(|_| MathError::overflow_conversion(self, "Uint128"))?;
        Ok((Uint128::new(floor), Uint128::new(ceil)))
    }

    /// The largest quantity purchasable with `budget`: `floor(budget / self)`.
    pub fn amount_affordable(&self, budget: Uint128) -> MathResult<Uint128> {
        let budget = U256::from(budget.u128());
        let quotient = if self.exp >= 0 {
            let scale = U256::from(10_u8)
                .checked_pow(self.exp as u32)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, self.exp))?;
            let denominator = U256::from(self.mantissa)
                .checked_mul(scale)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, self.exp))?;
            budget / denominator
        } else {
            let scale = U256::from(10_u8)
                .checked_pow(-(self.exp as i32) as u32)
                .ok_or_else(|| MathError::overflow_mul(self.mantissa, self.exp))?;
            let numerator = budget
                .checked_mul(scale)
                .ok_or_else(|| MathError::overflow_mul(budget, scale))?;
            numerator / U256::from(self.mantissa)
        };
        match u128::try_from(quotient) {
            Ok(amount) => Ok(Uint128::new(amount)),
            // The budget buys more than Uint128 can count; the caller caps
            // by other means anyway.
            Err(_) => Ok(Uint128::MAX),
        }
    }

    /// Whether `self` is a whole multiple of `tick`.
    pub fn is_multiple_of(&self, tick: &Price) -> bool {
        // self / tick = (m_s / m_t) · 10^d. Reduce the fraction; the
        // remaining denominator must divide a power of ten within reach.
        let d = self.exp as i32 - tick.exp as i32;
        let g = gcd(self.mantissa, tick.mantissa);
        let numerator = self.mantissa / g;
        let mut denominator = tick.mantissa / g;

        if d < 0 {
            // Need 10^(-d) · denominator to divide the numerator.
            return denominator == 1 && divides_pow10(numerator, (-d) as u32);
        }

        let twos = strip_factor(&mut denominator, 2);
        let fives = strip_factor(&mut denominator, 5);
        denominator == 1 && twos <= d as u32 && fives <= d as u32
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn strip_factor(value: &mut u64, factor: u64) -> u32 {
    let mut count = 0;
    while *value % factor == 0 {
        *value /= factor;
        count += 1;
    }
    count
}

/// Whether `10^exp` divides `value`.
fn divides_pow10(mut value: u64, exp: u32) -> bool {
    for _ in 0..exp {
        if value % 10 != 0 {
            return false;
        }
        value /= 10;
    }
    true
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.exp == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            write!(f, "{}e{}", self.mantissa, self.exp)
        }
    }
}

impl FromStr for Price {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_input("empty price string"));
        }

        let (body, exp_part) = match s.split_once(['e', 'E']) {
            Some((body, exp)) => (body, Some(exp)),
            None => (s, None),
        };

        let mut exp: i32 = match exp_part {
            Some(exp_str) => exp_str
                .parse::<i32>()
                .ok()
                .filter(|exp| exp.abs() <= 200)
                .ok_or_else(|| Error::invalid_input(format!("invalid price exponent in `{s}`")))?,
            None => 0,
        };

        let digits: String = match body.split_once('.') {
            Some((whole, fractional)) => {
                if fractional.is_empty() || fractional.contains('.') {
                    return Err(Error::invalid_input(format!("malformed price `{s}`")));
                }
                exp -= fractional.len() as i32;
                format!("{whole}{fractional}")
            },
            None => body.to_string(),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_input(format!("malformed price `{s}`")));
        }

        let mantissa: u128 = digits
            .parse()
            .map_err(|_| Error::invalid_input(format!("price mantissa overflow in `{s}`")))?;
        if mantissa > u64::MAX as u128 {
            return Err(Error::invalid_input(format!(
                "price mantissa overflow in `{s}`"
            )));
        }
        if exp < i8::MIN as i32 || exp > i8::MAX as i32 {
            return Err(Error::invalid_input("price exponent out of range"));
        }

        Self::new(mantissa as u64, exp as i8)
    }
}

impl ser::Serialize for Price {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Price {
    fn deserialize<D: de::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = <String as de::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A price's position in the order book index: the sort key, inverted for
/// the buy side so that a single ascending iteration visits orders in
/// price-time priority on both sides.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriceKey(pub [u8; 9]);

impl PrimaryKey for PriceKey {
    type Output = PriceKey;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Fixed9(self.0)]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => bytes
                .to_vec()
                .try_into()
                .map(PriceKey)
                .map_err(|_| StdError::invalid_key("expecting exactly 9 bytes")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*, test_case::test_case};

    #[test_case("1", 1, 0; "one")]
    #[test_case("1.5", 15, -1; "decimal")]
    #[test_case("0.001", 1, -3; "leading zeros")]
    #[test_case("100", 1, 2; "trailing zeros stripped")]
    #[test_case("12e-3", 12, -3; "scientific")]
    #[test_case("1.25e3", 125, 1; "scientific with dot")]
    #[test_case("0.10", 1, -1; "trailing fractional zero")]
    fn parse_canonicalizes(input: &str, mantissa: u64, exp: i8) {
        let price: Price = input.parse().unwrap();
        assert_eq!((price.mantissa(), price.exp()), (mantissa, exp));
    }

    #[test_case(""; "empty")]
    #[test_case("1.2.3"; "two dots")]
    #[test_case("1."; "trailing dot")]
    #[test_case("abc"; "letters")]
    #[test_case("0"; "zero")]
    #[test_case("0.0"; "zero with dot")]
    #[test_case("-1"; "negative")]
    #[test_case("99999999999999999999999999"; "mantissa overflow")]
    #[test_case("1e120"; "exponent too big")]
    fn parse_rejects(input: &str) {
        assert!(input.parse::<Price>().is_err());
    }

    #[test]
    fn ordering_crosses_exponents() {
        let parse = |s: &str| s.parse::<Price>().unwrap();
        assert!(parse("0.5") < parse("1"));
        assert!(parse("1") < parse("1.5"));
        assert!(parse("95e-2") < parse("1"));
        assert!(parse("2e3") < parse("3e3"));
        assert!(parse("9999") < parse("1e4"));
        assert_eq!(parse("1.50"), parse("15e-1"));
    }

    #[test]
    fn sort_key_preserves_order() {
        let prices = ["1e-30", "0.001", "0.5", "1", "1.5", "2", "999", "1e5"]
            .iter()
            .map(|s| s.parse::<Price>().unwrap())
            .collect::<Vec<_>>();
        for pair in prices.windows(2) {
            assert!(pair[0].to_sort_key() < pair[1].to_sort_key());
        }
    }

    #[test_case("1", 10, 10, 10; "integral")]
    #[test_case("1.5", 10, 15, 15; "integral product")]
    #[test_case("0.3", 5, 1, 2; "floor and ceil differ")]
    #[test_case("1e-3", 5, 0, 1; "small price")]
    fn mul_to_amounts(price: &str, quantity: u128, floor: u128, ceil: u128) {
        let price: Price = price.parse().unwrap();
        let (lo, hi) = price.checked_mul_to_amounts(Uint128::new(quantity)).unwrap();
        assert_eq!((lo.u128(), hi.u128()), (floor, ceil));
    }

    #[test_case("1", "0.01", true; "whole of centitick")]
    #[test_case("1.25", "0.01", true; "quarter of centitick")]
    #[test_case("1.005", "0.01", false; "half tick")]
    #[test_case("3e5", "1e3", true; "large exponents")]
    #[test_case("1e-5", "1e-3", false; "below tick")]
    fn multiple_of_tick(price: &str, tick: &str, expected: bool) {
        let price: Price = price.parse().unwrap();
        let tick: Price = tick.parse().unwrap();
        assert_eq!(price.is_multiple_of(&tick), expected);
    }

    /// A mantissa that survives canonicalization unchanged, so the exponent
    /// stays within the tested range.
    fn canonical_mantissa(raw: u64) -> u64 {
        if raw % 10 == 0 {
            raw + 1
        } else {
            raw
        }
    }

    proptest! {
        #[test]
        fn print_parse_round_trips(mantissa in 1_u64..10_u64.pow(18), exp in -90_i8..90) {
            let price = Price::new(canonical_mantissa(mantissa), exp).unwrap();
            let reparsed: Price = price.to_string().parse().unwrap();
            prop_assert_eq!(price, reparsed);
        }

        #[test]
        fn sort_key_matches_ord(
            m1 in 1_u64..10_u64.pow(18), e1 in -90_i8..90,
            m2 in 1_u64..10_u64.pow(18), e2 in -90_i8..90,
        ) {
            let p1 = Price::new(canonical_mantissa(m1), e1).unwrap();
            let p2 = Price::new(canonical_mantissa(m2), e2).unwrap();
            prop_assert_eq!(p1.cmp(&p2), p1.to_sort_key().cmp(&p2.to_sort_key()));
        }
    }
}
