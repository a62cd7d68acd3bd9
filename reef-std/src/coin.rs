use {
    crate::{Denom, MathResult, StdError, StdResult, Uint128},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeMap,
        fmt::{self, Display},
    },
};

/// An amount of a single token.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Coin {
    pub denom: Denom,
    pub amount: Uint128,
}

impl Coin {
    pub fn new(denom: Denom, amount: Uint128) -> Self {
        Self { denom, amount }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A sorted collection of coins, at most one entry per denom, no zero
/// amounts.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Default, Debug, Clone, PartialEq, Eq,
)]
#[serde(transparent)]
pub struct Coins(BTreeMap<Denom, Uint128>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn one(denom: Denom, amount: Uint128) -> Self {
        let mut coins = Self::new();
        if !amount.is_zero() {
            coins.0.insert(denom, amount);
        }
        coins
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn amount_of(&self, denom: &Denom) -> Uint128 {
        self.0.get(denom).copied().unwrap_or(Uint128::ZERO)
    }

    /// Add a coin, merging with any existing entry of the same denom.
    pub fn insert(&mut self, coin: Coin) -> MathResult<()> {
        if coin.amount.is_zero() {
            return Ok(());
        }
        let entry = self.0.entry(coin.denom).or_insert(Uint128::ZERO);
        *entry = entry.checked_add(coin.amount)?;
        Ok(())
    }

    /// Deduct a coin; error if the balance is insufficient.
    pub fn deduct(&mut self, coin: &Coin) -> StdResult<()> {
        let Some(entry) = self.0.get_mut(&coin.denom) else {
            return Err(StdError::invalid_coins(format!(
                "cannot deduct {coin}: denom not found"
            )));
        };
        *entry = entry.checked_sub(coin.amount)?;
        if entry.is_zero() {
            self.0.remove(&coin.denom);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0
            .iter()
            .map(|(denom, amount)| Coin::new(denom.clone(), *amount))
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = StdError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        let mut out = Self::new();
        for coin in coins {
            out.insert(coin)?;
        }
        Ok(out)
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let joined = self
            .iter()
            .map(|coin| coin.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr};

    fn denom(s: &str) -> Denom {
        Denom::from_str(s).unwrap()
    }

    #[test]
    fn insert_merges_and_skips_zero() {
        let mut coins = Coins::new();
        coins.insert(Coin::new(denom("ureef"), Uint128::new(10))).unwrap();
        coins.insert(Coin::new(denom("ureef"), Uint128::new(5))).unwrap();
        coins.insert(Coin::new(denom("uatom"), Uint128::ZERO)).unwrap();

        assert_eq!(coins.amount_of(&denom("ureef")), Uint128::new(15));
        assert_eq!(coins.len(), 1);
    }

    #[test]
    fn deduct_removes_empty_entries() {
        let mut coins = Coins::one(denom("ureef"), Uint128::new(10));
        coins.deduct(&Coin::new(denom("ureef"), Uint128::new(10))).unwrap();
        assert!(coins.is_empty());

        assert!(coins.deduct(&Coin::new(denom("ureef"), Uint128::ONE)).is_err());
    }
}
