use {
    crate::{Error, Price, PriceKey, Result},
    borsh::{BorshDeserialize, BorshSerialize},
    reef_std::{
        Addr, Coin, Denom, PrimaryKey, RawKey, StdError, StdResult, Timestamp, Uint128,
    },
    serde::{Deserialize, Serialize},
};

pub const MAX_ORDER_ID_LENGTH: usize = 40;

/// User-assigned order identifier, unique per creator among live and
/// recently used orders.
pub type OrderId = String;

/// Numeric identifier of an order book. Both directions of a pair share one.
pub type OrderBookId = u32;

#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
    PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl PrimaryKey for Side {
    type Output = Side;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        match self {
            Side::Buy => vec![RawKey::Fixed1([0])],
            Side::Sell => vec![RawKey::Fixed1([1])],
        }
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [[0]] => Ok(Side::Buy),
            [[1]] => Ok(Side::Sell),
            _ => Err(StdError::invalid_key("invalid order side! must be 0|1")),
        }
    }
}

#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Any unfilled portion rests in the book until cancelled or expired.
    Gtc,
    /// Any unfilled portion is dropped and refunded.
    Ioc,
    /// The order must fill entirely in one go, or the placement fails.
    Fok,
}

/// A deadline after which a resting order is auto-cancelled. Either trigger
/// is sufficient when both are set.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct GoodTil {
    pub block_height: Option<u64>,
    pub block_time: Option<Timestamp>,
}

#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    User,
    Ioc,
    Expired,
}

/// A live order. Owned by the book from placement until it is fully filled,
/// cancelled, or expired.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Order {
    pub creator: Addr,
    pub id: OrderId,
    /// Assigned from the global monotonic counter at placement. Ties on
    /// price break by sequence: earlier wins.
    pub sequence: u64,
    pub base_denom: Denom,
    pub quote_denom: Denom,
    pub order_type: OrderType,
    pub side: Side,
    /// Required for limit orders, absent for market orders.
    pub price: Option<Price>,
    /// Initial size, in base units.
    pub quantity: Uint128,
    pub remaining_base_quantity: Uint128,
    /// The portion of the creator's locked balance still backing the order:
    /// base units for sells, quote units for buys.
    pub remaining_spendable_balance: Uint128,
    pub time_in_force: TimeInForce,
    pub good_til: Option<GoodTil>,
    /// Native-token amount held at placement to discourage order spam;
    /// refunded when the order leaves the book.
    pub reserve: Coin,
}

impl Order {
    /// The denom the creator's balance is locked in.
    pub fn locked_denom(&self) -> &Denom {
        match self.side {
            Side::Buy => &self.quote_denom,
            Side::Sell => &self.base_denom,
        }
    }

    /// The denom the creator stands to receive.
    pub fn expected_denom(&self) -> &Denom {
        match self.side {
            Side::Buy => &self.base_denom,
            Side::Sell => &self.quote_denom,
        }
    }

    /// The most the creator may still receive from this order. Counted
    /// against the receiver's whitelist cap.
    pub fn expected_to_receive(&self) -> Result<Uint128> {
        match self.side {
            Side::Buy => Ok(self.remaining_base_quantity),
            Side::Sell => {
                let price = self.price.ok_or_else(|| {
                    Error::invalid_state("resting sell order without a price")
                })?;
                let (_, ceil) = price.checked_mul_to_amounts(self.remaining_base_quantity)?;
                Ok(ceil)
            },
        }
    }

    /// The position of this order in its book's price-time index.
    pub fn sort_key(&self) -> Result<PriceKey> {
        let price = self
            .price
            .ok_or_else(|| Error::invalid_state("resting order without a price"))?;
        let mut key = price.to_sort_key();
        // Buys iterate best-price-first by inverting the bytes, so a single
        // ascending walk is price-time priority on both sides.
        if self.side == Side::Buy {
            for byte in &mut key {
                *byte = !*byte;
            }
        }
        Ok(PriceKey(key))
    }
}

/// The initial balance a placement must lock: the full base quantity for
/// sells, `ceil(price · quantity)` in quote units for buys.
pub fn initial_locked_amount(side: Side, price: Option<&Price>, quantity: Uint128) -> Result<Uint128> {
    match side {
        Side::Sell => Ok(quantity),
        Side::Buy => {
            let price =
                price.ok_or_else(|| Error::invalid_input("buy order requires a price"))?;
            let (_, ceil) = price.checked_mul_to_amounts(quantity)?;
            Ok(ceil)
        },
    }
}

/// A pair's rounding parameters, derived from the two denoms' unified ref
/// amounts.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct OrderBookParams {
    pub price_tick: Price,
    pub quantity_step: Uint128,
}

/// Module parameters.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Params {
    /// Native-token amount held per order; bounds the number of live orders
    /// an account can afford.
    pub order_reserve: Coin,
    /// Cap on an account's live orders touching a given denom.
    pub max_orders_per_denom: u64,
    /// Default unified ref amount for denoms without DEX settings.
    pub default_unified_ref_amount: Uint128,
}

/// A request to place an order, as submitted by a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub id: OrderId,
    pub order_type: OrderType,
    pub side: Side,
    pub base_denom: Denom,
    pub quote_denom: Denom,
    pub price: Option<Price>,
    pub quantity: Uint128,
    pub time_in_force: TimeInForce,
    pub good_til: Option<GoodTil>,
}

/// DEX module messages, routed by sender.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    PlaceOrder(OrderRequest),
    CancelOrder { id: OrderId },
    CancelOrderBySequence { sequence: u64 },
    UpdateParams { params: Params },
}

// ---------------------------------- events -----------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderBookCreated {
    pub order_book_id: OrderBookId,
    pub base_denom: Denom,
    pub quote_denom: Denom,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub creator: Addr,
    pub id: OrderId,
    pub sequence: u64,
    pub order_type: OrderType,
    pub side: Side,
    pub base_denom: Denom,
    pub quote_denom: Denom,
    pub price: Option<Price>,
    pub quantity: Uint128,
    pub time_in_force: TimeInForce,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderFilled {
    pub maker_sequence: u64,
    pub taker_sequence: u64,
    pub base_amount: Uint128,
    pub quote_amount: Uint128,
    /// The maker's price; trades always execute at it.
    pub price: Price,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderClosed {
    pub creator: Addr,
    pub id: OrderId,
    pub sequence: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderCancelled {
    pub creator: Addr,
    pub id: OrderId,
    pub sequence: u64,
    pub reason: CancelReason,
}

// --------------------------------- responses ---------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderBookRecord {
    pub order_book_id: OrderBookId,
    pub base_denom: Denom,
    pub quote_denom: Denom,
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr};

    fn order(side: Side, price: &str, quantity: u128) -> Order {
        Order {
            creator: Addr::mock(1),
            id: "id1".to_string(),
            sequence: 1,
            base_denom: Denom::from_str("ubase").unwrap(),
            quote_denom: Denom::from_str("uquote").unwrap(),
            order_type: OrderType::Limit,
            side,
            price: Some(Price::from_str(price).unwrap()),
            quantity: Uint128::new(quantity),
            remaining_base_quantity: Uint128::new(quantity),
            remaining_spendable_balance: Uint128::new(quantity),
            time_in_force: TimeInForce::Gtc,
            good_til: None,
            reserve: Coin::new(Denom::from_str("ureef").unwrap(), Uint128::ZERO),
        }
    }

    #[test]
    fn locked_and_expected_denoms() {
        let buy = order(Side::Buy, "1.5", 10);
        assert_eq!(buy.locked_denom().as_str(), "uquote");
        assert_eq!(buy.expected_denom().as_str(), "ubase");

        let sell = order(Side::Sell, "1.5", 10);
        assert_eq!(sell.locked_denom().as_str(), "ubase");
        assert_eq!(sell.expected_denom().as_str(), "uquote");
    }

    #[test]
    fn initial_locked_rounds_up_for_buys() {
        let price = Price::from_str("0.3").unwrap();
        let locked =
            initial_locked_amount(Side::Buy, Some(&price), Uint128::new(5)).unwrap();
        assert_eq!(locked, Uint128::new(2)); // 1.5 rounded up

        let locked = initial_locked_amount(Side::Sell, None, Uint128::new(5)).unwrap();
        assert_eq!(locked, Uint128::new(5));
    }

    #[test]
    fn buy_sort_keys_invert_price_order() {
        let cheap = order(Side::Buy, "1", 10).sort_key().unwrap();
        let dear = order(Side::Buy, "2", 10).sort_key().unwrap();
        // Higher buy price sorts first.
        assert!(dear < cheap);

        let cheap = order(Side::Sell, "1", 10).sort_key().unwrap();
        let dear = order(Side::Sell, "2", 10).sort_key().unwrap();
        // Lower sell price sorts first.
        assert!(cheap < dear);
    }
}
