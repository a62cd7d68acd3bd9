use {
    reef_std::{Addr, Counter, Denom, Item, Map, Set, Timestamp},
    reef_types::{
        dex::{Order, OrderBookId, Params, Side},
        PriceKey,
    },
};

pub const PARAMS: Item<Params> = Item::new("params");

pub const NEXT_ORDER_BOOK_ID: Counter<u32> = Counter::new("order_book_id", 0, 1);

// (base_denom, quote_denom) => order book id
pub const ORDER_BOOK_IDS: Map<(&Denom, &Denom), OrderBookId> = Map::new("order_book");

pub const NEXT_ORDER_SEQUENCE: Counter<u64> = Counter::new("order_sequence", 1, 1);

// sequence => order
pub const ORDERS: Map<u64, Order> = Map::new("order");

/// The price-time index. Keyed
///
/// ```plain
/// (order_book_id, side) | price sort key | sequence
/// ```
///
/// with the price key inverted for buys, so ascending iteration visits
/// orders in matching priority on both sides: better price first, then
/// lower sequence.
pub const ORDER_BOOK_INDEX: Set<((OrderBookId, Side), PriceKey, u64)> = Set::new("order_index");

// (creator, order id) => sequence
pub const ORDER_IDS: Map<(&Addr, &str), u64> = Map::new("order_id");

// (creator, sequence); for enumerating one account's open orders
pub const CREATOR_ORDERS: Set<(&Addr, u64)> = Set::new("creator_order");

// (account, denom) => number of open orders touching the denom
pub const ORDER_COUNTS: Map<(&Addr, &Denom), u64> = Map::new("order_count");

// recently used (creator, order id) pairs; a dead order's id cannot be
// resurrected to defeat replay guards
pub const TOMBSTONES: Set<(&Addr, &str)> = Set::new("tombstone");

// (deadline height, sequence)
pub const GOOD_TIL_HEIGHT: Set<(u64, u64)> = Set::new("good_til_height");

// (deadline time, sequence)
pub const GOOD_TIL_TIME: Set<(Timestamp, u64)> = Set::new("good_til_time");
