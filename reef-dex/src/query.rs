use {
    crate::{CREATOR_ORDERS, ORDERS, ORDER_BOOK_IDS, ORDER_BOOK_INDEX, ORDER_COUNTS, ORDER_IDS},
    reef_std::{
        Addr, Bound, Denom, Order as IterationOrder, Storage, StdResult, DEFAULT_PAGE_LIMIT,
        MAX_PAGE_LIMIT,
    },
    reef_types::{
        dex::{Order, OrderBookParams, OrderBookRecord, OrderId, Side},
        Error, Result,
    },
};

fn page_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT) as usize
}

/// A single order, by creator and user-assigned id.
pub fn query_order(storage: &dyn Storage, creator: &Addr, id: &OrderId) -> Result<Order> {
    let sequence = ORDER_IDS
        .may_load(storage, (creator, id.as_str()))?
        .ok_or_else(|| Error::not_found(format!("order with id `{id}`")))?;
    Ok(ORDERS.load(storage, sequence)?)
}

/// One creator's open orders, ascending by sequence.
pub fn query_orders(
    storage: &dyn Storage,
    creator: &Addr,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> Result<Vec<Order>> {
    let min = start_after.map(Bound::Exclusive);
    let sequences = CREATOR_ORDERS
        .prefix(creator)
        .keys(storage, min, None, IterationOrder::Ascending)
        .take(page_limit(limit))
        .collect::<StdResult<Vec<_>>>()?;

    sequences
        .into_iter()
        .map(|sequence| Ok(ORDERS.load(storage, sequence)?))
        .collect()
}

/// All order books, ascending by (base, quote).
pub fn query_order_books(
    storage: &dyn Storage,
    start_after: Option<(Denom, Denom)>,
    limit: Option<u32>,
) -> Result<Vec<OrderBookRecord>> {
    let min = start_after
        .as_ref()
        .map(|(base, quote)| Bound::Exclusive((base, quote)));
    let books = ORDER_BOOK_IDS
        .range(storage, min, None, IterationOrder::Ascending)
        .take(page_limit(limit))
        .map(|res| {
            res.map(|((base_denom, quote_denom), order_book_id)| OrderBookRecord {
                order_book_id,
                base_denom,
                quote_denom,
            })
        })
        .collect::<StdResult<_>>()?;
    Ok(books)
}

/// A pair's tick and step.
pub fn query_order_book_params(
    storage: &dyn Storage,
    base_denom: &Denom,
    quote_denom: &Denom,
) -> Result<OrderBookParams> {
    if !ORDER_BOOK_IDS.has(storage, (base_denom, quote_denom)) {
        return Err(Error::not_found(format!(
            "order book for {base_denom}/{quote_denom}"
        )));
    }
    crate::order_book_params(storage, base_denom, quote_denom)
}

/// One side of a book, in price-time priority order, paginated by the
/// sequence of the last order of the previous page.
pub fn query_order_book_orders(
    storage: &dyn Storage,
    base_denom: &Denom,
    quote_denom: &Denom,
    side: Side,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> Result<Vec<Order>> {
    let book_id = ORDER_BOOK_IDS
        .may_load(storage, (base_denom, quote_denom))?
        .ok_or_else(|| {
            Error::not_found(format!("order book for {base_denom}/{quote_denom}"))
        })?;

    let min = match start_after {
        Some(sequence) => {
            let order = ORDERS.load(storage, sequence)?;
            Some(Bound::Exclusive((order.sort_key()?, sequence)))
        },
        None => None,
    };

    let sequences = ORDER_BOOK_INDEX
        .prefix((book_id, side))
        .keys(storage, min, None, IterationOrder::Ascending)
        .take(page_limit(limit))
        .map(|res| res.map(|(_, sequence)| sequence))
        .collect::<StdResult<Vec<_>>>()?;

    sequences
        .into_iter()
        .map(|sequence| Ok(ORDERS.load(storage, sequence)?))
        .collect()
}

/// How many open orders an account has touching a denom.
pub fn query_account_denom_orders_count(
    storage: &dyn Storage,
    account: &Addr,
    denom: &Denom,
) -> Result<u64> {
    Ok(ORDER_COUNTS
        .may_load(storage, (account, denom))?
        .unwrap_or(0))
}
