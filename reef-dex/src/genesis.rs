use {
    crate::{
        register_good_til, CREATOR_ORDERS, GOOD_TIL_HEIGHT, GOOD_TIL_TIME, NEXT_ORDER_BOOK_ID,
        NEXT_ORDER_SEQUENCE, ORDERS, ORDER_BOOK_IDS, ORDER_BOOK_INDEX, ORDER_COUNTS, ORDER_IDS,
        PARAMS, TOMBSTONES,
    },
    reef_std::{Addr, Denom, Order as IterationOrder, Storage, StdResult},
    reef_types::{
        dex::{Order, OrderBookRecord, OrderId, Params},
        Error, Result,
    },
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisState {
    pub params: Params,
    pub order_books: Vec<OrderBookRecord>,
    pub orders: Vec<Order>,
    /// The next value of the global order sequence counter.
    pub order_sequence: u64,
    pub tombstones: Vec<(Addr, OrderId)>,
}

/// Import the module state. The price-time index, the creator/id indexes,
/// the per-(account, denom) counts, and the good-til indexes are all
/// rebuilt from the order list; the invariants of the order record are
/// checked on the way.
pub fn init_genesis(storage: &mut dyn Storage, state: &GenesisState) -> Result<()> {
    PARAMS.save(storage, &state.params)?;

    let mut max_book_id = None;
    for book in &state.order_books {
        ORDER_BOOK_IDS.save(
            storage,
            (&book.base_denom, &book.quote_denom),
            &book.order_book_id,
        )?;
        max_book_id = max_book_id.max(Some(book.order_book_id));
    }
    if let Some(max_book_id) = max_book_id {
        NEXT_ORDER_BOOK_ID.set(storage, max_book_id + 1)?;
    }

    let books_by_pair: BTreeMap<(Denom, Denom), u32> = state
        .order_books
        .iter()
        .map(|book| {
            (
                (book.base_denom.clone(), book.quote_denom.clone()),
                book.order_book_id,
            )
        })
        .collect();

    for order in &state.orders {
        if order.remaining_base_quantity > order.quantity {
            return Err(Error::invalid_state(format!(
                "order {} has more remaining than its quantity",
                order.sequence,
            )));
        }
        if order.sequence >= state.order_sequence {
            return Err(Error::invalid_state(format!(
                "order sequence {} is not below the counter {}",
                order.sequence, state.order_sequence,
            )));
        }
        let book_id = books_by_pair
            .get(&(order.base_denom.clone(), order.quote_denom.clone()))
            .copied()
            .ok_or_else(|| {
                Error::invalid_state(format!(
                    "order {} references an unknown order book",
                    order.sequence,
                ))
            })?;

        ORDERS.save(storage, order.sequence, order)?;
        ORDER_BOOK_INDEX.insert(
            storage,
            ((book_id, order.side), order.sort_key()?, order.sequence),
        )?;
        ORDER_IDS.save(storage, (&order.creator, order.id.as_str()), &order.sequence)?;
        CREATOR_ORDERS.insert(storage, (&order.creator, order.sequence))?;
        for denom in [&order.base_denom, &order.quote_denom] {
            let count = ORDER_COUNTS
                .may_load(storage, (&order.creator, denom))?
                .unwrap_or(0)
                + 1;
            ORDER_COUNTS.save(storage, (&order.creator, denom), &count)?;
        }
        register_good_til(storage, order)?;
    }

    NEXT_ORDER_SEQUENCE.set(storage, state.order_sequence)?;

    for (creator, id) in &state.tombstones {
        TOMBSTONES.insert(storage, (creator, id.as_str()))?;
    }

    Ok(())
}

/// Export the module state. The stored per-(account, denom) counts are
/// recomputed from the open orders as a cross-check; a mismatch aborts.
pub fn export_genesis(storage: &dyn Storage) -> Result<GenesisState> {
    let params = PARAMS.load(storage)?;

    let order_books = ORDER_BOOK_IDS
        .range(storage, None, None, IterationOrder::Ascending)
        .map(|res| {
            res.map(|((base_denom, quote_denom), order_book_id)| OrderBookRecord {
                order_book_id,
                base_denom,
                quote_denom,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    let orders = ORDERS
        .values(storage, None, None, IterationOrder::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    let mut computed_counts = BTreeMap::<(Addr, Denom), u64>::new();
    for order in &orders {
        for denom in [&order.base_denom, &order.quote_denom] {
            *computed_counts
                .entry((order.creator, denom.clone()))
                .or_insert(0) += 1;
        }
    }
    for res in ORDER_COUNTS.range(storage, None, None, IterationOrder::Ascending) {
        let ((account, denom), count) = res?;
        let computed = computed_counts
            .get(&(account, denom.clone()))
            .copied()
            .unwrap_or(0);
        if computed != count {
            return Err(Error::invalid_state(format!(
                "order count for {account}/{denom} is {count} but {computed} orders are open"
            )));
        }
    }

    let order_sequence = NEXT_ORDER_SEQUENCE.current(storage)?;

    let tombstones = TOMBSTONES
        .range(storage, None, None, IterationOrder::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        params,
        order_books,
        orders,
        order_sequence,
        tombstones,
    })
}
