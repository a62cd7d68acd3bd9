mod order_cancellation;
mod order_placement;

pub use {order_cancellation::*, order_placement::*};

use {
    crate::{
        CREATOR_ORDERS, GOOD_TIL_HEIGHT, GOOD_TIL_TIME, ORDERS, ORDER_BOOK_INDEX, ORDER_COUNTS,
        ORDER_IDS, TOMBSTONES,
    },
    reef_std::{Addr, Coin, Denom, Storage},
    reef_types::{
        dex::{CancelReason, Order, OrderBookId, OrderCancelled, OrderClosed, OrderType},
        Context, Error, Result,
    },
};

/// How an order leaves the book.
pub(crate) enum Removal {
    /// Fully filled.
    Closed,
    Cancelled(CancelReason),
}

pub(crate) fn increment_order_count(
    storage: &mut dyn Storage,
    account: &Addr,
    denom: &Denom,
) -> Result<u64> {
    let count = ORDER_COUNTS
        .may_load(storage, (account, denom))?
        .unwrap_or(0)
        + 1;
    ORDER_COUNTS.save(storage, (account, denom), &count)?;
    Ok(count)
}

pub(crate) fn decrement_order_count(
    storage: &mut dyn Storage,
    account: &Addr,
    denom: &Denom,
) -> Result<()> {
    let count = ORDER_COUNTS.may_load(storage, (account, denom))?.unwrap_or(0);
    match count {
        0 => Err(Error::invalid_state(format!(
            "order count for {account}/{denom} is already zero"
        ))),
        1 => {
            ORDER_COUNTS.remove(storage, (account, denom));
            Ok(())
        },
        _ => {
            ORDER_COUNTS.save(storage, (account, denom), &(count - 1))?;
            Ok(())
        },
    }
}

pub(crate) fn register_good_til(storage: &mut dyn Storage, order: &Order) -> Result<()> {
    if let Some(good_til) = &order.good_til {
        if let Some(height) = good_til.block_height {
            GOOD_TIL_HEIGHT.insert(storage, (height, order.sequence))?;
        }
        if let Some(time) = good_til.block_time {
            GOOD_TIL_TIME.insert(storage, (time, order.sequence))?;
        }
    }
    Ok(())
}

/// Removing an order by either trigger must drop both index entries, so the
/// good-til indexes always point at live orders.
pub(crate) fn deregister_good_til(storage: &mut dyn Storage, order: &Order) {
    if let Some(good_til) = &order.good_til {
        if let Some(height) = good_til.block_height {
            GOOD_TIL_HEIGHT.remove(storage, (height, order.sequence));
        }
        if let Some(time) = good_til.block_time {
            GOOD_TIL_TIME.remove(storage, (time, order.sequence));
        }
    }
}

/// Release whatever still backs the order (leftover locked balance, the
/// expected-to-receive registration, the reserve) and record its id as
/// recently used.
pub(crate) fn release_order_funds(ctx: &mut Context, order: &Order) -> Result<()> {
    if !order.remaining_spendable_balance.is_zero() {
        reef_ft::dex_unlock(
            ctx.storage,
            &order.creator,
            &Coin::new(order.locked_denom().clone(), order.remaining_spendable_balance),
        )?;
    }

    // Market orders never register an expectation: they cannot rest.
    if order.order_type == OrderType::Limit {
        let expected = order.expected_to_receive()?;
        if !expected.is_zero() {
            reef_ft::dex_decrease_expected(
                ctx.storage,
                &order.creator,
                &Coin::new(order.expected_denom().clone(), expected),
            )?;
        }
    }

    if !order.reserve.is_zero() {
        reef_ft::transfer(ctx, &reef_ft::dex_module_account(), &order.creator, &order.reserve)?;
    }

    TOMBSTONES.insert(ctx.storage, (&order.creator, order.id.as_str()))?;

    Ok(())
}

pub(crate) fn emit_removal(ctx: &mut Context, order: &Order, removal: Removal) {
    match removal {
        Removal::Closed => ctx.emit(OrderClosed {
            creator: order.creator,
            id: order.id.clone(),
            sequence: order.sequence,
        }),
        Removal::Cancelled(reason) => ctx.emit(OrderCancelled {
            creator: order.creator,
            id: order.id.clone(),
            sequence: order.sequence,
            reason,
        }),
    }
}

/// Remove a resting order from the book and all its indexes, refund what it
/// still holds, and emit the closing event.
pub(crate) fn remove_resting_order(
    ctx: &mut Context,
    book_id: OrderBookId,
    order: &Order,
    removal: Removal,
) -> Result<()> {
    ORDER_BOOK_INDEX.remove(
        ctx.storage,
        ((book_id, order.side), order.sort_key()?, order.sequence),
    );
    ORDERS.remove(ctx.storage, order.sequence);
    ORDER_IDS.remove(ctx.storage, (&order.creator, order.id.as_str()));
    CREATOR_ORDERS.remove(ctx.storage, (&order.creator, order.sequence));
    decrement_order_count(ctx.storage, &order.creator, &order.base_denom)?;
    decrement_order_count(ctx.storage, &order.creator, &order.quote_denom)?;
    deregister_good_til(ctx.storage, order);

    release_order_funds(ctx, order)?;
    emit_removal(ctx, order, removal);

    Ok(())
}
