use {
    crate::{remove_resting_order, Removal, ORDERS, ORDER_BOOK_IDS, ORDER_IDS},
    reef_std::Addr,
    reef_types::{
        dex::{CancelReason, OrderId},
        Context, Error, Result,
    },
};

/// Cancel one of the sender's orders by its user-assigned id.
pub fn cancel_order(ctx: &mut Context, sender: Addr, id: &OrderId) -> Result<()> {
    let Some(sequence) = ORDER_IDS.may_load(&*ctx.storage, (&sender, id.as_str()))? else {
        return Err(Error::not_found(format!("order with id `{id}`")));
    };
    cancel_order_with_reason(ctx, Some(sender), sequence, CancelReason::User)
}

/// Cancel one of the sender's orders by sequence.
pub fn cancel_order_by_sequence(ctx: &mut Context, sender: Addr, sequence: u64) -> Result<()> {
    cancel_order_with_reason(ctx, Some(sender), sequence, CancelReason::User)
}

/// The shared cancellation path. `sender` is `None` for system-initiated
/// cancellations (good-til expiry), which skip the ownership check.
pub(crate) fn cancel_order_with_reason(
    ctx: &mut Context,
    sender: Option<Addr>,
    sequence: u64,
    reason: CancelReason,
) -> Result<()> {
    let Some(order) = ORDERS.may_load(&*ctx.storage, sequence)? else {
        return Err(Error::not_found(format!("order with sequence {sequence}")));
    };

    if let Some(sender) = sender {
        if order.creator != sender {
            return Err(Error::unauthorized(format!(
                "order {sequence} does not belong to the sender",
            )));
        }
    }

    let book_id = ORDER_BOOK_IDS.load(&*ctx.storage, (&order.base_denom, &order.quote_denom))?;

    remove_resting_order(ctx, book_id, &order, Removal::Cancelled(reason))
}
