use {
    crate::{cancel_order_with_reason, GOOD_TIL_HEIGHT, GOOD_TIL_TIME},
    reef_std::{Bound, Order as IterationOrder, StdResult},
    reef_types::{dex::CancelReason, Context, Result},
};

/// Expire orders whose good-til deadline has passed. Runs at the beginning
/// of every block.
///
/// A deadline is inclusive: an order good til height `h` (or time `t`)
/// still trades in the block at `h`, and is removed at the beginning of the
/// first block past it.
///
/// Height deadlines are processed before time deadlines; within each index,
/// entries pop in (deadline, sequence) order. An order carrying both
/// triggers is removed by whichever fires first; removal deregisters the
/// other entry, so the second pass doesn't see it.
pub fn begin_block(ctx: &mut Context) -> Result<()> {
    let due_by_height = GOOD_TIL_HEIGHT
        .range(
            &*ctx.storage,
            None,
            Some(Bound::Exclusive((ctx.block.height, 0))),
            IterationOrder::Ascending,
        )
        .collect::<StdResult<Vec<_>>>()?;

    for (height, sequence) in due_by_height {
        tracing::debug!(height, sequence, "expiring order past its good-til height");
        cancel_order_with_reason(ctx, None, sequence, CancelReason::Expired)?;
    }

    let due_by_time = GOOD_TIL_TIME
        .range(
            &*ctx.storage,
            None,
            Some(Bound::Exclusive((ctx.block.timestamp, 0))),
            IterationOrder::Ascending,
        )
        .collect::<StdResult<Vec<_>>>()?;

    for (time, sequence) in due_by_time {
        tracing::debug!(%time, sequence, "expiring order past its good-til time");
        cancel_order_with_reason(ctx, None, sequence, CancelReason::Expired)?;
    }

    Ok(())
}
