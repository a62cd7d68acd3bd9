use {
    crate::{
        increment_order_count, order_book_params, register_good_til, release_order_funds,
        remove_resting_order, emit_removal, Removal, CREATOR_ORDERS, NEXT_ORDER_BOOK_ID,
        NEXT_ORDER_SEQUENCE, ORDERS, ORDER_BOOK_IDS, ORDER_BOOK_INDEX, ORDER_IDS, TOMBSTONES,
    },
    reef_std::{Addr, Coin, Order as IterationOrder, Storage, Uint128},
    reef_types::{
        dex::{
            initial_locked_amount, CancelReason, Order, OrderBookCreated, OrderBookId,
            OrderBookParams, OrderFilled, OrderPlaced, OrderRequest, OrderType, Side, TimeInForce,
            MAX_ORDER_ID_LENGTH,
        },
        Context, Error, Result,
    },
};

fn validate_order_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_ORDER_ID_LENGTH {
        return Err(Error::invalid_input(format!(
            "order id length must be within [1, {MAX_ORDER_ID_LENGTH}]"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::invalid_input(format!("invalid order id `{id}`")));
    }
    Ok(())
}

fn validate_request(ctx: &Context, request: &OrderRequest) -> Result<()> {
    validate_order_id(&request.id)?;

    if request.base_denom == request.quote_denom {
        return Err(Error::invalid_input(
            "base and quote denoms must be different",
        ));
    }

    if request.quantity.is_zero() {
        return Err(Error::invalid_input("order quantity must be positive"));
    }

    match request.order_type {
        OrderType::Limit => {
            if request.price.is_none() {
                return Err(Error::invalid_input("limit order requires a price"));
            }
        },
        OrderType::Market => {
            if request.price.is_some() {
                return Err(Error::invalid_input("market order cannot have a price"));
            }
            if request.time_in_force == TimeInForce::Gtc {
                return Err(Error::invalid_input("market orders cannot rest in the book"));
            }
            if request.good_til.is_some() {
                return Err(Error::invalid_input("market orders cannot have a good-til"));
            }
        },
    }

    if let Some(good_til) = &request.good_til {
        if good_til.block_height.is_none() && good_til.block_time.is_none() {
            return Err(Error::invalid_input("good-til must set a height or a time"));
        }
        if let Some(height) = good_til.block_height {
            if height <= ctx.block.height {
                return Err(Error::invalid_input(format!(
                    "good-til height {height} must be after the current block {}",
                    ctx.block.height,
                )));
            }
        }
        if let Some(time) = good_til.block_time {
            if time <= ctx.block.timestamp {
                return Err(Error::invalid_input(format!(
                    "good-til time {time} must be after the current block time {}",
                    ctx.block.timestamp,
                )));
            }
        }
    }

    Ok(())
}

fn get_or_create_order_book(
    ctx: &mut Context,
    request: &OrderRequest,
) -> Result<OrderBookId> {
    if let Some(book_id) =
        ORDER_BOOK_IDS.may_load(&*ctx.storage, (&request.base_denom, &request.quote_denom))?
    {
        return Ok(book_id);
    }

    let (book_id, _) = NEXT_ORDER_BOOK_ID.increment(ctx.storage)?;
    ORDER_BOOK_IDS.save(
        ctx.storage,
        (&request.base_denom, &request.quote_denom),
        &book_id,
    )?;
    ctx.emit(OrderBookCreated {
        order_book_id: book_id,
        base_denom: request.base_denom.clone(),
        quote_denom: request.quote_denom.clone(),
    });

    tracing::debug!(
        order_book_id = book_id,
        base = %request.base_denom,
        quote = %request.quote_denom,
        "created order book",
    );

    Ok(book_id)
}

/// Walk the opposite side and sum how much base quantity the incoming order
/// could trade, without touching anything. Used by the fill-or-kill
/// pre-check.
fn fillable_volume(storage: &dyn Storage, book_id: OrderBookId, incoming: &OrderRequest) -> Result<Uint128> {
    let mut volume = Uint128::ZERO;
    for res in ORDER_BOOK_INDEX
        .prefix((book_id, incoming.side.opposite()))
        .keys(storage, None, None, IterationOrder::Ascending)
    {
        let (_, maker_sequence) = res?;
        let maker = ORDERS.load(storage, maker_sequence)?;
        let maker_price = maker
            .price
            .ok_or_else(|| Error::invalid_state("resting order without a price"))?;

        if let Some(limit_price) = incoming.price {
            let crossed = match incoming.side {
                Side::Buy => maker_price <= limit_price,
                Side::Sell => maker_price >= limit_price,
            };
            if !crossed {
                break;
            }
        }

        volume = volume.checked_add(maker.remaining_base_quantity)?;
        if volume >= incoming.quantity {
            break;
        }
    }
    Ok(volume)
}

/// The first order on the given side, by price-time priority.
fn best_maker(
    storage: &dyn Storage,
    book_id: OrderBookId,
    side: Side,
) -> Result<Option<Order>> {
    let Some(res) = ORDER_BOOK_INDEX
        .prefix((book_id, side))
        .keys(storage, None, None, IterationOrder::Ascending)
        .next()
    else {
        return Ok(None);
    };
    let (_, sequence) = res?;
    Ok(Some(ORDERS.load(storage, sequence)?))
}

struct Fill {
    base: Uint128,
    quote: Uint128,
}

/// Settle one match between the incoming order and the best maker, at the
/// maker's price. Returns the traded amounts.
fn settle_fill(
    ctx: &mut Context,
    incoming: &mut Order,
    maker: &mut Order,
    base_quantity: Uint128,
    quote_amount: Uint128,
) -> Result<Fill> {
    let (buyer, seller) = match incoming.side {
        Side::Buy => (&mut *incoming, &mut *maker),
        Side::Sell => (&mut *maker, &mut *incoming),
    };

    // Decrease both parties' expected-to-receive before any balance moves,
    // so the whitelist check inside the settlement doesn't double count.
    for order in [&mut *buyer, &mut *seller] {
        if order.order_type == OrderType::Limit {
            let before = order.expected_to_receive()?;
            let mut after_order = order.clone();
            after_order.remaining_base_quantity = order
                .remaining_base_quantity
                .checked_sub(base_quantity)?;
            let after = after_order.expected_to_receive()?;
            let released = before.checked_sub(after)?;
            if !released.is_zero() {
                reef_ft::dex_decrease_expected(
                    ctx.storage,
                    &order.creator,
                    &Coin::new(order.expected_denom().clone(), released),
                )?;
            }
        }
    }

    let base_coin = Coin::new(buyer.base_denom.clone(), base_quantity);
    let quote_coin = Coin::new(buyer.quote_denom.clone(), quote_amount);
    let (buyer_addr, seller_addr) = (buyer.creator, seller.creator);

    reef_ft::dex_settle(ctx, &seller_addr, &buyer_addr, &base_coin)?;
    reef_ft::dex_settle(ctx, &buyer_addr, &seller_addr, &quote_coin)?;

    seller.remaining_base_quantity = seller.remaining_base_quantity.checked_sub(base_quantity)?;
    seller.remaining_spendable_balance =
        seller.remaining_spendable_balance.checked_sub(base_quantity)?;
    buyer.remaining_base_quantity = buyer.remaining_base_quantity.checked_sub(base_quantity)?;
    buyer.remaining_spendable_balance =
        buyer.remaining_spendable_balance.checked_sub(quote_amount)?;

    Ok(Fill {
        base: base_quantity,
        quote: quote_amount,
    })
}

/// Walk the opposite side of the book in priority order, trading at each
/// maker's price, until the incoming order is spent or prices stop
/// crossing.
fn run_match_loop(
    ctx: &mut Context,
    book_id: OrderBookId,
    book_params: &OrderBookParams,
    incoming: &mut Order,
) -> Result<()> {
    loop {
        if incoming.remaining_base_quantity.is_zero() {
            break;
        }

        let Some(mut maker) = best_maker(&*ctx.storage, book_id, incoming.side.opposite())? else {
            break;
        };
        let maker_price = maker
            .price
            .ok_or_else(|| Error::invalid_state("resting order without a price"))?;

        // Makers beyond the incoming order's limit price don't trade: the
        // maker's price wins only while it is at least as good.
        if let Some(limit_price) = incoming.price {
            let crossed = match incoming.side {
                Side::Buy => maker_price <= limit_price,
                Side::Sell => maker_price >= limit_price,
            };
            if !crossed {
                break;
            }
        }

        let mut base_quantity = incoming
            .remaining_base_quantity
            .min(maker.remaining_base_quantity);

        // The buyer's locked quote balance caps the trade, floored to the
        // quantity step. Rounding dust can leave a buy order unable to
        // afford a single step; a dusty maker is closed, a dusty taker
        // stops matching.
        let buyer_spendable = match incoming.side {
            Side::Buy => incoming.remaining_spendable_balance,
            Side::Sell => maker.remaining_spendable_balance,
        };
        let affordable = maker_price.amount_affordable(buyer_spendable)?;
        let affordable =
            affordable.checked_sub(affordable.checked_rem(book_params.quantity_step)?)?;
        base_quantity = base_quantity.min(affordable);
        if base_quantity.is_zero() {
            match incoming.side {
                Side::Buy => break,
                Side::Sell => {
                    remove_resting_order(ctx, book_id, &maker, Removal::Closed)?;
                    continue;
                },
            }
        }

        let (floor_quote, ceil_quote) = maker_price.checked_mul_to_amounts(base_quantity)?;
        // The resting maker's nominal amount is honored exactly; the taker
        // absorbs the rounding.
        let quote_amount = match incoming.side {
            Side::Buy => ceil_quote,
            Side::Sell => floor_quote,
        };

        let fill = settle_fill(ctx, incoming, &mut maker, base_quantity, quote_amount)?;

        ctx.emit(OrderFilled {
            maker_sequence: maker.sequence,
            taker_sequence: incoming.sequence,
            base_amount: fill.base,
            quote_amount: fill.quote,
            price: maker_price,
        });

        if maker.remaining_base_quantity.is_zero() || maker.remaining_spendable_balance.is_zero() {
            remove_resting_order(ctx, book_id, &maker, Removal::Closed)?;
        } else {
            ORDERS.save(ctx.storage, maker.sequence, &maker)?;
        }
    }

    Ok(())
}

/// Park the incoming order's residual in the book.
fn park_order(ctx: &mut Context, book_id: OrderBookId, order: &Order) -> Result<()> {
    ORDERS.save(ctx.storage, order.sequence, order)?;
    ORDER_BOOK_INDEX.insert(
        ctx.storage,
        ((book_id, order.side), order.sort_key()?, order.sequence),
    )?;
    ORDER_IDS.save(ctx.storage, (&order.creator, order.id.as_str()), &order.sequence)?;
    CREATOR_ORDERS.insert(ctx.storage, (&order.creator, order.sequence))?;
    increment_order_count(ctx.storage, &order.creator, &order.base_denom)?;
    increment_order_count(ctx.storage, &order.creator, &order.quote_denom)?;
    register_good_til(ctx.storage, order)?;
    Ok(())
}

/// The entry point of the matching engine.
///
/// Validates and normalizes the request, locks the creator's funds, matches
/// against the opposite side of the book at maker prices, and finally
/// parks, drops, or closes the residual according to the time-in-force.
///
/// Returns the sequence assigned to the order.
pub fn place_order(ctx: &mut Context, creator: Addr, request: OrderRequest) -> Result<u64> {
    validate_request(ctx, &request)?;

    let params = crate::get_params(&*ctx.storage)?;

    if ORDER_IDS.has(&*ctx.storage, (&creator, request.id.as_str()))
        || TOMBSTONES.has(&*ctx.storage, (&creator, request.id.as_str()))
    {
        return Err(Error::DuplicateOrderId {
            creator: creator.to_string(),
            id: request.id.clone(),
        });
    }

    for denom in [&request.base_denom, &request.quote_denom] {
        let count = crate::ORDER_COUNTS
            .may_load(&*ctx.storage, (&creator, denom))?
            .unwrap_or(0);
        if count >= params.max_orders_per_denom {
            return Err(Error::invalid_input(format!(
                "account {creator} reached the maximum of {} open orders for {denom}",
                params.max_orders_per_denom,
            )));
        }
    }

    let book_id = get_or_create_order_book(ctx, &request)?;
    let book_params = order_book_params(&*ctx.storage, &request.base_denom, &request.quote_denom)?;

    if !request.quantity.checked_multiple_of(book_params.quantity_step)? {
        return Err(Error::invalid_input(format!(
            "quantity {} must be a multiple of the quantity step {}",
            request.quantity, book_params.quantity_step,
        )));
    }
    if let Some(price) = &request.price {
        if !price.is_multiple_of(&book_params.price_tick) {
            return Err(Error::invalid_input(format!(
                "price {price} must be a multiple of the price tick {}",
                book_params.price_tick,
            )));
        }
    }

    // Fill-or-kill: simulate the walk before any side effect; the
    // placement either fully fills or fails.
    if request.time_in_force == TimeInForce::Fok {
        let volume = fillable_volume(&*ctx.storage, book_id, &request)?;
        if volume < request.quantity {
            return Err(Error::NoSufficientLiquidity);
        }
    }

    let (sequence, _) = NEXT_ORDER_SEQUENCE.increment(ctx.storage)?;

    // What the order locks: sells lock the base quantity; limit buys lock
    // the rounded-up quote value; market buys lock the whole spendable
    // quote balance, the leftover being refunded after the match loop.
    let locked_amount = match (request.order_type, request.side) {
        (OrderType::Market, Side::Buy) => {
            let spendable =
                reef_ft::spendable_balance(&*ctx.storage, &creator, &request.quote_denom)?;
            if spendable.is_zero() {
                return Err(Error::insufficient_funds(
                    format!("market buy on {}", request.quote_denom),
                    format!("0{}", request.quote_denom),
                ));
            }
            spendable
        },
        _ => initial_locked_amount(request.side, request.price.as_ref(), request.quantity)?,
    };

    let order = Order {
        creator,
        id: request.id.clone(),
        sequence,
        base_denom: request.base_denom.clone(),
        quote_denom: request.quote_denom.clone(),
        order_type: request.order_type,
        side: request.side,
        price: request.price,
        quantity: request.quantity,
        remaining_base_quantity: request.quantity,
        remaining_spendable_balance: locked_amount,
        time_in_force: request.time_in_force,
        good_til: request.good_til,
        reserve: params.order_reserve.clone(),
    };

    if !params.order_reserve.is_zero() {
        reef_ft::transfer(ctx, &creator, &reef_ft::dex_module_account(), &params.order_reserve)?;
    }

    reef_ft::dex_lock(
        ctx,
        &creator,
        &Coin::new(order.locked_denom().clone(), locked_amount),
    )?;
    if order.order_type == OrderType::Limit {
        let expected = order.expected_to_receive()?;
        reef_ft::dex_increase_expected(
            ctx,
            &creator,
            &Coin::new(order.expected_denom().clone(), expected),
        )?;
    }

    ctx.emit(OrderPlaced {
        creator,
        id: order.id.clone(),
        sequence,
        order_type: order.order_type,
        side: order.side,
        base_denom: order.base_denom.clone(),
        quote_denom: order.quote_denom.clone(),
        price: order.price,
        quantity: order.quantity,
        time_in_force: order.time_in_force,
    });

    let mut order = order;
    run_match_loop(ctx, book_id, &book_params, &mut order)?;

    // The pre-walk measured raw volume; rounding can still leave a
    // fill-or-kill short, in which case the whole placement reverts.
    if order.time_in_force == TimeInForce::Fok && !order.remaining_base_quantity.is_zero() {
        return Err(Error::NoSufficientLiquidity);
    }

    if order.remaining_base_quantity.is_zero() {
        // Fully filled in its own placement.
        release_order_funds(ctx, &order)?;
        emit_removal(ctx, &order, Removal::Closed);
    } else if order.time_in_force == TimeInForce::Gtc && can_rest(&order, &book_params)? {
        park_order(ctx, book_id, &order)?;
    } else if order.time_in_force == TimeInForce::Gtc {
        // Partially filled down to rounding dust that cannot back another
        // step; nothing left to rest.
        release_order_funds(ctx, &order)?;
        emit_removal(ctx, &order, Removal::Closed);
    } else {
        // Immediate-or-cancel (market orders behave the same): drop the
        // residual and refund.
        release_order_funds(ctx, &order)?;
        emit_removal(ctx, &order, Removal::Cancelled(CancelReason::Ioc));
    }

    Ok(sequence)
}

/// Whether a residual can rest as a maker: a buy must still be able to pay
/// for at least one quantity step at its own price.
fn can_rest(order: &Order, book_params: &OrderBookParams) -> Result<bool> {
    match order.side {
        Side::Sell => Ok(true),
        Side::Buy => {
            let price = order
                .price
                .ok_or_else(|| Error::invalid_state("resting order without a price"))?;
            let affordable = price.amount_affordable(order.remaining_spendable_balance)?;
            Ok(affordable >= book_params.quantity_step)
        },
    }
}
