use {
    crate::PARAMS,
    reef_std::{Denom, Storage, Uint128},
    reef_types::{
        dex::{OrderBookParams, Params},
        Price, Result, MAX_PRICE_EXPONENT, MIN_PRICE_EXPONENT,
    },
};

/// How many leading digits of the unified ref amount stay significant in
/// the quantity step.
const QUANTITY_STEP_DIGITS: u32 = 2;

/// How many significant decimal digits a price carries relative to the
/// pair's ref-amount ratio.
const PRICE_TICK_DIGITS: i32 = 6;

pub fn get_params(storage: &dyn Storage) -> Result<Params> {
    Ok(PARAMS.load(storage)?)
}

pub fn set_params(storage: &mut dyn Storage, params: &Params) -> Result<()> {
    Ok(PARAMS.save(storage, params)?)
}

/// A denom's unified ref amount: set at issuance via DEX settings, or the
/// module default for denoms without one.
fn unified_ref_amount(storage: &dyn Storage, denom: &Denom, params: &Params) -> Result<Uint128> {
    match reef_ft::query_dex_settings(storage, denom)? {
        Some(settings) => Ok(settings.unified_ref_amount),
        None => Ok(params.default_unified_ref_amount),
    }
}

/// Derive a pair's price tick and quantity step from the two denoms'
/// unified ref amounts.
///
/// The quantity step keeps roughly `QUANTITY_STEP_DIGITS` significant
/// digits of the base ref amount; the price tick is a power of ten placed
/// `PRICE_TICK_DIGITS` below the quote/base ref ratio.
pub fn order_book_params(
    storage: &dyn Storage,
    base_denom: &Denom,
    quote_denom: &Denom,
) -> Result<OrderBookParams> {
    let params = get_params(storage)?;
    let base_ura = unified_ref_amount(storage, base_denom, &params)?;
    let quote_ura = unified_ref_amount(storage, quote_denom, &params)?;

    let base_exp = base_ura.integer_log10();
    let quote_exp = quote_ura.integer_log10();

    let step_exp = base_exp.saturating_sub(QUANTITY_STEP_DIGITS);
    let quantity_step = Uint128::new(10_u128.pow(step_exp));

    let tick_exp = (quote_exp as i32 - base_exp as i32 - PRICE_TICK_DIGITS)
        .clamp(MIN_PRICE_EXPONENT as i32, MAX_PRICE_EXPONENT as i32);
    let price_tick = Price::new(1, tick_exp as i8)?;

    Ok(OrderBookParams {
        price_tick,
        quantity_step,
    })
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        reef_std::{Coin, MemStorage},
        std::str::FromStr,
    };

    #[test]
    fn params_track_ref_amounts() {
        let mut storage = MemStorage::new();
        set_params(&mut storage, &Params {
            order_reserve: Coin::new(Denom::from_str("ureef").unwrap(), Uint128::ZERO),
            max_orders_per_denom: 100,
            default_unified_ref_amount: Uint128::new(100),
        })
        .unwrap();

        let base = Denom::from_str("ubase").unwrap();
        let quote = Denom::from_str("uquote").unwrap();
        let params = order_book_params(&storage, &base, &quote).unwrap();

        // Equal ref amounts of 100: step 1, tick 1e-6.
        assert_eq!(params.quantity_step, Uint128::ONE);
        assert_eq!(params.price_tick, Price::from_str("1e-6").unwrap());
    }
}
