use {
    crate::{
        definition_or_nil, dex_expected_balance, dex_locked_balance, move_coins,
        validate_receivable, validate_spendable, validate_whitelist_headroom, DEX_EXPECTED,
        DEX_LOCKED,
    },
    reef_std::{Addr, Coin, Storage, Uint128},
    reef_types::{ft::Feature, Context, Error, Result},
};

fn save_locked(storage: &mut dyn Storage, addr: &Addr, coin: &Coin, value: Uint128) -> Result<()> {
    if value.is_zero() {
        DEX_LOCKED.remove(storage, (addr, &coin.denom));
    } else {
        DEX_LOCKED.save(storage, (addr, &coin.denom), &value)?;
    }
    Ok(())
}

fn save_expected(
    storage: &mut dyn Storage,
    addr: &Addr,
    coin: &Coin,
    value: Uint128,
) -> Result<()> {
    if value.is_zero() {
        DEX_EXPECTED.remove(storage, (addr, &coin.denom));
    } else {
        DEX_EXPECTED.save(storage, (addr, &coin.denom), &value)?;
    }
    Ok(())
}

/// Commit part of `addr`'s balance to an open order. The amount must be
/// spendable under the full transfer-validator rules.
pub fn dex_lock(ctx: &mut Context, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let def = definition_or_nil(&*ctx.storage, &coin.denom)?;
    validate_spendable(ctx, addr, def.as_ref(), &coin.denom, coin.amount)?;

    let locked = dex_locked_balance(&*ctx.storage, addr, &coin.denom)?.checked_add(coin.amount)?;
    save_locked(ctx.storage, addr, coin, locked)
}

/// Release part of `addr`'s DEX-locked balance back to free balance.
pub fn dex_unlock(storage: &mut dyn Storage, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let locked = dex_locked_balance(storage, addr, &coin.denom)?;
    let remaining = locked.checked_sub(coin.amount).map_err(|_| {
        Error::invalid_state(format!(
            "unlocking {coin} exceeds the DEX-locked balance {locked}"
        ))
    })?;
    save_locked(storage, addr, coin, remaining)
}

/// Settle one leg of a match: spend `coin` out of `from`'s DEX-locked
/// balance into `to`'s free balance. No burn or commission rates apply to
/// DEX fills; the receiver still passes the transfer validator.
pub fn dex_settle(ctx: &mut Context, from: &Addr, to: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let def = definition_or_nil(&*ctx.storage, &coin.denom)?;
    validate_receivable(ctx, to, def.as_ref(), &coin.denom, coin.amount)?;

    dex_unlock(ctx.storage, from, coin)?;
    move_coins(ctx.storage, from, to, coin)
}

/// Register that `addr` may receive up to `coin` more from its open orders.
/// Counted against the whitelist cap, so the headroom is checked here.
pub fn dex_increase_expected(ctx: &mut Context, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let def = definition_or_nil(&*ctx.storage, &coin.denom)?;
    if let Some(def) = &def {
        if def.is_feature_enabled(Feature::Whitelisting) && !def.has_admin_privileges(addr) {
            validate_whitelist_headroom(&*ctx.storage, addr, &coin.denom, coin.amount)?;
        }
    }

    let expected =
        dex_expected_balance(&*ctx.storage, addr, &coin.denom)?.checked_add(coin.amount)?;
    save_expected(ctx.storage, addr, coin, expected)
}

pub fn dex_decrease_expected(storage: &mut dyn Storage, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let expected = dex_expected_balance(storage, addr, &coin.denom)?;
    let remaining = expected.checked_sub(coin.amount).map_err(|_| {
        Error::invalid_state(format!(
            "decreasing expected-to-receive by {coin} exceeds the recorded {expected}"
        ))
    })?;
    save_expected(storage, addr, coin, remaining)
}
