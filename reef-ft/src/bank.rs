use {
    crate::{
        definition_or_nil, ft_module_account, validate_receivable, validate_spendable, BALANCES,
        SUPPLIES,
    },
    reef_std::{Addr, Coin, Denom, Storage, Udec128, Uint128},
    reef_types::{
        ft::{Definition, Feature},
        Context, Error, Result,
    },
};

pub fn get_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    Ok(BALANCES
        .may_load(storage, (addr, denom))?
        .unwrap_or(Uint128::ZERO))
}

pub fn get_supply(storage: &dyn Storage, denom: &Denom) -> Result<Uint128> {
    Ok(SUPPLIES.may_load(storage, denom)?.unwrap_or(Uint128::ZERO))
}

fn set_balance(
    storage: &mut dyn Storage,
    addr: &Addr,
    denom: &Denom,
    amount: Uint128,
) -> Result<()> {
    if amount.is_zero() {
        BALANCES.remove(storage, (addr, denom));
    } else {
        BALANCES.save(storage, (addr, denom), &amount)?;
    }
    Ok(())
}

/// Move coins between accounts with no validation and no rates. Callers are
/// responsible for having validated both legs.
pub(crate) fn move_coins(
    storage: &mut dyn Storage,
    from: &Addr,
    to: &Addr,
    coin: &Coin,
) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let from_balance = get_balance(storage, from, &coin.denom)?;
    let new_from = from_balance.checked_sub(coin.amount).map_err(|_| {
        Error::insufficient_funds(coin.to_string(), format!("{from_balance}{}", coin.denom))
    })?;
    let to_balance = get_balance(storage, to, &coin.denom)?;
    set_balance(storage, from, &coin.denom, new_from)?;
    set_balance(storage, to, &coin.denom, to_balance.checked_add(coin.amount)?)?;
    Ok(())
}

/// Create coins out of thin air into `recipient`, growing the supply.
pub(crate) fn mint_coins(storage: &mut dyn Storage, recipient: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let supply = get_supply(storage, &coin.denom)?.checked_add(coin.amount)?;
    SUPPLIES.save(storage, &coin.denom, &supply)?;
    let balance = get_balance(storage, recipient, &coin.denom)?.checked_add(coin.amount)?;
    set_balance(storage, recipient, &coin.denom, balance)
}

/// Destroy coins held by `addr`, shrinking the supply. The coins pass
/// through the module account on their way out.
pub(crate) fn burn_coins(storage: &mut dyn Storage, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Ok(());
    }
    let module = ft_module_account();
    move_coins(storage, addr, &module, coin)?;
    let module_balance = get_balance(storage, &module, &coin.denom)?;
    set_balance(storage, &module, &coin.denom, module_balance.checked_sub(coin.amount)?)?;
    let supply = get_supply(storage, &coin.denom)?;
    let new_supply = supply.checked_sub(coin.amount).map_err(|_| {
        Error::invalid_state(format!(
            "burning {coin} exceeds the recorded supply {supply}"
        ))
    })?;
    if new_supply.is_zero() {
        SUPPLIES.remove(storage, &coin.denom);
    } else {
        SUPPLIES.save(storage, &coin.denom, &new_supply)?;
    }
    Ok(())
}

fn rate_applies(def: &Definition, rate: Udec128, from: &Addr, to: &Addr) -> bool {
    !rate.is_zero() && !def.has_admin_privileges(from) && !def.has_admin_privileges(to)
}

/// A bank send: both legs validated, then the amount moved, then the burn
/// rate and send commission charged on top of the amount.
///
/// The sender pays `ceil(amount · burn_rate)` burned and
/// `ceil(amount · send_commission_rate)` forwarded to the admin, or to the
/// extension contract when the admin has been cleared with the extension
/// feature enabled. Rates are skipped only when the sender or recipient
/// has admin privileges; DEX fills never come through here.
pub fn transfer(ctx: &mut Context, from: &Addr, to: &Addr, coin: &Coin) -> Result<()> {
    let def = definition_or_nil(&*ctx.storage, &coin.denom)?;

    let (burn, commission, commission_to) = match &def {
        Some(def) => {
            let burn = if rate_applies(def, def.burn_rate, from, to) {
                coin.amount.checked_mul_dec_ceil(def.burn_rate)?
            } else {
                Uint128::ZERO
            };
            let (commission, commission_to) =
                if rate_applies(def, def.send_commission_rate, from, to) {
                    match (&def.admin, &def.extension_addr) {
                        (Some(admin), _) => (
                            coin.amount.checked_mul_dec_ceil(def.send_commission_rate)?,
                            Some(*admin),
                        ),
                        (None, Some(extension))
                            if def.is_feature_enabled(Feature::Extension) =>
                        {
                            (
                                coin.amount.checked_mul_dec_ceil(def.send_commission_rate)?,
                                Some(*extension),
                            )
                        },
                        (None, _) => (Uint128::ZERO, None),
                    }
                } else {
                    (Uint128::ZERO, None)
                };
            (burn, commission, commission_to)
        },
        None => (Uint128::ZERO, Uint128::ZERO, None),
    };

    let total_debit = coin
        .amount
        .checked_add(burn)?
        .checked_add(commission)?;

    validate_spendable(ctx, from, def.as_ref(), &coin.denom, total_debit)?;
    validate_receivable(ctx, to, def.as_ref(), &coin.denom, coin.amount)?;

    move_coins(ctx.storage, from, to, coin)?;

    if !burn.is_zero() {
        burn_coins(ctx.storage, from, &Coin::new(coin.denom.clone(), burn))?;
    }
    if let Some(commission_to) = commission_to {
        if !commission.is_zero() {
            move_coins(
                ctx.storage,
                from,
                &commission_to,
                &Coin::new(coin.denom.clone(), commission),
            )?;
        }
    }

    Ok(())
}
