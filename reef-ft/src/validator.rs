use {
    crate::{
        get_balance, CONTRACT_ACCOUNTS, DEX_EXPECTED, DEX_LOCKED, FROZEN, GLOBAL_FREEZE,
        VESTING_LOCKED, WHITELISTED,
    },
    reef_std::{Addr, Denom, Storage, Uint128},
    reef_types::{
        ft::{Definition, Feature},
        Context, Error, Result, TransferPurpose,
    },
};

pub fn is_globally_frozen(storage: &dyn Storage, denom: &Denom) -> bool {
    GLOBAL_FREEZE.has(storage, denom)
}

pub fn is_smart_contract(storage: &dyn Storage, addr: &Addr) -> bool {
    CONTRACT_ACCOUNTS.has(storage, addr)
}

pub fn frozen_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    Ok(FROZEN.may_load(storage, (addr, denom))?.unwrap_or(Uint128::ZERO))
}

pub fn whitelisted_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    Ok(WHITELISTED
        .may_load(storage, (addr, denom))?
        .unwrap_or(Uint128::ZERO))
}

pub fn dex_locked_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    Ok(DEX_LOCKED
        .may_load(storage, (addr, denom))?
        .unwrap_or(Uint128::ZERO))
}

pub fn dex_expected_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    Ok(DEX_EXPECTED
        .may_load(storage, (addr, denom))?
        .unwrap_or(Uint128::ZERO))
}

pub fn vesting_locked_balance(
    storage: &dyn Storage,
    addr: &Addr,
    denom: &Denom,
) -> Result<Uint128> {
    Ok(VESTING_LOCKED
        .may_load(storage, (addr, denom))?
        .unwrap_or(Uint128::ZERO))
}

/// Authorize spending `amount` of `denom` from `addr`.
///
/// The rules run in a fixed order and short-circuit on the first one that
/// decides the outcome:
///
/// 1. IBC ack/timeout refund legs always pass, so a freeze applied after the
///    user sent the transfer cannot strand their funds on escrow.
/// 2. Global freeze blocks everyone but the admin.
/// 3. Funds returning to escrow (ibc-in) pass; the global freeze above
///    intentionally still applies to them.
/// 4. Smart-contract-initiated transfers are blocked when the feature says so.
/// 5. The amount must fit in the balance net of DEX and vesting locks.
/// 6. With freezing enabled, the amount must also fit net of the frozen
///    balance (admin exempt).
pub fn validate_spendable(
    ctx: &Context,
    addr: &Addr,
    def: Option<&Definition>,
    denom: &Denom,
    amount: Uint128,
) -> Result<()> {
    if ctx.purpose.is_refund() {
        return Ok(());
    }

    let storage: &dyn Storage = &*ctx.storage;

    if let Some(def) = def {
        if def.is_feature_enabled(Feature::Freezing)
            && is_globally_frozen(storage, denom)
            && !def.has_admin_privileges(addr)
        {
            return Err(Error::GloballyFrozen {
                denom: denom.to_string(),
            });
        }
    }

    if ctx.purpose == TransferPurpose::IbcIn {
        return Ok(());
    }

    if let Some(def) = def {
        if def.is_feature_enabled(Feature::BlockSmartContracts)
            && !def.has_admin_privileges(addr)
            && ctx.triggered_by_contract
        {
            return Err(Error::unauthorized(format!(
                "transfers made by smart contracts are disabled for {denom}"
            )));
        }
    }

    let balance = get_balance(storage, addr, denom)?;
    let not_locked = balance
        .saturating_sub(dex_locked_balance(storage, addr, denom)?)
        .saturating_sub(vesting_locked_balance(storage, addr, denom)?);
    if not_locked < amount {
        return Err(Error::insufficient_funds(
            format!("{amount}{denom}"),
            format!("{not_locked}{denom}"),
        ));
    }

    if let Some(def) = def {
        if def.is_feature_enabled(Feature::Freezing) && !def.has_admin_privileges(addr) {
            let not_frozen = balance.saturating_sub(frozen_balance(storage, addr, denom)?);
            if not_frozen < amount {
                return Err(Error::insufficient_funds(
                    format!("{amount}{denom}"),
                    format!("{not_frozen}{denom}"),
                ));
            }
        }
    }

    Ok(())
}

/// Authorize `addr` receiving `amount` of `denom`.
///
/// 1. ibc-out (the escrow account receiving) passes only when the denom has
///    the IBC feature.
/// 2. Refund legs always pass, even if the receiver lost their whitelisting
///    since sending.
/// 3. The whitelist cap counts the current balance plus everything the
///    account may still receive from its open DEX orders.
/// 4. Receiving smart contracts are blocked when the feature says so.
pub fn validate_receivable(
    ctx: &Context,
    addr: &Addr,
    def: Option<&Definition>,
    denom: &Denom,
    amount: Uint128,
) -> Result<()> {
    if ctx.purpose == TransferPurpose::IbcOut {
        if let Some(def) = def {
            if !def.is_feature_enabled(Feature::Ibc) {
                return Err(Error::unauthorized(format!(
                    "ibc transfers are disabled for {denom}"
                )));
            }
        }
        return Ok(());
    }

    if ctx.purpose.is_refund() {
        return Ok(());
    }

    let storage: &dyn Storage = &*ctx.storage;

    if let Some(def) = def {
        if def.is_feature_enabled(Feature::Whitelisting) && !def.has_admin_privileges(addr) {
            validate_whitelist_headroom(storage, addr, denom, amount)?;
        }

        if def.is_feature_enabled(Feature::BlockSmartContracts)
            && !def.has_admin_privileges(addr)
            && is_smart_contract(storage, addr)
        {
            return Err(Error::unauthorized(format!(
                "transfers to smart contracts are disabled for {denom}"
            )));
        }
    }

    Ok(())
}

/// `balance + expected_to_receive + amount` must stay within the whitelist
/// cap.
pub fn validate_whitelist_headroom(
    storage: &dyn Storage,
    addr: &Addr,
    denom: &Denom,
    amount: Uint128,
) -> Result<()> {
    let balance = get_balance(storage, addr, denom)?;
    let expected = dex_expected_balance(storage, addr, denom)?;
    let cap = whitelisted_balance(storage, addr, denom)?;
    let available = cap.saturating_sub(balance).saturating_sub(expected);
    if available < amount {
        return Err(Error::WhitelistedLimitExceeded {
            requested: format!("{amount}{denom}"),
            available: format!("{available}{denom}"),
        });
    }
    Ok(())
}

/// The balance `addr` can freely spend: net of DEX locks, vesting locks,
/// and (admin exempt) the frozen amount. Floors at zero.
pub fn spendable_balance(storage: &dyn Storage, addr: &Addr, denom: &Denom) -> Result<Uint128> {
    let balance = get_balance(storage, addr, denom)?;
    if balance.is_zero() {
        return Ok(balance);
    }

    let not_locked = balance
        .saturating_sub(dex_locked_balance(storage, addr, denom)?)
        .saturating_sub(vesting_locked_balance(storage, addr, denom)?);

    let def = crate::definition_or_nil(storage, denom)?;
    if let Some(def) = &def {
        if def.is_feature_enabled(Feature::Freezing) && !def.has_admin_privileges(addr) {
            let frozen = if is_globally_frozen(storage, denom) {
                balance
            } else {
                frozen_balance(storage, addr, denom)?
            };
            let not_frozen = balance.saturating_sub(frozen);
            return Ok(not_locked.min(not_frozen));
        }
    }

    Ok(not_locked)
}
