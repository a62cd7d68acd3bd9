use {
    crate::{
        burn_coins, dex_locked_balance, frozen_balance, get_balance, mint_coins, module_accounts,
        move_coins, validate_receivable, validate_spendable, vesting_locked_balance,
        whitelisted_balance, CONTRACT_ACCOUNTS, CURRENT_TOKEN_VERSION, DEFINITIONS, DEX_SETTINGS,
        FROZEN, GLOBAL_FREEZE, METADATA, PARAMS, SYMBOLS, WHITELISTED,
    },
    reef_std::{validate_subunit, Addr, Coin, Denom, Storage, Uint128},
    reef_types::{
        ft::{
            normalize_symbol, validate_features, validate_precision, validate_rate,
            validate_symbol, Definition, EventAdminCleared, EventAdminTransferred,
            EventAmountClawedBack, EventFrozenAmountChanged, EventGloballyFrozen,
            EventGloballyUnfrozen, EventIssued, EventWhitelistedAmountChanged, Feature,
            IssueSettings, Params, TokenMetadata, MAX_MINTABLE_AMOUNT,
        },
        Context, Error, Result,
    },
};

pub fn get_params(storage: &dyn Storage) -> Result<Params> {
    Ok(PARAMS.load(storage)?)
}

pub fn set_params(storage: &mut dyn Storage, params: &Params) -> Result<()> {
    Ok(PARAMS.save(storage, params)?)
}

/// Look up a denom's definition, or `None` for denoms that were not issued
/// through this module (native and IBC denoms).
pub fn definition_or_nil(storage: &dyn Storage, denom: &Denom) -> Result<Option<Definition>> {
    if !denom.is_issued() {
        return Ok(None);
    }
    let (subunit, issuer) = denom.deconstruct()?;
    Ok(DEFINITIONS.may_load(storage, (&issuer, subunit.as_str()))?)
}

pub fn get_definition(storage: &dyn Storage, denom: &Denom) -> Result<Definition> {
    definition_or_nil(storage, denom)?
        .ok_or_else(|| Error::not_found(format!("token definition for {denom}")))
}

fn save_definition(storage: &mut dyn Storage, def: &Definition) -> Result<()> {
    let (subunit, issuer) = def.denom.deconstruct()?;
    Ok(DEFINITIONS.save(storage, (&issuer, subunit.as_str()), def)?)
}

/// Issue a new fungible token. Returns its denom.
pub fn issue(ctx: &mut Context, issuer: Addr, settings: IssueSettings) -> Result<Denom> {
    validate_subunit(&settings.subunit)
        .map_err(|err| Error::invalid_input(format!("provided subunit: {err}")))?;
    validate_precision(settings.precision)?;
    let features = validate_features(&settings.features)?;
    validate_rate("burn rate", settings.burn_rate)?;
    validate_rate("send commission rate", settings.send_commission_rate)?;
    validate_symbol(&settings.symbol)?;

    if settings.initial_amount > MAX_MINTABLE_AMOUNT {
        return Err(Error::invalid_input(
            "initial amount is greater than maximum allowed",
        ));
    }

    let denom = Denom::issued(&settings.subunit, &issuer)?;
    if DEFINITIONS.has(&*ctx.storage, (&issuer, settings.subunit.as_str())) {
        return Err(Error::invalid_input(format!(
            "subunit {} already registered for the address {issuer}",
            settings.subunit,
        )));
    }

    let params = get_params(&*ctx.storage)?;
    if !params.issue_fee.is_zero() {
        burn_issue_fee(ctx, &issuer, &params.issue_fee)?;
    }

    set_symbol(ctx.storage, &issuer, &settings.symbol)?;

    let mut definition = Definition {
        denom: denom.clone(),
        issuer,
        admin: Some(issuer),
        features,
        burn_rate: settings.burn_rate,
        send_commission_rate: settings.send_commission_rate,
        version: CURRENT_TOKEN_VERSION,
        uri: settings.uri.clone(),
        uri_hash: settings.uri_hash.clone(),
        extension_addr: None,
    };

    if definition.is_feature_enabled(Feature::Extension) {
        let extension = settings
            .extension_settings
            .as_ref()
            .ok_or_else(|| Error::invalid_input("extension settings must be provided"))?;
        // The contract instance is derived deterministically from the denom;
        // hosting the contract itself is outside the core.
        let extension_addr = Addr::module(&format!("extension/{denom}/{}", extension.code_id));
        CONTRACT_ACCOUNTS.insert(ctx.storage, &extension_addr)?;
        definition.extension_addr = Some(extension_addr);
    }

    mint_if_receivable(ctx, &definition, settings.initial_amount, &issuer)?;

    METADATA.save(ctx.storage, &denom, &TokenMetadata {
        symbol: settings.symbol.clone(),
        precision: settings.precision,
        description: settings.description.clone(),
    })?;
    save_definition(ctx.storage, &definition)?;

    if let Some(dex_settings) = &settings.dex_settings {
        if dex_settings.unified_ref_amount.is_zero() {
            return Err(Error::invalid_input("unified ref amount must be positive"));
        }
        DEX_SETTINGS.save(ctx.storage, &denom, dex_settings)?;
    }

    ctx.emit(EventIssued {
        denom: denom.clone(),
        issuer,
        symbol: settings.symbol,
        subunit: settings.subunit,
        precision: settings.precision,
        description: settings.description,
        initial_amount: settings.initial_amount,
        features: definition.features.clone(),
        burn_rate: settings.burn_rate,
        send_commission_rate: settings.send_commission_rate,
        uri: settings.uri,
        uri_hash: settings.uri_hash,
        admin: definition.admin,
    });

    tracing::debug!(%denom, %issuer, "issued new fungible token");

    Ok(denom)
}

pub(crate) fn set_symbol(storage: &mut dyn Storage, issuer: &Addr, symbol: &str) -> Result<()> {
    let normalized = normalize_symbol(symbol);
    if SYMBOLS.has(storage, (issuer, normalized.as_str())) {
        return Err(Error::invalid_input(format!("duplicate symbol {symbol}")));
    }
    Ok(SYMBOLS.insert(storage, (issuer, normalized.as_str()))?)
}

fn burn_issue_fee(ctx: &mut Context, issuer: &Addr, fee: &Coin) -> Result<()> {
    let def = definition_or_nil(&*ctx.storage, &fee.denom)?;
    validate_spendable(ctx, issuer, def.as_ref(), &fee.denom, fee.amount)?;
    burn_coins(ctx.storage, issuer, fee)
}

fn mint_if_receivable(
    ctx: &mut Context,
    def: &Definition,
    amount: Uint128,
    recipient: &Addr,
) -> Result<()> {
    if amount.is_zero() {
        return Ok(());
    }
    validate_receivable(ctx, recipient, Some(def), &def.denom, amount)?;
    mint_coins(ctx.storage, recipient, &Coin::new(def.denom.clone(), amount))
}

fn burn_if_spendable(
    ctx: &mut Context,
    addr: &Addr,
    def: &Definition,
    amount: Uint128,
) -> Result<()> {
    validate_spendable(ctx, addr, Some(def), &def.denom, amount)?;
    burn_coins(ctx.storage, addr, &Coin::new(def.denom.clone(), amount))
}

pub fn mint(ctx: &mut Context, sender: Addr, recipient: Option<Addr>, coin: Coin) -> Result<()> {
    if coin.amount > MAX_MINTABLE_AMOUNT {
        return Err(Error::invalid_input(
            "minting amount is greater than maximum allowed",
        ));
    }
    let def = get_definition(&*ctx.storage, &coin.denom)?;
    def.check_feature_allowed(&sender, Feature::Minting)?;

    let recipient = recipient.unwrap_or(sender);
    mint_if_receivable(ctx, &def, coin.amount, &recipient)
}

pub fn burn(ctx: &mut Context, sender: Addr, coin: Coin) -> Result<()> {
    let def = get_definition(&*ctx.storage, &coin.denom)?;
    def.check_feature_allowed(&sender, Feature::Burning)?;

    burn_if_spendable(ctx, &sender, &def, coin.amount)
}

fn freezing_checks(storage: &dyn Storage, sender: &Addr, account: &Addr, denom: &Denom) -> Result<Definition> {
    let def = get_definition(storage, denom)?;
    if def.has_admin_privileges(account) {
        return Err(Error::unauthorized("admin's balance can't be frozen"));
    }
    def.check_feature_allowed(sender, Feature::Freezing)?;
    Ok(def)
}

fn save_frozen(
    ctx: &mut Context,
    account: &Addr,
    denom: &Denom,
    previous: Uint128,
    current: Uint128,
) -> Result<()> {
    if current.is_zero() {
        FROZEN.remove(ctx.storage, (account, denom));
    } else {
        FROZEN.save(ctx.storage, (account, denom), &current)?;
    }
    ctx.emit(EventFrozenAmountChanged {
        account: *account,
        denom: denom.clone(),
        previous_amount: previous,
        current_amount: current,
    });
    Ok(())
}

pub fn freeze(ctx: &mut Context, sender: Addr, account: Addr, coin: Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Err(Error::invalid_input("freeze amount should be positive"));
    }
    freezing_checks(&*ctx.storage, &sender, &account, &coin.denom)?;

    let previous = frozen_balance(&*ctx.storage, &account, &coin.denom)?;
    let current = previous.checked_add(coin.amount)?;
    save_frozen(ctx, &account, &coin.denom, previous, current)
}

pub fn unfreeze(ctx: &mut Context, sender: Addr, account: Addr, coin: Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Err(Error::invalid_input("unfreeze amount should be positive"));
    }
    freezing_checks(&*ctx.storage, &sender, &account, &coin.denom)?;

    let previous = frozen_balance(&*ctx.storage, &account, &coin.denom)?;
    let current = previous.checked_sub(coin.amount).map_err(|_| {
        Error::insufficient_funds(coin.to_string(), format!("{previous}{}", coin.denom))
    })?;
    save_frozen(ctx, &account, &coin.denom, previous, current)
}

/// Overwrite the frozen amount. Unlike freeze/unfreeze, zero is allowed.
pub fn set_frozen(ctx: &mut Context, sender: Addr, account: Addr, coin: Coin) -> Result<()> {
    freezing_checks(&*ctx.storage, &sender, &account, &coin.denom)?;

    let previous = frozen_balance(&*ctx.storage, &account, &coin.denom)?;
    save_frozen(ctx, &account, &coin.denom, previous, coin.amount)
}

/// Enable the global freeze on a denom. Idempotent.
pub fn globally_freeze(ctx: &mut Context, sender: Addr, denom: Denom) -> Result<()> {
    let def = get_definition(&*ctx.storage, &denom)?;
    def.check_feature_allowed(&sender, Feature::Freezing)?;

    GLOBAL_FREEZE.insert(ctx.storage, &denom)?;
    ctx.emit(EventGloballyFrozen { denom });
    Ok(())
}

/// Disable the global freeze on a denom. Idempotent.
pub fn globally_unfreeze(ctx: &mut Context, sender: Addr, denom: Denom) -> Result<()> {
    let def = get_definition(&*ctx.storage, &denom)?;
    def.check_feature_allowed(&sender, Feature::Freezing)?;

    GLOBAL_FREEZE.remove(ctx.storage, &denom);
    ctx.emit(EventGloballyUnfrozen { denom });
    Ok(())
}

pub fn set_whitelisted(ctx: &mut Context, sender: Addr, account: Addr, coin: Coin) -> Result<()> {
    let def = get_definition(&*ctx.storage, &coin.denom)?;
    if def.is_admin(&account) {
        return Err(Error::unauthorized("admin's balance can't be whitelisted"));
    }
    def.check_feature_allowed(&sender, Feature::Whitelisting)?;

    let previous = whitelisted_balance(&*ctx.storage, &account, &coin.denom)?;
    if coin.amount.is_zero() {
        WHITELISTED.remove(ctx.storage, (&account, &coin.denom));
    } else {
        WHITELISTED.save(ctx.storage, (&account, &coin.denom), &coin.amount)?;
    }
    ctx.emit(EventWhitelistedAmountChanged {
        account,
        denom: coin.denom,
        previous_amount: previous,
        current_amount: coin.amount,
    });
    Ok(())
}

/// Confiscate tokens from an account back to the admin. Refuses to touch
/// module accounts and locked portions of the balance.
pub fn clawback(ctx: &mut Context, sender: Addr, account: Addr, coin: Coin) -> Result<()> {
    if coin.amount.is_zero() {
        return Err(Error::invalid_input("clawback amount should be positive"));
    }
    let def = get_definition(&*ctx.storage, &coin.denom)?;

    if module_accounts().contains(&account) {
        return Err(Error::unauthorized(
            "claw back from module accounts is prohibited",
        ));
    }

    let balance = get_balance(&*ctx.storage, &account, &coin.denom)?;
    let not_locked = balance
        .saturating_sub(dex_locked_balance(&*ctx.storage, &account, &coin.denom)?)
        .saturating_sub(vesting_locked_balance(&*ctx.storage, &account, &coin.denom)?);
    if not_locked < coin.amount {
        return Err(Error::insufficient_funds(
            coin.to_string(),
            format!("{not_locked}{}", coin.denom),
        ));
    }

    def.check_feature_allowed(&sender, Feature::Clawback)?;

    move_coins(ctx.storage, &account, &sender, &coin)?;

    ctx.emit(EventAmountClawedBack {
        account,
        denom: coin.denom,
        amount: coin.amount,
    });
    Ok(())
}

pub fn transfer_admin(ctx: &mut Context, sender: Addr, new_admin: Addr, denom: Denom) -> Result<()> {
    let mut def = get_definition(&*ctx.storage, &denom)?;
    if !def.is_admin(&sender) {
        return Err(Error::unauthorized(
            "only admin can transfer administration of an account",
        ));
    }

    def.admin = Some(new_admin);
    save_definition(ctx.storage, &def)?;

    ctx.emit(EventAdminTransferred {
        denom,
        previous_admin: sender,
        current_admin: new_admin,
    });
    Ok(())
}

/// Give up administration for good. With the extension feature disabled
/// there is no one left to receive commissions, so the rate drops to zero.
pub fn clear_admin(ctx: &mut Context, sender: Addr, denom: Denom) -> Result<()> {
    let mut def = get_definition(&*ctx.storage, &denom)?;
    if !def.is_admin(&sender) {
        return Err(Error::unauthorized(
            "only admin can remove administration of an account",
        ));
    }

    def.admin = None;
    if !def.is_feature_enabled(Feature::Extension) {
        def.send_commission_rate = reef_std::Udec128::ZERO;
    }
    save_definition(ctx.storage, &def)?;

    ctx.emit(EventAdminCleared {
        denom,
        previous_admin: sender,
    });
    Ok(())
}

/// Register an account as a smart contract, for the block_smart_contracts
/// feature. In the source chain this information comes from the wasm host.
pub fn register_contract_account(storage: &mut dyn Storage, addr: &Addr) -> Result<()> {
    Ok(CONTRACT_ACCOUNTS.insert(storage, addr)?)
}

/// Set the vesting-locked amount for an account. Maintained by the bank's
/// vesting layer; exposed for genesis and tests.
pub fn set_vesting_locked(storage: &mut dyn Storage, addr: &Addr, coin: &Coin) -> Result<()> {
    if coin.amount.is_zero() {
        crate::VESTING_LOCKED.remove(storage, (addr, &coin.denom));
        return Ok(());
    }
    Ok(crate::VESTING_LOCKED.save(storage, (addr, &coin.denom), &coin.amount)?)
}

/// Validation shared by genesis import: definitions must be internally
/// consistent.
pub fn validate_definition(def: &Definition) -> Result<()> {
    let (_, issuer) = def.denom.deconstruct()?;
    if issuer != def.issuer {
        return Err(Error::invalid_state(format!(
            "definition issuer {} doesn't match denom {}",
            def.issuer, def.denom,
        )));
    }
    validate_rate("burn rate", def.burn_rate)?;
    validate_rate("send commission rate", def.send_commission_rate)?;
    if def.features.contains(&Feature::Extension) && def.extension_addr.is_none() {
        return Err(Error::invalid_state(format!(
            "extension enabled for {} without an extension address",
            def.denom,
        )));
    }
    Ok(())
}
