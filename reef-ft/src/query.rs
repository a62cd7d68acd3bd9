use {
    crate::{
        definition_or_nil, dex_expected_balance, dex_locked_balance, frozen_balance, get_balance,
        is_globally_frozen, vesting_locked_balance, whitelisted_balance, DEFINITIONS,
        DEX_SETTINGS, FROZEN, METADATA, WHITELISTED,
    },
    reef_std::{
        Addr, Bound, Coin, Denom, Order, Storage, StdResult, Uint128, DEFAULT_PAGE_LIMIT,
        MAX_PAGE_LIMIT,
    },
    reef_types::{
        ft::{BalanceResponse, Definition, Feature, Token},
        Error, Result,
    },
};

pub(crate) fn page_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT) as usize
}

fn token_from_definition(storage: &dyn Storage, def: Definition) -> Result<Token> {
    let metadata = METADATA
        .may_load(storage, &def.denom)?
        .ok_or_else(|| Error::not_found(format!("metadata for {} denom", def.denom)))?;
    let (subunit, _) = def.denom.deconstruct()?;
    let dex_settings = DEX_SETTINGS.may_load(storage, &def.denom)?;
    let globally_frozen = is_globally_frozen(storage, &def.denom);

    Ok(Token {
        denom: def.denom,
        issuer: def.issuer,
        admin: def.admin,
        symbol: metadata.symbol,
        subunit,
        precision: metadata.precision,
        description: metadata.description,
        features: def.features,
        burn_rate: def.burn_rate,
        send_commission_rate: def.send_commission_rate,
        globally_frozen,
        version: def.version,
        uri: def.uri,
        uri_hash: def.uri_hash,
        extension_addr: def.extension_addr,
        dex_settings,
    })
}

/// The full public view of a single token.
pub fn query_token(storage: &dyn Storage, denom: &Denom) -> Result<Token> {
    let def = crate::get_definition(storage, denom)?;
    token_from_definition(storage, def)
}

/// All tokens, or the tokens of one issuer, paginated by denom.
pub fn query_tokens(
    storage: &dyn Storage,
    issuer: Option<Addr>,
    start_after: Option<Denom>,
    limit: Option<u32>,
) -> Result<Vec<Token>> {
    let start = match &start_after {
        Some(denom) => {
            let (subunit, issuer) = denom.deconstruct()?;
            Some((issuer, subunit))
        },
        None => None,
    };

    let definitions: Vec<Definition> = match issuer {
        Some(issuer) => {
            let min = match &start {
                Some((start_issuer, subunit)) if *start_issuer == issuer => {
                    Some(Bound::Exclusive(subunit.as_str()))
                },
                _ => None,
            };
            DEFINITIONS
                .prefix(&issuer)
                .values(storage, min, None, Order::Ascending)
                .take(page_limit(limit))
                .collect::<StdResult<_>>()?
        },
        None => {
            let min = start
                .as_ref()
                .map(|(issuer, subunit)| Bound::Exclusive((issuer, subunit.as_str())));
            DEFINITIONS
                .range(storage, min, None, Order::Ascending)
                .map(|res| res.map(|(_, def)| def))
                .take(page_limit(limit))
                .collect::<StdResult<_>>()?
        },
    };

    definitions
        .into_iter()
        .map(|def| token_from_definition(storage, def))
        .collect()
}

/// The compound balance view returned by the `Balance` query.
pub fn query_balance(storage: &dyn Storage, account: &Addr, denom: &Denom) -> Result<BalanceResponse> {
    let balance = get_balance(storage, account, denom)?;
    let def = definition_or_nil(storage, denom)?;

    let frozen = match &def {
        Some(def) if def.is_feature_enabled(Feature::Freezing) => {
            if def.has_admin_privileges(account) {
                Uint128::ZERO
            } else if is_globally_frozen(storage, denom) {
                balance
            } else {
                frozen_balance(storage, account, denom)?
            }
        },
        _ => Uint128::ZERO,
    };

    let locked_in_dex = dex_locked_balance(storage, account, denom)?;
    let locked_in_vesting = vesting_locked_balance(storage, account, denom)?;
    let locked = frozen
        .checked_add(locked_in_dex)?
        .checked_add(locked_in_vesting)?
        .min(balance);

    Ok(BalanceResponse {
        balance,
        whitelisted: whitelisted_balance(storage, account, denom)?,
        frozen,
        locked,
        locked_in_vesting,
        locked_in_dex,
        expected_to_receive_in_dex: dex_expected_balance(storage, account, denom)?,
    })
}

/// All frozen balances of one account.
pub fn query_frozen_balances(
    storage: &dyn Storage,
    account: &Addr,
    start_after: Option<Denom>,
    limit: Option<u32>,
) -> Result<Vec<Coin>> {
    let min = start_after.as_ref().map(Bound::Exclusive);
    let coins = FROZEN
        .prefix(account)
        .range(storage, min, None, Order::Ascending)
        .take(page_limit(limit))
        .map(|res| res.map(|(denom, amount)| Coin::new(denom, amount)))
        .collect::<StdResult<_>>()?;
    Ok(coins)
}

/// Frozen balances across all accounts, paginated by (account, denom).
pub fn query_all_frozen_balances(
    storage: &dyn Storage,
    start_after: Option<(Addr, Denom)>,
    limit: Option<u32>,
) -> Result<Vec<(Addr, Coin)>> {
    let min = start_after
        .as_ref()
        .map(|(addr, denom)| Bound::Exclusive((addr, denom)));
    let balances = FROZEN
        .range(storage, min, None, Order::Ascending)
        .take(page_limit(limit))
        .map(|res| res.map(|((addr, denom), amount)| (addr, Coin::new(denom, amount))))
        .collect::<StdResult<_>>()?;
    Ok(balances)
}

/// All whitelisted caps of one account.
pub fn query_whitelisted_balances(
    storage: &dyn Storage,
    account: &Addr,
    start_after: Option<Denom>,
    limit: Option<u32>,
) -> Result<Vec<Coin>> {
    let min = start_after.as_ref().map(Bound::Exclusive);
    let coins = WHITELISTED
        .prefix(account)
        .range(storage, min, None, Order::Ascending)
        .take(page_limit(limit))
        .map(|res| res.map(|(denom, amount)| Coin::new(denom, amount)))
        .collect::<StdResult<_>>()?;
    Ok(coins)
}

/// Whitelisted caps across all accounts.
pub fn query_all_whitelisted_balances(
    storage: &dyn Storage,
    start_after: Option<(Addr, Denom)>,
    limit: Option<u32>,
) -> Result<Vec<(Addr, Coin)>> {
    let min = start_after
        .as_ref()
        .map(|(addr, denom)| Bound::Exclusive((addr, denom)));
    let balances = WHITELISTED
        .range(storage, min, None, Order::Ascending)
        .take(page_limit(limit))
        .map(|res| res.map(|((addr, denom), amount)| (addr, Coin::new(denom, amount))))
        .collect::<StdResult<_>>()?;
    Ok(balances)
}

/// A denom's DEX settings, if any were set at issuance.
pub fn query_dex_settings(
    storage: &dyn Storage,
    denom: &Denom,
) -> Result<Option<reef_types::ft::DexSettings>> {
    Ok(DEX_SETTINGS.may_load(storage, denom)?)
}
