use {
    crate::{
        set_symbol, validate_definition, BALANCES, CONTRACT_ACCOUNTS, DEFINITIONS, DEX_SETTINGS,
        FROZEN, GLOBAL_FREEZE, METADATA, PARAMS, SUPPLIES, VESTING_LOCKED, WHITELISTED,
    },
    reef_std::{Addr, Coin, Coins, Denom, Order, Storage, StdResult, Uint128},
    reef_types::{
        ft::{Definition, DexSettings, Params, TokenMetadata},
        Error, Result,
    },
    serde::{Deserialize, Serialize},
};

/// Per-account coin list, the shape balances take in genesis JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: Addr,
    pub coins: Coins,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisState {
    pub params: Params,
    pub tokens: Vec<GenesisToken>,
    pub globally_frozen_denoms: Vec<Denom>,
    pub balances: Vec<Balance>,
    pub frozen_balances: Vec<Balance>,
    pub whitelisted_balances: Vec<Balance>,
    pub vesting_locked: Vec<Balance>,
    pub contract_accounts: Vec<Addr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisToken {
    pub definition: Definition,
    pub metadata: TokenMetadata,
    pub dex_settings: Option<DexSettings>,
}

fn import_balances<F>(storage: &mut dyn Storage, balances: &[Balance], mut save: F) -> Result<()>
where
    F: FnMut(&mut dyn Storage, &Addr, &Coin) -> Result<()>,
{
    for balance in balances {
        for coin in balance.coins.iter() {
            save(storage, &balance.address, &coin)?;
        }
    }
    Ok(())
}

/// Initialize the module state from genesis. Supplies are recomputed from
/// the balance list; every definition is re-validated.
pub fn init_genesis(storage: &mut dyn Storage, state: &GenesisState) -> Result<()> {
    PARAMS.save(storage, &state.params)?;

    for token in &state.tokens {
        validate_definition(&token.definition)?;
        let (subunit, issuer) = token.definition.denom.deconstruct()?;
        DEFINITIONS.save(storage, (&issuer, subunit.as_str()), &token.definition)?;
        METADATA.save(storage, &token.definition.denom, &token.metadata)?;
        set_symbol(storage, &issuer, &token.metadata.symbol)?;
        if let Some(dex_settings) = &token.dex_settings {
            DEX_SETTINGS.save(storage, &token.definition.denom, dex_settings)?;
        }
    }

    for denom in &state.globally_frozen_denoms {
        GLOBAL_FREEZE.insert(storage, denom)?;
    }

    import_balances(storage, &state.balances, |storage, address, coin| {
        BALANCES.save(storage, (address, &coin.denom), &coin.amount)?;
        let supply = SUPPLIES
            .may_load(storage, &coin.denom)?
            .unwrap_or(Uint128::ZERO)
            .checked_add(coin.amount)?;
        Ok(SUPPLIES.save(storage, &coin.denom, &supply)?)
    })?;
    import_balances(storage, &state.frozen_balances, |storage, address, coin| {
        Ok(FROZEN.save(storage, (address, &coin.denom), &coin.amount)?)
    })?;
    import_balances(storage, &state.whitelisted_balances, |storage, address, coin| {
        Ok(WHITELISTED.save(storage, (address, &coin.denom), &coin.amount)?)
    })?;
    import_balances(storage, &state.vesting_locked, |storage, address, coin| {
        Ok(VESTING_LOCKED.save(storage, (address, &coin.denom), &coin.amount)?)
    })?;

    for addr in &state.contract_accounts {
        CONTRACT_ACCOUNTS.insert(storage, addr)?;
    }

    Ok(())
}

fn export_balances(
    entries: Vec<((Addr, Denom), Uint128)>,
) -> Result<Vec<Balance>> {
    let mut out: Vec<Balance> = Vec::new();
    for ((address, denom), amount) in entries {
        match out.last_mut() {
            Some(last) if last.address == address => {
                last.coins.insert(reef_std::Coin::new(denom, amount))?;
            },
            _ => {
                out.push(Balance {
                    address,
                    coins: Coins::one(denom, amount),
                });
            },
        }
    }
    Ok(out)
}

/// Export the module state. The recorded supplies are cross-checked against
/// the sum of balances; a mismatch means corrupted state and aborts the
/// export.
pub fn export_genesis(storage: &dyn Storage) -> Result<GenesisState> {
    let params = PARAMS.load(storage)?;

    let mut tokens = Vec::new();
    for res in DEFINITIONS.range(storage, None, None, Order::Ascending) {
        let (_, definition) = res?;
        let metadata = METADATA.load(storage, &definition.denom)?;
        let dex_settings = DEX_SETTINGS.may_load(storage, &definition.denom)?;
        tokens.push(GenesisToken {
            definition,
            metadata,
            dex_settings,
        });
    }

    let globally_frozen_denoms = GLOBAL_FREEZE
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    let balance_entries = BALANCES
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    // Cross-check: recompute supplies from the authoritative balances.
    let mut computed = std::collections::BTreeMap::<Denom, Uint128>::new();
    for ((_, denom), amount) in &balance_entries {
        let entry = computed.entry(denom.clone()).or_insert(Uint128::ZERO);
        *entry = entry.checked_add(*amount)?;
    }
    for res in SUPPLIES.range(storage, None, None, Order::Ascending) {
        let (denom, supply) = res?;
        let summed = computed.get(&denom).copied().unwrap_or(Uint128::ZERO);
        if summed != supply {
            return Err(Error::invalid_state(format!(
                "supply of {denom} is {supply} but balances sum to {summed}"
            )));
        }
    }

    let balances = export_balances(balance_entries)?;
    let frozen_balances = export_balances(
        FROZEN
            .range(storage, None, None, Order::Ascending)
            .collect::<StdResult<Vec<_>>>()?,
    )?;
    let whitelisted_balances = export_balances(
        WHITELISTED
            .range(storage, None, None, Order::Ascending)
            .collect::<StdResult<Vec<_>>>()?,
    )?;
    let vesting_locked = export_balances(
        VESTING_LOCKED
            .range(storage, None, None, Order::Ascending)
            .collect::<StdResult<Vec<_>>>()?,
    )?;

    let contract_accounts = CONTRACT_ACCOUNTS
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        params,
        tokens,
        globally_frozen_denoms,
        balances,
        frozen_balances,
        whitelisted_balances,
        vesting_locked,
        contract_accounts,
    })
}
