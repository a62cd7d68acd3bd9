use {
    reef_std::{Coin, Denom, Order as IterationOrder, Storage, StdResult, Uint128},
    reef_types::{dex::OrderType, Error, Result},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// The whole chain's genesis: one section per module, plus the denom fees
/// are paid in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisState {
    pub fee_denom: Denom,
    pub ft: reef_ft::GenesisState,
    pub dex: reef_dex::GenesisState,
    pub feemodel: reef_feemodel::GenesisState,
}

impl GenesisState {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::invalid_state(format!("failed to encode genesis: {err}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| Error::invalid_input(format!("malformed genesis: {err}")))
    }
}

/// Initialize every module, then rebuild the DEX lock counters from the
/// open orders (the orders are the authoritative source) and verify the
/// result against the bank balances.
pub fn init_genesis(storage: &mut dyn Storage, state: &GenesisState) -> Result<()> {
    reef_ft::init_genesis(storage, &state.ft)?;
    reef_dex::init_genesis(storage, &state.dex)?;
    reef_feemodel::init_genesis(storage, &state.feemodel)?;

    let mut locked = BTreeMap::<(reef_std::Addr, Denom), Uint128>::new();
    let mut expected = BTreeMap::<(reef_std::Addr, Denom), Uint128>::new();
    for order in &state.dex.orders {
        let entry = locked
            .entry((order.creator, order.locked_denom().clone()))
            .or_insert(Uint128::ZERO);
        *entry = entry.checked_add(order.remaining_spendable_balance)?;

        if order.order_type == OrderType::Limit {
            let entry = expected
                .entry((order.creator, order.expected_denom().clone()))
                .or_insert(Uint128::ZERO);
            *entry = entry.checked_add(order.expected_to_receive()?)?;
        }
    }

    for ((account, denom), amount) in &locked {
        let balance = reef_ft::get_balance(storage, account, denom)?;
        if *amount > balance {
            return Err(Error::invalid_state(format!(
                "DEX-locked {amount}{denom} of {account} exceeds their balance {balance}"
            )));
        }
        reef_ft::DEX_LOCKED.save(storage, (account, denom), amount)?;
    }
    for ((account, denom), amount) in &expected {
        reef_ft::DEX_EXPECTED.save(storage, (account, denom), amount)?;
    }

    Ok(())
}

pub fn export_genesis(storage: &dyn Storage, fee_denom: &Denom) -> Result<GenesisState> {
    let state = GenesisState {
        fee_denom: fee_denom.clone(),
        ft: reef_ft::export_genesis(storage)?,
        dex: reef_dex::export_genesis(storage)?,
        feemodel: reef_feemodel::export_genesis(storage)?,
    };

    // Cross-check the lock counters against the open orders before letting
    // the export out the door.
    let mut locked = BTreeMap::<(reef_std::Addr, Denom), Uint128>::new();
    for order in &state.dex.orders {
        let entry = locked
            .entry((order.creator, order.locked_denom().clone()))
            .or_insert(Uint128::ZERO);
        *entry = entry.checked_add(order.remaining_spendable_balance)?;
    }
    for res in reef_ft::DEX_LOCKED.range(storage, None, None, IterationOrder::Ascending) {
        let ((account, denom), amount) = res?;
        let computed = locked
            .get(&(account, denom.clone()))
            .copied()
            .unwrap_or(Uint128::ZERO);
        if computed != amount {
            return Err(Error::invalid_state(format!(
                "DEX-locked {amount}{denom} of {account} but open orders lock {computed}"
            )));
        }
    }

    Ok(state)
}

/// A convenience for building test genesis states: everyone's balances,
/// empty books, default params.
pub fn genesis_with_balances(
    fee_denom: Denom,
    ft_params: reef_types::ft::Params,
    dex_params: reef_types::dex::Params,
    feemodel: reef_feemodel::GenesisState,
    balances: Vec<(reef_std::Addr, Vec<Coin>)>,
) -> Result<GenesisState> {
    let balances = balances
        .into_iter()
        .map(|(address, coins)| {
            Ok(reef_ft::Balance {
                address,
                coins: coins.try_into()?,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        fee_denom,
        ft: reef_ft::GenesisState {
            params: ft_params,
            tokens: vec![],
            globally_frozen_denoms: vec![],
            balances,
            frozen_balances: vec![],
            whitelisted_balances: vec![],
            vesting_locked: vec![],
            contract_accounts: vec![],
        },
        dex: reef_dex::GenesisState {
            params: dex_params,
            order_books: vec![],
            orders: vec![],
            order_sequence: 1,
            tombstones: vec![],
        },
        feemodel,
    })
}
