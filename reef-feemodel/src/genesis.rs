use {
    crate::{long_ema, min_gas_price, set_params, short_ema, LONG_EMA, MIN_GAS_PRICE, SHORT_EMA},
    reef_std::{Storage, Udec128},
    reef_types::{feemodel::ModelParams, Result},
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisState {
    pub params: ModelParams,
    pub min_gas_price: Udec128,
    pub short_ema: u64,
    pub long_ema: u64,
}

pub fn init_genesis(storage: &mut dyn Storage, state: &GenesisState) -> Result<()> {
    set_params(storage, &state.params)?;
    MIN_GAS_PRICE.save(storage, &state.min_gas_price)?;
    SHORT_EMA.save(storage, &state.short_ema)?;
    LONG_EMA.save(storage, &state.long_ema)?;
    Ok(())
}

pub fn export_genesis(storage: &dyn Storage) -> Result<GenesisState> {
    Ok(GenesisState {
        params: crate::get_params(storage)?,
        min_gas_price: min_gas_price(storage)?,
        short_ema: short_ema(storage)?,
        long_ema: long_ema(storage)?,
    })
}
