use {
    crate::{Error, Result},
    borsh::{BorshDeserialize, BorshSerialize},
    reef_std::Udec128,
    serde::{Deserialize, Serialize},
};

/// Parameters of the gas price curve and the two EMAs feeding it.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct ModelParams {
    /// The gas price at zero load.
    pub initial_gas_price: Udec128,
    /// The price ceiling is `initial_gas_price · max_gas_price_multiplier`,
    /// reached when the short EMA hits `max_block_gas`.
    pub max_gas_price_multiplier: Udec128,
    /// The price floor is `initial_gas_price · (1 - max_discount)`.
    pub max_discount: Udec128,
    /// Escalation starts at `escalation_start_fraction · max_block_gas`.
    pub escalation_start_fraction: Udec128,
    pub max_block_gas: u64,
    pub short_ema_block_length: u32,
    pub long_ema_block_length: u32,
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        if self.initial_gas_price.is_zero() {
            return Err(Error::invalid_input("initial gas price must be positive"));
        }
        if self.max_gas_price_multiplier < Udec128::ONE {
            return Err(Error::invalid_input(
                "max gas price multiplier must be at least 1",
            ));
        }
        if self.max_discount >= Udec128::ONE {
            return Err(Error::invalid_input("max discount must be below 1"));
        }
        if self.escalation_start_fraction >= Udec128::ONE {
            return Err(Error::invalid_input(
                "escalation start fraction must be below 1",
            ));
        }
        if self.max_block_gas == 0 {
            return Err(Error::invalid_input("max block gas must be positive"));
        }
        if self.short_ema_block_length == 0
            || self.long_ema_block_length <= self.short_ema_block_length
        {
            return Err(Error::invalid_input(
                "long EMA length must exceed the short EMA length",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub model: ModelParams,
}

/// Response of the recommended-gas-price query: the band the min gas price
/// can reach within the queried horizon, plus the current value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GasPriceResponse {
    pub low: Udec128,
    pub med: Udec128,
    pub high: Udec128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    UpdateParams { params: ModelParams },
}
