use {
    crate::{calculate_ema, Model},
    reef_std::{Item, Storage, Udec128},
    reef_types::{
        feemodel::{GasPriceResponse, ModelParams},
        Error, Result,
    },
};

pub const PARAMS: Item<ModelParams> = Item::new("params");
pub const SHORT_EMA: Item<u64> = Item::new("short_ema_gas");
pub const LONG_EMA: Item<u64> = Item::new("long_ema_gas");
pub const MIN_GAS_PRICE: Item<Udec128> = Item::new("min_gas_price");

/// Per-block gas tracking lives in the transient store, which the host
/// resets at every block boundary.
pub const TRACKED_GAS: Item<u64> = Item::new("tracked_gas");

pub fn get_params(storage: &dyn Storage) -> Result<ModelParams> {
    Ok(PARAMS.load(storage)?)
}

pub fn set_params(storage: &mut dyn Storage, params: &ModelParams) -> Result<()> {
    params.validate()?;
    Ok(PARAMS.save(storage, params)?)
}

/// Gas consumed by transactions executed so far in the current block.
pub fn tracked_gas(transient: &dyn Storage) -> Result<u64> {
    Ok(TRACKED_GAS.may_load(transient)?.unwrap_or(0))
}

/// Add a transaction's gas to the current block's tally.
pub fn track_gas(transient: &mut dyn Storage, gas: u64) -> Result<()> {
    let total = tracked_gas(transient)?.saturating_add(gas);
    Ok(TRACKED_GAS.save(transient, &total)?)
}

pub fn short_ema(storage: &dyn Storage) -> Result<u64> {
    Ok(SHORT_EMA.may_load(storage)?.unwrap_or(0))
}

pub fn long_ema(storage: &dyn Storage) -> Result<u64> {
    Ok(LONG_EMA.may_load(storage)?.unwrap_or(0))
}

/// The minimum gas price transactions must pay in the current block.
///
/// Genesis initialization is required to have set this; its absence means
/// corrupted state.
pub fn min_gas_price(storage: &dyn Storage) -> Result<Udec128> {
    MIN_GAS_PRICE
        .may_load(storage)?
        .ok_or_else(|| Error::invalid_state("min gas price not set"))
}

/// Fold the block's gas usage into both EMAs and persist the next block's
/// minimum gas price. Runs at the end of every block.
pub fn end_block(storage: &mut dyn Storage, transient: &mut dyn Storage) -> Result<()> {
    let params = get_params(storage)?;
    let block_gas = tracked_gas(transient)?;

    let short = calculate_ema(short_ema(storage)?, block_gas, params.short_ema_block_length);
    let long = calculate_ema(long_ema(storage)?, block_gas, params.long_ema_block_length);

    SHORT_EMA.save(storage, &short)?;
    LONG_EMA.save(storage, &long)?;

    let model = Model::new(params);
    let price = model.next_gas_price(short, long)?;
    MIN_GAS_PRICE.save(storage, &price)?;

    TRACKED_GAS.remove(transient);

    tracing::debug!(block_gas, short, long, %price, "updated fee model");

    Ok(())
}

/// The band the minimum gas price can reach within `after_blocks` blocks,
/// obtained by simulating the two extreme load trajectories (every block
/// full; every block empty) and taking the envelope. `med` is the current
/// price.
pub fn recommended_gas_price(
    storage: &dyn Storage,
    after_blocks: u32,
) -> Result<GasPriceResponse> {
    let params = get_params(storage)?;
    if after_blocks > params.short_ema_block_length {
        return Err(Error::invalid_input(format!(
            "after blocks must be lower than or equal to {}",
            params.short_ema_block_length,
        )));
    }
    let after_blocks = if after_blocks == 0 {
        params.short_ema_block_length
    } else {
        after_blocks
    };

    let current = min_gas_price(storage)?;
    let mut low = current;
    let mut high = current;

    let mut max_short = short_ema(storage)?;
    let mut max_long = long_ema(storage)?;
    let mut min_short = max_short;
    let mut min_long = max_long;

    let model = Model::new(params.clone());
    for _ in 0..after_blocks {
        max_short = calculate_ema(max_short, params.max_block_gas, params.short_ema_block_length);
        max_long = calculate_ema(max_long, params.max_block_gas, params.long_ema_block_length);
        let max_load_price = model.next_gas_price(max_short, max_long)?;

        min_short = calculate_ema(min_short, 0, params.short_ema_block_length);
        min_long = calculate_ema(min_long, 0, params.long_ema_block_length);
        let min_load_price = model.next_gas_price(min_short, min_long)?;

        high = high.max(max_load_price).max(min_load_price);
        low = low.min(max_load_price).min(min_load_price);
    }

    Ok(GasPriceResponse {
        low,
        med: current,
        high,
    })
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, reef_std::MemStorage, std::str::FromStr};

    fn params() -> ModelParams {
        ModelParams {
            initial_gas_price: Udec128::from_str("0.0625").unwrap(),
            max_gas_price_multiplier: Udec128::new(1000),
            max_discount: Udec128::from_str("0.5").unwrap(),
            escalation_start_fraction: Udec128::from_str("0.8").unwrap(),
            max_block_gas: 50_000_000,
            short_ema_block_length: 50,
            long_ema_block_length: 1000,
        }
    }

    fn setup() -> (MemStorage, MemStorage) {
        let mut storage = MemStorage::new();
        set_params(&mut storage, &params()).unwrap();
        MIN_GAS_PRICE
            .save(&mut storage, &params().initial_gas_price)
            .unwrap();
        (storage, MemStorage::new())
    }

    #[test]
    fn end_block_updates_emas_and_price() {
        let (mut storage, mut transient) = setup();

        track_gas(&mut transient, 1_000_000).unwrap();
        track_gas(&mut transient, 500_000).unwrap();
        assert_eq!(tracked_gas(&transient).unwrap(), 1_500_000);

        end_block(&mut storage, &mut transient).unwrap();

        assert_eq!(short_ema(&storage).unwrap(), 30_000);
        assert_eq!(long_ema(&storage).unwrap(), 1_500);
        // The tally resets for the next block.
        assert_eq!(tracked_gas(&transient).unwrap(), 0);
        assert!(min_gas_price(&storage).is_ok());
    }

    #[test]
    fn recommended_band_brackets_the_current_price() {
        let (mut storage, mut transient) = setup();
        for _ in 0..10 {
            track_gas(&mut transient, 10_000_000).unwrap();
            end_block(&mut storage, &mut transient).unwrap();
        }

        let band = recommended_gas_price(&storage, 25).unwrap();
        assert!(band.low <= band.med);
        assert!(band.med <= band.high);
        assert_eq!(band.med, min_gas_price(&storage).unwrap());
    }

    #[test]
    fn rejects_horizons_beyond_the_short_ema() {
        let (storage, _) = setup();
        assert!(recommended_gas_price(&storage, 51).is_err());
        assert!(recommended_gas_price(&storage, 50).is_ok());
    }
}
