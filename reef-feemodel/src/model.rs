use {
    reef_std::{MathResult, Udec128, Uint128},
    reef_types::feemodel::ModelParams,
};

/// `ema' = (ema · (n - 1) + value) / n`, in integer gas units.
pub fn calculate_ema(previous: u64, value: u64, length: u32) -> u64 {
    let length = length as u128;
    ((previous as u128 * (length - 1) + value as u128) / length) as u64
}

/// The gas price curve.
///
/// Three regions, by where the short EMA sits:
///
/// - below the long EMA: the price falls linearly from `initial_gas_price`
///   at zero load down to the maximum discount at the long EMA; a chain
///   under its usual load trades at a discount;
/// - from the long EMA up to the escalation start: flat at the discounted
///   price;
/// - past the escalation start: the price climbs quadratically, reaching
///   `initial_gas_price · max_gas_price_multiplier` at `max_block_gas`.
pub struct Model {
    params: ModelParams,
}

impl Model {
    pub fn new(params: ModelParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    fn discounted_gas_price(&self) -> MathResult<Udec128> {
        let keep = Udec128::ONE.checked_sub(self.params.max_discount)?;
        self.params.initial_gas_price.checked_mul(keep)
    }

    fn escalation_start(&self) -> MathResult<u64> {
        let start = Uint128::new(self.params.max_block_gas as u128)
            .checked_mul_dec_floor(self.params.escalation_start_fraction)?;
        Ok(start.u128() as u64)
    }

    pub fn max_gas_price(&self) -> MathResult<Udec128> {
        self.params
            .initial_gas_price
            .checked_mul(self.params.max_gas_price_multiplier)
    }

    /// The minimum gas price for the next block, given the current EMAs.
    pub fn next_gas_price(&self, short_ema: u64, long_ema: u64) -> MathResult<Udec128> {
        let discounted = self.discounted_gas_price()?;
        let escalation_start = self.escalation_start()?;

        if long_ema == 0 {
            // No history yet.
            return Ok(self.params.initial_gas_price);
        }

        if short_ema >= self.params.max_block_gas {
            return self.max_gas_price();
        }

        if short_ema > escalation_start {
            // Quadratic climb from the discounted price to the ceiling.
            let span = (self.params.max_block_gas - escalation_start) as u128;
            let offset = (short_ema - escalation_start) as u128;
            let fraction = Udec128::checked_from_ratio(offset, span)?;
            let fraction_squared = fraction.checked_mul(fraction)?;
            let climb = self.max_gas_price()?.checked_sub(discounted)?;
            return discounted.checked_add(climb.checked_mul(fraction_squared)?);
        }

        if short_ema >= long_ema {
            return Ok(discounted);
        }

        // Linear slide from the initial price at zero load down to the
        // discounted price at the long EMA.
        let drop = self
            .params
            .initial_gas_price
            .checked_sub(discounted)?
            .checked_mul_ratio(short_ema as u128, long_ema as u128)?;
        self.params.initial_gas_price.checked_sub(drop)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr, test_case::test_case};

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

    #[test]
    fn ema_converges_to_constant_input() {
        let mut ema = 0;
        for _ in 0..10_000 {
            ema = calculate_ema(ema, 1_000, 50);
        }
        assert!((999..=1_000).contains(&ema));
    }

    #[test]
    fn no_history_charges_initial_price() {
        let model = Model::new(params());
        assert_eq!(
            model.next_gas_price(0, 0).unwrap(),
            params().initial_gas_price
        );
    }

    #[test]
    fn flat_discount_at_average_load() {
        let model = Model::new(params());
        let discounted = Udec128::from_str("0.03125").unwrap();
        // Short EMA at the long EMA, well below escalation.
        assert_eq!(model.next_gas_price(1_000_000, 1_000_000).unwrap(), discounted);
        assert_eq!(model.next_gas_price(2_000_000, 1_000_000).unwrap(), discounted);
    }

    #[test]
    fn underload_discounts_from_initial_price() {
        let model = Model::new(params());
        let at_zero = model.next_gas_price(0, 1_000_000).unwrap();
        let at_half = model.next_gas_price(500_000, 1_000_000).unwrap();
        let at_avg = model.next_gas_price(1_000_000, 1_000_000).unwrap();
        assert_eq!(at_zero, params().initial_gas_price);
        assert!(at_half < at_zero);
        assert!(at_avg < at_half);
    }

    #[test]
    fn escalation_is_monotone_and_capped() {
        let model = Model::new(params());
        let start = 40_000_000; // 0.8 of max block gas
        let mut last = model.next_gas_price(start, 1_000_000).unwrap();
        for short_ema in [42_000_000, 45_000_000, 48_000_000, 49_999_999] {
            let price = model.next_gas_price(short_ema, 1_000_000).unwrap();
            assert!(price >= last);
            last = price;
        }
        assert_eq!(
            model.next_gas_price(50_000_000, 1_000_000).unwrap(),
            model.max_gas_price().unwrap()
        );
        assert!(last <= model.max_gas_price().unwrap());
    }

    #[test_case(0; "zero load")]
    #[test_case(25_000_000; "half load")]
    #[test_case(49_000_000; "near full load")]
    fn price_stays_within_floor_and_ceiling(short_ema: u64) {
        let model = Model::new(params());
        let price = model.next_gas_price(short_ema, 5_000_000).unwrap();
        let floor = Udec128::from_str("0.03125").unwrap();
        assert!(price >= floor);
        assert!(price <= model.max_gas_price().unwrap());
    }
}
