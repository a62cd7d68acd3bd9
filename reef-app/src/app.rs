use {
    crate::{init_genesis, route, GenesisState, Msg},
    reef_std::{flush, Addr, Buffer, Coin, MemStorage, Storage, Timestamp, Uint128},
    reef_types::{BlockInfo, Context, Error, Event, Result, TransferPurpose},
};

/// The in-process chain: the committed store, the per-block transient
/// store, and the current block. Everything runs single-threaded and
/// synchronously; a failed message's writes are simply dropped.
#[derive(Debug)]
pub struct App {
    storage: MemStorage,
    transient: MemStorage,
    block: BlockInfo,
    fee_denom: reef_std::Denom,
}

impl App {
    pub fn new(genesis: &GenesisState, height: u64, timestamp: Timestamp) -> Result<Self> {
        let mut storage = MemStorage::new();
        init_genesis(&mut storage, genesis)?;
        Ok(Self {
            storage,
            transient: MemStorage::new(),
            block: BlockInfo { height, timestamp },
            fee_denom: genesis.fee_denom.clone(),
        })
    }

    pub fn block(&self) -> BlockInfo {
        self.block
    }

    pub fn storage(&self) -> &dyn Storage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        &mut self.storage
    }

    /// Open a new block: reset the transient store and run the good-til
    /// expirations. An error here is an invariant violation and must halt
    /// the chain, so it is propagated rather than swallowed.
    pub fn begin_block(&mut self, height: u64, timestamp: Timestamp) -> Result<Vec<Event>> {
        self.block = BlockInfo { height, timestamp };
        self.transient = MemStorage::new();

        let mut ctx = Context::new(&mut self.storage, self.block);
        ctx.infinite_gas = true;
        reef_dex::begin_block(&mut ctx)?;
        Ok(ctx.events)
    }

    /// Close the block: fold the tracked gas into the fee model and persist
    /// the next block's minimum gas price.
    pub fn end_block(&mut self) -> Result<()> {
        reef_feemodel::end_block(&mut self.storage, &mut self.transient)
    }

    /// Execute a single message. Writes are staged in a buffer and only
    /// reach the committed store if the handler succeeds.
    pub fn execute(&mut self, sender: Addr, msg: Msg) -> Result<Vec<Event>> {
        self.execute_with_purpose(sender, msg, TransferPurpose::None)
    }

    /// Same, with an IBC transfer purpose attached to the context.
    pub fn execute_with_purpose(
        &mut self,
        sender: Addr,
        msg: Msg,
        purpose: TransferPurpose,
    ) -> Result<Vec<Event>> {
        let mut buffer = Buffer::new(&self.storage);
        let mut ctx = Context::new(&mut buffer, self.block).with_purpose(purpose);

        route(&mut ctx, sender, msg)?;

        let events = std::mem::take(&mut ctx.events);
        drop(ctx);
        let batch = buffer.into_batch();
        flush(&mut self.storage, batch);
        Ok(events)
    }

    /// Execute a transaction: the ante handler charges the fee against the
    /// fee model's minimum gas price and tracks the gas, then the messages
    /// run atomically: all staged, committed together or not at all.
    ///
    /// The ante phase commits on its own. A message failing afterwards
    /// reverts the messages' writes only; the fee stays charged and the gas
    /// stays tracked.
    pub fn execute_tx(
        &mut self,
        sender: Addr,
        gas_limit: u64,
        fee: Coin,
        msgs: Vec<Msg>,
    ) -> Result<Vec<Event>> {
        let min_gas_price = reef_feemodel::min_gas_price(&self.storage)?;
        let required = Uint128::new(gas_limit as u128).checked_mul_dec_ceil(min_gas_price)?;
        if fee.denom != self.fee_denom {
            return Err(Error::invalid_input(format!(
                "fee must be paid in {}, got {}",
                self.fee_denom, fee.denom,
            )));
        }
        if fee.amount < required {
            return Err(Error::insufficient_funds(
                format!("{required}{} fee", self.fee_denom),
                fee.to_string(),
            ));
        }

        let mut ante_buffer = Buffer::new(&self.storage);
        let mut ante_ctx = Context::new(&mut ante_buffer, self.block);

        reef_ft::transfer(&mut ante_ctx, &sender, &fee_collector_account(), &fee)?;

        let mut events = std::mem::take(&mut ante_ctx.events);
        drop(ante_ctx);
        let ante_batch = ante_buffer.into_batch();
        flush(&mut self.storage, ante_batch);
        reef_feemodel::track_gas(&mut self.transient, gas_limit)?;

        let mut buffer = Buffer::new(&self.storage);
        let mut ctx = Context::new(&mut buffer, self.block);

        for msg in msgs {
            route(&mut ctx, sender, msg)?;
        }

        events.extend(std::mem::take(&mut ctx.events));
        drop(ctx);
        let batch = buffer.into_batch();
        flush(&mut self.storage, batch);

        Ok(events)
    }
}

/// Where transaction fees accumulate. Fee distribution is outside the core.
pub fn fee_collector_account() -> Addr {
    Addr::module("fee_collector")
}
