use {
    reef_app::{genesis_with_balances, App, GenesisState, Msg},
    reef_std::{Addr, Coin, Denom, Timestamp, Udec128, Uint128},
    reef_types::{dex, ft, Event, Result},
    std::{fmt::Debug, str::FromStr},
};

pub const FEE_DENOM: &str = "ureef";
pub const ORDER_RESERVE: u128 = 10;
pub const INITIAL_BALANCE: u128 = 1_000_000;
pub const GENESIS_HEIGHT: u64 = 100;
pub const BLOCK_INTERVAL_SECONDS: u64 = 5;

/// The accounts every test starts with, each funded with
/// `INITIAL_BALANCE` of the fee denom.
pub struct TestAccounts {
    pub issuer: Addr,
    pub alice: Addr,
    pub bob: Addr,
    pub charlie: Addr,
}

impl TestAccounts {
    fn new() -> Self {
        Self {
            issuer: Addr::mock(1),
            alice: Addr::mock(2),
            bob: Addr::mock(3),
            charlie: Addr::mock(4),
        }
    }

    fn all(&self) -> [Addr; 4] {
        [self.issuer, self.alice, self.bob, self.charlie]
    }
}

/// An in-process chain for integration tests: produces blocks, delivers
/// messages, inspects balances and events.
pub struct TestSuite {
    pub app: App,
}

impl TestSuite {
    pub fn block_time(height: u64) -> Timestamp {
        Timestamp::from_seconds(1_700_000_000 + height * BLOCK_INTERVAL_SECONDS)
    }

    /// End the current block and open the next one, returning the events
    /// emitted at the new block's beginning (good-til expirations).
    pub fn next_block(&mut self) -> Vec<Event> {
        self.app.end_block().expect("end block");
        let height = self.app.block().height + 1;
        self.app
            .begin_block(height, Self::block_time(height))
            .expect("begin block")
    }

    /// Produce empty blocks until the given height is the current one.
    pub fn next_block_until(&mut self, height: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.app.block().height < height {
            events = self.next_block();
        }
        events
    }

    pub fn execute(&mut self, sender: Addr, msg: Msg) -> Result<Vec<Event>> {
        self.app.execute(sender, msg)
    }

    pub fn place_order(&mut self, sender: Addr, request: dex::OrderRequest) -> Result<Vec<Event>> {
        self.execute(sender, Msg::Dex(dex::Msg::PlaceOrder(request)))
    }

    pub fn send(&mut self, sender: Addr, recipient: Addr, coin: Coin) -> Result<Vec<Event>> {
        self.execute(sender, Msg::Ft(ft::Msg::Send { recipient, coin }))
    }

    pub fn balance(&self, account: Addr, denom: &Denom) -> Uint128 {
        reef_ft::get_balance(self.app.storage(), &account, denom).expect("query balance")
    }

    pub fn balances(&self, account: Addr, denom: &Denom) -> ft::BalanceResponse {
        reef_ft::query_balance(self.app.storage(), &account, denom).expect("query balances")
    }

    pub fn orders(&self, creator: Addr) -> Vec<dex::Order> {
        reef_dex::query_orders(self.app.storage(), &creator, None, None).expect("query orders")
    }

    pub fn book_orders(&self, base: &Denom, quote: &Denom, side: dex::Side) -> Vec<dex::Order> {
        reef_dex::query_order_book_orders(self.app.storage(), base, quote, side, None, None)
            .expect("query book")
    }
}

pub fn fee_denom() -> Denom {
    Denom::from_str(FEE_DENOM).unwrap()
}

/// The native pair most DEX tests trade.
pub fn coral() -> Denom {
    Denom::from_str("ucoral").unwrap()
}

pub fn shell() -> Denom {
    Denom::from_str("ushell").unwrap()
}

pub fn default_feemodel_genesis() -> reef_feemodel::GenesisState {
    let params = reef_types::feemodel::ModelParams {
        initial_gas_price: Udec128::from_str("0.0625").unwrap(),
        max_gas_price_multiplier: Udec128::new(1000),
        max_discount: Udec128::from_str("0.5").unwrap(),
        escalation_start_fraction: Udec128::from_str("0.8").unwrap(),
        max_block_gas: 50_000_000,
        short_ema_block_length: 50,
        long_ema_block_length: 1000,
    };
    reef_feemodel::GenesisState {
        min_gas_price: params.initial_gas_price,
        params,
        short_ema: 0,
        long_ema: 0,
    }
}

pub fn default_genesis(accounts: &TestAccounts) -> GenesisState {
    let ft_params = ft::Params {
        issue_fee: Coin::new(fee_denom(), Uint128::new(100)),
    };
    let dex_params = dex::Params {
        order_reserve: Coin::new(fee_denom(), Uint128::new(ORDER_RESERVE)),
        max_orders_per_denom: 100,
        default_unified_ref_amount: Uint128::new(100),
    };
    let balances = accounts
        .all()
        .into_iter()
        .map(|addr| {
            (addr, vec![
                Coin::new(fee_denom(), Uint128::new(INITIAL_BALANCE)),
                Coin::new(coral(), Uint128::new(INITIAL_BALANCE)),
                Coin::new(shell(), Uint128::new(INITIAL_BALANCE)),
            ])
        })
        .collect();

    genesis_with_balances(
        fee_denom(),
        ft_params,
        dex_params,
        default_feemodel_genesis(),
        balances,
    )
    .expect("build genesis")
}

/// Spin up a chain at `GENESIS_HEIGHT` with the default genesis.
pub fn setup_test() -> (TestSuite, TestAccounts) {
    let accounts = TestAccounts::new();
    let genesis = default_genesis(&accounts);
    let app = App::new(&genesis, GENESIS_HEIGHT, TestSuite::block_time(GENESIS_HEIGHT))
        .expect("init chain");
    (TestSuite { app }, accounts)
}

/// Check the chain-wide conservation invariants, panicking on violation:
///
/// 1. every DEX-locked counter equals the sum of the matching open orders'
///    remaining locked balance;
/// 2. every expected-to-receive counter equals the analogous sum;
/// 3. every price-time index entry points at an existing order, and every
///    order appears in the index exactly once.
pub fn assert_chain_invariants(storage: &dyn reef_std::Storage) {
    use {
        reef_std::Order as IterationOrder,
        std::collections::BTreeMap,
    };

    let orders = reef_dex::ORDERS
        .range(storage, None, None, IterationOrder::Ascending)
        .collect::<reef_std::StdResult<Vec<_>>>()
        .expect("iterate orders");

    let mut locked = BTreeMap::<(Addr, Denom), Uint128>::new();
    let mut expected = BTreeMap::<(Addr, Denom), Uint128>::new();
    for (_, order) in &orders {
        let entry = locked
            .entry((order.creator, order.locked_denom().clone()))
            .or_insert(Uint128::ZERO);
        *entry = entry.checked_add(order.remaining_spendable_balance).unwrap();
        let entry = expected
            .entry((order.creator, order.expected_denom().clone()))
            .or_insert(Uint128::ZERO);
        *entry = entry
            .checked_add(order.expected_to_receive().unwrap())
            .unwrap();
    }

    let stored_locked: BTreeMap<(Addr, Denom), Uint128> = reef_ft::DEX_LOCKED
        .range(storage, None, None, IterationOrder::Ascending)
        .collect::<reef_std::StdResult<_>>()
        .expect("iterate locked");
    locked.retain(|_, amount| !amount.is_zero());
    assert_eq!(stored_locked, locked, "lock conservation violated");

    let stored_expected: BTreeMap<(Addr, Denom), Uint128> = reef_ft::DEX_EXPECTED
        .range(storage, None, None, IterationOrder::Ascending)
        .collect::<reef_std::StdResult<_>>()
        .expect("iterate expected");
    expected.retain(|_, amount| !amount.is_zero());
    assert_eq!(stored_expected, expected, "expected-receive conservation violated");

    let index_sequences = reef_dex::ORDER_BOOK_INDEX
        .range(storage, None, None, IterationOrder::Ascending)
        .map(|res| res.map(|(_, _, sequence)| sequence))
        .collect::<reef_std::StdResult<Vec<_>>>()
        .expect("iterate index");
    let mut sorted = index_sequences.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(
        sorted.len(),
        index_sequences.len(),
        "an order appears in the index more than once"
    );
    assert_eq!(
        sorted,
        orders.iter().map(|(sequence, _)| *sequence).collect::<Vec<_>>(),
        "index entries and stored orders diverge"
    );
}

/// The total of an account set's balances in one denom, for conservation
/// checks.
pub fn total_balance(storage: &dyn reef_std::Storage, accounts: &[Addr], denom: &Denom) -> Uint128 {
    accounts.iter().fold(Uint128::ZERO, |sum, account| {
        sum.checked_add(reef_ft::get_balance(storage, account, denom).unwrap())
            .unwrap()
    })
}

/// Assertion helpers in the house style.
pub trait ResultExt<T> {
    fn should_succeed(self) -> T;

    fn should_fail_with_error(self, fragment: &str);
}

impl<T: Debug> ResultExt<T> for Result<T> {
    fn should_succeed(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic!("expected success, got error: {err}"),
        }
    }

    fn should_fail_with_error(self, fragment: &str) {
        match self {
            Ok(value) => panic!("expected failure containing `{fragment}`, got: {value:?}"),
            Err(err) => {
                let message = err.to_string();
                assert!(
                    message.contains(fragment),
                    "expected error containing `{fragment}`, got: {message}"
                );
            },
        }
    }
}

/// Shorthand for building an issued test token.
pub fn issue_settings(subunit: &str, symbol: &str, features: &[ft::Feature]) -> ft::IssueSettings {
    ft::IssueSettings {
        symbol: symbol.to_string(),
        subunit: subunit.to_string(),
        precision: 6,
        initial_amount: Uint128::new(1_000_000),
        description: String::new(),
        features: features.to_vec(),
        burn_rate: Udec128::ZERO,
        send_commission_rate: Udec128::ZERO,
        uri: String::new(),
        uri_hash: String::new(),
        extension_settings: None,
        dex_settings: None,
    }
}

/// Shorthand for a limit order request.
pub fn limit_order(
    id: &str,
    side: dex::Side,
    base: &Denom,
    quote: &Denom,
    price: &str,
    quantity: u128,
    time_in_force: dex::TimeInForce,
) -> dex::OrderRequest {
    dex::OrderRequest {
        id: id.to_string(),
        order_type: dex::OrderType::Limit,
        side,
        base_denom: base.clone(),
        quote_denom: quote.clone(),
        price: Some(price.parse().unwrap()),
        quantity: Uint128::new(quantity),
        time_in_force,
        good_til: None,
    }
}
