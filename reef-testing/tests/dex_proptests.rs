use {
    proptest::prelude::*,
    reef_app::Msg,
    reef_std::Uint128,
    reef_testing::{
        assert_chain_invariants, coral, setup_test, shell, total_balance, TestAccounts,
    },
    reef_types::dex::{self, OrderRequest, OrderType, Side, TimeInForce},
};

#[derive(Debug, Clone)]
struct Action {
    account: usize,
    side: Side,
    price_ticks: u64,
    quantity: u64,
    time_in_force: TimeInForce,
    cancel_after: bool,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    (
        0_usize..3,
        prop_oneof![Just(Side::Buy), Just(Side::Sell)],
        // Prices between 0.5 and 2.0 in 0.25 steps, all on the 1e-6 tick.
        2_u64..=8,
        1_u64..=50,
        prop_oneof![
            Just(TimeInForce::Gtc),
            Just(TimeInForce::Ioc),
            Just(TimeInForce::Fok),
        ],
        any::<bool>(),
    )
        .prop_map(|(account, side, price_ticks, quantity, time_in_force, cancel_after)| {
            Action {
                account,
                side,
                price_ticks,
                quantity,
                time_in_force,
                cancel_after,
            }
        })
}

fn accounts_of(accounts: &TestAccounts) -> [reef_std::Addr; 3] {
    [accounts.alice, accounts.bob, accounts.charlie]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever sequence of placements and cancellations happens, the lock
    /// and index invariants hold and no value is created or destroyed.
    #[test]
    fn matching_preserves_conservation_invariants(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let (mut suite, accounts) = setup_test();
        let traders = accounts_of(&accounts);

        let base_before = total_balance(suite.app.storage(), &traders, &coral());
        let quote_before = total_balance(suite.app.storage(), &traders, &shell());

        for (index, action) in actions.iter().enumerate() {
            let sender = traders[action.account];
            let request = OrderRequest {
                id: format!("ord-{index}"),
                order_type: OrderType::Limit,
                side: action.side,
                base_denom: coral(),
                quote_denom: shell(),
                price: Some(format!("{}e-2", action.price_ticks * 25).parse().unwrap()),
                quantity: Uint128::new(action.quantity as u128),
                time_in_force: action.time_in_force,
                good_til: None,
            };

            // Some placements legitimately fail (FOK without liquidity);
            // failures must leave no trace, which the invariant check below
            // verifies.
            let placed = suite.place_order(sender, request).is_ok();

            if placed && action.cancel_after {
                // The order may or may not still be alive; either outcome
                // is fine.
                let _ = suite.execute(
                    sender,
                    Msg::Dex(dex::Msg::CancelOrder { id: format!("ord-{index}") }),
                );
            }

            assert_chain_invariants(suite.app.storage());
        }

        // Matching only moves balances between traders; the totals are
        // untouched (reserves return on cancel, but open orders hold
        // theirs, so only the traded denoms are compared).
        let base_after = total_balance(suite.app.storage(), &traders, &coral());
        let quote_after = total_balance(suite.app.storage(), &traders, &shell());
        prop_assert_eq!(base_before, base_after);
        prop_assert_eq!(quote_before, quote_after);
    }
}
