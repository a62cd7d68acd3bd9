use {
    reef_app::Msg,
    reef_std::Uint128,
    reef_testing::{
        coral, issue_settings, limit_order, setup_test, shell, ResultExt, TestSuite,
        INITIAL_BALANCE, ORDER_RESERVE,
    },
    reef_types::{
        dex::{self, CancelReason, GoodTil, OrderRequest, OrderType, Side, TimeInForce},
        ft::{self, DexSettings},
        Event,
    },
    test_case::test_case,
};

fn fee_balance(suite: &TestSuite, account: reef_std::Addr) -> u128 {
    suite.balance(account, &reef_testing::fee_denom()).u128()
}

#[test]
fn simple_cross_at_maker_price() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    // While the order rests, the reserve is held by the DEX module.
    assert_eq!(fee_balance(&suite, accounts.alice), INITIAL_BALANCE - ORDER_RESERVE);

    let events = suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1.5", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    // The trade executes at the maker's price: 10 base for 10 quote.
    let fill = events
        .iter()
        .find_map(|event| match event {
            Event::OrderFilled(fill) => Some(fill.clone()),
            _ => None,
        })
        .expect("a fill event");
    assert_eq!(fill.base_amount, Uint128::new(10));
    assert_eq!(fill.quote_amount, Uint128::new(10));
    assert_eq!(fill.price, "1".parse().unwrap());

    // Both sides end up flat, reserves refunded, books empty.
    assert_eq!(suite.balance(accounts.alice, &coral()).u128(), INITIAL_BALANCE - 10);
    assert_eq!(suite.balance(accounts.alice, &shell()).u128(), INITIAL_BALANCE + 10);
    assert_eq!(suite.balance(accounts.bob, &coral()).u128(), INITIAL_BALANCE + 10);
    assert_eq!(suite.balance(accounts.bob, &shell()).u128(), INITIAL_BALANCE - 10);
    assert_eq!(fee_balance(&suite, accounts.alice), INITIAL_BALANCE);
    assert_eq!(fee_balance(&suite, accounts.bob), INITIAL_BALANCE);
    assert!(suite.book_orders(&coral(), &shell(), Side::Buy).is_empty());
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
}

#[test]
fn partial_taker_residual_rests() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 5, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    // The maker is gone; the taker's residual 5 rests on the buy side.
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
    let buys = suite.book_orders(&coral(), &shell(), Side::Buy);
    assert_eq!(buys.len(), 1);
    assert_eq!(buys[0].creator, accounts.bob);
    assert_eq!(buys[0].remaining_base_quantity, Uint128::new(5));
    assert_eq!(buys[0].quantity, Uint128::new(10));

    // The residual's backing stays locked.
    let bob = suite.balances(accounts.bob, &shell());
    assert_eq!(bob.locked_in_dex, Uint128::new(5));
}

#[test]
fn ioc_drops_residual() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 5, TimeInForce::Gtc),
        )
        .should_succeed();
    let events = suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1", 10, TimeInForce::Ioc),
        )
        .should_succeed();

    assert!(events.iter().any(|event| matches!(
        event,
        Event::OrderCancelled(cancelled) if cancelled.reason == CancelReason::Ioc
    )));

    // The matched 5 settled, the residual 5 was refunded in full.
    assert_eq!(suite.balance(accounts.bob, &coral()).u128(), INITIAL_BALANCE + 5);
    assert_eq!(suite.balance(accounts.bob, &shell()).u128(), INITIAL_BALANCE - 5);
    assert_eq!(suite.balances(accounts.bob, &shell()).locked_in_dex, Uint128::ZERO);
    assert_eq!(fee_balance(&suite, accounts.bob), INITIAL_BALANCE);
    assert!(suite.book_orders(&coral(), &shell(), Side::Buy).is_empty());
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
}

#[test]
fn fok_rejects_insufficient_liquidity() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 5, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1", 10, TimeInForce::Fok),
        )
        .should_fail_with_error("not enough liquidity");

    // The maker is untouched, the taker unchanged.
    let sells = suite.book_orders(&coral(), &shell(), Side::Sell);
    assert_eq!(sells.len(), 1);
    assert_eq!(sells[0].remaining_base_quantity, Uint128::new(5));
    assert_eq!(suite.balance(accounts.bob, &coral()).u128(), INITIAL_BALANCE);
    assert_eq!(suite.balance(accounts.bob, &shell()).u128(), INITIAL_BALANCE);
    assert_eq!(fee_balance(&suite, accounts.bob), INITIAL_BALANCE);
}

#[test]
fn fok_fills_when_liquidity_suffices() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1", 10, TimeInForce::Fok),
        )
        .should_succeed();

    assert_eq!(suite.balance(accounts.bob, &coral()).u128(), INITIAL_BALANCE + 10);
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
}

#[test]
fn good_til_height_expires_order() {
    let (mut suite, accounts) = setup_test();
    suite.next_block(); // height 101

    let mut request =
        limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc);
    request.good_til = Some(GoodTil {
        block_height: Some(103),
        block_time: None,
    });
    suite.place_order(accounts.alice, request).should_succeed();

    // Still resting through its deadline block.
    suite.next_block_until(103);
    assert_eq!(suite.book_orders(&coral(), &shell(), Side::Sell).len(), 1);
    assert_eq!(suite.balance(accounts.alice, &coral()).u128(), INITIAL_BALANCE);
    assert_eq!(
        suite.balances(accounts.alice, &coral()).locked_in_dex,
        Uint128::new(10)
    );

    // Expired at the beginning of block 104; funds and reserve return.
    let events = suite.next_block_until(104);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::OrderCancelled(cancelled) if cancelled.reason == CancelReason::Expired
    )));
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
    assert_eq!(suite.balances(accounts.alice, &coral()).locked_in_dex, Uint128::ZERO);
    assert_eq!(fee_balance(&suite, accounts.alice), INITIAL_BALANCE);
}

#[test]
fn good_til_time_expires_order() {
    let (mut suite, accounts) = setup_test();
    suite.next_block();

    let mut request =
        limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc);
    request.good_til = Some(GoodTil {
        block_height: None,
        block_time: Some(TestSuite::block_time(102)),
    });
    suite.place_order(accounts.alice, request).should_succeed();

    suite.next_block_until(102);
    assert_eq!(suite.book_orders(&coral(), &shell(), Side::Sell).len(), 1);

    let events = suite.next_block_until(103);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::OrderCancelled(cancelled) if cancelled.reason == CancelReason::Expired
    )));
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
}

#[test]
fn price_time_priority_consumes_better_price_first() {
    let (mut suite, accounts) = setup_test();

    // Three sells at different prices, plus a tie broken by sequence.
    suite
        .place_order(
            accounts.alice,
            limit_order("s-high", Side::Sell, &coral(), &shell(), "1.2", 10, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.alice,
            limit_order("s-low-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.charlie,
            limit_order("s-low-2", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    let sells = suite.book_orders(&coral(), &shell(), Side::Sell);
    assert_eq!(
        sells.iter().map(|order| order.id.as_str()).collect::<Vec<_>>(),
        vec!["s-low-1", "s-low-2", "s-high"],
    );

    // A buy of 15 takes all of s-low-1 and half of s-low-2; s-high is
    // beyond the limit price and stays.
    let events = suite
        .place_order(
            accounts.bob,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1.1", 15, TimeInForce::Ioc),
        )
        .should_succeed();

    let fills: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::OrderFilled(fill) => Some((fill.maker_sequence, fill.base_amount.u128())),
            _ => None,
        })
        .collect();
    assert_eq!(fills, vec![(2, 10), (3, 5)]);

    let sells = suite.book_orders(&coral(), &shell(), Side::Sell);
    assert_eq!(
        sells.iter().map(|order| order.id.as_str()).collect::<Vec<_>>(),
        vec!["s-low-2", "s-high"],
    );
    assert_eq!(sells[0].remaining_base_quantity, Uint128::new(5));
}

#[test]
fn self_trade_is_allowed() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.alice,
            limit_order("buy-1", Side::Buy, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    // Crossing with oneself is not rejected; balances net out flat.
    assert_eq!(suite.balance(accounts.alice, &coral()).u128(), INITIAL_BALANCE);
    assert_eq!(suite.balance(accounts.alice, &shell()).u128(), INITIAL_BALANCE);
    assert!(suite.book_orders(&coral(), &shell(), Side::Sell).is_empty());
    assert!(suite.book_orders(&coral(), &shell(), Side::Buy).is_empty());
}

#[test]
fn market_buy_takes_best_available() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "2", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    let request = OrderRequest {
        id: "mkt-1".to_string(),
        order_type: OrderType::Market,
        side: Side::Buy,
        base_denom: coral(),
        quote_denom: shell(),
        price: None,
        quantity: Uint128::new(4),
        time_in_force: TimeInForce::Ioc,
        good_til: None,
    };
    suite.place_order(accounts.bob, request).should_succeed();

    assert_eq!(suite.balance(accounts.bob, &coral()).u128(), INITIAL_BALANCE + 4);
    assert_eq!(suite.balance(accounts.bob, &shell()).u128(), INITIAL_BALANCE - 8);
    // Nothing of the market order lingers.
    assert_eq!(suite.balances(accounts.bob, &shell()).locked_in_dex, Uint128::ZERO);
    let sells = suite.book_orders(&coral(), &shell(), Side::Sell);
    assert_eq!(sells[0].remaining_base_quantity, Uint128::new(6));
}

#[test]
fn user_cancellation_refunds_and_tombstones() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    // A stranger cannot cancel it.
    suite
        .execute(accounts.bob, Msg::Dex(dex::Msg::CancelOrder { id: "sell-1".to_string() }))
        .should_fail_with_error("not found");
    suite
        .execute(accounts.bob, Msg::Dex(dex::Msg::CancelOrderBySequence { sequence: 1 }))
        .should_fail_with_error("does not belong to the sender");

    let events = suite
        .execute(
            accounts.alice,
            Msg::Dex(dex::Msg::CancelOrder { id: "sell-1".to_string() }),
        )
        .should_succeed();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::OrderCancelled(cancelled) if cancelled.reason == CancelReason::User
    )));

    assert_eq!(suite.balances(accounts.alice, &coral()).locked_in_dex, Uint128::ZERO);
    assert_eq!(fee_balance(&suite, accounts.alice), INITIAL_BALANCE);

    // The id is tombstoned: it cannot be resurrected.
    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_fail_with_error("already used");
}

#[test]
fn duplicate_live_order_id_rejected() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("ord-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();
    suite
        .place_order(
            accounts.alice,
            limit_order("ord-1", Side::Sell, &coral(), &shell(), "2", 10, TimeInForce::Gtc),
        )
        .should_fail_with_error("already used");

    // A different creator may reuse the id.
    suite
        .place_order(
            accounts.bob,
            limit_order("ord-1", Side::Sell, &coral(), &shell(), "2", 10, TimeInForce::Gtc),
        )
        .should_succeed();
}

#[test]
fn zero_quantity_rejected() {
    let (mut suite, accounts) = setup_test();
    suite
        .place_order(
            accounts.alice,
            limit_order("ord-1", Side::Sell, &coral(), &shell(), "1", 0, TimeInForce::Gtc),
        )
        .should_fail_with_error("quantity must be positive");
}

#[test]
fn price_not_on_tick_rejected() {
    let (mut suite, accounts) = setup_test();
    // Tick for the default ref amounts is 1e-6.
    suite
        .place_order(
            accounts.alice,
            limit_order("ord-1", Side::Sell, &coral(), &shell(), "1e-7", 10, TimeInForce::Gtc),
        )
        .should_fail_with_error("multiple of the price tick");
}

#[test]
fn quantity_not_on_step_rejected() {
    let (mut suite, accounts) = setup_test();

    // A base denom with a larger ref amount gets a coarser step (10 here).
    let mut settings = issue_settings("stp", "STP", &[]);
    settings.dex_settings = Some(DexSettings {
        unified_ref_amount: Uint128::new(1_000),
    });
    suite
        .execute(accounts.issuer, Msg::Ft(ft::Msg::Issue(settings)))
        .should_succeed();
    let denom: reef_std::Denom = format!("stp-{}", accounts.issuer).parse().unwrap();

    suite
        .place_order(
            accounts.issuer,
            limit_order("ord-1", Side::Sell, &denom, &shell(), "1", 15, TimeInForce::Gtc),
        )
        .should_fail_with_error("multiple of the quantity step");
    suite
        .place_order(
            accounts.issuer,
            limit_order("ord-1", Side::Sell, &denom, &shell(), "1", 20, TimeInForce::Gtc),
        )
        .should_succeed();
}

#[test_case(None, None; "empty good til")]
#[test_case(Some(100), None; "height in the past")]
#[test_case(None, Some(100); "time in the past")]
fn stale_good_til_rejected(height: Option<u64>, time_height: Option<u64>) {
    let (mut suite, accounts) = setup_test();

    let mut request =
        limit_order("ord-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc);
    request.good_til = Some(GoodTil {
        block_height: height,
        block_time: time_height.map(TestSuite::block_time),
    });
    suite
        .place_order(accounts.alice, request)
        .should_fail_with_error("good-til");
}

#[test]
fn insufficient_balance_rejected() {
    let (mut suite, accounts) = setup_test();
    suite
        .place_order(
            accounts.alice,
            limit_order(
                "ord-1",
                Side::Sell,
                &coral(),
                &shell(),
                "1",
                INITIAL_BALANCE + 1,
                TimeInForce::Gtc,
            ),
        )
        .should_fail_with_error("insufficient funds");
}

#[test]
fn locked_balance_not_spendable_outside_fills() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order(
                "sell-1",
                Side::Sell,
                &coral(),
                &shell(),
                "1",
                INITIAL_BALANCE - 10,
                TimeInForce::Gtc,
            ),
        )
        .should_succeed();

    // Only the unlocked remainder can be sent away.
    suite
        .send(
            accounts.alice,
            accounts.bob,
            reef_std::Coin::new(coral(), Uint128::new(11)),
        )
        .should_fail_with_error("insufficient funds");
    suite
        .send(
            accounts.alice,
            accounts.bob,
            reef_std::Coin::new(coral(), Uint128::new(10)),
        )
        .should_succeed();
}

#[test]
fn order_book_queries() {
    let (mut suite, accounts) = setup_test();

    suite
        .place_order(
            accounts.alice,
            limit_order("sell-1", Side::Sell, &coral(), &shell(), "1", 10, TimeInForce::Gtc),
        )
        .should_succeed();

    let books =
        reef_dex::query_order_books(suite.app.storage(), None, None).should_succeed();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].base_denom, coral());

    let order = reef_dex::query_order(suite.app.storage(), &accounts.alice, &"sell-1".to_string())
        .should_succeed();
    assert_eq!(order.sequence, 1);

    let count = reef_dex::query_account_denom_orders_count(
        suite.app.storage(),
        &accounts.alice,
        &coral(),
    )
    .should_succeed();
    assert_eq!(count, 1);

    let params =
        reef_dex::query_order_book_params(suite.app.storage(), &coral(), &shell())
            .should_succeed();
    assert_eq!(params.quantity_step, Uint128::ONE);
}
