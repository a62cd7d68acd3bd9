use {
    reef_app::Msg,
    reef_std::{Coin, Uint128},
    reef_testing::{fee_denom, setup_test, ResultExt},
    reef_types::ft,
};

#[test]
fn ante_enforces_min_gas_price() {
    let (mut suite, accounts) = setup_test();

    let min_price = reef_feemodel::min_gas_price(suite.app.storage()).unwrap();
    let gas_limit = 100_000_u64;
    let required = Uint128::new(gas_limit as u128)
        .checked_mul_dec_ceil(min_price)
        .unwrap();

    let msg = Msg::Ft(ft::Msg::Send {
        recipient: accounts.bob,
        coin: Coin::new(fee_denom(), Uint128::new(1)),
    });

    // Underpaying the fee is rejected before the message runs.
    let low_fee = Coin::new(fee_denom(), required.checked_sub(Uint128::ONE).unwrap());
    suite
        .app
        .execute_tx(accounts.alice, gas_limit, low_fee, vec![msg.clone()])
        .should_fail_with_error("fee");

    let exact_fee = Coin::new(fee_denom(), required);
    suite
        .app
        .execute_tx(accounts.alice, gas_limit, exact_fee, vec![msg])
        .should_succeed();
}

#[test]
fn fee_stays_charged_when_a_message_fails() {
    let (mut suite, accounts) = setup_test();

    let min_price = reef_feemodel::min_gas_price(suite.app.storage()).unwrap();
    let gas_limit = 200_000_u64;
    let fee = Coin::new(
        fee_denom(),
        Uint128::new(gas_limit as u128)
            .checked_mul_dec_ceil(min_price)
            .unwrap(),
    );

    let alice_before = suite.balance(accounts.alice, &fee_denom());
    let collector_before =
        suite.balance(reef_app::fee_collector_account(), &fee_denom());

    // The send exceeds alice's balance, so the message phase fails after
    // the ante phase already committed.
    let overdraft = Msg::Ft(ft::Msg::Send {
        recipient: accounts.bob,
        coin: Coin::new(fee_denom(), Uint128::new(u128::from(u64::MAX))),
    });
    suite
        .app
        .execute_tx(accounts.alice, gas_limit, fee.clone(), vec![overdraft])
        .should_fail_with_error("insufficient funds");

    // The failed message's writes are gone, but the fee is not refunded
    // and the gas stays tracked for the fee model.
    assert_eq!(
        suite.balance(accounts.alice, &fee_denom()),
        alice_before.checked_sub(fee.amount).unwrap()
    );
    assert_eq!(
        suite.balance(reef_app::fee_collector_account(), &fee_denom()),
        collector_before.checked_add(fee.amount).unwrap()
    );
    assert_eq!(suite.balance(accounts.bob, &fee_denom()).u128(), reef_testing::INITIAL_BALANCE);

    suite.next_block();
    assert_eq!(
        reef_feemodel::short_ema(suite.app.storage()).unwrap(),
        gas_limit / 50
    );
}

#[test]
fn tracked_gas_moves_the_emas() {
    let (mut suite, accounts) = setup_test();

    assert_eq!(reef_feemodel::short_ema(suite.app.storage()).unwrap(), 0);

    let min_price = reef_feemodel::min_gas_price(suite.app.storage()).unwrap();
    let gas_limit = 1_000_000_u64;
    let fee = Coin::new(
        fee_denom(),
        Uint128::new(gas_limit as u128)
            .checked_mul_dec_ceil(min_price)
            .unwrap(),
    );

    suite
        .app
        .execute_tx(accounts.alice, gas_limit, fee, vec![Msg::Ft(ft::Msg::Send {
            recipient: accounts.bob,
            coin: Coin::new(fee_denom(), Uint128::new(1)),
        })])
        .should_succeed();

    suite.next_block();

    // One loaded block: short EMA = 1_000_000 / 50.
    assert_eq!(reef_feemodel::short_ema(suite.app.storage()).unwrap(), 20_000);
    assert_eq!(reef_feemodel::long_ema(suite.app.storage()).unwrap(), 1_000);

    // Empty blocks decay the EMAs back toward zero.
    suite.next_block();
    assert!(reef_feemodel::short_ema(suite.app.storage()).unwrap() < 20_000);
}

#[test]
fn recommended_gas_price_brackets_current() {
    let (mut suite, _) = setup_test();
    suite.next_block();

    let band = reef_feemodel::recommended_gas_price(suite.app.storage(), 10).should_succeed();
    assert!(band.low <= band.med);
    assert!(band.med <= band.high);

    reef_feemodel::recommended_gas_price(suite.app.storage(), 51)
        .should_fail_with_error("after blocks");
}
