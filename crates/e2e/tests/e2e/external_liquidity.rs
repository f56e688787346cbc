use {
    alloy::primitives::U256,
    e2e::setup::*,
    model::Fungible,
};

const CONFIG: &str = r#"
[pool]
fee = 0.01

[router]
min-out-percent = 50
max-out-percent = 100
"#;

const LP_AMOUNT: u64 = 1_000_000;
const INPUT_AMOUNT: u64 = 1000;
// INPUT_AMOUNT * (1 - fee) at the 1:1 spot price of balanced reserves.
const OUTPUT_AMOUNT: u64 = 990;

#[test]
fn can_use_external_liquidity() {
    run_with_config(CONFIG, use_external_liquidity);
}

fn use_external_liquidity(contracts: Contracts) {
    let bounds = contracts.router_bounds;
    contracts.provide_external_liquidity(account(1), LP_AMOUNT, LP_AMOUNT);

    let trader = account(2);
    contracts.mint_wrapped(&contracts.wrapped_a, trader, INPUT_AMOUNT);
    contracts
        .arbitrator
        .add_parent(DEPLOYER, addresses::ROUTER)
        .unwrap();

    let amount_out = contracts
        .router
        .swap(
            trader,
            trader,
            U256::from(INPUT_AMOUNT),
            bounds.min_out_percent,
            bounds.max_out_percent,
        )
        .unwrap();
    assert_eq!(amount_out, U256::from(OUTPUT_AMOUNT));

    // Original token balance is gone.
    assert_eq!(contracts.wrapped_a.balance_of(trader), U256::ZERO);
    // Balance on new token is correct.
    assert_eq!(
        contracts.wrapped_b.balance_of(trader),
        U256::from(OUTPUT_AMOUNT)
    );
    assert_eq!(contracts.wrapped_b.locked(), U256::from(OUTPUT_AMOUNT));
    assert_eq!(contracts.underlying_a.balance_of(addresses::ROUTER), U256::ZERO);
    assert_eq!(contracts.underlying_b.balance_of(addresses::ROUTER), U256::ZERO);

    // The same delegation covers the way back since one arbitrator guards
    // both wrappers.
    let back = contracts
        .router
        .swap_back(
            trader,
            trader,
            U256::from(OUTPUT_AMOUNT),
            bounds.min_out_percent,
            bounds.max_out_percent,
        )
        .unwrap();
    assert!(back < U256::from(INPUT_AMOUNT));
    assert_eq!(contracts.wrapped_a.balance_of(trader), back);
    assert_eq!(contracts.wrapped_b.balance_of(trader), U256::ZERO);
}

#[test]
fn router_needs_delegation() {
    run_with_config(CONFIG, |contracts| {
        let bounds = contracts.router_bounds;
        contracts.provide_external_liquidity(account(1), LP_AMOUNT, LP_AMOUNT);
        let trader = account(2);
        contracts.mint_wrapped(&contracts.wrapped_a, trader, INPUT_AMOUNT);

        assert_eq!(
            contracts.router.swap(
                trader,
                trader,
                U256::from(INPUT_AMOUNT),
                bounds.min_out_percent,
                bounds.max_out_percent,
            ),
            Err(router::Error::Arbitration(
                arbitration::Error::NotAuthorized
            ))
        );

        // Once resigned nobody, the router included, holds override
        // authority.
        contracts
            .arbitrator
            .add_parent(DEPLOYER, addresses::ROUTER)
            .unwrap();
        contracts.arbitrator.resign(DEPLOYER).unwrap();
        assert_eq!(
            contracts.router.swap(
                trader,
                trader,
                U256::from(INPUT_AMOUNT),
                bounds.min_out_percent,
                bounds.max_out_percent,
            ),
            Err(router::Error::Arbitration(
                arbitration::Error::NotAuthorized
            ))
        );
        assert_eq!(
            contracts.wrapped_a.balance_of(trader),
            U256::from(INPUT_AMOUNT)
        );
    });
}

#[test]
fn router_rejects_off_market_prices() {
    run_with_config(CONFIG, |contracts| {
        contracts.provide_external_liquidity(account(1), LP_AMOUNT, LP_AMOUNT);
        let trader = account(2);
        contracts.mint_wrapped(&contracts.wrapped_a, trader, INPUT_AMOUNT);
        contracts
            .arbitrator
            .add_parent(DEPLOYER, addresses::ROUTER)
            .unwrap();
        // The oracles say A lost half its value, the pool still pays 990.
        contracts.feed_a.set_answer(50_000_000);

        assert_eq!(
            contracts
                .router
                .swap(trader, trader, U256::from(INPUT_AMOUNT), 50, 100),
            Err(router::Error::PriceOutOfBounds {
                amount_out: U256::from(OUTPUT_AMOUNT),
                min_amount_out: U256::from(250),
                max_amount_out: U256::from(500),
            })
        );
        assert_eq!(
            contracts.wrapped_a.balance_of(trader),
            U256::from(INPUT_AMOUNT)
        );
        assert_eq!(
            contracts.external_pool.reserves(),
            (U256::from(LP_AMOUNT), U256::from(LP_AMOUNT))
        );
    });
}
