use {
    alloy::primitives::U256,
    e2e::setup::*,
    liquidity::Direction,
    model::Event,
};

const CONFIG: &str = r#"
[pool]
name = "test lp"
symbol = "TESTLP"
fee = 0.02
curve = "spot-price"
"#;

const LP_DEPOSIT: u64 = 100_000;
const SWAP_AMOUNT: u64 = 1000;
const SWAP_OUT: u64 = 981;

#[test]
fn can_swap_tokens() {
    run_with_config(CONFIG, swap_tokens);
}

fn swap_tokens(contracts: Contracts) {
    let (lp, trader, receiver) = (account(1), account(2), account(3));
    let shares = contracts.provide_liquidity(lp, LP_DEPOSIT, LP_DEPOSIT);
    assert_eq!(shares, U256::from(LP_DEPOSIT));

    contracts.mint_wrapped(&contracts.wrapped_b, trader, SWAP_AMOUNT);
    contracts
        .wrapped_b
        .approve(trader, addresses::POOL, U256::from(SWAP_AMOUNT))
        .unwrap();
    let amount_out = contracts
        .pool
        .swap_route(
            trader,
            Direction::try_from(1).unwrap(),
            U256::from(SWAP_AMOUNT),
            U256::from(SWAP_AMOUNT * 98 / 100),
            receiver,
        )
        .unwrap();
    assert_eq!(amount_out, U256::from(SWAP_OUT));
    assert_eq!(
        contracts.wrapped_a.balance_of(receiver),
        U256::from(SWAP_OUT)
    );

    let withdrawal = contracts.pool.withdraw(lp, shares).unwrap();
    assert_eq!(withdrawal.amount_a, U256::from(LP_DEPOSIT - SWAP_OUT));
    assert_eq!(withdrawal.amount_b, U256::from(LP_DEPOSIT + SWAP_AMOUNT));
    assert_eq!(
        contracts.wrapped_a.balance_of(lp),
        U256::from(LP_DEPOSIT - SWAP_OUT)
    );
    assert_eq!(
        contracts.wrapped_b.balance_of(lp),
        U256::from(LP_DEPOSIT + SWAP_AMOUNT)
    );

    // Every wrapped unit in circulation stays backed.
    assert_eq!(contracts.wrapped_a.total_supply(), contracts.wrapped_a.locked());
    assert_eq!(contracts.wrapped_b.total_supply(), contracts.wrapped_b.locked());

    let swaps: Vec<_> = contracts
        .events
        .snapshot()
        .into_iter()
        .filter(|event| matches!(event, Event::Swap { .. }))
        .collect();
    assert_eq!(
        swaps,
        vec![Event::Swap {
            pool: addresses::POOL,
            sender: trader,
            to: receiver,
            direction: 1,
            amount_in: U256::from(SWAP_AMOUNT),
            amount_out: U256::from(SWAP_OUT),
        }]
    );
}

#[test]
fn arbitrator_reaches_into_pooled_liquidity() {
    run_with_config(CONFIG, |contracts| {
        let lp = account(1);
        contracts.provide_liquidity(lp, LP_DEPOSIT, LP_DEPOSIT);

        // The pool holds the wrapped assets, so the arbitrator can still
        // move them. The pool's books then no longer match its balance and
        // the next withdrawal fails instead of paying out unbacked value.
        contracts
            .wrapped_a
            .arbitrator_transfer(DEPLOYER, addresses::POOL, account(9), U256::from(LP_DEPOSIT))
            .unwrap();
        assert!(matches!(
            contracts.pool.withdraw(lp, U256::from(LP_DEPOSIT)),
            Err(liquidity::Error::UnderlyingTransferFailed(_))
        ));
        assert_eq!(contracts.pool.shares_of(lp), U256::from(LP_DEPOSIT));
    });
}
