use {
    alloy::primitives::U256,
    e2e::setup::*,
    liquidity::{Curve, FeeFraction},
    std::io::Write,
};

const CONFIG: &str = r#"
[logging]
env-filter = "warn,arbitration=debug"
stderr-threshold = "warn"

[pool]
name = "test lp"
symbol = "TESTLP"
fee = 0.02
curve = "spot-price"

[[wrapper]]
name = "wrapper test"
symbol = "TEST"

[[wrapper]]
name = "foo"
symbol = "BAR"

[router]
min-out-percent = 50
max-out-percent = 100
"#;

#[test]
fn deploys_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = configs::load(file.path()).unwrap();
    observe::tracing::initialize_reentrant(&config.logging.to_observe().unwrap());

    let contracts = Contracts::deploy(&config).unwrap();
    assert_eq!(contracts.wrapped_a.name(), "wrapper test");
    assert_eq!(contracts.wrapped_a.symbol(), "TEST");
    assert_eq!(contracts.wrapped_b.symbol(), "BAR");
    assert_eq!(contracts.pool.name(), "test lp");
    assert_eq!(contracts.pool.symbol(), "TESTLP");
    assert_eq!(contracts.pool.fee(), FeeFraction::new(85_899_345));
    assert_eq!(contracts.pool.curve(), Curve::SpotPrice);
    assert_eq!(contracts.external_pool.curve(), Curve::DiscountedSpot);
    assert_eq!(contracts.external_pool.fee(), contracts.pool.fee());
    assert_eq!(contracts.router_bounds.min_out_percent, 50);
    assert_eq!(contracts.arbitrator.controller(), Some(DEPLOYER));
    assert!(contracts.arbitrator.parents().is_empty());
    assert_eq!(contracts.pool.total_shares(), U256::ZERO);
}

#[test]
fn defaults_apply_without_config() {
    run_with_config("", |contracts| {
        assert_eq!(contracts.pool.curve(), Curve::ConstantProduct);
        assert_eq!(
            Some(contracts.pool.fee()),
            FeeFraction::from_fraction(0.003)
        );
        assert_eq!(contracts.router_bounds.min_out_percent, 95);
        assert_eq!(contracts.router_bounds.max_out_percent, 105);
    });
}

#[test]
fn rejects_invalid_config() {
    assert!(configs::from_str("[pool]\nfee = 1.5").is_err());
    assert!(configs::from_str("[router]\nmin-out-percent = 101\nmax-out-percent = 100").is_err());
    assert!(configs::from_str("[pool]\ncurve = \"stable\"").is_err());
}
