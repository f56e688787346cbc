mod deploy;

pub use {
    deploy::{Contracts, addresses},
    testlib::accounts::{DEPLOYER, account},
};

/// Default log filter of the scenario tests.
pub const LOG_FILTER: &str = "warn,arbitration=debug,liquidity=debug,router=debug,e2e=debug";

/// Runs a scenario with logging set up.
pub fn run_test(test: impl FnOnce()) {
    observe::tracing::initialize_reentrant(&observe::Config::default().with_env_filter(LOG_FILTER));
    test();
}

/// Deploys the protocol from `config` and runs a scenario against it.
pub fn run_with_config(config: &str, test: impl FnOnce(Contracts)) {
    run_test(|| {
        let config = configs::from_str(config).unwrap();
        test(Contracts::deploy(&config).unwrap());
    });
}
