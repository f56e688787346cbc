use {
    alloy::primitives::{Address, U256},
    anyhow::{Context, Result},
    arbitration::{Authority, Metadata, WrappedToken},
    liquidity::LiquidityPool,
    model::{EventLog, Fungible},
    router::SwapRouter,
    std::sync::Arc,
    testlib::{Erc20, FixedFeed, accounts::DEPLOYER},
};

pub mod addresses {
    use {alloy::primitives::Address, testlib::accounts::contract};

    pub const UNDERLYING_A: Address = contract(0);
    pub const UNDERLYING_B: Address = contract(1);
    pub const ARBITRATOR: Address = contract(2);
    pub const WRAPPED_A: Address = contract(3);
    pub const WRAPPED_B: Address = contract(4);
    pub const POOL: Address = contract(5);
    pub const EXTERNAL_POOL: Address = contract(6);
    pub const ROUTER: Address = contract(7);
}

/// Feed answer of both assets: 1.00000000 of the reference currency.
const UNIT_PRICE: i64 = 100_000_000;
const FEED_DECIMALS: u8 = 8;

/// A full deployment: two plain assets, their arbitrable wrappers guarded by
/// one arbitrator, a pool of the wrapped assets, an external pool of the
/// plain assets paying the fee discounted spot price and a router between the
/// wrappers.
pub struct Contracts {
    pub events: EventLog,
    pub underlying_a: Arc<Erc20>,
    pub underlying_b: Arc<Erc20>,
    pub arbitrator: Arc<Authority>,
    pub wrapped_a: Arc<WrappedToken>,
    pub wrapped_b: Arc<WrappedToken>,
    pub pool: Arc<LiquidityPool>,
    pub external_pool: Arc<LiquidityPool>,
    pub feed_a: Arc<FixedFeed>,
    pub feed_b: Arc<FixedFeed>,
    pub router: SwapRouter,
    pub router_bounds: configs::Router,
}

impl Contracts {
    pub fn deploy(config: &configs::Config) -> Result<Self> {
        let events = EventLog::new();
        let underlying_a = Arc::new(Erc20::new(addresses::UNDERLYING_A));
        let underlying_b = Arc::new(Erc20::new(addresses::UNDERLYING_B));
        let arbitrator = Arc::new(Authority::new(
            addresses::ARBITRATOR,
            DEPLOYER,
            events.clone(),
        ));

        let metadata = |index: usize| {
            config
                .wrappers
                .get(index)
                .map(Metadata::from)
                .unwrap_or_else(|| Metadata::new("wrapped", "W"))
        };
        let wrapped_a = Arc::new(
            WrappedToken::new(
                addresses::WRAPPED_A,
                underlying_a.clone(),
                arbitrator.clone(),
                metadata(0),
                events.clone(),
            )
            .context("wrapping asset A")?,
        );
        let wrapped_b = Arc::new(
            WrappedToken::new(
                addresses::WRAPPED_B,
                underlying_b.clone(),
                arbitrator.clone(),
                metadata(1),
                events.clone(),
            )
            .context("wrapping asset B")?,
        );

        let pool = Arc::new(
            LiquidityPool::from_config(
                addresses::POOL,
                wrapped_a.clone(),
                wrapped_b.clone(),
                &config.pool,
                events.clone(),
            )
            .context("deploying pool")?,
        );
        let external = configs::Pool {
            curve: configs::Curve::DiscountedSpot,
            ..config.pool.clone()
        };
        let external_pool = Arc::new(
            LiquidityPool::from_config(
                addresses::EXTERNAL_POOL,
                underlying_a.clone(),
                underlying_b.clone(),
                &external,
                events.clone(),
            )
            .context("deploying external pool")?,
        );

        let feed_a = Arc::new(FixedFeed::new(UNIT_PRICE, FEED_DECIMALS));
        let feed_b = Arc::new(FixedFeed::new(UNIT_PRICE, FEED_DECIMALS));
        let router = SwapRouter::new(
            addresses::ROUTER,
            feed_a.clone(),
            feed_b.clone(),
            external_pool.clone(),
            wrapped_a.clone(),
            wrapped_b.clone(),
            &arbitrator,
        )
        .context("deploying router")?;

        tracing::info!(
            pool = pool.name(),
            wrapped_a = wrapped_a.symbol(),
            wrapped_b = wrapped_b.symbol(),
            "deployed protocol"
        );
        Ok(Self {
            events,
            underlying_a,
            underlying_b,
            arbitrator,
            wrapped_a,
            wrapped_b,
            pool,
            external_pool,
            feed_a,
            feed_b,
            router,
            router_bounds: config.router,
        })
    }

    /// Mints `amount` of the underlying to `account` and wraps all of it.
    pub fn mint_wrapped(&self, wrapped: &WrappedToken, account: Address, amount: u64) {
        let underlying = if Fungible::address(wrapped) == addresses::WRAPPED_A {
            &self.underlying_a
        } else {
            &self.underlying_b
        };
        let amount_u256 = U256::from(amount);
        underlying.mint(account, amount);
        underlying
            .approve(account, Fungible::address(wrapped), amount_u256)
            .unwrap();
        wrapped.wrap(account, amount_u256, account).unwrap();
    }

    /// Mints wrapped assets to `account` and deposits them into the pool of
    /// wrapped assets. Returns the minted shares.
    pub fn provide_liquidity(&self, account: Address, amount_a: u64, amount_b: u64) -> U256 {
        self.mint_wrapped(&self.wrapped_a, account, amount_a);
        self.mint_wrapped(&self.wrapped_b, account, amount_b);
        deposit(
            &self.pool,
            &*self.wrapped_a,
            &*self.wrapped_b,
            account,
            amount_a,
            amount_b,
        )
    }

    /// Mints plain assets to `account` and deposits them into the external
    /// pool. Returns the minted shares.
    pub fn provide_external_liquidity(
        &self,
        account: Address,
        amount_a: u64,
        amount_b: u64,
    ) -> U256 {
        self.underlying_a.mint(account, amount_a);
        self.underlying_b.mint(account, amount_b);
        deposit(
            &self.external_pool,
            &*self.underlying_a,
            &*self.underlying_b,
            account,
            amount_a,
            amount_b,
        )
    }
}

fn deposit(
    pool: &LiquidityPool,
    token_a: &dyn Fungible,
    token_b: &dyn Fungible,
    account: Address,
    amount_a: u64,
    amount_b: u64,
) -> U256 {
    let pool_address = liquidity::Pool::address(pool);
    token_a
        .approve(account, pool_address, U256::from(amount_a))
        .unwrap();
    token_b
        .approve(account, pool_address, U256::from(amount_b))
        .unwrap();
    pool.deposit(account, U256::from(amount_a), U256::from(amount_b))
        .unwrap()
        .shares
}
