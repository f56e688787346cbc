use {
    crate::{Curve, Direction, Error, FeeFraction, Result},
    alloy::primitives::{Address, U256},
    model::{Event, EventLog, Fungible, TransferError},
    number::U256Ext,
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
    tracing::instrument,
};

/// Interface of a two asset pool, local or external.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Pool: Send + Sync {
    fn address(&self) -> Address;

    /// Addresses of asset A and asset B.
    fn tokens(&self) -> (Address, Address);

    /// Output a swap of `amount_in` would currently pay.
    fn quote(&self, direction: Direction, amount_in: U256) -> Result<U256>;

    /// A failed swap returns the input to `caller` or owes it to them.
    fn swap_route(
        &self,
        caller: Address,
        direction: Direction,
        amount_in: U256,
        min_amount_out: U256,
        to: Address,
    ) -> Result<U256>;

    fn deposit(&self, caller: Address, amount_a: U256, amount_b: U256) -> Result<Deposit>;

    fn withdraw(&self, caller: Address, shares: U256) -> Result<Withdrawal>;
}

/// Outcome of a deposit: the amounts actually pulled from the provider and
/// the shares minted for them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub amount_a: U256,
    pub amount_b: U256,
    pub shares: U256,
}

/// Outcome of a withdrawal, or amounts a pool owes an account.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Withdrawal {
    pub amount_a: U256,
    pub amount_b: U256,
}

/// Pool holding reserves of two assets and a ledger of proportional shares
/// in them.
///
/// When the pool cannot undo a transfer of an operation that failed halfway,
/// it books what it owes the affected account as pending and pays it out on
/// [`LiquidityPool::claim`]. Pending amounts are held by the pool but are not
/// part of the reserves.
pub struct LiquidityPool {
    address: Address,
    name: String,
    symbol: String,
    token_a: Arc<dyn Fungible>,
    token_b: Arc<dyn Fungible>,
    fee: FeeFraction,
    curve: Curve,
    state: Mutex<State>,
    events: EventLog,
}

#[derive(Debug, Default)]
struct State {
    reserve_a: U256,
    reserve_b: U256,
    total_shares: U256,
    shares: HashMap<Address, U256>,
    pending: HashMap<Address, Withdrawal>,
}

impl State {
    fn shares_of(&self, account: Address) -> U256 {
        self.shares.get(&account).copied().unwrap_or_default()
    }

    fn owe(&mut self, account: Address, amount_a: U256, amount_b: U256) {
        let pending = self.pending.entry(account).or_default();
        pending.amount_a += amount_a;
        pending.amount_b += amount_b;
    }

    /// Pending amounts of both assets, summed over all accounts.
    fn owed(&self) -> (U256, U256) {
        self.pending
            .values()
            .fold((U256::ZERO, U256::ZERO), |(a, b), pending| {
                (a + pending.amount_a, b + pending.amount_b)
            })
    }

    /// `(reserve_in, reserve_out)` of a swap in `direction`.
    fn reserves(&self, direction: Direction) -> (U256, U256) {
        match direction {
            Direction::AToB => (self.reserve_a, self.reserve_b),
            Direction::BToA => (self.reserve_b, self.reserve_a),
        }
    }

    fn set_reserves(&mut self, direction: Direction, reserve_in: U256, reserve_out: U256) {
        match direction {
            Direction::AToB => (self.reserve_a, self.reserve_b) = (reserve_in, reserve_out),
            Direction::BToA => (self.reserve_b, self.reserve_a) = (reserve_in, reserve_out),
        }
    }

    /// Works out how much of the offered amounts a deposit uses and how many
    /// shares it mints.
    ///
    /// The first deposit mints the geometric mean of both amounts. Later
    /// deposits use the limiting side in full and only as much of the other
    /// side as keeps the reserve ratio, rounded up in favour of the pool. The
    /// excess is never pulled.
    fn plan_deposit(&self, amount_a: U256, amount_b: U256) -> Result<Deposit> {
        let deposit = if self.total_shares.is_zero() {
            Deposit {
                amount_a,
                amount_b,
                shares: amount_a.checked_mul(amount_b).ok_or(Error::Overflow)?.isqrt(),
            }
        } else {
            let a_limits = amount_a.checked_mul(self.reserve_b).ok_or(Error::Overflow)?
                <= amount_b.checked_mul(self.reserve_a).ok_or(Error::Overflow)?;
            if a_limits {
                Deposit {
                    amount_a,
                    amount_b: amount_a
                        .checked_mul_div_ceil(&self.reserve_b, &self.reserve_a)
                        .ok_or(Error::Overflow)?,
                    shares: amount_a
                        .checked_mul_div(&self.total_shares, &self.reserve_a)
                        .ok_or(Error::Overflow)?,
                }
            } else {
                Deposit {
                    amount_a: amount_b
                        .checked_mul_div_ceil(&self.reserve_a, &self.reserve_b)
                        .ok_or(Error::Overflow)?,
                    amount_b,
                    shares: amount_b
                        .checked_mul_div(&self.total_shares, &self.reserve_b)
                        .ok_or(Error::Overflow)?,
                }
            }
        };
        if deposit.shares.is_zero() {
            return Err(Error::ZeroShares);
        }
        Ok(deposit)
    }
}

impl LiquidityPool {
    pub fn new(
        address: Address,
        token_a: Arc<dyn Fungible>,
        token_b: Arc<dyn Fungible>,
        fee: FeeFraction,
        curve: Curve,
        events: EventLog,
    ) -> Result<Self> {
        if token_a.address() == token_b.address() {
            return Err(Error::IdenticalTokens);
        }
        Ok(Self {
            address,
            name: String::new(),
            symbol: String::new(),
            token_a,
            token_b,
            fee,
            curve,
            state: Default::default(),
            events,
        })
    }

    pub fn from_config(
        address: Address,
        token_a: Arc<dyn Fungible>,
        token_b: Arc<dyn Fungible>,
        config: &configs::Pool,
        events: EventLog,
    ) -> Result<Self> {
        let fee = FeeFraction::from_fraction(config.fee).ok_or(Error::InvalidFee(config.fee))?;
        let mut pool = Self::new(address, token_a, token_b, fee, config.curve.into(), events)?;
        pool.name.clone_from(&config.name);
        pool.symbol.clone_from(&config.symbol);
        Ok(pool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn fee(&self) -> FeeFraction {
        self.fee
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// `(reserve_a, reserve_b)`.
    pub fn reserves(&self) -> (U256, U256) {
        let state = self.state.lock().unwrap();
        (state.reserve_a, state.reserve_b)
    }

    pub fn total_shares(&self) -> U256 {
        self.state.lock().unwrap().total_shares
    }

    pub fn shares_of(&self, account: Address) -> U256 {
        self.state.lock().unwrap().shares_of(account)
    }

    /// Amounts the pool owes `account` and pays out on
    /// [`LiquidityPool::claim`].
    pub fn pending_of(&self, account: Address) -> Withdrawal {
        self.state
            .lock()
            .unwrap()
            .pending
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    /// `(token_in, token_out)` of a swap in `direction`.
    fn assets(&self, direction: Direction) -> (&dyn Fungible, &dyn Fungible) {
        match direction {
            Direction::AToB => (&*self.token_a, &*self.token_b),
            Direction::BToA => (&*self.token_b, &*self.token_a),
        }
    }

    /// Fails unless the pool holds `amount` of `token` on top of what it owes.
    fn ensure_held(&self, token: &dyn Fungible, owed: U256, amount: U256) -> Result<()> {
        let available = token.balance_of(self.address).saturating_sub(owed);
        if available < amount {
            tracing::warn!(
                pool = ?self.address,
                token = ?token.address(),
                %available,
                %amount,
                "pool holds less than its books"
            );
            return Err(Error::UnderlyingTransferFailed(
                TransferError::InsufficientBalance {
                    available,
                    required: amount,
                },
            ));
        }
        Ok(())
    }

    /// Returns `amount` of `token` held by the pool to `to`. Used to undo the
    /// first leg of an operation whose second leg failed.
    fn refund(&self, token: &dyn Fungible, to: Address, amount: U256) -> bool {
        match token.transfer(self.address, to, amount) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    pool = ?self.address,
                    token = ?token.address(),
                    ?to,
                    %amount,
                    ?err,
                    "failed to refund first leg"
                );
                false
            }
        }
    }

    /// Adds liquidity from `caller`, who has to have approved the pool on
    /// both assets.
    #[instrument(skip_all, fields(pool = ?self.address, ?caller))]
    pub fn deposit(&self, caller: Address, amount_a: U256, amount_b: U256) -> Result<Deposit> {
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let mut state = self.state.lock().unwrap();
        let deposit = state.plan_deposit(amount_a, amount_b)?;
        let reserve_a = state
            .reserve_a
            .checked_add(deposit.amount_a)
            .ok_or(Error::Overflow)?;
        let reserve_b = state
            .reserve_b
            .checked_add(deposit.amount_b)
            .ok_or(Error::Overflow)?;
        let total_shares = state
            .total_shares
            .checked_add(deposit.shares)
            .ok_or(Error::Overflow)?;

        self.token_a
            .transfer_from(self.address, caller, self.address, deposit.amount_a)
            .map_err(Error::UnderlyingTransferFailed)?;
        if let Err(err) =
            self.token_b
                .transfer_from(self.address, caller, self.address, deposit.amount_b)
        {
            if !self.refund(&*self.token_a, caller, deposit.amount_a) {
                state.owe(caller, deposit.amount_a, U256::ZERO);
            }
            return Err(Error::UnderlyingTransferFailed(err));
        }

        state.reserve_a = reserve_a;
        state.reserve_b = reserve_b;
        state.total_shares = total_shares;
        *state.shares.entry(caller).or_default() += deposit.shares;
        drop(state);

        tracing::debug!(?deposit, "deposit");
        self.events.emit(Event::Deposit {
            pool: self.address,
            provider: caller,
            amount_a: deposit.amount_a,
            amount_b: deposit.amount_b,
            shares: deposit.shares,
        });
        Ok(deposit)
    }

    /// Burns `shares` of `caller` and pays out the proportional part of both
    /// reserves, rounded down.
    ///
    /// If asset B cannot be paid after asset A went out and the pool cannot
    /// pull A back, the withdrawal still goes through and B is owed to
    /// `caller` instead.
    #[instrument(skip_all, fields(pool = ?self.address, ?caller))]
    pub fn withdraw(&self, caller: Address, shares: U256) -> Result<Withdrawal> {
        if shares.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let mut state = self.state.lock().unwrap();
        let available = state.shares_of(caller);
        if available < shares {
            return Err(Error::InsufficientShares {
                available,
                required: shares,
            });
        }
        let withdrawal = Withdrawal {
            amount_a: state
                .reserve_a
                .checked_mul_div(&shares, &state.total_shares)
                .ok_or(Error::Overflow)?,
            amount_b: state
                .reserve_b
                .checked_mul_div(&shares, &state.total_shares)
                .ok_or(Error::Overflow)?,
        };

        let (owed_a, owed_b) = state.owed();
        self.ensure_held(&*self.token_a, owed_a, withdrawal.amount_a)?;
        self.ensure_held(&*self.token_b, owed_b, withdrawal.amount_b)?;

        self.token_a
            .transfer(self.address, caller, withdrawal.amount_a)
            .map_err(Error::UnderlyingTransferFailed)?;
        if let Err(err) = self
            .token_b
            .transfer(self.address, caller, withdrawal.amount_b)
        {
            // The provider holds the first leg now; it can only be reclaimed
            // if they allowed the pool to pull it.
            let reclaimed = self
                .token_a
                .transfer_from(self.address, caller, self.address, withdrawal.amount_a);
            if reclaimed.is_ok() {
                return Err(Error::UnderlyingTransferFailed(err));
            }
            tracing::error!(
                ?withdrawal,
                ?err,
                "could not pay second leg nor reclaim the first, second leg is claimable"
            );
            state.owe(caller, U256::ZERO, withdrawal.amount_b);
        }

        state.reserve_a -= withdrawal.amount_a;
        state.reserve_b -= withdrawal.amount_b;
        state.total_shares -= shares;
        state.shares.insert(caller, available - shares);
        drop(state);

        tracing::debug!(?withdrawal, %shares, "withdraw");
        self.events.emit(Event::Withdraw {
            pool: self.address,
            provider: caller,
            shares,
            amount_a: withdrawal.amount_a,
            amount_b: withdrawal.amount_b,
        });
        Ok(withdrawal)
    }

    pub fn quote(&self, direction: Direction, amount_in: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = self.state.lock().unwrap().reserves(direction);
        self.curve
            .amount_out(self.fee, amount_in, reserve_in, reserve_out)
    }

    /// Swaps `amount_in` of the input asset pulled from `caller` for the
    /// output asset paid to `to`.
    #[instrument(skip_all, fields(pool = ?self.address, ?caller, %direction))]
    pub fn swap_route(
        &self,
        caller: Address,
        direction: Direction,
        amount_in: U256,
        min_amount_out: U256,
        to: Address,
    ) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        let (reserve_in, reserve_out) = state.reserves(direction);
        let amount_out = self
            .curve
            .amount_out(self.fee, amount_in, reserve_in, reserve_out)?;
        if amount_out < min_amount_out {
            return Err(Error::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }
        let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(Error::Overflow)?;

        let (token_in, token_out) = self.assets(direction);
        let owed_out = match (direction, state.owed()) {
            (Direction::AToB, (_, owed_b)) => owed_b,
            (Direction::BToA, (owed_a, _)) => owed_a,
        };
        self.ensure_held(token_out, owed_out, amount_out)?;
        token_in
            .transfer_from(self.address, caller, self.address, amount_in)
            .map_err(Error::UnderlyingTransferFailed)?;
        if let Err(err) = token_out.transfer(self.address, to, amount_out) {
            if !self.refund(token_in, caller, amount_in) {
                match direction {
                    Direction::AToB => state.owe(caller, amount_in, U256::ZERO),
                    Direction::BToA => state.owe(caller, U256::ZERO, amount_in),
                }
            }
            return Err(Error::UnderlyingTransferFailed(err));
        }
        state.set_reserves(direction, new_reserve_in, reserve_out - amount_out);
        drop(state);

        tracing::debug!(%amount_in, %amount_out, ?to, "swap");
        self.events.emit(Event::Swap {
            pool: self.address,
            sender: caller,
            to,
            direction: direction.into(),
            amount_in,
            amount_out,
        });
        Ok(amount_out)
    }

    /// Pays out what the pool owes `caller`. A leg paid before the other one
    /// failed is no longer owed.
    #[instrument(skip_all, fields(pool = ?self.address, ?caller))]
    pub fn claim(&self, caller: Address) -> Result<Withdrawal> {
        let mut state = self.state.lock().unwrap();
        let owed = state.pending.get(&caller).copied().unwrap_or_default();
        if owed == Withdrawal::default() {
            return Err(Error::NothingToClaim);
        }

        if !owed.amount_a.is_zero() {
            self.token_a
                .transfer(self.address, caller, owed.amount_a)
                .map_err(Error::UnderlyingTransferFailed)?;
            if let Some(pending) = state.pending.get_mut(&caller) {
                pending.amount_a = U256::ZERO;
            }
        }
        if !owed.amount_b.is_zero() {
            self.token_b
                .transfer(self.address, caller, owed.amount_b)
                .map_err(Error::UnderlyingTransferFailed)?;
        }
        state.pending.remove(&caller);
        drop(state);

        tracing::debug!(?owed, "claim");
        self.events.emit(Event::Claim {
            pool: self.address,
            account: caller,
            amount_a: owed.amount_a,
            amount_b: owed.amount_b,
        });
        Ok(owed)
    }
}

impl Pool for LiquidityPool {
    fn address(&self) -> Address {
        self.address
    }

    fn tokens(&self) -> (Address, Address) {
        (self.token_a.address(), self.token_b.address())
    }

    fn quote(&self, direction: Direction, amount_in: U256) -> Result<U256> {
        LiquidityPool::quote(self, direction, amount_in)
    }

    fn swap_route(
        &self,
        caller: Address,
        direction: Direction,
        amount_in: U256,
        min_amount_out: U256,
        to: Address,
    ) -> Result<U256> {
        LiquidityPool::swap_route(self, caller, direction, amount_in, min_amount_out, to)
    }

    fn deposit(&self, caller: Address, amount_a: U256, amount_b: U256) -> Result<Deposit> {
        LiquidityPool::deposit(self, caller, amount_a, amount_b)
    }

    fn withdraw(&self, caller: Address, shares: U256) -> Result<Withdrawal> {
        LiquidityPool::withdraw(self, caller, shares)
    }
}
