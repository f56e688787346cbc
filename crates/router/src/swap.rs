use {
    crate::{
        Error,
        Result,
        price::{self, Bounds, Priced},
    },
    alloy::primitives::{Address, U256},
    arbitration::{Authority, WrappedToken},
    liquidity::{Direction, Pool},
    model::{Fungible, PriceFeed},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
    tracing::instrument,
};

/// Routes swaps of wrapped asset A into wrapped asset B (and back) through an
/// external pool trading their underlyings.
///
/// The router has to be a parent of the input asset's authority: it burns the
/// account's wrapped balance with the delegated authority, so the account
/// never approves the router.
///
/// The pool is not trusted: the router only credits output it actually
/// received. Underlying it cannot wrap back for an account while undoing a
/// failed swap stays pending until [`SwapRouter::claim`].
pub struct SwapRouter {
    address: Address,
    feed_a: Arc<dyn PriceFeed>,
    feed_b: Arc<dyn PriceFeed>,
    pool: Arc<dyn Pool>,
    wrapped_a: Arc<WrappedToken>,
    wrapped_b: Arc<WrappedToken>,
    /// Swaps are serialized.
    lock: Mutex<()>,
    /// Underlying owed per `(account, wrapped asset)`.
    pending: Mutex<HashMap<(Address, Address), U256>>,
}

/// One direction of travel through the router.
#[derive(Clone, Copy)]
struct Leg<'a> {
    direction: Direction,
    wrapped_in: &'a WrappedToken,
    wrapped_out: &'a WrappedToken,
    feed_in: &'a dyn PriceFeed,
    feed_out: &'a dyn PriceFeed,
}

impl Leg<'_> {
    fn reverse(self) -> Self {
        Self {
            direction: self.direction.reverse(),
            wrapped_in: self.wrapped_out,
            wrapped_out: self.wrapped_in,
            feed_in: self.feed_out,
            feed_out: self.feed_in,
        }
    }
}

/// Balance changes of the router across a trade.
#[derive(Clone, Copy, Debug)]
struct Fill {
    /// Underlying input that left the router.
    spent: U256,
    /// Underlying output that arrived at the router.
    received: U256,
}

/// Steps of a route that completed and have to be undone if a later one
/// fails.
#[derive(Clone, Copy, Debug)]
enum Stage {
    /// The account's input was burned and the underlying is held by the
    /// router.
    Unwrapped { amount_in: U256 },
    /// The underlying input was traded and the router holds what the trade
    /// left of it and its output.
    Traded { amount_in: U256, fill: Fill },
}

impl SwapRouter {
    /// Binds the router to its collaborators. `authority` has to be the
    /// authority guarding `wrapped_a` and `pool` has to trade exactly the
    /// underlyings of `wrapped_a` and `wrapped_b`, in that order.
    pub fn new(
        address: Address,
        feed_a: Arc<dyn PriceFeed>,
        feed_b: Arc<dyn PriceFeed>,
        pool: Arc<dyn Pool>,
        wrapped_a: Arc<WrappedToken>,
        wrapped_b: Arc<WrappedToken>,
        authority: &Arc<Authority>,
    ) -> Result<Self> {
        let underlyings = (
            wrapped_a.underlying().address(),
            wrapped_b.underlying().address(),
        );
        if pool.tokens() != underlyings {
            tracing::warn!(pool = ?pool.address(), ?underlyings, "pool trades other assets");
            return Err(Error::PoolMismatch);
        }
        if !Arc::ptr_eq(wrapped_a.authority(), authority) {
            return Err(Error::AuthorityMismatch);
        }
        Ok(Self {
            address,
            feed_a,
            feed_b,
            pool,
            wrapped_a,
            wrapped_b,
            lock: Mutex::new(()),
            pending: Default::default(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Underlying of `wrapped` the router holds for `account` after failing
    /// to wrap it back.
    pub fn pending_of(&self, account: Address, wrapped: Address) -> U256 {
        self.pending
            .lock()
            .unwrap()
            .get(&(account, wrapped))
            .copied()
            .unwrap_or_default()
    }

    /// Wraps everything pending for `caller` and credits it to them.
    pub fn claim(&self, caller: Address) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        for wrapped in [&*self.wrapped_a, &*self.wrapped_b] {
            let key = (caller, Fungible::address(wrapped));
            let Some(amount) = self.pending.lock().unwrap().get(&key).copied() else {
                continue;
            };
            self.wrap(wrapped, amount, caller)?;
            self.pending.lock().unwrap().remove(&key);
            tracing::debug!(?caller, wrapped = ?key.1, %amount, "claimed pending output");
        }
        Ok(())
    }

    /// Swaps `amount_in` of `account`'s wrapped A into wrapped B credited to
    /// `account`. The realized output has to be within `min_out_percent` and
    /// `max_out_percent` of the output the price feeds imply.
    ///
    /// `caller` is either `account` itself or an active controller of wrapped
    /// A's authority. Returns the amount of wrapped B minted.
    pub fn swap(
        &self,
        caller: Address,
        account: Address,
        amount_in: U256,
        min_out_percent: u32,
        max_out_percent: u32,
    ) -> Result<U256> {
        let leg = Leg {
            direction: Direction::AToB,
            wrapped_in: &self.wrapped_a,
            wrapped_out: &self.wrapped_b,
            feed_in: &*self.feed_a,
            feed_out: &*self.feed_b,
        };
        self.route(leg, caller, account, amount_in, min_out_percent, max_out_percent)
    }

    /// Like [`SwapRouter::swap`] from wrapped B into wrapped A. Requires the
    /// router to be a parent of wrapped B's authority.
    pub fn swap_back(
        &self,
        caller: Address,
        account: Address,
        amount_in: U256,
        min_out_percent: u32,
        max_out_percent: u32,
    ) -> Result<U256> {
        let leg = Leg {
            direction: Direction::BToA,
            wrapped_in: &self.wrapped_b,
            wrapped_out: &self.wrapped_a,
            feed_in: &*self.feed_b,
            feed_out: &*self.feed_a,
        };
        self.route(leg, caller, account, amount_in, min_out_percent, max_out_percent)
    }

    #[instrument(skip_all, fields(router = ?self.address, direction = %leg.direction, ?account))]
    fn route(
        &self,
        leg: Leg,
        caller: Address,
        account: Address,
        amount_in: U256,
        min_out_percent: u32,
        max_out_percent: u32,
    ) -> Result<U256> {
        let _guard = self.lock.lock().unwrap();
        if caller != account && !leg.wrapped_in.authority().is_active_controller(caller) {
            tracing::warn!(?caller, "rejected swap on behalf of another account");
            return Err(Error::NotAuthorized);
        }

        let expected = price::expected_out(
            Priced {
                feed: leg.feed_in,
                token_decimals: leg.wrapped_in.decimals(),
            },
            Priced {
                feed: leg.feed_out,
                token_decimals: leg.wrapped_out.decimals(),
            },
            amount_in,
        )?;
        let bounds = Bounds::from_percent(expected, min_out_percent, max_out_percent)?;
        bounds.check(self.pool.quote(leg.direction, amount_in)?)?;
        tracing::debug!(%amount_in, %expected, ?bounds, "routing swap");

        leg.wrapped_in
            .burn_from(self.address, account, self.address, amount_in)?;
        let fill = match self.trade(leg, amount_in, &bounds) {
            Ok(fill) => fill,
            Err(err) => {
                self.rollback(leg, account, Stage::Unwrapped { amount_in });
                return Err(err);
            }
        };
        let committed = bounds
            .check(fill.received)
            .and_then(|()| self.wrap(leg.wrapped_out, fill.received, account));
        if let Err(err) = committed {
            self.rollback(leg, account, Stage::Traded { amount_in, fill });
            return Err(err);
        }

        let amount_out = fill.received;
        tracing::debug!(%amount_in, %amount_out, "swap routed");
        Ok(amount_out)
    }

    /// Trades `amount_in` of the leg's input underlying through the pool and
    /// measures what actually moved.
    fn trade(&self, leg: Leg, amount_in: U256, bounds: &Bounds) -> Result<Fill> {
        let (token_in, token_out) = (leg.wrapped_in.underlying(), leg.wrapped_out.underlying());
        let (held_in, held_out) = (
            token_in.balance_of(self.address),
            token_out.balance_of(self.address),
        );
        token_in
            .approve(self.address, self.pool.address(), amount_in)
            .map_err(Error::UnderlyingTransferFailed)?;
        let reported = self.pool.swap_route(
            self.address,
            leg.direction,
            amount_in,
            bounds.min_amount_out,
            self.address,
        );
        if let Err(err) = token_in.approve(self.address, self.pool.address(), U256::ZERO) {
            tracing::warn!(?err, "failed to revoke pool allowance");
        }
        let reported = reported?;

        let fill = Fill {
            spent: held_in.saturating_sub(token_in.balance_of(self.address)),
            received: token_out
                .balance_of(self.address)
                .saturating_sub(held_out),
        };
        if fill.received != reported || fill.spent != amount_in {
            tracing::warn!(
                pool = ?self.pool.address(),
                %reported,
                ?fill,
                "pool misreported its trade"
            );
        }
        Ok(fill)
    }

    /// Wraps `amount` of the underlying held by the router for `to`.
    fn wrap(&self, wrapped: &WrappedToken, amount: U256, to: Address) -> Result<()> {
        wrapped
            .underlying()
            .approve(self.address, Fungible::address(wrapped), amount)
            .map_err(Error::UnderlyingTransferFailed)?;
        wrapped.wrap(self.address, amount, to)?;
        Ok(())
    }

    /// Undoes the completed steps of a failed route, latest first. Reversing
    /// a trade pays the pool's fee a second time, so the account gets back
    /// less than it put in. Output that cannot be traded back is credited as
    /// wrapped output instead.
    fn rollback(&self, leg: Leg, account: Address, stage: Stage) {
        tracing::debug!(?stage, "rolling back swap");
        let (refund_in, refund_out) = match stage {
            Stage::Unwrapped { amount_in } => (amount_in, U256::ZERO),
            Stage::Traded { amount_in, fill } => {
                let unspent = amount_in.saturating_sub(fill.spent);
                if fill.received.is_zero() {
                    (unspent, U256::ZERO)
                } else {
                    match self.trade(leg.reverse(), fill.received, &Bounds::default()) {
                        Ok(back) => (
                            unspent.saturating_add(back.received),
                            fill.received.saturating_sub(back.spent),
                        ),
                        Err(err) => {
                            tracing::error!(
                                ?err,
                                %amount_in,
                                ?fill,
                                "failed to reverse trade, crediting the output"
                            );
                            (unspent, fill.received)
                        }
                    }
                }
            }
        };
        self.restore(leg.wrapped_in, account, refund_in);
        self.restore(leg.wrapped_out, account, refund_out);
    }

    /// Wraps `amount` of the underlying held by the router back for
    /// `account`, or books it as pending if that fails.
    fn restore(&self, wrapped: &WrappedToken, account: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        if let Err(err) = self.wrap(wrapped, amount, account) {
            tracing::error!(
                ?err,
                %amount,
                ?account,
                "failed to restore wrapped asset, amount is claimable"
            );
            *self
                .pending
                .lock()
                .unwrap()
                .entry((account, Fungible::address(wrapped)))
                .or_default() += amount;
        }
    }
}
