//! Arbitrable wrapper around a fungible asset.

use {
    crate::{Authority, Error, Metadata, Result},
    alloy::primitives::{Address, Bytes, U256},
    model::{Event, EventLog, Fungible, TransferError},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

/// Wraps an underlying [`Fungible`] 1:1. Every minted unit is backed by one
/// unit of the underlying locked at the wrapper's address.
pub struct WrappedToken {
    address: Address,
    metadata: Metadata,
    decimals: u8,
    underlying: Arc<dyn Fungible>,
    authority: Arc<Authority>,
    state: Mutex<State>,
    events: EventLog,
}

#[derive(Debug, Default)]
struct State {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl State {
    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<()> {
        let available = self.balance(account);
        let remaining = available
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance {
                available,
                required: amount,
            })?;
        self.balances.insert(account, remaining);
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        // Check the receiving side first so a failure leaves no trace.
        self.balance(to).checked_add(amount).ok_or(Error::Overflow)?;
        self.debit(from, amount)?;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

impl WrappedToken {
    /// Deploys a wrapper around `underlying`.
    ///
    /// Fails with [`Error::CannotNestArbitrable`] if `underlying` is itself
    /// subject to an arbitrator.
    pub fn new(
        address: Address,
        underlying: Arc<dyn Fungible>,
        authority: Arc<Authority>,
        metadata: Metadata,
        events: EventLog,
    ) -> Result<Self> {
        if underlying.is_arbitrable() {
            tracing::warn!(underlying = ?underlying.address(), "refusing to nest arbitrable asset");
            return Err(Error::CannotNestArbitrable);
        }
        Ok(Self {
            address,
            metadata,
            decimals: underlying.decimals(),
            underlying,
            authority,
            state: Default::default(),
            events,
        })
    }

    pub fn from_config(
        address: Address,
        underlying: Arc<dyn Fungible>,
        authority: Arc<Authority>,
        config: &configs::Wrapper,
        events: EventLog,
    ) -> Result<Self> {
        Self::new(address, underlying, authority, config.into(), events)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn underlying(&self) -> &Arc<dyn Fungible> {
        &self.underlying
    }

    pub fn authority(&self) -> &Arc<Authority> {
        &self.authority
    }

    pub fn total_supply(&self) -> U256 {
        self.state.lock().unwrap().total_supply
    }

    /// Amount of the underlying backing the wrapped supply.
    pub fn locked(&self) -> U256 {
        self.underlying.balance_of(self.address)
    }

    /// Locks `amount` of the underlying from `caller` and mints the same
    /// amount to `to`. `caller` has to have approved the wrapper on the
    /// underlying beforehand.
    pub fn wrap(&self, caller: Address, amount: U256, to: Address) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        let balance = state.balance(to).checked_add(amount).ok_or(Error::Overflow)?;

        self.underlying
            .transfer_from(self.address, caller, self.address, amount)
            .map_err(Error::UnderlyingTransferFailed)?;
        state.total_supply = total_supply;
        state.balances.insert(to, balance);
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?to, %amount, "wrapped");
        self.events.emit(Event::Wrap {
            asset: self.address,
            from: caller,
            to,
            value: amount.into(),
        });
        Ok(())
    }

    /// Burns `amount` of `holder`'s balance and releases the same amount of
    /// the underlying to `to`.
    ///
    /// While an arbitrator is active only the arbitrator (or one of its
    /// parents) may burn, for any holder. Once resigned, holders may only burn
    /// their own balance.
    pub fn burn_from(
        &self,
        caller: Address,
        holder: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.authorize_redemption(caller, holder)?;
        let available = state.balance(holder);
        if available < amount {
            return Err(Error::InsufficientBalance {
                available,
                required: amount,
            });
        }

        self.underlying
            .transfer(self.address, to, amount)
            .map_err(Error::UnderlyingTransferFailed)?;
        state.debit(holder, amount)?;
        state.total_supply -= amount;
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?holder, ?to, %amount, "burned");
        self.events.emit(if caller == holder {
            Event::Unwrap {
                asset: self.address,
                holder,
                to,
                value: amount.into(),
            }
        } else {
            Event::Burn {
                asset: self.address,
                arbitrator: caller,
                holder,
                to,
                value: amount.into(),
            }
        });
        Ok(())
    }

    /// Redeems `caller`'s own balance.
    pub fn unwrap(&self, caller: Address, amount: U256, to: Address) -> Result<()> {
        self.burn_from(caller, caller, to, amount)
    }

    /// Moves `amount` from `from` to `to` without `from`'s consent.
    pub fn arbitrator_transfer(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.authority.is_active_controller(caller) {
            tracing::warn!(asset = ?self.address, ?caller, "rejected arbitrator transfer");
            return Err(Error::NotAuthorized);
        }
        state.move_balance(from, to, amount)?;
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?from, ?to, %amount, "arbitrator transfer");
        self.events.emit(Event::ArbitratorTransfer {
            asset: self.address,
            arbitrator: caller,
            from,
            to,
            value: amount.into(),
            data: Bytes::new(),
        });
        Ok(())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state.lock().unwrap().balance(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn transfer(&self, caller: Address, to: Address, amount: U256) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .move_balance(caller, to, amount)?;
        self.emit_transfer(caller, to, amount);
        Ok(())
    }

    pub fn approve(&self, caller: Address, spender: Address, amount: U256) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((caller, spender), amount);
        self.events.emit(Event::Approval {
            asset: self.address,
            owner: caller,
            spender,
            value: amount.into(),
        });
        Ok(())
    }

    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let available = state
            .allowances
            .get(&(from, caller))
            .copied()
            .unwrap_or_default();
        if available < amount {
            return Err(Error::InsufficientAllowance {
                available,
                required: amount,
            });
        }
        state.move_balance(from, to, amount)?;
        state.allowances.insert((from, caller), available - amount);
        drop(state);

        self.emit_transfer(from, to, amount);
        Ok(())
    }

    fn emit_transfer(&self, from: Address, to: Address, amount: U256) {
        self.events.emit(Event::Transfer {
            asset: self.address,
            from,
            to,
            value: amount.into(),
        });
    }

    fn authorize_redemption(&self, caller: Address, holder: Address) -> Result<()> {
        let authorized = if self.authority.is_resigned() {
            caller == holder
        } else {
            self.authority.is_active_controller(caller)
        };
        if !authorized {
            tracing::warn!(asset = ?self.address, ?caller, ?holder, "rejected redemption");
            return Err(Error::NotAuthorized);
        }
        Ok(())
    }
}

impl Fungible for WrappedToken {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, account: Address) -> U256 {
        WrappedToken::balance_of(self, account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        WrappedToken::allowance(self, owner, spender)
    }

    fn transfer(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        Ok(WrappedToken::transfer(self, caller, to, amount)?)
    }

    fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        Ok(WrappedToken::approve(self, caller, spender, amount)?)
    }

    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        Ok(WrappedToken::transfer_from(self, caller, from, to, amount)?)
    }

    fn is_arbitrable(&self) -> bool {
        true
    }
}
