//! Arbitrable wrapper around a non-fungible collection.

use {
    crate::{Authority, Error, Metadata, Result},
    alloy::primitives::{Address, Bytes},
    model::{Event, EventLog, NonFungible, TokenId, TransferError},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

/// Wraps tokens of an underlying [`NonFungible`] collection. A wrapped token
/// keeps the id of the original, which stays locked at the wrapper's address
/// until unwrapped.
pub struct WrappedCollection {
    address: Address,
    metadata: Metadata,
    underlying: Arc<dyn NonFungible>,
    authority: Arc<Authority>,
    state: Mutex<State>,
    events: EventLog,
}

#[derive(Debug, Default)]
struct State {
    owners: HashMap<TokenId, Address>,
    approvals: HashMap<TokenId, Address>,
}

impl State {
    fn owner(&self, id: TokenId) -> Result<Address> {
        self.owners.get(&id).copied().ok_or(Error::UnknownToken(id))
    }

    fn reassign(&mut self, id: TokenId, to: Address) {
        self.approvals.remove(&id);
        self.owners.insert(id, to);
    }
}

impl WrappedCollection {
    /// Deploys a wrapper around `underlying`.
    ///
    /// Fails with [`Error::CannotNestArbitrable`] if `underlying` is itself
    /// subject to an arbitrator.
    pub fn new(
        address: Address,
        underlying: Arc<dyn NonFungible>,
        authority: Arc<Authority>,
        metadata: Metadata,
        events: EventLog,
    ) -> Result<Self> {
        if underlying.is_arbitrable() {
            tracing::warn!(underlying = ?underlying.address(), "refusing to nest arbitrable collection");
            return Err(Error::CannotNestArbitrable);
        }
        Ok(Self {
            address,
            metadata,
            underlying,
            authority,
            state: Default::default(),
            events,
        })
    }

    pub fn from_config(
        address: Address,
        underlying: Arc<dyn NonFungible>,
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

    pub fn authority(&self) -> &Arc<Authority> {
        &self.authority
    }

    /// Locks the original token `id` owned by `caller` and mints its wrapped
    /// counterpart to `to`. `caller` has to have approved the wrapper for
    /// `id` on the underlying collection.
    pub fn wrap_nft(&self, caller: Address, id: TokenId, to: Address) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.underlying
            .transfer_from(self.address, caller, self.address, id)
            .map_err(Error::UnderlyingTransferFailed)?;
        state.reassign(id, to);
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?to, %id, "wrapped");
        self.events.emit(Event::Wrap {
            asset: self.address,
            from: caller,
            to,
            value: id.into(),
        });
        Ok(())
    }

    /// Burns wrapped token `id` and releases the original to `to`.
    ///
    /// While an arbitrator is active only the arbitrator (or one of its
    /// parents) may unwrap, whoever owns the token. Once resigned only the
    /// current owner may.
    pub fn unwrap_nft(&self, caller: Address, id: TokenId, to: Address) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let owner = state.owner(id)?;
        let authorized = if self.authority.is_resigned() {
            caller == owner
        } else {
            self.authority.is_active_controller(caller)
        };
        if !authorized {
            tracing::warn!(asset = ?self.address, ?caller, ?owner, %id, "rejected unwrap");
            return Err(Error::NotAuthorized);
        }

        self.underlying
            .transfer_from(self.address, self.address, to, id)
            .map_err(Error::UnderlyingTransferFailed)?;
        state.owners.remove(&id);
        state.approvals.remove(&id);
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?owner, ?to, %id, "unwrapped");
        self.events.emit(if caller == owner {
            Event::Unwrap {
                asset: self.address,
                holder: owner,
                to,
                value: id.into(),
            }
        } else {
            Event::Burn {
                asset: self.address,
                arbitrator: caller,
                holder: owner,
                to,
                value: id.into(),
            }
        });
        Ok(())
    }

    /// Moves wrapped token `id` to `to` without the owner's approval. `data`
    /// is passed through to the emitted event.
    pub fn arbitrator_transfer(
        &self,
        caller: Address,
        id: TokenId,
        to: Address,
        data: Bytes,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !self.authority.is_active_controller(caller) {
            tracing::warn!(asset = ?self.address, ?caller, %id, "rejected arbitrator transfer");
            return Err(Error::NotAuthorized);
        }
        let from = state.owner(id)?;
        state.reassign(id, to);
        drop(state);

        tracing::debug!(asset = ?self.address, ?caller, ?from, ?to, %id, "arbitrator transfer");
        self.events.emit(Event::ArbitratorTransfer {
            asset: self.address,
            arbitrator: caller,
            from,
            to,
            value: id.into(),
            data,
        });
        Ok(())
    }

    /// Metadata of the original token.
    pub fn token_uri(&self, id: TokenId) -> Option<String> {
        self.underlying.token_uri(id)
    }

    pub fn owner_of(&self, id: TokenId) -> Option<Address> {
        self.state.lock().unwrap().owners.get(&id).copied()
    }

    pub fn balance_of(&self, account: Address) -> usize {
        self.state
            .lock()
            .unwrap()
            .owners
            .values()
            .filter(|owner| **owner == account)
            .count()
    }

    pub fn get_approved(&self, id: TokenId) -> Option<Address> {
        self.state.lock().unwrap().approvals.get(&id).copied()
    }

    pub fn approve(&self, caller: Address, spender: Address, id: TokenId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.owner(id)? != caller {
            return Err(Error::NotAuthorized);
        }
        state.approvals.insert(id, spender);
        drop(state);

        self.events.emit(Event::Approval {
            asset: self.address,
            owner: caller,
            spender,
            value: id.into(),
        });
        Ok(())
    }

    /// Owner or approved spender transfer.
    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: TokenId,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let owner = state.owner(id)?;
        let approved = state.approvals.get(&id) == Some(&caller);
        if owner != from || (caller != owner && !approved) {
            return Err(Error::NotAuthorized);
        }
        state.reassign(id, to);
        drop(state);

        self.events.emit(Event::Transfer {
            asset: self.address,
            from,
            to,
            value: id.into(),
        });
        Ok(())
    }
}

impl NonFungible for WrappedCollection {
    fn address(&self) -> Address {
        self.address
    }

    fn owner_of(&self, id: TokenId) -> Option<Address> {
        WrappedCollection::owner_of(self, id)
    }

    fn balance_of(&self, account: Address) -> usize {
        WrappedCollection::balance_of(self, account)
    }

    fn get_approved(&self, id: TokenId) -> Option<Address> {
        WrappedCollection::get_approved(self, id)
    }

    fn approve(
        &self,
        caller: Address,
        spender: Address,
        id: TokenId,
    ) -> std::result::Result<(), TransferError> {
        WrappedCollection::approve(self, caller, spender, id).map_err(|err| match err {
            Error::NotAuthorized => TransferError::NotApproved(id),
            err => err.into(),
        })
    }

    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: TokenId,
    ) -> std::result::Result<(), TransferError> {
        WrappedCollection::transfer_from(self, caller, from, to, id).map_err(|err| match err {
            Error::NotAuthorized => TransferError::NotApproved(id),
            err => err.into(),
        })
    }

    fn token_uri(&self, id: TokenId) -> Option<String> {
        WrappedCollection::token_uri(self, id)
    }

    fn is_arbitrable(&self) -> bool {
        true
    }
}
