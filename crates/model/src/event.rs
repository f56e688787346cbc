//! Events produced for external indexers.

use {
    crate::TokenId,
    alloy::primitives::{Address, Bytes, U256},
    serde::Serialize,
    std::sync::{Arc, Mutex},
};

/// What an event moved: an amount of a fungible asset or a single
/// non-fungible token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    Amount(U256),
    Id(TokenId),
}

impl From<U256> for Value {
    fn from(amount: U256) -> Self {
        Self::Amount(amount)
    }
}

impl From<TokenId> for Value {
    fn from(id: TokenId) -> Self {
        Self::Id(id)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Event {
    /// `controller` is `None` once the authority resigned.
    ControllerChanged {
        authority: Address,
        previous: Address,
        controller: Option<Address>,
    },
    ParentAdded {
        authority: Address,
        parent: Address,
    },
    ParentRemoved {
        authority: Address,
        parent: Address,
    },
    Wrap {
        asset: Address,
        from: Address,
        to: Address,
        value: Value,
    },
    /// A holder redeemed their own wrapped value.
    Unwrap {
        asset: Address,
        holder: Address,
        to: Address,
        value: Value,
    },
    /// An arbitrator redeemed someone else's wrapped value.
    Burn {
        asset: Address,
        arbitrator: Address,
        holder: Address,
        to: Address,
        value: Value,
    },
    ArbitratorTransfer {
        asset: Address,
        arbitrator: Address,
        from: Address,
        to: Address,
        value: Value,
        data: Bytes,
    },
    Transfer {
        asset: Address,
        from: Address,
        to: Address,
        value: Value,
    },
    Approval {
        asset: Address,
        owner: Address,
        spender: Address,
        value: Value,
    },
    Deposit {
        pool: Address,
        provider: Address,
        amount_a: U256,
        amount_b: U256,
        shares: U256,
    },
    Withdraw {
        pool: Address,
        provider: Address,
        shares: U256,
        amount_a: U256,
        amount_b: U256,
    },
    Swap {
        pool: Address,
        sender: Address,
        to: Address,
        direction: u8,
        amount_in: U256,
        amount_out: U256,
    },
    /// Payout of amounts a pool owed `account` after a transfer it could not
    /// undo.
    Claim {
        pool: Address,
        account: Address,
        amount_a: U256,
        amount_b: U256,
    },
}

/// Append only journal shared by all components of a deployment.
///
/// Components only emit once an operation committed, so the journal never
/// contains events of rejected operations.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: Event) {
        tracing::trace!(?event, "emitting event");
        self.0.lock().unwrap().push(event);
    }

    /// Returns a copy of all events emitted so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Removes and returns all events emitted so far.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
