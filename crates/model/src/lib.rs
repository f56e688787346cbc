//! Contains models that are shared between the arbitration, liquidity and
//! routing crates: the collaborator interfaces the ledgers are built on and
//! the events they produce.

pub mod event;
pub mod feed;
pub mod token;

use {
    alloy::primitives::U256,
    serde::{Deserialize, Serialize},
};

pub use {
    event::{Event, EventLog, Value},
    feed::PriceFeed,
    token::{Fungible, NonFungible, TransferError},
};

#[cfg(any(test, feature = "test-util"))]
pub use feed::MockPriceFeed;

/// Identifier of a single non-fungible token within a collection.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct TokenId(pub U256);

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}
