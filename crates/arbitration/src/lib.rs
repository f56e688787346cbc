//! Assets placed under an arbitrator's override authority.
//!
//! An [`Authority`] names the controller that may force transfers and
//! redemptions of the assets it guards, plus the parents it delegated that
//! power to. [`WrappedToken`] and [`WrappedCollection`] lock an underlying
//! fungible or non-fungible asset 1:1 and consult their authority on every
//! privileged operation.
//!
//! Locks are always taken in the order wrapper, authority, underlying ledger.
//! Nothing ever calls back up that chain.

pub mod authority;
pub mod erc20;
pub mod erc721;
mod error;

pub use {
    authority::{Authority, Controller},
    erc20::WrappedToken,
    erc721::WrappedCollection,
    error::{Error, Result},
};

/// Human readable identity of a wrapped asset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub symbol: String,
}

impl Metadata {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

impl From<&configs::Wrapper> for Metadata {
    fn from(config: &configs::Wrapper) -> Self {
        Self::new(&config.name, &config.symbol)
    }
}
