//! Interfaces of the asset ledgers the protocol wraps, pools and routes.
//!
//! Every call names its `caller` explicitly. Ledgers never look up an ambient
//! sender, so authority has to be passed down to every call site that needs
//! it.

use {
    crate::TokenId,
    alloy::primitives::{Address, U256},
};

/// Reasons a collaborating ledger refuses to move value.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient balance: {available} < {required}")]
    InsufficientBalance { available: U256, required: U256 },
    #[error("insufficient allowance: {available} < {required}")]
    InsufficientAllowance { available: U256, required: U256 },
    #[error("caller is not allowed to move token {0}")]
    NotApproved(TokenId),
    #[error("token {0} does not exist")]
    UnknownToken(TokenId),
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// An ERC20 like ledger.
pub trait Fungible: Send + Sync {
    /// Address the ledger is deployed at.
    fn address(&self) -> Address;

    fn decimals(&self) -> u8;

    fn balance_of(&self, account: Address) -> U256;

    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Moves `amount` from `caller` to `to`.
    fn transfer(&self, caller: Address, to: Address, amount: U256) -> Result<(), TransferError>;

    /// Allows `spender` to move up to `amount` of `caller`'s balance.
    fn approve(&self, caller: Address, spender: Address, amount: U256)
    -> Result<(), TransferError>;

    /// Moves `amount` from `from` to `to` spending `caller`'s allowance.
    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError>;

    /// Whether the ledger is itself subject to an arbitrator. Wrappers
    /// refuse to wrap ledgers carrying this capability.
    fn is_arbitrable(&self) -> bool {
        false
    }
}

/// An ERC721 like collection.
pub trait NonFungible: Send + Sync {
    /// Address the collection is deployed at.
    fn address(&self) -> Address;

    fn owner_of(&self, id: TokenId) -> Option<Address>;

    fn balance_of(&self, account: Address) -> usize;

    fn get_approved(&self, id: TokenId) -> Option<Address>;

    /// Allows `spender` to move token `id` owned by `caller`.
    fn approve(&self, caller: Address, spender: Address, id: TokenId)
    -> Result<(), TransferError>;

    /// Moves token `id` from `from` to `to`. `caller` has to be the owner or
    /// the approved spender.
    fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: TokenId,
    ) -> Result<(), TransferError>;

    /// Metadata URI of token `id`.
    fn token_uri(&self, id: TokenId) -> Option<String>;

    /// Whether the collection is itself subject to an arbitrator.
    fn is_arbitrable(&self) -> bool {
        false
    }
}
