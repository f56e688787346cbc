//! Well known addresses used throughout the tests.

use alloy::primitives::Address;

/// Address of the `index`th externally owned test account.
pub const fn account(index: u8) -> Address {
    Address::with_last_byte(index + 1)
}

/// Address of the `index`th deployed test contract. Never collides with
/// [`account`] for the first 64 indices of either.
pub const fn contract(index: u8) -> Address {
    Address::with_last_byte(0xc0 + index)
}

/// Deployer of every test contract and the initial arbitrator.
pub const DEPLOYER: Address = account(0);
