//! Read-only price oracles.

use alloy::primitives::I256;

/// A Chainlink style price feed.
///
/// Answers are fixed point numbers with [`PriceFeed::decimals`] decimals
/// quoting one whole unit of the priced asset in a common reference currency.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait PriceFeed: Send + Sync {
    fn decimals(&self) -> u8;

    /// The most recent answer of the feed.
    fn latest_answer(&self) -> anyhow::Result<I256>;
}
