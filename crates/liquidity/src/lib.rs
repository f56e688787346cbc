//! Two asset liquidity pools pricing swaps against their reserves.
//!
//! Pools only see balances: any [`model::Fungible`] can be pooled, including
//! arbitrable wrapped assets.

mod error;
pub mod fee;
pub mod pool;
pub mod pricing;

pub use {
    error::{Error, Result},
    fee::FeeFraction,
    pool::{Deposit, LiquidityPool, Pool, Withdrawal},
    pricing::{Curve, Direction},
};

#[cfg(any(test, feature = "test-util"))]
pub use pool::MockPool;
