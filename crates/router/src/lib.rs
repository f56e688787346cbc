//! Swaps between arbitrable wrapped assets through an external pool.
//!
//! The router unwraps the input asset on behalf of the account with the
//! authority delegated to it, trades the underlying on the pool and wraps the
//! proceeds into the output asset. Realized prices are checked against a pair
//! of price feeds.

mod error;
pub mod price;
mod swap;

pub use {
    error::{Error, Result},
    swap::SwapRouter,
};
