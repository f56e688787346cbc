//! In-memory stand-ins for the ledgers and oracles the protocol talks to.

pub mod accounts;
pub mod erc20;
pub mod erc721;
pub mod feed;

pub use {erc20::Erc20, erc721::Erc721, feed::FixedFeed};
