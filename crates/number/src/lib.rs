//! Integer helpers shared by the ledger crates.

pub mod u256_ext;

pub use u256_ext::U256Ext;
