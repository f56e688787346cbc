//! This crate is intended to contain code that is required to provide or
//! improve the observability of the protocol components. That includes
//! initialization logic for logging as well as the panic hook routing panics
//! through `tracing`.
pub mod config;
pub mod tracing;

pub use config::Config;
