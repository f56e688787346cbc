//! In-memory deployments of the whole protocol for scenario tests.

pub mod setup;
