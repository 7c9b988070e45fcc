//! papertrade: a simulated brokerage account.
//!
//! Hexagonal architecture: valuation, validation and execution in [`domain`],
//! port traits in [`ports`], ledgers and quote sources in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
