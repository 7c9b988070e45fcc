//! Port traits at the edge of the domain.

pub mod config_port;
pub mod ledger_port;
pub mod quote_port;
