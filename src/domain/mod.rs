//! Core domain types and logic.

pub mod holding;
pub mod transaction;
pub mod portfolio;
pub mod valuation;
pub mod validation;
pub mod execution;
pub mod config_validation;
pub mod format;
pub mod error;
