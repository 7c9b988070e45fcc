//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod json_file_adapter;
pub mod memory_adapter;
pub mod mock_quote_adapter;
pub mod csv_quote_adapter;
pub mod file_config_adapter;
