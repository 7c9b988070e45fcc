//! Configuration validation.
//!
//! Checks every field the CLI reads before any ledger is opened.

use crate::domain::error::PaperTradeError;
use crate::ports::config_port::ConfigPort;

pub const LEDGER_BACKENDS: &[&str] = &["json", "sqlite", "memory"];
pub const QUOTE_SOURCES: &[&str] = &["mock", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PaperTradeError> {
    validate_ledger_backend(config)?;
    validate_ledger_path(config)?;
    validate_starting_balance(config)?;
    validate_quote_source(config)?;
    Ok(())
}

fn ledger_backend(config: &dyn ConfigPort) -> String {
    config.get_choice("ledger", "backend", "json")
}

fn validate_ledger_backend(config: &dyn ConfigPort) -> Result<(), PaperTradeError> {
    let backend = ledger_backend(config);
    if !LEDGER_BACKENDS.contains(&backend.as_str()) {
        return Err(PaperTradeError::ConfigInvalid {
            section: "ledger".to_string(),
            key: "backend".to_string(),
            reason: format!(
                "unknown backend {:?}, expected one of {}",
                backend,
                LEDGER_BACKENDS.join(", ")
            ),
        });
    }
    Ok(())
}

fn validate_ledger_path(config: &dyn ConfigPort) -> Result<(), PaperTradeError> {
    if ledger_backend(config) == "memory" {
        return Ok(());
    }
    match config.get_string("ledger", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PaperTradeError::ConfigMissing {
            section: "ledger".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_starting_balance(config: &dyn ConfigPort) -> Result<(), PaperTradeError> {
    let value = config.get_double("ledger", "starting_balance", 25_000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(PaperTradeError::ConfigInvalid {
            section: "ledger".to_string(),
            key: "starting_balance".to_string(),
            reason: "starting_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_quote_source(config: &dyn ConfigPort) -> Result<(), PaperTradeError> {
    let source = config.get_choice("quotes", "source", "mock");

    if !QUOTE_SOURCES.contains(&source.as_str()) {
        return Err(PaperTradeError::ConfigInvalid {
            section: "quotes".to_string(),
            key: "source".to_string(),
            reason: format!(
                "unknown quote source {:?}, expected one of {}",
                source,
                QUOTE_SOURCES.join(", ")
            ),
        });
    }

    if source == "csv" {
        match config.get_string("quotes", "path") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(PaperTradeError::ConfigMissing {
                    section: "quotes".to_string(),
                    key: "path".to_string(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn minimal_json_config_is_valid() {
        assert!(validate_config(&config("[ledger]\npath = ./ledger.json\n")).is_ok());
    }

    #[test]
    fn memory_backend_needs_no_path() {
        assert!(validate_config(&config("[ledger]\nbackend = memory\n")).is_ok());
    }

    #[test]
    fn missing_path_rejected() {
        let err = validate_config(&config("[ledger]\nbackend = sqlite\n")).unwrap_err();
        assert!(matches!(err, PaperTradeError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn unknown_backend_rejected() {
        let err =
            validate_config(&config("[ledger]\nbackend = redis\npath = x\n")).unwrap_err();
        assert!(matches!(err, PaperTradeError::ConfigInvalid { key, .. } if key == "backend"));
    }

    #[test]
    fn non_positive_balance_rejected() {
        for balance in ["0", "-5"] {
            let ini = format!("[ledger]\npath = x\nstarting_balance = {balance}\n");
            let err = validate_config(&config(&ini)).unwrap_err();
            assert!(
                matches!(err, PaperTradeError::ConfigInvalid { ref key, .. } if key == "starting_balance")
            );
        }
    }

    #[test]
    fn csv_quotes_need_path() {
        let err = validate_config(&config("[ledger]\npath = x\n[quotes]\nsource = csv\n"))
            .unwrap_err();
        assert!(matches!(err, PaperTradeError::ConfigMissing { section, .. } if section == "quotes"));

        assert!(
            validate_config(&config(
                "[ledger]\npath = x\n[quotes]\nsource = csv\npath = q.csv\n"
            ))
            .is_ok()
        );
    }

    #[test]
    fn unknown_quote_source_rejected() {
        let err = validate_config(&config("[ledger]\npath = x\n[quotes]\nsource = bloomberg\n"))
            .unwrap_err();
        assert!(matches!(err, PaperTradeError::ConfigInvalid { key, .. } if key == "source"));
    }
}
