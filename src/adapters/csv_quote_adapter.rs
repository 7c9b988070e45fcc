//! CSV quote table adapter.
//!
//! Expects a header row followed by `symbol,name,price` records.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::error::PaperTradeError;
use crate::ports::quote_port::{Quote, QuotePort};

pub struct CsvQuoteAdapter {
    quotes: BTreeMap<String, Quote>,
}

impl CsvQuoteAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PaperTradeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PaperTradeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_csv(&content).map_err(|reason| PaperTradeError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })
    }

    pub fn from_csv(content: &str) -> Result<Self, String> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut quotes = BTreeMap::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

            let symbol = record
                .get(0)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("record {}: missing symbol column", line + 1))?
                .to_uppercase();
            let name = record.get(1).unwrap_or_default().to_string();
            let price: f64 = record
                .get(2)
                .ok_or_else(|| format!("record {}: missing price column", line + 1))?
                .parse()
                .map_err(|e| format!("record {}: invalid price value: {}", line + 1, e))?;

            if !price.is_finite() || price <= 0.0 {
                return Err(format!("record {}: price must be positive", line + 1));
            }

            quotes.insert(
                symbol.clone(),
                Quote {
                    symbol,
                    name,
                    price,
                },
            );
        }

        Ok(Self { quotes })
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(&symbol.trim().to_uppercase()).cloned()
    }

    fn symbols(&self) -> Vec<String> {
        self.quotes.keys().cloned().collect()
    }
}
