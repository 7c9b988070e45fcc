//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_file_adapter::{JsonFileLedger, DEFAULT_STARTING_BALANCE};
use crate::adapters::memory_adapter::InMemoryLedger;
use crate::adapters::mock_quote_adapter::MockQuoteAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::PaperTradeError;
use crate::domain::execution::{execute_trade, TradeOutcome};
use crate::domain::format::{format_currency, format_percentage};
use crate::domain::portfolio::Portfolio;
use crate::domain::transaction::{TradeRequest, TradeType};
use crate::domain::validation::clamp_share_input;
use crate::domain::valuation::compute_portfolio_valuation;
use crate::logging::{init_logging, LoggingConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::quote_port::QuotePort;

#[derive(Parser, Debug)]
#[command(name = "papertrade", about = "Paper-trading simulator")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clear all holdings and history and set the cash balance
    Init {
        #[arg(long)]
        balance: Option<f64>,
    },
    /// Show the current quote for a symbol, or every known quote
    Quote { symbol: Option<String> },
    /// Buy shares at the quoted (or given) price
    Buy {
        symbol: String,
        #[arg(allow_hyphen_values = true)]
        shares: String,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Sell shares at the quoted (or given) price
    Sell {
        symbol: String,
        #[arg(allow_hyphen_values = true)]
        shares: String,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Show holdings and portfolio valuation
    Portfolio,
    /// Show transaction history, most recent first
    History {
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show the cash balance
    Balance,
    /// Validate the configuration file
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Json,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteSource {
    Mock,
    Csv(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: LedgerBackend,
    pub ledger_path: PathBuf,
    pub starting_balance: f64,
    pub pool_size: u32,
    pub quote_source: QuoteSource,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let logging = LoggingConfig::resolve(
        Some(&config as &dyn ConfigPort),
        std::env::var("RUST_LOG").ok(),
    );
    if let Err(e) = init_logging(&logging) {
        eprintln!("warning: logging disabled ({e})");
    }

    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let settings = match build_settings(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = match cli.command {
        Command::Init { balance } => run_init(&settings, balance),
        Command::Quote { symbol } => run_quote(&settings, symbol.as_deref()),
        Command::Buy {
            symbol,
            shares,
            price,
        } => run_trade(&settings, TradeType::Buy, &symbol, &shares, price),
        Command::Sell {
            symbol,
            shares,
            price,
        } => run_trade(&settings, TradeType::Sell, &symbol, &shares, price),
        Command::Portfolio => run_portfolio(&settings),
        Command::History { limit, offset } => run_history(&settings, limit, offset),
        Command::Balance => run_balance(&settings),
        Command::Validate => {
            println!("Config validated successfully");
            print_settings(&settings);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Used when no `--config` is given.
pub const DEFAULT_CONFIG: &str = "[ledger]\nbackend = json\npath = papertrade.json\n\n[quotes]\nsource = mock\n\n[logging]\nlevel = warn\n";

/// Load the INI file (or the built-in defaults) and apply `PAPERTRADE_*`
/// environment overrides.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let loaded = match path {
        Some(p) => FileConfigAdapter::from_file(p),
        None => FileConfigAdapter::from_string(DEFAULT_CONFIG).map_err(|reason| {
            PaperTradeError::ConfigParse {
                file: "<defaults>".to_string(),
                reason,
            }
        }),
    };
    loaded
        .map(|c| c.with_env_overrides(std::env::vars()))
        .map_err(|err| {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        })
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, PaperTradeError> {
    let backend = match config.get_choice("ledger", "backend", "json").as_str() {
        "json" => LedgerBackend::Json,
        "sqlite" => LedgerBackend::Sqlite,
        "memory" => LedgerBackend::Memory,
        other => {
            return Err(PaperTradeError::ConfigInvalid {
                section: "ledger".into(),
                key: "backend".into(),
                reason: format!("unknown backend {other:?}"),
            })
        }
    };

    let quote_source = match config.get_choice("quotes", "source", "mock").as_str() {
        "mock" => QuoteSource::Mock,
        "csv" => {
            let path = config
                .get_string("quotes", "path")
                .ok_or_else(|| PaperTradeError::ConfigMissing {
                    section: "quotes".into(),
                    key: "path".into(),
                })?;
            QuoteSource::Csv(PathBuf::from(path))
        }
        other => {
            return Err(PaperTradeError::ConfigInvalid {
                section: "quotes".into(),
                key: "source".into(),
                reason: format!("unknown quote source {other:?}"),
            })
        }
    };

    Ok(Settings {
        backend,
        ledger_path: PathBuf::from(
            config
                .get_string("ledger", "path")
                .unwrap_or_else(|| "papertrade.json".to_string()),
        ),
        starting_balance: config.get_double("ledger", "starting_balance", DEFAULT_STARTING_BALANCE),
        pool_size: config.get_int("ledger", "pool_size", 4).clamp(1, 64) as u32,
        quote_source,
    })
}

pub fn open_ledger(settings: &Settings) -> Result<Box<dyn LedgerPort>, PaperTradeError> {
    match settings.backend {
        LedgerBackend::Json => Ok(Box::new(JsonFileLedger::new(
            &settings.ledger_path,
            settings.starting_balance,
        ))),
        LedgerBackend::Memory => Ok(Box::new(InMemoryLedger::new(settings.starting_balance))),
        #[cfg(feature = "sqlite")]
        LedgerBackend::Sqlite => Ok(Box::new(crate::adapters::sqlite_adapter::SqliteLedger::open(
            &settings.ledger_path,
            settings.starting_balance,
            settings.pool_size,
        )?)),
        #[cfg(not(feature = "sqlite"))]
        LedgerBackend::Sqlite => Err(PaperTradeError::ConfigInvalid {
            section: "ledger".into(),
            key: "backend".into(),
            reason: "built without the sqlite feature".into(),
        }),
    }
}

pub fn open_quotes(settings: &Settings) -> Result<Box<dyn QuotePort>, PaperTradeError> {
    match &settings.quote_source {
        QuoteSource::Mock => Ok(Box::new(MockQuoteAdapter)),
        QuoteSource::Csv(path) => Ok(Box::new(CsvQuoteAdapter::from_file(path)?)),
    }
}

/// Current valuation of whatever the ledger holds, priced from `quotes`.
pub fn current_portfolio(
    ledger: &dyn LedgerPort,
    quotes: &dyn QuotePort,
) -> Result<Portfolio, PaperTradeError> {
    let holdings = ledger.read_holdings()?;
    let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
    Ok(compute_portfolio_valuation(&holdings, &quotes.prices(&symbols)))
}

/// Build a request from raw CLI input. The share count is clamped to at
/// least 1; without `--price` the quote is used.
pub fn build_trade_request(
    quotes: &dyn QuotePort,
    trade_type: TradeType,
    symbol: &str,
    raw_shares: &str,
    price: Option<f64>,
) -> Result<TradeRequest, PaperTradeError> {
    let shares = clamp_share_input(raw_shares);
    let quote = quotes.quote(symbol);
    let (price, name) = match (price, quote) {
        (Some(p), q) => (p, q.map(|q| q.name).unwrap_or_default()),
        (None, Some(q)) => (q.price, q.name),
        (None, None) => {
            return Err(PaperTradeError::UnknownSymbol {
                symbol: symbol.trim().to_uppercase(),
            })
        }
    };
    Ok(TradeRequest::new(trade_type, symbol, shares, price).with_company_name(&name))
}

fn run_init(settings: &Settings, balance: Option<f64>) -> Result<(), PaperTradeError> {
    let balance = balance.unwrap_or(settings.starting_balance);
    if !balance.is_finite() || balance <= 0.0 {
        return Err(PaperTradeError::ConfigInvalid {
            section: "ledger".into(),
            key: "starting_balance".into(),
            reason: "starting balance must be positive".into(),
        });
    }
    let mut ledger = open_ledger(settings)?;
    ledger.reset(balance)?;
    println!("Ledger reset. Cash balance: {}", format_currency(balance));
    Ok(())
}

fn run_quote(settings: &Settings, symbol: Option<&str>) -> Result<(), PaperTradeError> {
    let quotes = open_quotes(settings)?;
    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => quotes.symbols(),
    };
    for symbol in &symbols {
        let quote = quotes
            .quote(symbol)
            .ok_or_else(|| PaperTradeError::UnknownSymbol {
                symbol: symbol.trim().to_uppercase(),
            })?;
        println!(
            "{:<6} {:<28} {:>12}",
            quote.symbol,
            quote.name,
            format_currency(quote.price)
        );
    }
    Ok(())
}

fn run_trade(
    settings: &Settings,
    trade_type: TradeType,
    symbol: &str,
    raw_shares: &str,
    price: Option<f64>,
) -> Result<(), PaperTradeError> {
    let quotes = open_quotes(settings)?;
    let mut ledger = open_ledger(settings)?;
    let request = build_trade_request(quotes.as_ref(), trade_type, symbol, raw_shares, price)?;

    let mut symbols: Vec<String> = ledger
        .read_holdings()?
        .into_iter()
        .map(|h| h.symbol)
        .collect();
    symbols.push(request.symbol.clone());
    let prices = quotes.prices(&symbols);

    let outcome = execute_trade(ledger.as_mut(), &prices, &request, Utc::now())?;
    print_outcome(&outcome);
    Ok(())
}

fn run_portfolio(settings: &Settings) -> Result<(), PaperTradeError> {
    let quotes = open_quotes(settings)?;
    let ledger = open_ledger(settings)?;
    let balance = ledger.read_balance()?;
    let portfolio = current_portfolio(ledger.as_ref(), quotes.as_ref())?;
    print_portfolio(&portfolio, balance);
    Ok(())
}

fn run_history(settings: &Settings, limit: usize, offset: usize) -> Result<(), PaperTradeError> {
    let ledger = open_ledger(settings)?;
    let transactions = ledger.read_transactions(limit, offset)?;
    if transactions.is_empty() {
        println!("No transactions.");
        return Ok(());
    }
    println!(
        "{:<20} {:<4} {:<6} {:>8} {:>12} {:>14}",
        "Date", "Type", "Symbol", "Shares", "Price", "Total"
    );
    for t in &transactions {
        println!(
            "{:<20} {:<4} {:<6} {:>8} {:>12} {:>14}",
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.trade_type,
            t.symbol,
            t.shares,
            format_currency(t.price),
            format_currency(t.total_cost)
        );
    }
    Ok(())
}

fn run_balance(settings: &Settings) -> Result<(), PaperTradeError> {
    let ledger = open_ledger(settings)?;
    println!("Cash balance: {}", format_currency(ledger.read_balance()?));
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("  ledger backend:   {:?}", settings.backend);
    if settings.backend != LedgerBackend::Memory {
        println!("  ledger path:      {}", settings.ledger_path.display());
    }
    println!("  starting balance: {}", format_currency(settings.starting_balance));
    match &settings.quote_source {
        QuoteSource::Mock => println!("  quotes:           built-in table"),
        QuoteSource::Csv(path) => println!("  quotes:           {}", path.display()),
    }
}

fn print_outcome(outcome: &TradeOutcome) {
    let t = &outcome.transaction;
    println!(
        "{} {} {} @ {} = {}",
        t.trade_type,
        t.shares,
        t.symbol,
        format_currency(t.price),
        format_currency(t.total_cost)
    );
    if let Some(realized) = outcome.realized_pl {
        println!("Realized P&L:     {}", format_currency(realized));
    }
    match &outcome.updated_holding {
        Some(h) => println!(
            "Position:         {} shares, avg cost {}",
            h.shares,
            format_currency(h.average_cost)
        ),
        None => println!("Position:         closed"),
    }
    println!("Cash balance:     {}", format_currency(outcome.updated_balance));
    println!(
        "Portfolio value:  {} ({})",
        format_currency(outcome.portfolio.total_value),
        format_percentage(outcome.portfolio.profit_loss_percent)
    );
}

fn print_portfolio(portfolio: &Portfolio, balance: f64) {
    if portfolio.is_empty() {
        println!("No holdings.");
    } else {
        println!(
            "{:<6} {:>8} {:>12} {:>12} {:>14} {:>14} {:>9}",
            "Symbol", "Shares", "Avg Cost", "Price", "Value", "P&L", "P&L %"
        );
        for h in &portfolio.holdings {
            println!(
                "{:<6} {:>8} {:>12} {:>12} {:>14} {:>14} {:>9}",
                h.symbol,
                h.shares,
                format_currency(h.average_cost),
                format_currency(h.current_price),
                format_currency(h.current_value),
                format_currency(h.unrealized_pl),
                format_percentage(h.unrealized_pl_percent)
            );
        }
    }

    println!();
    println!("Holdings:         {}", portfolio.holding_count());
    println!("Total value:      {}", format_currency(portfolio.total_value));
    println!("Total invested:   {}", format_currency(portfolio.total_invested));
    println!(
        "Profit/Loss:      {} ({})",
        format_currency(portfolio.profit_loss),
        format_percentage(portfolio.profit_loss_percent)
    );
    println!("Cash balance:     {}", format_currency(balance));
    println!(
        "Account value:    {}",
        format_currency(balance + portfolio.total_value)
    );

    if portfolio.has_stale_prices() {
        eprintln!(
            "warning: no live quote for {}; showing last known price",
            portfolio.stale_symbols.join(", ")
        );
    }
}
