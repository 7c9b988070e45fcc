//! Domain error types.

/// Reason a trade request was refused before anything was written.
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeRejection {
    #[error("invalid share count: {shares} (holdings must stay between 1 and 2^53 shares)")]
    InvalidShareCount { shares: u64 },

    #[error("invalid price: {price} (must be greater than zero)")]
    InvalidPrice { price: f64 },

    #[error("invalid symbol: {symbol:?} (expected 1-10 uppercase letters)")]
    InvalidSymbol { symbol: String },

    #[error("Insufficient balance. Available: ${available:.2}, Required: ${required:.2}")]
    InsufficientBalance { available: f64, required: f64 },

    #[error("Insufficient shares of {symbol}. Available: {available}, Requested: {requested}")]
    InsufficientShares {
        symbol: String,
        available: u64,
        requested: u64,
    },
}

/// Top-level error type for papertrade.
#[derive(Debug, thiserror::Error)]
pub enum PaperTradeError {
    #[error(transparent)]
    Rejected(#[from] TradeRejection),

    #[error("persistence failure: {reason}")]
    PersistenceFailure { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no quote available for {symbol}")]
    UnknownSymbol { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PaperTradeError {
    pub fn persistence(reason: impl std::fmt::Display) -> Self {
        PaperTradeError::PersistenceFailure {
            reason: reason.to_string(),
        }
    }
}

impl PaperTradeError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PaperTradeError::Io(_) => 1,
            PaperTradeError::ConfigParse { .. }
            | PaperTradeError::ConfigMissing { .. }
            | PaperTradeError::ConfigInvalid { .. } => 2,
            PaperTradeError::PersistenceFailure { .. } => 3,
            PaperTradeError::Rejected(_) => 4,
            PaperTradeError::UnknownSymbol { .. } => 5,
        }
    }
}

impl From<&PaperTradeError> for std::process::ExitCode {
    fn from(err: &PaperTradeError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
