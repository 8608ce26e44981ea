use std::path::PathBuf;

use thiserror::Error;

/// Failures reading the entropy byte stream. Fatal to the run that asked for
/// a seed, since its randomness can no longer be reproduced.
#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("failed to open entropy stream {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read entropy stream")]
    Read(#[from] std::io::Error),
    #[error("entropy stream is empty")]
    Empty,
}

/// Domain-rule violations raised by account transfers.
///
/// These are expected flow control inside the monthly loop: a transfer the
/// rules forbid simply does not happen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    #[error("{account}: amount must not be negative (got {amount})")]
    NegativeAmount { account: String, amount: f64 },
    #[error("{account}: IRS rules prevent withdrawal")]
    WithdrawalForbidden { account: String },
    #[error("{account}: IRS rules prevent deposit")]
    DepositForbidden { account: String },
    #[error("{account}: cannot {operation} this account")]
    Unsupported {
        account: String,
        operation: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid household configuration")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("run {index} failed")]
    Run {
        index: usize,
        #[source]
        source: Box<SimulationError>,
    },
    #[error("a Monte Carlo study needs at least one run")]
    NoRuns,
    #[error("failed to hand off run results")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
