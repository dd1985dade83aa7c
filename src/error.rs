//! # error
//!
//! Failure type for every call that leaves the process.
//!
//! Broker and data-API wrappers return [`BrokerResult`]; none of them decide
//! policy.  The caller picks the degradation: the window filter falls back to
//! the local session check, the trend gate blocks, the position fetch becomes
//! an empty list, and a failed sell is logged and left for the next cycle.

use thiserror::Error;

pub type BrokerResult<T> = Result<T, BrokerError>;

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The broker refused the order (insufficient qty, halted symbol, ...).
    #[error("Order rejected: {0}")]
    Rejected(String),
}

impl BrokerError {
    /// Maps a non-2xx status to the matching variant.  Alpaca answers order
    /// validation failures with 403 or 422.
    pub fn from_status(status: u16, body: String, is_order: bool) -> Self {
        match status {
            403 | 422 if is_order => BrokerError::Rejected(format!("HTTP {status}: {body}")),
            _ => BrokerError::Http { status, body },
        }
    }
}
