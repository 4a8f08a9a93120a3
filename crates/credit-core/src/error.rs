use chrono::NaiveDate;
use thiserror::Error;

/// Data-quality defects surfaced by the engine.
///
/// Business edge cases (unknown company, one-record series, zero denominators)
/// never produce an error; they resolve to neutral values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid transaction {payer_id} -> {receiver_id}: amount {amount} must be positive")]
    InvalidTransaction {
        payer_id: String,
        receiver_id: String,
        amount: f64,
    },

    #[error("Duplicate record for company {company_id} in period {period}")]
    DuplicatePeriod { company_id: String, period: NaiveDate },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
