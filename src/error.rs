use crate::domain::ids::RequestId;
use crate::domain::request::RequestStatus;
use crate::domain::rules::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),
    #[error("Illegal state transition from {from} to {to}")]
    IllegalStateTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("Request {request} is {status} and no longer accepts this action")]
    StaleRequestState {
        request: RequestId,
        status: RequestStatus,
    },
    #[error("Malformed payment callback: {0}")]
    MalformedCallback(String),
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MarketError {
    pub fn validation(rules: impl Into<ValidationErrors>) -> Self {
        Self::Validation(rules.into())
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    /// True for failures the caller may retry by resubmitting or re-issuing the call.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::BackendUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
