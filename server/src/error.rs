//! Error taxonomy shared by the chain adapter, the transaction builders and
//! the HTTP layer.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client input rejected before any chain call.
    #[error("{0}")]
    Validation(String),
    /// Signer is not allowed to perform the operation.
    #[error("{0}")]
    Unauthorized(String),
    /// Signer owns no coins, or not enough to cover amount + gas.
    #[error("{0}")]
    InsufficientFunds(String),
    /// Full node accepted the call but the transaction or query failed.
    #[error("{0}")]
    ChainRejected(String),
    /// Transport failure talking to the full node or a third party.
    #[error("{0}")]
    Network(String),
    /// Missing or malformed server configuration.
    #[error("{0}")]
    Configuration(String),
    /// Same idempotency key is already being processed.
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Prefix the message with an operation label, keeping the kind.
    pub fn context(self, label: &str) -> Self {
        let wrap = |msg: String| format!("{label}: {msg}");
        match self {
            Error::Validation(m) => Error::Validation(wrap(m)),
            Error::Unauthorized(m) => Error::Unauthorized(wrap(m)),
            Error::InsufficientFunds(m) => Error::InsufficientFunds(wrap(m)),
            Error::ChainRejected(m) => Error::ChainRejected(wrap(m)),
            Error::Network(m) => Error::Network(wrap(m)),
            Error::Configuration(m) => Error::Configuration(wrap(m)),
            Error::Duplicate(m) => Error::Duplicate(wrap(m)),
            Error::Internal(m) => Error::Internal(wrap(m)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Error::ChainRejected(_) => "CHAIN_REJECTED",
            Error::Network(_) => "NETWORK_ERROR",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::Duplicate(_) => "DUPLICATE_REQUEST",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::FORBIDDEN,
            Error::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Error::ChainRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Network(_) => StatusCode::BAD_GATEWAY,
            Error::Configuration(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Duplicate(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

impl From<bcs::Error> for Error {
    fn from(e: bcs::Error) -> Self {
        Error::Internal(format!("bcs: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("json: {e}"))
    }
}
