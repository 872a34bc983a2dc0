use ethers::types::TxHash;
use std::{result, time::Duration};

pub type Result<T> = result::Result<T, BridgeSdkError>;

#[derive(thiserror::Error, Debug)]
pub enum BridgeSdkError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown bridge token: {0}")]
    UnknownToken(String),
    #[error("Transfer amount {amount} is outside the allowed range [{min}, {max}]")]
    AmountOutOfRange {
        amount: String,
        min: String,
        max: String,
    },
    #[error("Timed out after {0:?} fetching gas, nonce and gas price")]
    ParamFetchTimeout(Duration),
    #[error("Error fetching transaction parameters: {0}")]
    ParamFetchError(String),
    #[error("Signer error: {0}")]
    SignerError(String),
    #[error("Error broadcasting transaction: {0}")]
    BroadcastError(String),
    #[error("Error communicating with bridge server: {0}")]
    BridgeServerError(String),
    #[error("Error deserializing RPC response: {0}")]
    DeserializationError(#[from] serde_json::Error),
    #[error("Invalid argument provided: {0}")]
    InvalidArgument(String),
}

/// Outcome of a bridge transfer as seen by the UI layer.
///
/// Every stage failure collapses into `Failure`; there is no partial success.
#[derive(Debug)]
pub enum PipelineResult {
    Success { transaction_hash: TxHash },
    Failure { reason: BridgeSdkError },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        match self {
            Self::Success { transaction_hash } => Some(*transaction_hash),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&BridgeSdkError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<TxHash> {
        match self {
            Self::Success { transaction_hash } => Ok(transaction_hash),
            Self::Failure { reason } => Err(reason),
        }
    }
}

impl From<Result<TxHash>> for PipelineResult {
    fn from(result: Result<TxHash>) -> Self {
        match result {
            Ok(transaction_hash) => Self::Success { transaction_hash },
            Err(reason) => Self::Failure { reason },
        }
    }
}
