use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Usage error: {0}")]
    Usage(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Contract read failed: {0}")]
    ContractRead(String),
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AccountError {
    /// True for failures of the transport or the remote contract, as opposed
    /// to errors in locally supplied input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ContractRead(_))
    }
}

impl From<serde_json::Error> for AccountError {
    fn from(err: serde_json::Error) -> Self {
        AccountError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
