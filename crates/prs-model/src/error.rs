use thiserror::Error;

/// Errors raised while loading or constructing a schema contract.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("duplicate canonical field: {0}")]
    DuplicateField(String),
    #[error("schema contract has no fields")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schema contract: {0}")]
    Parse(#[from] serde_json::Error),
}
