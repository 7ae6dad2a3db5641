use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Response {0} carries neither result nor error")]
    MissingResult(u64),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
