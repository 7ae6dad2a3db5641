// 交易历史合并流 - 错误类型定义
//
// 本模块定义了历史流拉取过程中可能出现的所有错误类型，
// 并提供了从传输层和协议层错误的转换。

use common::ProtocolError;
use thiserror::Error;

/// 流错误类型
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    // ========== 控制流 ==========
    /// 操作被取消（不是故障，调用方应与真实错误区分对待）
    #[error("Operation cancelled")]
    Cancelled,

    // ========== 传输错误 ==========
    /// 网络错误
    #[error("Network error: {0}")]
    Network(String),

    /// 请求超时
    #[error("Request timeout")]
    Timeout,

    // ========== 后端错误 ==========
    /// RPC节点返回的错误对象
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// 响应无法解析
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ========== 其他错误 ==========
    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StreamError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }

    /// 是否为瞬时错误（调用方可自行决定是否重试）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::Network(_) | StreamError::Timeout | StreamError::Rpc { .. }
        )
    }
}

/// 错误转换：从 reqwest::Error
impl From<reqwest::Error> for StreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StreamError::Timeout
        } else if error.is_decode() {
            StreamError::InvalidResponse(error.to_string())
        } else {
            StreamError::Network(error.to_string())
        }
    }
}

/// 错误转换：从 common::ProtocolError
impl From<ProtocolError> for StreamError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::Rpc { code, message } => StreamError::Rpc { code, message },
            other => StreamError::InvalidResponse(other.to_string()),
        }
    }
}
