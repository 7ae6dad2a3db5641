use crate::error::ProtocolError;
use crate::types::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";
pub const GET_SIGNATURES_FOR_ADDRESS: &str = "getSignaturesForAddress";

/// JSON-RPC 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: P,
}

impl<P> RpcRequest<P> {
    pub fn new(id: u64, method: impl Into<String>, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// getSignaturesForAddress 的可选参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignaturesForAddressOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<ConfirmationStatus>,
}

/// 位置参数：`[address, options]`
pub type SignaturesForAddressParams = (String, SignaturesForAddressOptions);

/// 构造 getSignaturesForAddress 请求
pub fn signatures_for_address_request(
    id: u64,
    address: &str,
    options: SignaturesForAddressOptions,
) -> RpcRequest<SignaturesForAddressParams> {
    RpcRequest::new(id, GET_SIGNATURES_FOR_ADDRESS, (address.to_string(), options))
}

/// JSON-RPC 错误对象
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// JSON-RPC 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl<T: DeserializeOwned> RpcResponse<T> {
    pub fn from_slice(body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// 取出结果；错误对象优先于结果
    pub fn into_result(self) -> Result<T, ProtocolError> {
        if let Some(error) = self.error {
            return Err(ProtocolError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result.ok_or(ProtocolError::MissingResult(self.id))
    }
}
