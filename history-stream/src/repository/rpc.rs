// 交易历史合并流 - JSON-RPC签名仓库
//
// 通过HTTP(S)调用节点的 getSignaturesForAddress 分页拉取签名。
// 超时由本仓库自己负责，不做重试。

use super::SignatureRepository;
use crate::streaming::StreamError;
use async_trait::async_trait;
use common::{
    signatures_for_address_request, ConfirmationStatus, RpcResponse, SignatureInfo,
    SignaturesForAddressOptions,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// RPC客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// 节点地址
    pub url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 建连超时（秒）
    pub connect_timeout_secs: u64,
    /// 查询使用的确认级别
    pub commitment: Option<ConfirmationStatus>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            commitment: Some(ConfirmationStatus::Confirmed),
        }
    }
}

/// JSON-RPC签名仓库
pub struct RpcSignatureRepository {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcSignatureRepository {
    pub fn new(config: RpcConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StreamError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn options(&self, limit: usize, before: Option<&str>) -> SignaturesForAddressOptions {
        SignaturesForAddressOptions {
            limit: Some(limit),
            before: before.map(str::to_string),
            until: None,
            commitment: self.config.commitment,
        }
    }
}

#[async_trait]
impl SignatureRepository for RpcSignatureRepository {
    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, StreamError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = signatures_for_address_request(id, address, self.options(limit, before));

        debug!(
            "RPC getSignaturesForAddress #{} for {} (limit: {}, before: {:?})",
            id, address, limit, before
        );

        let response = self.http.post(&self.config.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("RPC node returned HTTP {} for {}", status, address);
            return Err(StreamError::Network(format!("Node returned HTTP {}", status)));
        }

        let body = response.bytes().await?;
        let signatures = RpcResponse::<Vec<SignatureInfo>>::from_slice(&body)?.into_result()?;

        debug!("RPC #{} returned {} signatures for {}", id, signatures.len(), address);
        Ok(signatures)
    }
}
