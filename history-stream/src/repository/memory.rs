// 交易历史合并流 - 内存签名仓库
//
// 用于测试和离线演示，按与RPC节点相同的 `limit`/`before` 语义分页。

use super::SignatureRepository;
use crate::streaming::StreamError;
use async_trait::async_trait;
use common::SignatureInfo;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 内存签名仓库
///
/// 每个地址对应一份按时间倒序排列的签名列表。可指定某些地址拉取失败，
/// 并记录每个地址的调用次数以便断言。
#[derive(Debug, Default)]
pub struct InMemorySignatureRepository {
    signatures: HashMap<String, Vec<SignatureInfo>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
}

impl InMemorySignatureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从JSON夹具文件加载：`{ "<address>": [SignatureInfo, ...] }`
    pub fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StreamError::Internal(format!("Failed to read fixture {:?}: {}", path, e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, StreamError> {
        let signatures: HashMap<String, Vec<SignatureInfo>> = serde_json::from_str(content)
            .map_err(|e| StreamError::InvalidResponse(e.to_string()))?;

        let mut repository = Self::new();
        for (address, list) in signatures {
            repository = repository.with_signatures(address, list);
        }
        Ok(repository)
    }

    /// 设置某个地址的签名列表，按出块时间倒序整理，无时间的记录排在最后
    pub fn with_signatures(mut self, address: impl Into<String>, mut list: Vec<SignatureInfo>) -> Self {
        list.sort_by(|a, b| b.block_time.cmp(&a.block_time));
        self.signatures.insert(address.into(), list);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 让某个地址之后的拉取都失败
    pub fn fail_address(&self, address: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(address.to_string());
        }
    }

    pub fn recover_address(&self, address: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(address);
        }
    }

    pub fn call_count(&self, address: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(address).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.signatures.keys().map(String::as_str)
    }
}

#[async_trait]
impl SignatureRepository for InMemorySignatureRepository {
    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, StreamError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(address.to_string()).or_insert(0) += 1;
        }

        let failing = self
            .failing
            .lock()
            .map(|failing| failing.contains(address))
            .unwrap_or(false);
        if failing {
            return Err(StreamError::Network(format!("Simulated failure for {}", address)));
        }

        let Some(list) = self.signatures.get(address) else {
            return Ok(Vec::new());
        };

        let start = match before {
            Some(signature) => match list.iter().position(|s| s.signature == signature) {
                Some(index) => index + 1,
                None => {
                    return Err(StreamError::Rpc {
                        code: -32602,
                        message: format!("Invalid param: unknown signature {}", signature),
                    })
                }
            },
            None => 0,
        };

        let page: Vec<SignatureInfo> = list.iter().skip(start).take(limit).cloned().collect();
        debug!(
            "Served {} signatures for {} (before: {:?})",
            page.len(),
            address,
            before
        );
        Ok(page)
    }
}
