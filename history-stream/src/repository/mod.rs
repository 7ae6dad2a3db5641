// 交易历史合并流 - 签名仓库
//
// 账户数据源通过 `SignatureRepository` 分页拉取签名。
// 仓库自行负责后端协议、超时等策略；合并层对此一无所知。

pub mod memory;
pub mod rpc;

use crate::streaming::StreamError;
use async_trait::async_trait;
use common::SignatureInfo;

pub use memory::InMemorySignatureRepository;
pub use rpc::{RpcConfig, RpcSignatureRepository};

/// 签名仓库
#[async_trait]
pub trait SignatureRepository: Send + Sync {
    /// 拉取 `address` 的一页签名（按时间倒序）
    ///
    /// # 参数
    ///
    /// - `address`: 账户地址
    /// - `limit`: 本页最多返回条数
    /// - `before`: 只返回早于该签名的记录；为空时从最新记录开始
    async fn get_signatures(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, StreamError>;
}
