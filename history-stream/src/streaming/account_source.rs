// 交易历史合并流 - AccountStreamSource实现
//
// 本模块实现了单账户数据源：通过签名仓库按页拉取某个账户的签名，
// 以 `before` 游标向更早的历史翻页。

use super::error::StreamError;
use super::source::StreamSource;
use crate::repository::SignatureRepository;
use async_trait::async_trait;
use common::{FetchingConfiguration, SignatureInfo, StreamItem};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 默认每页拉取条数
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// 单账户数据源
///
/// # 特性
///
/// - **惰性翻页**: 只有页缓冲耗尽时才请求下一页
/// - **幂等查看**: `current_item` 不消费记录，重复调用不会重复请求
/// - **下界停止**: 记录不晚于 `timestamp_end` 时 `next` 返回 `None` 且不消费，
///   之后用更早的下界调用可从原处继续
///
/// # 示例
///
/// ```rust,ignore
/// let repository = Arc::new(RpcSignatureRepository::new(RpcConfig::default())?);
/// let mut source = AccountStreamSource::new("acc1", "SOL", repository);
///
/// let config = FetchingConfiguration::new(Utc::now() - Duration::days(1));
/// while let Some(item) = source.next(&config, &cancel).await? {
///     println!("{} at {:?}", item.signature(), item.block_time());
/// }
/// ```
pub struct AccountStreamSource {
    /// 账户地址
    account: String,
    /// 代币符号
    symbol: String,
    /// 签名仓库
    repository: Arc<dyn SignatureRepository>,
    /// 每页条数
    batch_size: usize,
    /// 已拉取未消费的签名
    buffer: VecDeque<SignatureInfo>,
    /// 翻页游标：已拉取的最早一条签名
    before: Option<String>,
    /// 仓库已无更早记录
    exhausted: bool,
}

impl AccountStreamSource {
    pub fn new(
        account: impl Into<String>,
        symbol: impl Into<String>,
        repository: Arc<dyn SignatureRepository>,
    ) -> Self {
        let account = account.into();
        debug!("Creating AccountStreamSource for account: {}", account);
        Self {
            account,
            symbol: symbol.into(),
            repository,
            batch_size: DEFAULT_BATCH_SIZE,
            buffer: VecDeque::new(),
            before: None,
            exhausted: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn wrap(&self, signature_info: SignatureInfo) -> StreamItem {
        StreamItem::new(signature_info, self.account.clone(), self.symbol.clone())
    }

    /// 页缓冲为空时拉取下一页；空页标记为耗尽
    async fn fill_page(&mut self) -> Result<(), StreamError> {
        if !self.buffer.is_empty() || self.exhausted {
            return Ok(());
        }

        let page = self
            .repository
            .get_signatures(&self.account, self.batch_size, self.before.as_deref())
            .await
            .map_err(|e| {
                warn!("Failed to fetch signatures for account {}: {}", self.account, e);
                e
            })?;

        match page.last() {
            Some(last) => {
                self.before = Some(last.signature.clone());
                debug!(
                    "Fetched {} signatures for account: {}",
                    page.len(),
                    self.account
                );
                self.buffer.extend(page);
            }
            None => {
                debug!("History exhausted for account: {}", self.account);
                self.exhausted = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StreamSource for AccountStreamSource {
    async fn current_item(&mut self) -> Result<Option<StreamItem>, StreamError> {
        self.fill_page().await?;
        Ok(self.buffer.front().cloned().map(|info| self.wrap(info)))
    }

    async fn next(
        &mut self,
        config: &FetchingConfiguration,
        _cancel: &CancellationToken,
    ) -> Result<Option<StreamItem>, StreamError> {
        self.fill_page().await?;

        let in_range = match self.buffer.front() {
            Some(head) => config.accepts(head.block_time),
            None => return Ok(None),
        };
        if !in_range {
            return Ok(None);
        }

        Ok(self.buffer.pop_front().map(|info| self.wrap(info)))
    }

    async fn reset(&mut self, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        debug!("Resetting AccountStreamSource for account: {}", self.account);
        self.buffer.clear();
        self.before = None;
        self.exhausted = false;
    }
}
