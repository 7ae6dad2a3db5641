// 交易历史合并流 - MultipleStreamSource实现
//
// 本模块把多个独立分页的数据源合并成一条按时间倒序的流。
//
// # 流程
//
// - 缓冲为空时并发向所有子数据源批量拉取（每个子数据源同一时刻只有一个请求）
// - 拼接所有结果，按出块时间倒序稳定排序，追加到缓冲末尾
// - 每次 `next` 从缓冲头部弹出一条
//
// 每次填充内部有序，跨填充不重新归并：新一批总是追加在旧缓冲之后。

use super::error::StreamError;
use super::source::StreamSource;
use async_trait::async_trait;
use common::{FetchingConfiguration, StreamItem};
use futures::future::try_join_all;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 多数据源合并器
///
/// 子数据源列表在构造时确定，之后不可增删。缓冲只属于本实例。
///
/// 所有推进方法都要求 `&mut self`，因此同一实例不能被多个调用方并发驱动；
/// 需要跨任务共享时应整体放进 `tokio::sync::Mutex`。
///
/// # 示例
///
/// ```rust,ignore
/// let sources: Vec<Box<dyn StreamSource>> = accounts
///     .iter()
///     .map(|a| Box::new(AccountStreamSource::new(&a.account, &a.symbol, repository.clone())) as _)
///     .collect();
/// let mut merged = MultipleStreamSource::new(sources);
///
/// while let Some(item) = merged.next(&config, &cancel).await? {
///     println!("{} {}", item.account, item.signature());
/// }
/// ```
pub struct MultipleStreamSource {
    /// 子数据源
    sources: Vec<Box<dyn StreamSource>>,
    /// 已合并未消费的记录
    buffer: VecDeque<StreamItem>,
}

impl MultipleStreamSource {
    pub fn new(sources: Vec<Box<dyn StreamSource>>) -> Self {
        debug!("Creating MultipleStreamSource with {} sources", sources.len());
        Self {
            sources,
            buffer: VecDeque::new(),
        }
    }

    /// 子数据源数量
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// 缓冲中的记录数
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffered_items(&self) -> impl Iterator<Item = &StreamItem> {
        self.buffer.iter()
    }

    /// 并发拉取所有子数据源并追加到缓冲
    ///
    /// 任一子数据源失败或拉取途中被取消，整批作废，缓冲保持不变。
    async fn fill(
        &mut self,
        config: &FetchingConfiguration,
        cancel: &CancellationToken,
    ) -> Result<(), StreamError> {
        if cancel.is_cancelled() {
            return Err(StreamError::Cancelled);
        }

        debug!("Fanning out to {} sources", self.sources.len());

        let fan_out = try_join_all(
            self.sources
                .iter_mut()
                .map(|source| source.next_items(config, cancel)),
        );

        let batches = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Fill cancelled while fanning out");
                return Err(StreamError::Cancelled);
            }
            result = fan_out => result.map_err(|e| {
                warn!("Source failed during fill: {}", e);
                e
            })?,
        };

        let mut items: Vec<StreamItem> = batches.into_iter().flatten().collect();
        sort_newest_first(&mut items);

        debug!(
            "Fill merged {} items ({} already buffered)",
            items.len(),
            self.buffer.len()
        );
        self.buffer.extend(items);
        Ok(())
    }
}

#[async_trait]
impl StreamSource for MultipleStreamSource {
    /// 查看合并流的头部
    ///
    /// 缓冲非空时返回缓冲头；否则依次查看每个子数据源的头部，取出块时间最新的一条。
    /// 无出块时间的记录在比较中总是落败；都没有时间时取第一个非空结果。
    async fn current_item(&mut self) -> Result<Option<StreamItem>, StreamError> {
        if let Some(item) = self.buffer.front() {
            return Ok(Some(item.clone()));
        }

        let mut newest: Option<StreamItem> = None;
        for source in self.sources.iter_mut() {
            let Some(candidate) = source.current_item().await? else {
                continue;
            };
            newest = match newest {
                Some(current) if !is_newer(&candidate, &current) => Some(current),
                _ => Some(candidate),
            };
        }
        Ok(newest)
    }

    async fn next(
        &mut self,
        config: &FetchingConfiguration,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamItem>, StreamError> {
        if self.buffer.is_empty() {
            self.fill(config, cancel).await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn reset(&mut self, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }

        debug!("Resetting MultipleStreamSource ({} buffered)", self.buffer.len());
        self.buffer.clear();
        for source in self.sources.iter_mut() {
            source.reset(cancel).await;
        }
    }
}

/// 候选记录是否比当前胜者更新
fn is_newer(candidate: &StreamItem, current: &StreamItem) -> bool {
    match (candidate.block_time(), current.block_time()) {
        (Some(candidate), Some(current)) => candidate > current,
        (Some(_), None) => true,
        _ => false,
    }
}

/// 按出块时间倒序稳定排序，无时间的记录保持原相对顺序排在末尾
///
/// `Option` 的顺序中 `None` 最小，倒序比较正好把它放到最后。
pub(crate) fn sort_newest_first(items: &mut [StreamItem]) {
    items.sort_by(|a, b| b.block_time().cmp(&a.block_time()));
}
