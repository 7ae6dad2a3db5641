// 交易历史合并流 - 分页拉取器
//
// 历史列表每次加载一页：以流头部记录的出块时间为锚点向前取一个时间窗，
// 逐条消费窗口内的记录，凑满一页即返回；窗口耗尽后以新的头部继续。

use crate::streaming::{StreamError, StreamSource};
use chrono::Duration;
use common::{FetchingConfiguration, StreamItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 分页配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// 每页条数阈值：页内条数超过该值即返回
    pub page_size: usize,
    /// 时间窗（小时）
    pub window_hours: i64,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: 15,
            window_hours: 24,
        }
    }
}

impl PagerConfig {
    /// 时间窗；小时数超出 `Duration` 可表示范围时为 `None`
    pub fn window(&self) -> Option<Duration> {
        Duration::try_hours(self.window_hours)
    }
}

/// 一页的结束原因
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// 凑满一页
    Full,
    /// 流已耗尽
    Exhausted,
    /// 被取消
    Cancelled,
    /// 拉取失败，页内是失败前已收集的记录
    Failed(StreamError),
}

/// 一页历史
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub items: Vec<StreamItem>,
    pub outcome: PageOutcome,
}

impl HistoryPage {
    pub fn is_exhausted(&self) -> bool {
        matches!(self.outcome, PageOutcome::Exhausted)
    }

    pub fn error(&self) -> Option<&StreamError> {
        match &self.outcome {
            PageOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// 分页拉取器
///
/// 按签名去重：已交付过的签名不会在后续页中再次出现。
pub struct HistoryPager {
    source: Box<dyn StreamSource>,
    config: PagerConfig,
    /// 已交付的签名
    delivered: HashSet<String>,
}

impl HistoryPager {
    pub fn new(source: Box<dyn StreamSource>, config: PagerConfig) -> Self {
        Self {
            source,
            config,
            delivered: HashSet::new(),
        }
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    /// 替换数据源（账户列表变化时），同时清空已交付记录
    pub fn replace_source(&mut self, source: Box<dyn StreamSource>) {
        debug!("Replacing pager source");
        self.source = source;
        self.delivered.clear();
    }

    /// 清空已交付记录并重置数据源
    pub async fn clear(&mut self, cancel: &CancellationToken) {
        info!("Clearing history pager ({} delivered)", self.delivered.len());
        self.delivered.clear();
        self.source.reset(cancel).await;
    }

    /// 拉取下一页
    pub async fn fetch_page(&mut self, cancel: &CancellationToken) -> HistoryPage {
        let mut items = Vec::new();

        let outcome = match self.collect(&mut items, cancel).await {
            Ok(outcome) => outcome,
            Err(StreamError::Cancelled) => PageOutcome::Cancelled,
            Err(error) => {
                warn!(
                    "History page interrupted after {} items: {}",
                    items.len(),
                    error
                );
                PageOutcome::Failed(error)
            }
        };

        debug!("History page: {} items, outcome: {:?}", items.len(), outcome);
        HistoryPage { items, outcome }
    }

    async fn collect(
        &mut self,
        items: &mut Vec<StreamItem>,
        cancel: &CancellationToken,
    ) -> Result<PageOutcome, StreamError> {
        let window = self.config.window().ok_or_else(|| {
            StreamError::Internal(format!(
                "window_hours {} is out of range",
                self.config.window_hours
            ))
        })?;

        loop {
            if cancel.is_cancelled() {
                return Ok(PageOutcome::Cancelled);
            }

            // 头部无出块时间时无法确定时间窗，视为到底
            let head = self.source.current_item().await?;
            let Some(config) = head
                .and_then(|item| item.block_time())
                .and_then(|time| FetchingConfiguration::window_before(time, window))
            else {
                return Ok(PageOutcome::Exhausted);
            };

            debug!("Draining window down to {}", config.timestamp_end);

            let mut drained = 0usize;
            while let Some(item) = self.source.next(&config, cancel).await? {
                drained += 1;
                if cancel.is_cancelled() {
                    return Ok(PageOutcome::Cancelled);
                }
                if !self.delivered.insert(item.signature().to_string()) {
                    continue;
                }

                items.push(item);
                if items.len() > self.config.page_size {
                    return Ok(PageOutcome::Full);
                }
            }

            // 头部不落在自身时间窗内的数据源不会再产出
            if drained == 0 {
                return Ok(PageOutcome::Exhausted);
            }
        }
    }
}
