// 交易历史合并流 - StreamSource Trait定义
//
// 本模块定义了统一的历史数据源抽象接口。每个数据源是某一个后端上的分页游标，
// 按时间倒序逐条产出交易记录；多数据源合并见 `MultipleStreamSource`。

use super::error::StreamError;
use async_trait::async_trait;
use common::{FetchingConfiguration, StreamItem};
use tokio_util::sync::CancellationToken;

/// 统一的历史数据源抽象接口
///
/// 状态机：`Fresh → (Fetching ⇄ Idle)* → Exhausted`，任意状态下 `reset` 回到 `Fresh`。
///
/// 推进游标的方法都要求 `&mut self`：同一数据源同一时刻最多只有一个进行中的调用。
///
/// # 实现
///
/// - `EmptyStreamSource`: 永远为空的数据源
/// - `AccountStreamSource`: 单个账户的签名历史
/// - `MultipleStreamSource`: 多个数据源按时间合并
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// 查看游标当前指向的记录，不推进游标
    ///
    /// 幂等：两次调用之间没有 `next`/`reset` 时返回相同结果。
    async fn current_item(&mut self) -> Result<Option<StreamItem>, StreamError>;

    /// 推进游标一条，返回满足 `config` 的下一条记录
    ///
    /// # 返回
    ///
    /// - `Ok(Some(item))`: 成功获取记录
    /// - `Ok(None)`: 没有更多满足条件的记录
    /// - `Err(error)`: 发生错误
    async fn next(
        &mut self,
        config: &FetchingConfiguration,
        cancel: &CancellationToken,
    ) -> Result<Option<StreamItem>, StreamError>;

    /// 批量获取：反复调用 `next` 直到返回 `None` 或被取消
    ///
    /// 循环中途被取消不会报错，直接返回已收集的记录。
    async fn next_items(
        &mut self,
        config: &FetchingConfiguration,
        cancel: &CancellationToken,
    ) -> Result<Vec<StreamItem>, StreamError> {
        let mut items = Vec::new();
        while !cancel.is_cancelled() {
            match self.next(config, cancel).await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// 将游标重置到初始位置；调用时已取消则什么也不做
    async fn reset(&mut self, cancel: &CancellationToken);
}

/// 空数据源
///
/// 账户列表加载前的占位数据源。
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyStreamSource;

#[async_trait]
impl StreamSource for EmptyStreamSource {
    async fn current_item(&mut self) -> Result<Option<StreamItem>, StreamError> {
        Ok(None)
    }

    async fn next(
        &mut self,
        _config: &FetchingConfiguration,
        _cancel: &CancellationToken,
    ) -> Result<Option<StreamItem>, StreamError> {
        Ok(None)
    }

    async fn reset(&mut self, _cancel: &CancellationToken) {}
}
